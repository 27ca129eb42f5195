use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::DebtAccount;
use crate::engines::numeric::round_currency;

/// Payoff orderings the strategist simulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoffMethod {
    /// Highest interest rate first.
    Avalanche,
    /// Lowest balance first.
    Snowball,
}

impl PayoffMethod {
    pub fn label(&self) -> &'static str {
        match self {
            PayoffMethod::Avalanche => "avalanche",
            PayoffMethod::Snowball => "snowball",
        }
    }
}

/// One debt's place in the chosen payoff ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoffOrderEntry {
    /// 1-indexed priority in the chosen method's sort order.
    pub priority: u32,
    pub debt_id: String,
    pub name: String,
    pub balance: f64,
    pub interest_rate: f64,
    /// Simulation month (1-indexed) in which the balance reaches zero; `None`
    /// if it outlives the simulation horizon.
    pub payoff_month: Option<u32>,
}

/// Recommended payoff plan: whichever ordering costs less interest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtPayoffStrategy {
    pub method: PayoffMethod,
    pub total_debt: f64,
    pub monthly_payment: f64,
    pub months_to_payoff: u32,
    pub projected_payoff_date: NaiveDate,
    pub total_interest_paid: f64,
    /// Other method's interest minus the chosen method's, reported as-is.
    pub total_interest_saved: f64,
    pub payoff_order: Vec<PayoffOrderEntry>,
}

const MAX_SIMULATION_MONTHS: u32 = 360;

struct SimulationOutcome {
    total_interest: f64,
    total_paid: f64,
    months: u32,
    /// Payoff month per debt, aligned with the simulated ordering.
    payoff_months: Vec<Option<u32>>,
}

/// Simulate both orderings and recommend the cheaper one. Returns `None`
/// when the tenant carries no active debt.
pub fn generate_strategy(
    debts: &[DebtAccount],
    extra_monthly_payment: f64,
    today: NaiveDate,
) -> Option<DebtPayoffStrategy> {
    let open_debts: Vec<&DebtAccount> = debts
        .iter()
        .filter(|debt| debt.active && debt.current_balance > 0.0)
        .collect();
    if open_debts.is_empty() {
        return None;
    }

    let mut avalanche_order = open_debts.clone();
    avalanche_order.sort_by(|a, b| {
        b.interest_rate
            .partial_cmp(&a.interest_rate)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let mut snowball_order = open_debts.clone();
    snowball_order.sort_by(|a, b| {
        a.current_balance
            .partial_cmp(&b.current_balance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let avalanche = simulate(&avalanche_order, extra_monthly_payment);
    let snowball = simulate(&snowball_order, extra_monthly_payment);

    let (method, chosen, chosen_order, other_interest) =
        if avalanche.total_interest <= snowball.total_interest {
            (
                PayoffMethod::Avalanche,
                avalanche,
                avalanche_order,
                snowball.total_interest,
            )
        } else {
            (
                PayoffMethod::Snowball,
                snowball,
                snowball_order,
                avalanche.total_interest,
            )
        };

    let total_debt: f64 = open_debts.iter().map(|debt| debt.current_balance).sum();
    let monthly_payment: f64 = open_debts
        .iter()
        .map(|debt| debt.monthly_commitment())
        .sum::<f64>()
        + extra_monthly_payment;

    let payoff_order = chosen_order
        .iter()
        .enumerate()
        .map(|(index, debt)| PayoffOrderEntry {
            priority: index as u32 + 1,
            debt_id: debt.id.clone(),
            name: debt.name.clone(),
            balance: round_currency(debt.current_balance),
            interest_rate: debt.interest_rate,
            payoff_month: chosen.payoff_months[index],
        })
        .collect();

    Some(DebtPayoffStrategy {
        method,
        total_debt: round_currency(total_debt),
        monthly_payment: round_currency(monthly_payment),
        months_to_payoff: chosen.months,
        projected_payoff_date: today + Months::new(chosen.months),
        total_interest_paid: round_currency(chosen.total_interest),
        total_interest_saved: round_currency(other_interest - chosen.total_interest),
        payoff_order,
    })
}

/// Month-by-month amortization: accrue interest on every open balance, apply
/// minimums, then roll the leftover budget onto the first open debt in the
/// given ordering.
fn simulate(ordered: &[&DebtAccount], extra_monthly_payment: f64) -> SimulationOutcome {
    let mut balances: Vec<f64> = ordered.iter().map(|debt| debt.current_balance).collect();
    let mut payoff_months: Vec<Option<u32>> = vec![None; ordered.len()];
    let monthly_budget: f64 = ordered
        .iter()
        .map(|debt| debt.monthly_commitment())
        .sum::<f64>()
        + extra_monthly_payment;

    let mut total_interest = 0.0;
    let mut total_paid = 0.0;
    let mut months = 0;

    for month in 1..=MAX_SIMULATION_MONTHS {
        if balances.iter().all(|balance| *balance <= 0.0) {
            break;
        }
        months = month;

        for (index, debt) in ordered.iter().enumerate() {
            if balances[index] > 0.0 {
                let interest = balances[index] * debt.interest_rate / 100.0 / 12.0;
                balances[index] += interest;
                total_interest += interest;
            }
        }

        let mut budget = monthly_budget;
        for (index, debt) in ordered.iter().enumerate() {
            if balances[index] <= 0.0 {
                continue;
            }
            let payment = debt.monthly_commitment().min(balances[index]).min(budget);
            balances[index] -= payment;
            budget -= payment;
            total_paid += payment;
            if balances[index] <= 0.0 {
                payoff_months[index] = Some(month);
            }
        }

        if budget > 0.0 {
            if let Some(index) = balances.iter().position(|balance| *balance > 0.0) {
                let payment = budget.min(balances[index]);
                balances[index] -= payment;
                total_paid += payment;
                if balances[index] <= 0.0 {
                    payoff_months[index] = Some(month);
                }
            }
        }
    }

    SimulationOutcome {
        total_interest,
        total_paid,
        months,
        payoff_months,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DebtKind;

    fn debt(id: &str, balance: f64, rate: f64, minimum: f64) -> DebtAccount {
        DebtAccount {
            id: id.to_string(),
            name: format!("debt {id}"),
            kind: DebtKind::CreditCard,
            original_balance: balance,
            current_balance: balance,
            interest_rate: rate,
            monthly_payment: None,
            minimum_payment: Some(minimum),
            active: true,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, 15).unwrap()
    }

    #[test]
    fn no_active_debts_yields_none() {
        assert!(generate_strategy(&[], 0.0, today()).is_none());
        let mut settled = debt("d1", 0.0, 19.9, 35.0);
        settled.current_balance = 0.0;
        assert!(generate_strategy(&[settled], 100.0, today()).is_none());
    }

    #[test]
    fn avalanche_wins_when_rates_diverge() {
        let debts = vec![
            debt("low-rate", 3_000.0, 5.0, 100.0),
            debt("high-rate", 3_000.0, 24.9, 100.0),
        ];
        let strategy = generate_strategy(&debts, 150.0, today()).expect("strategy");
        assert_eq!(strategy.method, PayoffMethod::Avalanche);
        assert!(strategy.total_interest_saved >= 0.0);
        assert_eq!(strategy.payoff_order[0].debt_id, "high-rate");
        assert_eq!(strategy.payoff_order[0].priority, 1);
        assert_eq!(strategy.payoff_order[1].priority, 2);
    }

    #[test]
    fn amounts_paid_equal_principal_plus_interest() {
        let debts = vec![
            debt("a", 2_000.0, 18.0, 60.0),
            debt("b", 5_000.0, 7.5, 120.0),
            debt("c", 800.0, 29.9, 40.0),
        ];
        let open: Vec<&DebtAccount> = debts.iter().collect();
        for ordering in [&open, &open.iter().rev().copied().collect::<Vec<_>>()] {
            let outcome = simulate(ordering, 80.0);
            let total_debt: f64 = ordering.iter().map(|debt| debt.current_balance).sum();
            assert!(
                (outcome.total_paid - (total_debt + outcome.total_interest)).abs() < 1e-6,
                "conservation holds for any ordering"
            );
            assert!(outcome.payoff_months.iter().all(Option::is_some));
        }
    }

    #[test]
    fn every_debt_records_a_payoff_month_within_horizon() {
        let debts = vec![debt("a", 1_200.0, 19.9, 50.0), debt("b", 600.0, 9.9, 25.0)];
        let strategy = generate_strategy(&debts, 0.0, today()).expect("strategy");
        assert!(strategy.months_to_payoff <= MAX_SIMULATION_MONTHS);
        assert!(strategy
            .payoff_order
            .iter()
            .all(|entry| entry.payoff_month.is_some()));
        assert_eq!(
            strategy.projected_payoff_date,
            today() + Months::new(strategy.months_to_payoff)
        );
    }

    #[test]
    fn starved_budget_hits_the_horizon_cap() {
        // Minimum payment below monthly interest accrual never terminates.
        let debts = vec![debt("a", 10_000.0, 30.0, 10.0)];
        let strategy = generate_strategy(&debts, 0.0, today()).expect("strategy");
        assert_eq!(strategy.months_to_payoff, MAX_SIMULATION_MONTHS);
        assert!(strategy.payoff_order[0].payoff_month.is_none());
    }
}

use serde::{Deserialize, Serialize};

use crate::engines::numeric::{round_currency, round_pct};

/// Supported loan products with per-type fallback pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanType {
    Mortgage,
    Personal,
    Auto,
    CreditCard,
    Student,
    Business,
    Other,
}

impl LoanType {
    /// Default annual rate (%) and term (months) used when the caller does
    /// not supply them.
    pub fn default_terms(&self) -> (f64, u32) {
        match self {
            LoanType::Mortgage => (4.5, 300),
            LoanType::Personal => (9.9, 36),
            LoanType::Auto => (6.9, 60),
            LoanType::CreditCard => (21.9, 24),
            LoanType::Student => (5.5, 120),
            LoanType::Business => (8.5, 60),
            LoanType::Other => (10.9, 36),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LoanType::Mortgage => "mortgage",
            LoanType::Personal => "personal loan",
            LoanType::Auto => "auto loan",
            LoanType::CreditCard => "credit card",
            LoanType::Student => "student loan",
            LoanType::Business => "business loan",
            LoanType::Other => "loan",
        }
    }
}

/// Affordability verdict, monotone in the affordability score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AffordabilityBand {
    VeryAffordable,
    Affordable,
    Stretching,
    Risky,
    Unaffordable,
}

impl AffordabilityBand {
    pub fn from_score(score: u8) -> Self {
        match score {
            80.. => AffordabilityBand::VeryAffordable,
            60..=79 => AffordabilityBand::Affordable,
            40..=59 => AffordabilityBand::Stretching,
            20..=39 => AffordabilityBand::Risky,
            _ => AffordabilityBand::Unaffordable,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AffordabilityBand::VeryAffordable => "very_affordable",
            AffordabilityBand::Affordable => "affordable",
            AffordabilityBand::Stretching => "stretching",
            AffordabilityBand::Risky => "risky",
            AffordabilityBand::Unaffordable => "unaffordable",
        }
    }
}

/// Tenant financial position feeding an assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffordabilityInputs {
    /// Trailing three-month average monthly income.
    pub monthly_income: f64,
    /// Trailing three-month average monthly expenses.
    pub monthly_expenses: f64,
    /// Sum of existing active debts' monthly commitments.
    pub existing_debt_payments: f64,
    /// Combined balance across savings-kind accounts.
    pub savings_balance: f64,
}

/// Published affordability result. Amounts are rounded to 2 dp and
/// percentages to 1 dp; internal math runs at full precision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanAffordabilityResult {
    pub loan_type: LoanType,
    pub requested_amount: f64,
    pub term_months: u32,
    pub annual_rate: f64,
    pub monthly_payment_estimate: f64,
    pub monthly_income: f64,
    pub monthly_expenses: f64,
    pub existing_debt_payments: f64,
    pub debt_to_income_before: f64,
    pub debt_to_income_after: f64,
    pub max_affordable_amount: f64,
    pub recommended_amount: f64,
    pub passes_rate_stress_test: bool,
    pub passes_income_stress_test: bool,
    pub affordability_score: u8,
    pub band: AffordabilityBand,
    pub risk_factors: Vec<String>,
    pub recommendations: Vec<String>,
    pub summary: String,
}

const MAX_PAYMENT_INCOME_SHARE: f64 = 0.36;
const RECOMMENDED_PAYMENT_INCOME_SHARE: f64 = 0.28;
const STRESS_RATE_BUMP: f64 = 2.0;
const STRESS_INCOME_FACTOR: f64 = 0.9;
const STRESS_DEBT_SERVICE_CEILING: f64 = 0.40;

/// Standard amortized monthly payment. A zero rate degenerates to straight
/// division rather than NaN.
pub fn monthly_payment(principal: f64, annual_rate_pct: f64, term_months: u32) -> f64 {
    if term_months == 0 || principal <= 0.0 {
        return 0.0;
    }
    let r = annual_rate_pct / 100.0 / 12.0;
    if r == 0.0 {
        return principal / term_months as f64;
    }
    let growth = (1.0 + r).powi(term_months as i32);
    principal * r * growth / (growth - 1.0)
}

/// Inverse amortization: the principal a given monthly budget can service.
pub fn principal_for_payment(payment: f64, annual_rate_pct: f64, term_months: u32) -> f64 {
    if term_months == 0 || payment <= 0.0 {
        return 0.0;
    }
    let r = annual_rate_pct / 100.0 / 12.0;
    if r == 0.0 {
        return payment * term_months as f64;
    }
    let growth = (1.0 + r).powi(term_months as i32);
    payment * (growth - 1.0) / (r * growth)
}

/// Run the full affordability assessment for a requested loan.
pub fn assess(
    inputs: &AffordabilityInputs,
    loan_type: LoanType,
    requested_amount: f64,
    term_months: Option<u32>,
    annual_rate: Option<f64>,
) -> LoanAffordabilityResult {
    let (default_rate, default_term) = loan_type.default_terms();
    let term = term_months.unwrap_or(default_term);
    let rate = annual_rate.unwrap_or(default_rate);

    let income = inputs.monthly_income;
    let expenses = inputs.monthly_expenses;
    let existing = inputs.existing_debt_payments;

    let payment = monthly_payment(requested_amount, rate, term);

    let dti_before = ratio_pct(existing, income);
    let dti_after = ratio_pct(existing + payment, income);

    let max_budget = (income * MAX_PAYMENT_INCOME_SHARE - existing).max(0.0);
    let recommended_budget = (income * RECOMMENDED_PAYMENT_INCOME_SHARE - existing).max(0.0);
    let max_affordable_amount = principal_for_payment(max_budget, rate, term);
    let recommended_amount = principal_for_payment(recommended_budget, rate, term);

    let stressed_payment = monthly_payment(requested_amount, rate + STRESS_RATE_BUMP, term);
    let passes_rate_stress_test =
        existing + stressed_payment <= income * STRESS_DEBT_SERVICE_CEILING;
    let passes_income_stress_test =
        existing + payment <= income * STRESS_INCOME_FACTOR * STRESS_DEBT_SERVICE_CEILING;

    let disposable = income - expenses - existing - payment;
    let savings_coverage_months = if expenses > 0.0 {
        inputs.savings_balance / expenses
    } else if inputs.savings_balance > 0.0 {
        f64::INFINITY
    } else {
        0.0
    };

    let mut score: i32 = 100;
    score -= match dti_after {
        dti if dti > 50.0 => 40,
        dti if dti > 43.0 => 30,
        dti if dti > 36.0 => 20,
        dti if dti > 28.0 => 10,
        _ => 0,
    };
    score -= match disposable {
        d if d < 0.0 => 40,
        d if d < 200.0 => 25,
        d if d < 500.0 => 10,
        _ => 0,
    };
    if !passes_rate_stress_test {
        score -= 10;
    }
    if !passes_income_stress_test {
        score -= 10;
    }
    if savings_coverage_months >= 6.0 {
        score += 5;
    } else if savings_coverage_months < 3.0 {
        score -= 5;
    }
    let affordability_score = score.clamp(0, 100) as u8;
    let band = AffordabilityBand::from_score(affordability_score);

    let mut risk_factors = Vec::new();
    if income <= 0.0 {
        risk_factors.push("No regular income observed in recent transactions".to_string());
    }
    if dti_after > 36.0 {
        risk_factors.push(format!(
            "Debt-to-income after this loan would reach {}%",
            round_pct(dti_after)
        ));
    }
    if disposable < 500.0 {
        risk_factors.push(format!(
            "Only £{} of monthly income would remain after commitments",
            round_currency(disposable.max(0.0))
        ));
    }
    if !passes_rate_stress_test {
        risk_factors.push("Fails the +2% interest rate stress test".to_string());
    }
    if !passes_income_stress_test {
        risk_factors.push("Fails the 10% income drop stress test".to_string());
    }
    if savings_coverage_months < 3.0 {
        risk_factors.push("Savings cover less than three months of expenses".to_string());
    }

    let mut recommendations = Vec::new();
    if requested_amount > recommended_amount {
        recommendations.push(format!(
            "Consider borrowing no more than £{} to stay within the 28% guideline",
            round_currency(recommended_amount)
        ));
    }
    if !passes_rate_stress_test || !passes_income_stress_test {
        recommendations
            .push("Build a larger buffer before committing to this repayment".to_string());
    }
    if savings_coverage_months < 3.0 {
        recommendations
            .push("Grow emergency savings to at least three months of expenses".to_string());
    }
    if recommendations.is_empty() {
        recommendations.push("This loan fits comfortably within your current budget".to_string());
    }

    let summary = summary_for(
        band,
        loan_type,
        requested_amount,
        payment,
        recommended_amount,
    );

    LoanAffordabilityResult {
        loan_type,
        requested_amount: round_currency(requested_amount),
        term_months: term,
        annual_rate: rate,
        monthly_payment_estimate: round_currency(payment),
        monthly_income: round_currency(income),
        monthly_expenses: round_currency(expenses),
        existing_debt_payments: round_currency(existing),
        debt_to_income_before: round_pct(dti_before),
        debt_to_income_after: round_pct(dti_after),
        max_affordable_amount: round_currency(max_affordable_amount),
        recommended_amount: round_currency(recommended_amount),
        passes_rate_stress_test,
        passes_income_stress_test,
        affordability_score,
        band,
        risk_factors,
        recommendations,
        summary,
    }
}

/// Percentage ratio with a defined zero when the denominator is zero.
fn ratio_pct(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator * 100.0
    } else {
        0.0
    }
}

fn summary_for(
    band: AffordabilityBand,
    loan_type: LoanType,
    amount: f64,
    payment: f64,
    recommended: f64,
) -> String {
    let amount = round_currency(amount);
    let payment = round_currency(payment);
    let recommended = round_currency(recommended);
    match band {
        AffordabilityBand::VeryAffordable => format!(
            "A £{amount} {} at £{payment}/month fits comfortably within your budget.",
            loan_type.label()
        ),
        AffordabilityBand::Affordable => format!(
            "A £{amount} {} at £{payment}/month is affordable with room to spare.",
            loan_type.label()
        ),
        AffordabilityBand::Stretching => format!(
            "A £{amount} {} at £{payment}/month would stretch your budget; £{recommended} would sit more comfortably.",
            loan_type.label()
        ),
        AffordabilityBand::Risky => format!(
            "A £{amount} {} at £{payment}/month carries real risk; consider closer to £{recommended}.",
            loan_type.label()
        ),
        AffordabilityBand::Unaffordable => format!(
            "A £{amount} {} at £{payment}/month is not affordable on your current income.",
            loan_type.label()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> AffordabilityInputs {
        AffordabilityInputs {
            monthly_income: 5_000.0,
            monthly_expenses: 3_000.0,
            existing_debt_payments: 0.0,
            savings_balance: 0.0,
        }
    }

    #[test]
    fn zero_rate_amortization_is_straight_division() {
        assert_eq!(monthly_payment(12_000.0, 0.0, 60), 200.0);
        assert_eq!(principal_for_payment(200.0, 0.0, 60), 12_000.0);
    }

    #[test]
    fn amortization_round_trips_through_its_inverse() {
        let payment = monthly_payment(20_000.0, 8.9, 60);
        let principal = principal_for_payment(payment, 8.9, 60);
        assert!((principal - 20_000.0).abs() < 1e-6);
    }

    #[test]
    fn degenerate_inputs_never_produce_nan() {
        let result = assess(
            &AffordabilityInputs {
                monthly_income: 0.0,
                monthly_expenses: 0.0,
                existing_debt_payments: 0.0,
                savings_balance: 0.0,
            },
            LoanType::Personal,
            10_000.0,
            Some(0),
            Some(0.0),
        );
        assert!(result.monthly_payment_estimate.is_finite());
        assert!(result.debt_to_income_after.is_finite());
        assert!(result.max_affordable_amount.is_finite());
        assert_eq!(result.debt_to_income_after, 0.0);
    }

    #[test]
    fn healthy_personal_loan_scenario() {
        let result = assess(&inputs(), LoanType::Personal, 20_000.0, Some(60), Some(8.9));
        assert!((result.monthly_payment_estimate - 414.20).abs() < 0.5);
        assert_eq!(result.debt_to_income_before, 0.0);
        assert!((result.debt_to_income_after - 8.3).abs() < 0.2);
        assert_eq!(result.band, AffordabilityBand::VeryAffordable);
        assert!(result.passes_rate_stress_test);
        assert!(result.passes_income_stress_test);
    }

    #[test]
    fn band_is_monotone_in_score() {
        let rank = |band: AffordabilityBand| match band {
            AffordabilityBand::Unaffordable => 0,
            AffordabilityBand::Risky => 1,
            AffordabilityBand::Stretching => 2,
            AffordabilityBand::Affordable => 3,
            AffordabilityBand::VeryAffordable => 4,
        };
        let mut previous = 0;
        for score in 0..=100u8 {
            let current = rank(AffordabilityBand::from_score(score));
            assert!(current >= previous, "score={score}");
            previous = current;
        }
        assert_eq!(AffordabilityBand::from_score(80), AffordabilityBand::VeryAffordable);
        assert_eq!(AffordabilityBand::from_score(79), AffordabilityBand::Affordable);
        assert_eq!(AffordabilityBand::from_score(60), AffordabilityBand::Affordable);
        assert_eq!(AffordabilityBand::from_score(40), AffordabilityBand::Stretching);
        assert_eq!(AffordabilityBand::from_score(20), AffordabilityBand::Risky);
        assert_eq!(AffordabilityBand::from_score(19), AffordabilityBand::Unaffordable);
    }

    #[test]
    fn heavy_existing_debt_degrades_the_band() {
        let strained = AffordabilityInputs {
            monthly_income: 2_500.0,
            monthly_expenses: 2_100.0,
            existing_debt_payments: 600.0,
            savings_balance: 0.0,
        };
        let result = assess(&strained, LoanType::Personal, 15_000.0, Some(36), Some(12.9));
        assert!(matches!(
            result.band,
            AffordabilityBand::Risky | AffordabilityBand::Unaffordable
        ));
        assert!(!result.risk_factors.is_empty());
        assert!(result.debt_to_income_after > 36.0);
    }
}

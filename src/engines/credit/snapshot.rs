use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::config::SnapshotConfig;
use crate::domain::{Account, AccountKind, DebtAccount, Transaction, TransactionKind};

/// Aggregated credit signals for one tenant, rebuilt from storage on every
/// calculation and discarded afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditDataSnapshot {
    pub total_credit_limit: f64,
    pub total_credit_used: f64,
    pub utilization_percentage: f64,
    pub account_types: Vec<AccountKind>,
    pub number_of_accounts: u32,
    pub oldest_account_age_months: u32,
    pub average_account_age_months: u32,
    pub on_time_payments: u32,
    pub missed_payments: u32,
    pub recent_applications: u32,
}

const PAYMENT_KEYWORDS: [&str; 3] = ["payment", "repayment", "credit card"];
const APPLICATION_KEYWORDS: [&str; 2] = ["application", "credit check"];

/// Build the scoring snapshot from already-fetched tenant data.
///
/// Utilization is fed from two overlapping sources: credit-kind asset
/// accounts contribute a flat assumed limit, and revolving debt accounts
/// contribute their original/current balances on top. The double counting is
/// a known quirk of the upstream data model; correcting it would shift score
/// semantics, so it stays.
pub fn build_snapshot(
    accounts: &[Account],
    debts: &[DebtAccount],
    transactions: &[Transaction],
    config: &SnapshotConfig,
    now: DateTime<Utc>,
) -> CreditDataSnapshot {
    let mut total_credit_limit = 0.0;
    let mut total_credit_used = 0.0;
    let mut account_types: Vec<AccountKind> = Vec::new();
    let mut age_months: Vec<u32> = Vec::new();

    for account in accounts {
        if !account_types.contains(&account.kind) {
            account_types.push(account.kind);
        }
        age_months.push(months_between(account.created_at, now));

        if account.kind == AccountKind::Credit {
            total_credit_limit += config.assumed_card_limit;
            total_credit_used += account.balance.abs();
        }
    }

    for debt in debts {
        if debt.active && debt.is_revolving() {
            total_credit_limit += debt.original_balance;
            total_credit_used += debt.current_balance;
        }
    }

    let utilization_percentage = if total_credit_limit > 0.0 {
        total_credit_used / total_credit_limit * 100.0
    } else {
        0.0
    };

    let oldest_account_age_months = age_months.iter().copied().max().unwrap_or(0);
    let average_account_age_months = if age_months.is_empty() {
        0
    } else {
        age_months.iter().sum::<u32>() / age_months.len() as u32
    };

    let mut on_time_payments = 0u32;
    let mut recent_applications = 0u32;
    for transaction in transactions {
        let description = transaction.description.to_lowercase();
        if transaction.kind == TransactionKind::Expense
            && PAYMENT_KEYWORDS
                .iter()
                .any(|keyword| description.contains(keyword))
        {
            on_time_payments += 1;
        }
        if APPLICATION_KEYWORDS
            .iter()
            .any(|keyword| description.contains(keyword))
        {
            recent_applications += 1;
        }
    }

    CreditDataSnapshot {
        total_credit_limit,
        total_credit_used,
        utilization_percentage,
        account_types,
        number_of_accounts: accounts.len() as u32,
        oldest_account_age_months,
        average_account_age_months,
        on_time_payments,
        // No due-date vs. payment-date data exists upstream, so missed
        // payments cannot be observed yet.
        missed_payments: 0,
        recent_applications: recent_applications.min(config.inquiry_cap),
    }
}

/// Whole calendar months elapsed between two instants, floored at zero.
pub(crate) fn months_between(from: DateTime<Utc>, to: DateTime<Utc>) -> u32 {
    if from >= to {
        return 0;
    }
    let mut months =
        (to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32;
    if to.day() < from.day() {
        months -= 1;
    }
    months.max(0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
    }

    fn account(id: &str, kind: AccountKind, balance: f64, created: DateTime<Utc>) -> Account {
        Account {
            id: id.to_string(),
            kind,
            balance,
            created_at: created,
        }
    }

    fn expense(description: &str) -> Transaction {
        Transaction {
            id: format!("tx-{description}"),
            kind: TransactionKind::Expense,
            amount: 50.0,
            category: "bills".to_string(),
            description: description.to_string(),
            booked_at: at(2025, 7, 10),
        }
    }

    #[test]
    fn empty_tenant_yields_zeroed_snapshot() {
        let snapshot = build_snapshot(&[], &[], &[], &SnapshotConfig::default(), at(2025, 8, 1));
        assert_eq!(snapshot.total_credit_limit, 0.0);
        assert_eq!(snapshot.utilization_percentage, 0.0);
        assert_eq!(snapshot.number_of_accounts, 0);
        assert_eq!(snapshot.oldest_account_age_months, 0);
        assert_eq!(snapshot.missed_payments, 0);
    }

    #[test]
    fn credit_accounts_and_revolving_debts_both_feed_utilization() {
        let accounts = vec![account("a1", AccountKind::Credit, 1_000.0, at(2020, 1, 15))];
        let debts = vec![DebtAccount {
            id: "d1".to_string(),
            name: "Card".to_string(),
            kind: crate::domain::DebtKind::CreditCard,
            original_balance: 2_000.0,
            current_balance: 500.0,
            interest_rate: 21.9,
            monthly_payment: None,
            minimum_payment: Some(35.0),
            active: true,
        }];
        let snapshot = build_snapshot(
            &accounts,
            &debts,
            &[],
            &SnapshotConfig::default(),
            at(2025, 8, 1),
        );
        // 5,000 assumed card limit + 2,000 debt original balance.
        assert_eq!(snapshot.total_credit_limit, 7_000.0);
        assert_eq!(snapshot.total_credit_used, 1_500.0);
        assert!((snapshot.utilization_percentage - 1_500.0 / 7_000.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn payment_and_application_keywords_are_counted() {
        let transactions = vec![
            expense("Credit card payment"),
            expense("Loan repayment March"),
            expense("Groceries"),
            expense("Credit check fee"),
            expense("Store card application"),
        ];
        let snapshot = build_snapshot(
            &[],
            &[],
            &transactions,
            &SnapshotConfig::default(),
            at(2025, 8, 1),
        );
        assert_eq!(snapshot.on_time_payments, 2);
        assert_eq!(snapshot.recent_applications, 2);
    }

    #[test]
    fn recent_applications_are_capped() {
        let transactions: Vec<Transaction> = (0..15)
            .map(|i| {
                let mut tx = expense("credit check");
                tx.id = format!("tx-{i}");
                tx
            })
            .collect();
        let snapshot = build_snapshot(
            &[],
            &[],
            &transactions,
            &SnapshotConfig::default(),
            at(2025, 8, 1),
        );
        assert_eq!(snapshot.recent_applications, 10);
    }

    #[test]
    fn account_age_uses_whole_elapsed_months() {
        assert_eq!(months_between(at(2025, 5, 15), at(2025, 8, 14)), 2);
        assert_eq!(months_between(at(2025, 5, 15), at(2025, 8, 15)), 3);
        assert_eq!(months_between(at(2025, 9, 1), at(2025, 8, 1)), 0);
    }
}

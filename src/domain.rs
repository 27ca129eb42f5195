use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for the tenant whose data an engine run operates on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantId(pub String);

impl TenantId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

/// Asset account as read from the platform's account store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub kind: AccountKind,
    pub balance: f64,
    pub created_at: DateTime<Utc>,
}

/// Account categories the engines distinguish between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    Current,
    Savings,
    Credit,
    Loan,
    Investment,
}

impl AccountKind {
    pub fn label(&self) -> &'static str {
        match self {
            AccountKind::Current => "current",
            AccountKind::Savings => "savings",
            AccountKind::Credit => "credit",
            AccountKind::Loan => "loan",
            AccountKind::Investment => "investment",
        }
    }

    /// Whether this account kind represents revolving credit.
    pub fn is_revolving(&self) -> bool {
        matches!(self, AccountKind::Credit)
    }

    /// Whether this account kind represents installment credit.
    pub fn is_installment(&self) -> bool {
        matches!(self, AccountKind::Loan)
    }
}

/// Ledger transaction; `amount` is always positive, direction comes from `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub kind: TransactionKind,
    pub amount: f64,
    pub category: String,
    pub description: String,
    pub booked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
}

/// Debt account tracked by the platform, active or settled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtAccount {
    pub id: String,
    pub name: String,
    pub kind: DebtKind,
    pub original_balance: f64,
    pub current_balance: f64,
    /// Annual interest rate as a percentage, e.g. `19.9`.
    pub interest_rate: f64,
    pub monthly_payment: Option<f64>,
    pub minimum_payment: Option<f64>,
    pub active: bool,
}

impl DebtAccount {
    /// Monthly outflow the debt demands: agreed payment, else the minimum, else zero.
    pub fn monthly_commitment(&self) -> f64 {
        self.monthly_payment
            .or(self.minimum_payment)
            .unwrap_or(0.0)
    }

    /// Revolving debts contribute to credit utilization.
    pub fn is_revolving(&self) -> bool {
        matches!(self.kind, DebtKind::CreditCard | DebtKind::Overdraft)
    }

    /// Installment-style debts count toward credit mix.
    pub fn is_installment(&self) -> bool {
        matches!(self.kind, DebtKind::Loan | DebtKind::Mortgage)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtKind {
    CreditCard,
    Overdraft,
    Loan,
    Mortgage,
}

/// Savings goal owned by a tenant member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub name: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub deadline: Option<NaiveDate>,
    pub active: bool,
}

impl Goal {
    pub fn remaining_amount(&self) -> f64 {
        (self.target_amount - self.current_amount).max(0.0)
    }
}

/// Recorded contribution toward a goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalContribution {
    pub goal_id: String,
    pub amount: f64,
    pub contributed_at: DateTime<Utc>,
}

/// Stored risk appetite used to tone personalized advice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskToleranceProfile {
    pub appetite: RiskAppetite,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskAppetite {
    Cautious,
    Balanced,
    Adventurous,
}

impl RiskAppetite {
    pub fn label(&self) -> &'static str {
        match self {
            RiskAppetite::Cautious => "cautious",
            RiskAppetite::Balanced => "balanced",
            RiskAppetite::Adventurous => "adventurous",
        }
    }
}

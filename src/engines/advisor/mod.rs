//! Forecasting and advice engine: spending projections, goal tracking, debt
//! payoff strategy, and AI-assisted personalized advice with deterministic
//! fallbacks.

pub mod advice;
pub mod debt;
pub mod goals;
pub mod spending;

pub use advice::{AdviceContext, AdviceSource, PersonalizedAdvice};
pub use debt::{DebtPayoffStrategy, PayoffMethod, PayoffOrderEntry};
pub use goals::GoalForecast;
pub use spending::{CategoryProjection, MonthlyForecast};

use std::sync::Arc;

use chrono::{DateTime, Months, Utc};

use crate::config::{AdviceConfig, SnapshotConfig};
use crate::domain::{AccountKind, RiskAppetite, RiskToleranceProfile, TenantId, TransactionKind};
use crate::engines::credit::build_snapshot;
use crate::store::{FinanceStore, StoreError, TextModel};

const HISTORY_MONTHS: u32 = 6;
const CONTRIBUTION_LOOKBACK_MONTHS: u32 = 3;

/// Service composing the forecasters, the payoff strategist, and the advice
/// composer over injected storage and text-generation backends.
pub struct AdvisorService<S, M> {
    store: Arc<S>,
    model: Arc<M>,
    advice_config: AdviceConfig,
    snapshot_config: SnapshotConfig,
}

impl<S, M> AdvisorService<S, M>
where
    S: FinanceStore + 'static,
    M: TextModel + 'static,
{
    pub fn new(
        store: Arc<S>,
        model: Arc<M>,
        advice_config: AdviceConfig,
        snapshot_config: SnapshotConfig,
    ) -> Self {
        Self {
            store,
            model,
            advice_config,
            snapshot_config,
        }
    }

    /// Project income, expenses, and savings forward `months` months.
    pub fn predict_spending(
        &self,
        tenant: &TenantId,
        months: u32,
    ) -> Result<Vec<MonthlyForecast>, StoreError> {
        let now = Utc::now();
        let transactions = self
            .store
            .transactions_since(tenant, now - Months::new(HISTORY_MONTHS))?;
        Ok(spending::predict_spending(
            &transactions,
            HISTORY_MONTHS,
            months,
            now,
        ))
    }

    /// Project completion for every active goal. No goals means an empty
    /// vec, not an error.
    pub fn forecast_goals(&self, tenant: &TenantId) -> Result<Vec<GoalForecast>, StoreError> {
        let now = Utc::now();
        self.forecast_goals_at(tenant, now)
    }

    /// Simulate avalanche vs. snowball payoff and recommend the cheaper one.
    /// `None` when the tenant has no active debt.
    pub fn generate_debt_payoff_strategy(
        &self,
        tenant: &TenantId,
        extra_monthly_payment: f64,
    ) -> Result<Option<DebtPayoffStrategy>, StoreError> {
        let debts = self.store.active_debts(tenant)?;
        let strategy =
            debt::generate_strategy(&debts, extra_monthly_payment, Utc::now().date_naive());
        if let Some(strategy) = &strategy {
            tracing::debug!(
                tenant = %tenant.0,
                method = strategy.method.label(),
                months = strategy.months_to_payoff,
                "debt payoff strategy generated"
            );
        }
        Ok(strategy)
    }

    /// Assemble context and compose advice. Text-model failures are absorbed
    /// here; only storage errors surface.
    pub fn generate_personalized_advice(
        &self,
        tenant: &TenantId,
    ) -> Result<PersonalizedAdvice, StoreError> {
        let now = Utc::now();
        let accounts = self.store.asset_accounts(tenant)?;
        let debts = self.store.active_debts(tenant)?;
        let transactions = self
            .store
            .transactions_since(tenant, now - Months::new(HISTORY_MONTHS))?;
        let snapshot = build_snapshot(
            &accounts,
            &debts,
            &transactions,
            &self.snapshot_config,
            now,
        );

        let (monthly_income, monthly_expenses) =
            monthly_averages(&transactions, CONTRIBUTION_LOOKBACK_MONTHS, now);
        let savings_rate_pct = if monthly_income > 0.0 {
            (monthly_income - monthly_expenses) / monthly_income * 100.0
        } else {
            0.0
        };
        let total_debt: f64 = debts
            .iter()
            .filter(|debt| debt.active)
            .map(|debt| debt.current_balance)
            .sum();
        let savings_balance: f64 = accounts
            .iter()
            .filter(|account| account.kind == AccountKind::Savings)
            .map(|account| account.balance)
            .sum();

        let goals = self.forecast_goals_at(tenant, now)?;
        let risk_appetite = self
            .store
            .risk_profile(tenant)?
            .map(|profile: RiskToleranceProfile| profile.appetite)
            .unwrap_or(RiskAppetite::Balanced);

        let context = AdviceContext {
            monthly_income,
            monthly_expenses,
            savings_rate_pct,
            utilization_pct: snapshot.utilization_percentage,
            total_debt,
            savings_balance,
            goals,
            risk_appetite,
        };

        Ok(advice::compose_advice(
            &context,
            self.model.as_ref(),
            &self.advice_config,
        ))
    }

    fn forecast_goals_at(
        &self,
        tenant: &TenantId,
        now: DateTime<Utc>,
    ) -> Result<Vec<GoalForecast>, StoreError> {
        let goals = self.store.active_goals(tenant)?;
        let contributions = self
            .store
            .goal_contributions_since(tenant, now - Months::new(CONTRIBUTION_LOOKBACK_MONTHS))?;
        let transactions = self
            .store
            .transactions_since(tenant, now - Months::new(CONTRIBUTION_LOOKBACK_MONTHS))?;
        let (income, expenses) =
            monthly_averages(&transactions, CONTRIBUTION_LOOKBACK_MONTHS, now);
        let monthly_net_savings = (income - expenses).max(0.0);

        Ok(goals::forecast_goals(
            &goals,
            &contributions,
            monthly_net_savings,
            now.date_naive(),
        ))
    }
}

/// Trailing averages over a window of already-fetched transactions.
fn monthly_averages(
    transactions: &[crate::domain::Transaction],
    window_months: u32,
    now: DateTime<Utc>,
) -> (f64, f64) {
    let cutoff = now - Months::new(window_months);
    let mut income = 0.0;
    let mut expenses = 0.0;
    for transaction in transactions {
        if transaction.booked_at < cutoff {
            continue;
        }
        match transaction.kind {
            TransactionKind::Income => income += transaction.amount,
            TransactionKind::Expense => expenses += transaction.amount,
        }
    }
    let window = window_months.max(1) as f64;
    (income / window, expenses / window)
}

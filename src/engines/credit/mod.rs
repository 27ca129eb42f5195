//! Credit risk scoring and loan affordability engine.
//!
//! Pure computation over a per-tenant data snapshot: weighted multi-factor
//! scoring onto the 0–999 range, score persistence with delta history, and
//! amortization-based affordability assessment with stress testing.

pub mod affordability;
mod composer;
mod factors;
mod snapshot;

pub use affordability::{
    AffordabilityBand, AffordabilityInputs, LoanAffordabilityResult, LoanType,
};
pub use composer::{compose, overall_score, CreditRiskResult, ScoreBand};
pub use factors::{
    CreditAgeFactor, CreditMixFactor, CreditRiskBreakdown, InquiryFactor, PaymentHistoryFactor,
    UtilizationFactor,
};
pub use snapshot::{build_snapshot, CreditDataSnapshot};

use std::sync::Arc;

use chrono::{DateTime, Duration, Months, Utc};

use crate::config::SnapshotConfig;
use crate::domain::{AccountKind, TenantId, TransactionKind};
use crate::store::{
    AssessmentId, FinanceStore, ScoreHistoryEntry, ScoreId, StoredAssessment, StoredScore,
    StoreError,
};

const ASSESSMENT_VALIDITY_DAYS: i64 = 30;
const SCORE_CHANGE_THRESHOLD: i32 = 10;
const INCOME_LOOKBACK_MONTHS: u32 = 3;

/// Service composing the snapshot builder, factor scorers, and persistence.
pub struct CreditRiskService<S> {
    store: Arc<S>,
    config: SnapshotConfig,
}

impl<S> CreditRiskService<S>
where
    S: FinanceStore + 'static,
{
    pub fn new(store: Arc<S>, config: SnapshotConfig) -> Self {
        Self { store, config }
    }

    /// Compute a fresh credit risk result from the latest stored data.
    pub fn calculate_credit_score(
        &self,
        tenant: &TenantId,
    ) -> Result<CreditRiskResult, StoreError> {
        let now = Utc::now();
        let snapshot = self.snapshot(tenant, now)?;
        tracing::debug!(
            tenant = %tenant.0,
            accounts = snapshot.number_of_accounts,
            utilization = snapshot.utilization_percentage,
            "credit snapshot built"
        );
        Ok(compose(CreditRiskBreakdown::from_snapshot(&snapshot)))
    }

    /// Persist a computed score together with its history entry.
    ///
    /// The two inserts are sequential, not transactional: a failure between
    /// them can leave a score row without a matching history row. Acceptable
    /// for advisory data; callers get at-least-once, not exactly-once.
    pub fn store_credit_score(
        &self,
        tenant: &TenantId,
        result: &CreditRiskResult,
    ) -> Result<ScoreId, StoreError> {
        let now = Utc::now();
        let previous = self.store.latest_score(tenant)?;
        let previous_score = previous.as_ref().map(|stored| stored.overall_score);

        let score_delta = match previous_score {
            Some(prev) => result.overall_score as i32 - prev as i32,
            None => 0,
        };
        let change_reason = match previous_score {
            None => "first score calculation".to_string(),
            Some(_) if score_delta >= SCORE_CHANGE_THRESHOLD => {
                format!("score improved by {score_delta} points")
            }
            Some(_) if score_delta <= -SCORE_CHANGE_THRESHOLD => {
                format!("score decreased by {} points", score_delta.abs())
            }
            Some(_) => "score stable".to_string(),
        };

        let score_id = self.store.insert_score(StoredScore {
            tenant: tenant.clone(),
            overall_score: result.overall_score,
            score_band: result.score_band,
            breakdown: result.breakdown.clone(),
            calculated_at: now,
        })?;

        self.store.insert_score_history(ScoreHistoryEntry {
            tenant: tenant.clone(),
            previous_score,
            new_score: result.overall_score,
            score_delta,
            change_reason,
            period: now.format("%Y-%m").to_string(),
            recorded_at: now,
        })?;

        tracing::info!(
            tenant = %tenant.0,
            score = result.overall_score,
            band = result.score_band.label(),
            delta = score_delta,
            "credit score stored"
        );
        Ok(score_id)
    }

    /// Most recent stored score, if the tenant has ever been scored.
    pub fn latest_score(&self, tenant: &TenantId) -> Result<Option<StoredScore>, StoreError> {
        self.store.latest_score(tenant)
    }

    /// Score change history over the trailing `months`.
    pub fn score_history(
        &self,
        tenant: &TenantId,
        months: u32,
    ) -> Result<Vec<ScoreHistoryEntry>, StoreError> {
        self.store.score_history(tenant, months)
    }

    /// Assess whether the tenant can afford a requested loan.
    pub fn calculate_loan_affordability(
        &self,
        tenant: &TenantId,
        loan_type: LoanType,
        requested_amount: f64,
        term_months: Option<u32>,
        annual_rate: Option<f64>,
    ) -> Result<LoanAffordabilityResult, StoreError> {
        let inputs = self.affordability_inputs(tenant, Utc::now())?;
        Ok(affordability::assess(
            &inputs,
            loan_type,
            requested_amount,
            term_months,
            annual_rate,
        ))
    }

    /// Persist an assessment with its 30-day advisory expiry.
    pub fn store_affordability_assessment(
        &self,
        tenant: &TenantId,
        result: &LoanAffordabilityResult,
    ) -> Result<AssessmentId, StoreError> {
        let now = Utc::now();
        let id = self.store.insert_assessment(StoredAssessment {
            tenant: tenant.clone(),
            loan_type: result.loan_type,
            requested_amount: result.requested_amount,
            term_months: result.term_months,
            annual_rate: result.annual_rate,
            result: result.clone(),
            created_at: now,
            expires_at: now + Duration::days(ASSESSMENT_VALIDITY_DAYS),
        })?;
        tracing::info!(
            tenant = %tenant.0,
            band = result.band.label(),
            "affordability assessment stored"
        );
        Ok(id)
    }

    pub(crate) fn snapshot(
        &self,
        tenant: &TenantId,
        now: DateTime<Utc>,
    ) -> Result<CreditDataSnapshot, StoreError> {
        let accounts = self.store.asset_accounts(tenant)?;
        let debts = self.store.active_debts(tenant)?;
        let from = now - Months::new(self.config.transaction_lookback_months);
        let transactions = self.store.transactions_since(tenant, from)?;
        Ok(build_snapshot(
            &accounts,
            &debts,
            &transactions,
            &self.config,
            now,
        ))
    }

    fn affordability_inputs(
        &self,
        tenant: &TenantId,
        now: DateTime<Utc>,
    ) -> Result<AffordabilityInputs, StoreError> {
        let from = now - Months::new(INCOME_LOOKBACK_MONTHS);
        let transactions = self.store.transactions_since(tenant, from)?;

        let mut income_total = 0.0;
        let mut expense_total = 0.0;
        for transaction in &transactions {
            match transaction.kind {
                TransactionKind::Income => income_total += transaction.amount,
                TransactionKind::Expense => expense_total += transaction.amount,
            }
        }
        let window = INCOME_LOOKBACK_MONTHS as f64;

        let debts = self.store.active_debts(tenant)?;
        let existing_debt_payments: f64 = debts
            .iter()
            .filter(|debt| debt.active)
            .map(|debt| debt.monthly_commitment())
            .sum();

        let accounts = self.store.asset_accounts(tenant)?;
        let savings_balance: f64 = accounts
            .iter()
            .filter(|account| account.kind == AccountKind::Savings)
            .map(|account| account.balance)
            .sum();

        Ok(AffordabilityInputs {
            monthly_income: income_total / window,
            monthly_expenses: expense_total / window,
            existing_debt_payments,
            savings_balance,
        })
    }
}

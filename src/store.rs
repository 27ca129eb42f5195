use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    Account, DebtAccount, Goal, GoalContribution, RiskToleranceProfile, TenantId, Transaction,
};
use crate::engines::credit::{CreditRiskBreakdown, LoanAffordabilityResult, LoanType, ScoreBand};

/// Storage abstraction so the engines can be exercised against test doubles
/// instead of the live platform database.
pub trait FinanceStore: Send + Sync {
    fn asset_accounts(&self, tenant: &TenantId) -> Result<Vec<Account>, StoreError>;
    fn active_debts(&self, tenant: &TenantId) -> Result<Vec<DebtAccount>, StoreError>;
    fn transactions_since(
        &self,
        tenant: &TenantId,
        from: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, StoreError>;
    fn active_goals(&self, tenant: &TenantId) -> Result<Vec<Goal>, StoreError>;
    fn goal_contributions_since(
        &self,
        tenant: &TenantId,
        from: DateTime<Utc>,
    ) -> Result<Vec<GoalContribution>, StoreError>;
    fn risk_profile(&self, tenant: &TenantId)
        -> Result<Option<RiskToleranceProfile>, StoreError>;

    /// Most recent stored score by `calculated_at`, if any.
    fn latest_score(&self, tenant: &TenantId) -> Result<Option<StoredScore>, StoreError>;
    fn insert_score(&self, record: StoredScore) -> Result<ScoreId, StoreError>;
    fn insert_score_history(&self, entry: ScoreHistoryEntry) -> Result<(), StoreError>;
    /// History entries recorded within the trailing `months`, newest first.
    fn score_history(
        &self,
        tenant: &TenantId,
        months: u32,
    ) -> Result<Vec<ScoreHistoryEntry>, StoreError>;

    fn insert_assessment(&self, record: StoredAssessment) -> Result<AssessmentId, StoreError>;
}

/// Error enumeration for storage failures. These propagate to the caller
/// unchanged; the engines never retry.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("query failed: {0}")]
    Query(String),
}

/// Identifier of a persisted score row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScoreId(pub String);

/// Identifier of a persisted affordability assessment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssessmentId(pub String);

/// Persisted credit score row. The latest-score read path orders by
/// `calculated_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredScore {
    pub tenant: TenantId,
    pub overall_score: u16,
    pub score_band: ScoreBand,
    pub breakdown: CreditRiskBreakdown,
    pub calculated_at: DateTime<Utc>,
}

/// Append-only score change record; one entry per calculation, immutable once
/// written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreHistoryEntry {
    pub tenant: TenantId,
    pub previous_score: Option<u16>,
    pub new_score: u16,
    pub score_delta: i32,
    pub change_reason: String,
    /// Calendar month of the calculation, formatted `YYYY-MM`.
    pub period: String,
    pub recorded_at: DateTime<Utc>,
}

/// Persisted loan affordability assessment. `expires_at` is advisory
/// metadata; nothing schedules a re-evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredAssessment {
    pub tenant: TenantId,
    pub loan_type: LoanType,
    pub requested_amount: f64,
    pub term_months: u32,
    pub annual_rate: f64,
    pub result: LoanAffordabilityResult,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Outbound seam to the platform's text-generation backend. Implementations
/// own their own timeout/retry policy; the advice composer treats any failure
/// as expected and falls back to rule-based output.
pub trait TextModel: Send + Sync {
    fn run(&self, request: TextModelRequest) -> Result<TextModelResponse, TextModelError>;
}

/// Chat-style completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextModelRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    System,
    User,
}

/// Raw completion text; parsed defensively by the advice composer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextModelResponse {
    pub response: String,
}

/// Text backend failure. Never surfaced past the advice composer.
#[derive(Debug, thiserror::Error)]
pub enum TextModelError {
    #[error("text model unavailable: {0}")]
    Unavailable(String),
    #[error("text model rejected request: {0}")]
    Rejected(String),
}

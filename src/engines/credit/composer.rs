use serde::{Deserialize, Serialize};

use crate::engines::numeric::round_pct;

use super::factors::CreditRiskBreakdown;

/// Factor weights; they sum to 1.0 and are scaled onto the 0–999 range.
pub const WEIGHT_PAYMENT_HISTORY: f64 = 0.35;
pub const WEIGHT_UTILIZATION: f64 = 0.30;
pub const WEIGHT_CREDIT_AGE: f64 = 0.15;
pub const WEIGHT_CREDIT_MIX: f64 = 0.10;
pub const WEIGHT_INQUIRIES: f64 = 0.10;

const SCORE_SCALE: f64 = 9.99;
const MAX_IMPROVEMENT_TIPS: usize = 5;

/// Categorical label for a 0–999 score. Boundaries are fixed, non-overlapping,
/// and cover the full range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Excellent,
    Good,
    Fair,
    Poor,
    VeryPoor,
}

impl ScoreBand {
    pub fn from_score(score: u16) -> Self {
        match score {
            961.. => ScoreBand::Excellent,
            881..=960 => ScoreBand::Good,
            721..=880 => ScoreBand::Fair,
            561..=720 => ScoreBand::Poor,
            _ => ScoreBand::VeryPoor,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreBand::Excellent => "excellent",
            ScoreBand::Good => "good",
            ScoreBand::Fair => "fair",
            ScoreBand::Poor => "poor",
            ScoreBand::VeryPoor => "very_poor",
        }
    }
}

/// Complete output of a credit risk calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditRiskResult {
    pub overall_score: u16,
    pub score_band: ScoreBand,
    pub breakdown: CreditRiskBreakdown,
    pub risk_factors: Vec<String>,
    pub positive_factors: Vec<String>,
    pub improvement_tips: Vec<String>,
}

/// Combine the five factor scores into the published result.
pub fn compose(breakdown: CreditRiskBreakdown) -> CreditRiskResult {
    let overall_score = overall_score(&breakdown);
    let score_band = ScoreBand::from_score(overall_score);
    let risk_factors = risk_factors(&breakdown);
    let positive_factors = positive_factors(&breakdown);
    let improvement_tips = improvement_tips(&breakdown, score_band);

    CreditRiskResult {
        overall_score,
        score_band,
        breakdown,
        risk_factors,
        positive_factors,
        improvement_tips,
    }
}

/// `round(Σ factorᵢ × weightᵢ × 9.99)`, always within 0–999.
pub fn overall_score(breakdown: &CreditRiskBreakdown) -> u16 {
    let weighted = breakdown.payment_history.score as f64 * WEIGHT_PAYMENT_HISTORY
        + breakdown.utilization.score as f64 * WEIGHT_UTILIZATION
        + breakdown.credit_age.score as f64 * WEIGHT_CREDIT_AGE
        + breakdown.credit_mix.score as f64 * WEIGHT_CREDIT_MIX
        + breakdown.inquiries.score as f64 * WEIGHT_INQUIRIES;

    (weighted * SCORE_SCALE).round().clamp(0.0, 999.0) as u16
}

fn risk_factors(breakdown: &CreditRiskBreakdown) -> Vec<String> {
    let mut factors = Vec::new();

    if breakdown.payment_history.missed_payments > 0 {
        factors.push(format!(
            "{} missed payment(s) on record",
            breakdown.payment_history.missed_payments
        ));
    }
    if breakdown.utilization.utilization_percentage > 30.0 {
        factors.push(format!(
            "High credit utilization ({}%)",
            round_pct(breakdown.utilization.utilization_percentage)
        ));
    }
    if breakdown.credit_age.oldest_account_age_months < 24 {
        factors.push("Limited credit history".to_string());
    }
    if breakdown.credit_mix.distinct_categories < 2 {
        factors.push("Narrow range of account types".to_string());
    }
    if breakdown.inquiries.recent_applications > 2 {
        factors.push(format!(
            "{} recent credit application(s)",
            breakdown.inquiries.recent_applications
        ));
    }

    factors
}

fn positive_factors(breakdown: &CreditRiskBreakdown) -> Vec<String> {
    let mut factors = Vec::new();

    if breakdown.payment_history.missed_payments == 0
        && breakdown.payment_history.on_time_payments > 0
    {
        factors.push("Consistent on-time payment record".to_string());
    }
    if breakdown.utilization.utilization_percentage <= 30.0 {
        factors.push(format!(
            "Credit utilization in the healthy range ({}%)",
            round_pct(breakdown.utilization.utilization_percentage)
        ));
    }
    if breakdown.credit_age.oldest_account_age_months >= 84 {
        factors.push("Long-standing accounts supporting the score".to_string());
    }
    if breakdown.credit_mix.distinct_categories >= 3 {
        factors.push("Varied mix of account types".to_string());
    }
    if breakdown.inquiries.recent_applications == 0 {
        factors.push("No recent credit applications".to_string());
    }

    factors
}

/// Up to five tips in a fixed priority order: payment, utilization, age, mix,
/// inquiries, then band-specific generic advice.
fn improvement_tips(breakdown: &CreditRiskBreakdown, band: ScoreBand) -> Vec<String> {
    let mut tips = Vec::new();

    if breakdown.payment_history.missed_payments > 0
        || breakdown.payment_history.on_time_payments < 12
    {
        tips.push(
            "Build a consistent record of on-time repayments; a full year without misses carries the most weight".to_string(),
        );
    }
    if breakdown.utilization.utilization_percentage > 30.0 {
        tips.push("Bring credit utilization below 30% of your combined limits".to_string());
    }
    if breakdown.credit_age.oldest_account_age_months < 48 {
        tips.push("Keep your oldest accounts open to let your credit history mature".to_string());
    }
    if breakdown.credit_mix.distinct_categories < 3 {
        tips.push(
            "Broaden your credit mix gradually; lenders look for both revolving and installment experience".to_string(),
        );
    }
    if breakdown.inquiries.recent_applications > 2 {
        tips.push("Pause new credit applications for at least six months".to_string());
    }

    if tips.len() < MAX_IMPROVEMENT_TIPS {
        match band {
            ScoreBand::Poor | ScoreBand::VeryPoor => tips.push(
                "Focus on the fundamentals first: every on-time payment moves this band".to_string(),
            ),
            ScoreBand::Fair => tips.push(
                "Small consistent changes will move you into the good band".to_string(),
            ),
            ScoreBand::Good | ScoreBand::Excellent => {}
        }
    }

    if tips.is_empty() {
        tips.push("Your credit profile is in great shape; keep your current habits".to_string());
    }

    tips.truncate(MAX_IMPROVEMENT_TIPS);
    tips
}

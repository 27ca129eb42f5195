//! The five factor scorers. Each breakpoint table is a policy decision: the
//! values are load-bearing for score semantics and are pinned by the
//! conformance tests below.

use serde::{Deserialize, Serialize};

use crate::domain::AccountKind;

use super::snapshot::CreditDataSnapshot;

/// Factor result for payment history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentHistoryFactor {
    pub score: u8,
    pub on_time_payments: u32,
    pub missed_payments: u32,
    pub description: String,
}

/// Factor result for credit utilization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UtilizationFactor {
    pub score: u8,
    pub utilization_percentage: f64,
    pub total_credit_limit: f64,
    pub total_credit_used: f64,
    pub description: String,
}

/// Factor result for credit age.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditAgeFactor {
    pub score: u8,
    pub oldest_account_age_months: u32,
    pub average_account_age_months: u32,
    pub description: String,
}

/// Factor result for credit mix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditMixFactor {
    pub score: u8,
    pub account_types: Vec<AccountKind>,
    pub distinct_categories: u32,
    pub description: String,
}

/// Factor result for recent hard inquiries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InquiryFactor {
    pub score: u8,
    pub recent_applications: u32,
    pub description: String,
}

/// The five named factor results that make up a credit risk calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditRiskBreakdown {
    pub payment_history: PaymentHistoryFactor,
    pub utilization: UtilizationFactor,
    pub credit_age: CreditAgeFactor,
    pub credit_mix: CreditMixFactor,
    pub inquiries: InquiryFactor,
}

impl CreditRiskBreakdown {
    pub fn from_snapshot(snapshot: &CreditDataSnapshot) -> Self {
        Self {
            payment_history: score_payment_history(snapshot),
            utilization: score_utilization(snapshot),
            credit_age: score_credit_age(snapshot),
            credit_mix: score_credit_mix(snapshot),
            inquiries: score_inquiries(snapshot),
        }
    }
}

struct PaymentTier {
    max_missed: u32,
    min_on_time: u32,
    min_on_time_rate: f64,
    score: u8,
    description: &'static str,
}

const PAYMENT_TIERS: [PaymentTier; 6] = [
    PaymentTier {
        max_missed: 0,
        min_on_time: 12,
        min_on_time_rate: 0.0,
        score: 100,
        description: "Flawless payment record across a full year of activity",
    },
    PaymentTier {
        max_missed: 0,
        min_on_time: 0,
        min_on_time_rate: 0.0,
        score: 90,
        description: "No missed payments on record",
    },
    PaymentTier {
        max_missed: 1,
        min_on_time: 0,
        min_on_time_rate: 0.95,
        score: 75,
        description: "Nearly flawless payment record with one slip",
    },
    PaymentTier {
        max_missed: 2,
        min_on_time: 0,
        min_on_time_rate: 0.90,
        score: 60,
        description: "Mostly reliable payments with a couple of misses",
    },
    PaymentTier {
        max_missed: 4,
        min_on_time: 0,
        min_on_time_rate: 0.75,
        score: 40,
        description: "Irregular payment behavior",
    },
    PaymentTier {
        max_missed: u32::MAX,
        min_on_time: 0,
        min_on_time_rate: 0.0,
        score: 20,
        description: "Frequent missed payments",
    },
];

pub fn score_payment_history(snapshot: &CreditDataSnapshot) -> PaymentHistoryFactor {
    let on_time = snapshot.on_time_payments;
    let missed = snapshot.missed_payments;
    let total = on_time + missed;
    let on_time_rate = if total > 0 {
        on_time as f64 / total as f64
    } else {
        1.0
    };

    let tier = PAYMENT_TIERS
        .iter()
        .find(|tier| {
            missed <= tier.max_missed
                && on_time >= tier.min_on_time
                && on_time_rate >= tier.min_on_time_rate
        })
        .unwrap_or(&PAYMENT_TIERS[PAYMENT_TIERS.len() - 1]);

    PaymentHistoryFactor {
        score: tier.score.min(100),
        on_time_payments: on_time,
        missed_payments: missed,
        description: tier.description.to_string(),
    }
}

struct UtilizationBreakpoint {
    max_pct: f64,
    score: u8,
    description: &'static str,
}

const UTILIZATION_BREAKPOINTS: [UtilizationBreakpoint; 6] = [
    UtilizationBreakpoint {
        max_pct: 10.0,
        score: 100,
        description: "Excellent utilization, well below 10%",
    },
    UtilizationBreakpoint {
        max_pct: 30.0,
        score: 90,
        description: "Healthy utilization under 30%",
    },
    UtilizationBreakpoint {
        max_pct: 50.0,
        score: 70,
        description: "Moderate utilization; aim below 30%",
    },
    UtilizationBreakpoint {
        max_pct: 75.0,
        score: 45,
        description: "High utilization weighing on the score",
    },
    UtilizationBreakpoint {
        max_pct: 100.0,
        score: 25,
        description: "Very high utilization near the limit",
    },
    UtilizationBreakpoint {
        max_pct: f64::INFINITY,
        score: 10,
        description: "Balances exceed the available limit",
    },
];

pub fn score_utilization(snapshot: &CreditDataSnapshot) -> UtilizationFactor {
    let pct = snapshot.utilization_percentage;
    let breakpoint = UTILIZATION_BREAKPOINTS
        .iter()
        .find(|breakpoint| pct <= breakpoint.max_pct)
        .unwrap_or(&UTILIZATION_BREAKPOINTS[UTILIZATION_BREAKPOINTS.len() - 1]);

    UtilizationFactor {
        score: breakpoint.score.min(100),
        utilization_percentage: pct,
        total_credit_limit: snapshot.total_credit_limit,
        total_credit_used: snapshot.total_credit_used,
        description: breakpoint.description.to_string(),
    }
}

struct AgeTier {
    min_oldest_months: u32,
    min_average_months: u32,
    score: u8,
    description: &'static str,
}

const AGE_TIERS: [AgeTier; 6] = [
    AgeTier {
        min_oldest_months: 120,
        min_average_months: 84,
        score: 100,
        description: "Long-established credit history",
    },
    AgeTier {
        min_oldest_months: 84,
        min_average_months: 48,
        score: 85,
        description: "Mature credit history",
    },
    AgeTier {
        min_oldest_months: 48,
        min_average_months: 24,
        score: 70,
        description: "Established credit history",
    },
    AgeTier {
        min_oldest_months: 24,
        min_average_months: 12,
        score: 50,
        description: "Developing credit history",
    },
    AgeTier {
        min_oldest_months: 12,
        min_average_months: 0,
        score: 35,
        description: "Young credit history",
    },
    AgeTier {
        min_oldest_months: 0,
        min_average_months: 0,
        score: 20,
        description: "Very limited credit history",
    },
];

pub fn score_credit_age(snapshot: &CreditDataSnapshot) -> CreditAgeFactor {
    let oldest = snapshot.oldest_account_age_months;
    let average = snapshot.average_account_age_months;
    let tier = AGE_TIERS
        .iter()
        .find(|tier| oldest >= tier.min_oldest_months && average >= tier.min_average_months)
        .unwrap_or(&AGE_TIERS[AGE_TIERS.len() - 1]);

    CreditAgeFactor {
        score: tier.score.min(100),
        oldest_account_age_months: oldest,
        average_account_age_months: average,
        description: tier.description.to_string(),
    }
}

const MIX_SAVINGS_BONUS: u8 = 10;

pub fn score_credit_mix(snapshot: &CreditDataSnapshot) -> CreditMixFactor {
    let types = &snapshot.account_types;
    let categories = types.len() as u32;
    let has_revolving = types.iter().any(AccountKind::is_revolving);
    let has_installment = types.iter().any(AccountKind::is_installment);
    let has_savings = types.contains(&AccountKind::Savings);

    let (base, description): (u8, &str) = if types.is_empty() {
        (20, "No open accounts to assess")
    } else if has_revolving && has_installment && categories >= 3 {
        (90, "Broad mix of revolving and installment credit")
    } else if has_revolving && has_installment {
        (75, "Both revolving and installment credit present")
    } else if categories >= 2 {
        (55, "More than one account category")
    } else {
        (40, "Single account category")
    };

    let score = if has_savings && has_revolving {
        base.saturating_add(MIX_SAVINGS_BONUS).min(100)
    } else {
        base.min(100)
    };

    CreditMixFactor {
        score,
        account_types: types.clone(),
        distinct_categories: categories,
        description: description.to_string(),
    }
}

struct InquiryBreakpoint {
    max_count: u32,
    score: u8,
    description: &'static str,
}

const INQUIRY_BREAKPOINTS: [InquiryBreakpoint; 5] = [
    InquiryBreakpoint {
        max_count: 0,
        score: 100,
        description: "No recent credit applications",
    },
    InquiryBreakpoint {
        max_count: 2,
        score: 85,
        description: "A couple of recent applications",
    },
    InquiryBreakpoint {
        max_count: 4,
        score: 65,
        description: "Several recent applications",
    },
    InquiryBreakpoint {
        max_count: 6,
        score: 45,
        description: "Many recent applications",
    },
    InquiryBreakpoint {
        max_count: u32::MAX,
        score: 25,
        description: "Heavy recent application activity",
    },
];

pub fn score_inquiries(snapshot: &CreditDataSnapshot) -> InquiryFactor {
    let count = snapshot.recent_applications;
    let breakpoint = INQUIRY_BREAKPOINTS
        .iter()
        .find(|breakpoint| count <= breakpoint.max_count)
        .unwrap_or(&INQUIRY_BREAKPOINTS[INQUIRY_BREAKPOINTS.len() - 1]);

    InquiryFactor {
        score: breakpoint.score.min(100),
        recent_applications: count,
        description: breakpoint.description.to_string(),
    }
}

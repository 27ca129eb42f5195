use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Months, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Transaction, TransactionKind};
use crate::engines::numeric::{round_currency, round_pct};

/// Projection for one future calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyForecast {
    /// Calendar month, formatted `YYYY-MM`.
    pub month: String,
    pub projected_income: f64,
    pub projected_expenses: f64,
    pub projected_savings: f64,
    /// Decreases linearly with forecast distance, clamped to [0, 1].
    pub confidence: f64,
    pub category_breakdown: Vec<CategoryProjection>,
}

/// Per-category expense projection with its fitted growth rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryProjection {
    pub category: String,
    pub projected_amount: f64,
    pub growth_rate_pct: f64,
}

const BASE_CONFIDENCE: f64 = 0.75;
const CONFIDENCE_DECAY_PER_MONTH: f64 = 0.05;

struct Trend {
    average: f64,
    growth_rate: f64,
}

/// Fit per-category linear trends over `history_months` of transactions and
/// project income, expenses, and savings forward `forecast_months`.
pub fn predict_spending(
    transactions: &[Transaction],
    history_months: u32,
    forecast_months: u32,
    now: DateTime<Utc>,
) -> Vec<MonthlyForecast> {
    let buckets = history_months.max(1) as usize;
    let base_ordinal = month_ordinal(now) - (buckets as i64 - 1);

    let mut income_series = vec![0.0; buckets];
    let mut category_series: BTreeMap<String, Vec<f64>> = BTreeMap::new();

    for transaction in transactions {
        let index = month_ordinal(transaction.booked_at) - base_ordinal;
        if index < 0 || index >= buckets as i64 {
            continue;
        }
        let index = index as usize;
        match transaction.kind {
            TransactionKind::Income => income_series[index] += transaction.amount,
            TransactionKind::Expense => {
                category_series
                    .entry(transaction.category.clone())
                    .or_insert_with(|| vec![0.0; buckets])[index] += transaction.amount;
            }
        }
    }

    let income_trend = fit_trend(&income_series);
    let category_trends: Vec<(String, Trend)> = category_series
        .iter()
        .map(|(category, series)| (category.clone(), fit_trend(series)))
        .collect();

    (0..forecast_months)
        .map(|offset| {
            let horizon = offset as i32 + 1;
            let projected_income = project(&income_trend, horizon);

            let breakdown: Vec<CategoryProjection> = category_trends
                .iter()
                .map(|(category, trend)| CategoryProjection {
                    category: category.clone(),
                    projected_amount: round_currency(project(trend, horizon)),
                    growth_rate_pct: round_pct(trend.growth_rate * 100.0),
                })
                .collect();
            let projected_expenses: f64 = category_trends
                .iter()
                .map(|(_, trend)| project(trend, horizon))
                .sum();

            let month = now + Months::new(offset + 1);
            MonthlyForecast {
                month: month.format("%Y-%m").to_string(),
                projected_income: round_currency(projected_income),
                projected_expenses: round_currency(projected_expenses),
                projected_savings: round_currency(projected_income - projected_expenses),
                confidence: (BASE_CONFIDENCE - CONFIDENCE_DECAY_PER_MONTH * offset as f64)
                    .clamp(0.0, 1.0),
                category_breakdown: breakdown,
            }
        })
        .collect()
}

/// Average plus OLS-slope-derived compound growth rate for one monthly series.
fn fit_trend(series: &[f64]) -> Trend {
    let n = series.len();
    let average = series.iter().sum::<f64>() / n as f64;
    if n < 2 || average <= 0.0 {
        return Trend {
            average,
            growth_rate: 0.0,
        };
    }

    let x_mean = (n as f64 - 1.0) / 2.0;
    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (index, value) in series.iter().enumerate() {
        let dx = index as f64 - x_mean;
        numerator += dx * (value - average);
        denominator += dx * dx;
    }
    let slope = if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    };

    Trend {
        average,
        // A slope steeper than the average itself would flip projection signs.
        growth_rate: (slope / average).clamp(-1.0, 1.0),
    }
}

fn project(trend: &Trend, months_ahead: i32) -> f64 {
    trend.average * (1.0 + trend.growth_rate).powi(months_ahead)
}

fn month_ordinal(at: DateTime<Utc>) -> i64 {
    at.year() as i64 * 12 + at.month0() as i64
}

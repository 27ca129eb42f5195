use std::collections::BTreeSet;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::{Goal, GoalContribution};
use crate::engines::numeric::{round_currency, round_pct};

/// Projection of one goal's trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalForecast {
    pub goal_id: String,
    pub name: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub current_monthly_average: f64,
    /// Present only when the goal has a deadline.
    pub required_monthly_contribution: Option<f64>,
    pub projected_completion: Option<NaiveDate>,
    /// Heuristic probability of hitting the goal, in [0.05, 0.95] (1.0 once
    /// the target is already reached).
    pub on_track_probability: f64,
    pub on_track: bool,
}

const AVG_DAYS_PER_MONTH: f64 = 30.44;
const PROBABILITY_FLOOR: f64 = 0.05;
const PROBABILITY_CEILING: f64 = 0.95;
/// Being 25% ahead of the required pace saturates the probability ceiling.
const PACE_SATURATION: f64 = 1.25;
/// Share of monthly net savings assumed to flow to a goal that has no
/// contribution history yet.
const SAVINGS_SHARE_FALLBACK: f64 = 0.30;

/// Project completion for each active goal from its trailing contribution
/// rate. Goals without history fall back to a share of net monthly savings.
pub fn forecast_goals(
    goals: &[Goal],
    contributions: &[GoalContribution],
    monthly_net_savings: f64,
    today: NaiveDate,
) -> Vec<GoalForecast> {
    goals
        .iter()
        .filter(|goal| goal.active)
        .map(|goal| forecast_goal(goal, contributions, monthly_net_savings, today))
        .collect()
}

fn forecast_goal(
    goal: &Goal,
    contributions: &[GoalContribution],
    monthly_net_savings: f64,
    today: NaiveDate,
) -> GoalForecast {
    let own: Vec<&GoalContribution> = contributions
        .iter()
        .filter(|contribution| contribution.goal_id == goal.id)
        .collect();

    let current_monthly_average = if own.is_empty() {
        (monthly_net_savings * SAVINGS_SHARE_FALLBACK).max(0.0)
    } else {
        let total: f64 = own.iter().map(|contribution| contribution.amount).sum();
        let months_of_data = own
            .iter()
            .map(|contribution| {
                let at = contribution.contributed_at;
                (at.year(), at.month())
            })
            .collect::<BTreeSet<_>>()
            .len()
            .max(1);
        total / months_of_data as f64
    };

    let remaining = goal.remaining_amount();
    if remaining <= 0.0 {
        return GoalForecast {
            goal_id: goal.id.clone(),
            name: goal.name.clone(),
            target_amount: round_currency(goal.target_amount),
            current_amount: round_currency(goal.current_amount),
            current_monthly_average: round_currency(current_monthly_average),
            required_monthly_contribution: None,
            projected_completion: Some(today),
            on_track_probability: 1.0,
            on_track: true,
        };
    }

    let required_monthly_contribution = goal.deadline.map(|deadline| {
        let days_left = (deadline - today).num_days().max(0);
        let months_left = (days_left as f64 / AVG_DAYS_PER_MONTH).ceil().max(1.0);
        remaining / months_left
    });

    let on_track_probability = match required_monthly_contribution {
        Some(required) if required > 0.0 => {
            let pace = current_monthly_average / required;
            (pace / PACE_SATURATION).clamp(PROBABILITY_FLOOR, PROBABILITY_CEILING)
        }
        _ => {
            // Without a deadline, any steady contribution counts as on track.
            if current_monthly_average > 0.0 {
                0.7
            } else {
                0.25
            }
        }
    };

    let projected_completion = if current_monthly_average > 0.0 {
        let months_needed = (remaining / current_monthly_average).ceil().max(1.0) as u32;
        Some(today + Months::new(months_needed))
    } else {
        None
    };

    GoalForecast {
        goal_id: goal.id.clone(),
        name: goal.name.clone(),
        target_amount: round_currency(goal.target_amount),
        current_amount: round_currency(goal.current_amount),
        current_monthly_average: round_currency(current_monthly_average),
        required_monthly_contribution: required_monthly_contribution.map(round_currency),
        projected_completion,
        on_track_probability: round_pct(on_track_probability * 100.0) / 100.0,
        on_track: on_track_probability >= 0.5,
    }
}

use serde::{Deserialize, Serialize};

use crate::config::AdviceConfig;
use crate::domain::RiskAppetite;
use crate::engines::numeric::round_pct;
use crate::store::{ChatMessage, MessageRole, TextModel, TextModelRequest};

use super::goals::GoalForecast;

/// Inputs the composer condenses into a prompt and into fallback rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdviceContext {
    pub monthly_income: f64,
    pub monthly_expenses: f64,
    /// Share of income left after expenses, as a percentage; 0 when income
    /// is 0.
    pub savings_rate_pct: f64,
    pub utilization_pct: f64,
    pub total_debt: f64,
    pub savings_balance: f64,
    pub goals: Vec<GoalForecast>,
    pub risk_appetite: RiskAppetite,
}

/// Complete advice payload. Every section is always populated, whether the
/// text model cooperated or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalizedAdvice {
    pub urgent_actions: Vec<String>,
    pub optimizations: Vec<String>,
    pub long_term_suggestions: Vec<String>,
    pub overall_assessment: String,
    pub source: AdviceSource,
}

/// Where the advice text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdviceSource {
    Model,
    RuleBased,
    Blended,
}

/// Shape the model is asked to produce; every field optional so partial
/// responses still contribute.
#[derive(Debug, Default, Deserialize)]
struct ModelAdvice {
    #[serde(alias = "urgentActions")]
    urgent_actions: Option<Vec<String>>,
    #[serde(alias = "optimizations")]
    optimizations: Option<Vec<String>>,
    #[serde(alias = "longTermSuggestions")]
    long_term_suggestions: Option<Vec<String>>,
    #[serde(alias = "overallAssessment")]
    overall_assessment: Option<String>,
}

/// Compose advice, preferring model output section by section and falling
/// back to deterministic rules. Text-model failures never escape this
/// function.
pub fn compose_advice<M: TextModel + ?Sized>(
    context: &AdviceContext,
    model: &M,
    config: &AdviceConfig,
) -> PersonalizedAdvice {
    let fallback = rule_based_advice(context);

    let parsed = match model.run(build_request(context, config)) {
        Ok(response) => match extract_advice(&response.response) {
            Some(parsed) => parsed,
            None => {
                tracing::warn!("text model returned unparseable advice; using rule-based output");
                return fallback;
            }
        },
        Err(error) => {
            tracing::warn!(%error, "text model call failed; using rule-based output");
            return fallback;
        }
    };

    let mut used_fallback_section = false;
    let mut pick = |section: Option<Vec<String>>, fallback_section: &[String]| match section {
        Some(items) if !items.is_empty() => items,
        _ => {
            used_fallback_section = true;
            fallback_section.to_vec()
        }
    };

    let urgent_actions = pick(parsed.urgent_actions, &fallback.urgent_actions);
    let optimizations = pick(parsed.optimizations, &fallback.optimizations);
    let long_term_suggestions = pick(
        parsed.long_term_suggestions,
        &fallback.long_term_suggestions,
    );
    let overall_assessment = match parsed.overall_assessment {
        Some(text) if !text.trim().is_empty() => text,
        _ => {
            used_fallback_section = true;
            fallback.overall_assessment.clone()
        }
    };

    PersonalizedAdvice {
        urgent_actions,
        optimizations,
        long_term_suggestions,
        overall_assessment,
        source: if used_fallback_section {
            AdviceSource::Blended
        } else {
            AdviceSource::Model
        },
    }
}

fn build_request(context: &AdviceContext, config: &AdviceConfig) -> TextModelRequest {
    let goal_lines: Vec<String> = context
        .goals
        .iter()
        .map(|goal| {
            format!(
                "- {} ({:.0}/{:.0}, on-track probability {:.0}%)",
                goal.name,
                goal.current_amount,
                goal.target_amount,
                goal.on_track_probability * 100.0
            )
        })
        .collect();

    let user_prompt = format!(
        "Financial position:\n\
         monthly income: {:.2}\n\
         monthly expenses: {:.2}\n\
         savings rate: {:.1}%\n\
         credit utilization: {:.1}%\n\
         total debt: {:.2}\n\
         savings balance: {:.2}\n\
         risk appetite: {}\n\
         goals:\n{}\n\n\
         Respond with a single JSON object and nothing else, with keys \
         \"urgent_actions\" (array of strings), \"optimizations\" (array of \
         strings), \"long_term_suggestions\" (array of strings) and \
         \"overall_assessment\" (string).",
        context.monthly_income,
        context.monthly_expenses,
        context.savings_rate_pct,
        context.utilization_pct,
        context.total_debt,
        context.savings_balance,
        context.risk_appetite.label(),
        if goal_lines.is_empty() {
            "- none".to_string()
        } else {
            goal_lines.join("\n")
        },
    );

    TextModelRequest {
        model: config.model.clone(),
        max_tokens: config.max_tokens,
        messages: vec![
            ChatMessage {
                role: MessageRole::System,
                content: "You are a prudent UK personal finance adviser. Be specific and concise."
                    .to_string(),
            },
            ChatMessage {
                role: MessageRole::User,
                content: user_prompt,
            },
        ],
    }
}

/// Pull the first `{...}` block out of free text and parse it leniently.
fn extract_advice(raw: &str) -> Option<ModelAdvice> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&raw[start..=end]).ok()
}

const HEALTHY_SAVINGS_RATE_PCT: f64 = 10.0;
const HEALTHY_UTILIZATION_PCT: f64 = 30.0;
const EMERGENCY_FUND_MONTHS: f64 = 6.0;

/// Deterministic advice derived from the same context the model sees.
pub fn rule_based_advice(context: &AdviceContext) -> PersonalizedAdvice {
    let mut urgent_actions = Vec::new();
    if context.monthly_expenses > context.monthly_income {
        urgent_actions.push("Spending exceeds income; cut discretionary costs now".to_string());
    }
    if context.savings_rate_pct < HEALTHY_SAVINGS_RATE_PCT {
        urgent_actions.push(format!(
            "Increase your savings rate; it is currently {}% of income",
            round_pct(context.savings_rate_pct)
        ));
    }
    if context.utilization_pct > HEALTHY_UTILIZATION_PCT {
        urgent_actions.push(format!(
            "Pay down revolving balances; utilization is {}%",
            round_pct(context.utilization_pct)
        ));
    }
    if urgent_actions.is_empty() {
        urgent_actions.push("No urgent issues detected this month".to_string());
    }

    let mut optimizations = Vec::new();
    if context.total_debt > 0.0 {
        optimizations
            .push("Direct spare cash at your highest-rate debt first".to_string());
    }
    optimizations.push("Review subscriptions and recurring charges for quiet creep".to_string());
    if context.utilization_pct > 10.0 && context.utilization_pct <= HEALTHY_UTILIZATION_PCT {
        optimizations
            .push("Nudging utilization below 10% would strengthen your credit profile".to_string());
    }

    let mut long_term_suggestions = Vec::new();
    let emergency_target = context.monthly_expenses * EMERGENCY_FUND_MONTHS;
    if context.savings_balance < emergency_target {
        long_term_suggestions.push(format!(
            "Build your emergency fund toward {:.0} (six months of expenses)",
            emergency_target
        ));
    }
    for goal in context.goals.iter().filter(|goal| !goal.on_track) {
        long_term_suggestions.push(format!(
            "Increase contributions to '{}' to get it back on track",
            goal.name
        ));
    }
    long_term_suggestions.push(match context.risk_appetite {
        RiskAppetite::Cautious => {
            "Consider low-risk savings products once your buffer is in place".to_string()
        }
        RiskAppetite::Balanced => {
            "A diversified index portfolio suits your balanced risk appetite".to_string()
        }
        RiskAppetite::Adventurous => {
            "With your risk appetite, regular investing beats waiting for timing".to_string()
        }
    });

    let overall_assessment = format!(
        "You take home {:.2} a month and spend {:.2}, a savings rate of {}%. \
         Credit utilization sits at {}% with total debt of {:.2}. Advice is \
         tuned to a {} risk appetite.",
        context.monthly_income,
        context.monthly_expenses,
        round_pct(context.savings_rate_pct),
        round_pct(context.utilization_pct),
        context.total_debt,
        context.risk_appetite.label(),
    );

    PersonalizedAdvice {
        urgent_actions,
        optimizations,
        long_term_suggestions,
        overall_assessment,
        source: AdviceSource::RuleBased,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{TextModelError, TextModelResponse};

    struct CannedModel(Result<String, ()>);

    impl TextModel for CannedModel {
        fn run(&self, _request: TextModelRequest) -> Result<TextModelResponse, TextModelError> {
            match &self.0 {
                Ok(text) => Ok(TextModelResponse {
                    response: text.clone(),
                }),
                Err(()) => Err(TextModelError::Unavailable("down".to_string())),
            }
        }
    }

    fn context() -> AdviceContext {
        AdviceContext {
            monthly_income: 4_000.0,
            monthly_expenses: 3_800.0,
            savings_rate_pct: 5.0,
            utilization_pct: 42.0,
            total_debt: 6_500.0,
            savings_balance: 900.0,
            goals: Vec::new(),
            risk_appetite: RiskAppetite::Balanced,
        }
    }

    #[test]
    fn extracts_json_wrapped_in_prose() {
        let raw = "Sure! Here is the advice you asked for:\n\
                   {\"urgent_actions\":[\"act\"],\"overall_assessment\":\"fine\"}\n\
                   Let me know if you need more.";
        let parsed = extract_advice(raw).expect("parses");
        assert_eq!(parsed.urgent_actions.unwrap(), vec!["act".to_string()]);
        assert_eq!(parsed.overall_assessment.unwrap(), "fine");
    }

    #[test]
    fn garbage_text_does_not_parse() {
        assert!(extract_advice("no braces here").is_none());
        assert!(extract_advice("{not json}").is_none());
        assert!(extract_advice("}{").is_none());
    }

    #[test]
    fn model_failure_falls_back_to_rules() {
        let advice = compose_advice(&context(), &CannedModel(Err(())), &AdviceConfig::default());
        assert_eq!(advice.source, AdviceSource::RuleBased);
        assert!(!advice.urgent_actions.is_empty());
        assert!(!advice.optimizations.is_empty());
        assert!(!advice.long_term_suggestions.is_empty());
        assert!(!advice.overall_assessment.is_empty());
    }

    #[test]
    fn partial_model_output_is_blended_with_rules() {
        let model = CannedModel(Ok(
            "{\"urgent_actions\":[\"from the model\"],\"optimizations\":[]}".to_string(),
        ));
        let advice = compose_advice(&context(), &model, &AdviceConfig::default());
        assert_eq!(advice.source, AdviceSource::Blended);
        assert_eq!(advice.urgent_actions, vec!["from the model".to_string()]);
        assert!(!advice.optimizations.is_empty());
        assert!(!advice.overall_assessment.is_empty());
    }

    #[test]
    fn complete_model_output_is_used_verbatim() {
        let model = CannedModel(Ok("{\
            \"urgent_actions\":[\"a\"],\
            \"optimizations\":[\"b\"],\
            \"long_term_suggestions\":[\"c\"],\
            \"overall_assessment\":\"d\"}"
            .to_string()));
        let advice = compose_advice(&context(), &model, &AdviceConfig::default());
        assert_eq!(advice.source, AdviceSource::Model);
        assert_eq!(advice.overall_assessment, "d");
    }

    #[test]
    fn rule_based_sections_react_to_the_context() {
        let advice = rule_based_advice(&context());
        assert!(advice
            .urgent_actions
            .iter()
            .any(|action| action.contains("savings rate")));
        assert!(advice
            .urgent_actions
            .iter()
            .any(|action| action.contains("utilization")));
        assert!(advice
            .long_term_suggestions
            .iter()
            .any(|suggestion| suggestion.contains("emergency fund")));
    }
}

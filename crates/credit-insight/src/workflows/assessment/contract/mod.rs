//! Boundary with the external assessment generator.
//!
//! The generator receives the complete application as a JSON document and answers with
//! raw text. The text is unwrapped, parsed loosely, checked for the two key fields and
//! only then promoted to a [`RiskAssessmentResult`].

mod result;

pub use result::{
    BiasMitigationAndFairLending, DetailedAnalysis, FraudDetection, KeyRiskFactors,
    Recommendations, RecommendedAction, RiskAssessmentResult, RiskScore, RiskTier,
};

use async_trait::async_trait;
use serde_json::Value;

use super::domain::CompleteApplicationRecord;

const RAW_EXCERPT_CHARS: usize = 500;

/// Capability that turns a complete application into a raw assessment response.
#[async_trait]
pub trait AssessmentGenerator: Send + Sync {
    async fn generate(
        &self,
        application: &CompleteApplicationRecord,
    ) -> Result<String, GeneratorError>;
}

/// Every way an assessment request can fail once dispatched.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("The assessment service API key is not configured.")]
    MissingApiKey,
    #[error("The provided API key is invalid or not authorized.")]
    InvalidApiKey,
    #[error("An error occurred while communicating with the AI assessment service: {0}")]
    Transport(String),
    #[error(transparent)]
    Contract(#[from] ContractError),
}

/// Response payloads that cannot be promoted to a typed result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContractError {
    #[error("Failed to parse the AI's response as JSON. Raw text: {excerpt}...")]
    Malformed { excerpt: String },
    #[error("The AI response is not in the expected format. Missing key fields.")]
    MissingKeyFields,
    #[error("The AI response could not be read as a risk assessment: {0}")]
    Shape(String),
}

/// JSON request document with `personalInfo`, `financialData`, `alternativeData`, `loanDetails`.
pub fn request_document(application: &CompleteApplicationRecord) -> serde_json::Result<String> {
    serde_json::to_string_pretty(application)
}

/// Remove a surrounding markdown code fence (with or without a `json` tag).
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed
        .strip_prefix("```")
        .and_then(|rest| rest.strip_suffix("```"))
    else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.trim()
}

pub fn parse_assessment(raw: &str) -> Result<RiskAssessmentResult, ContractError> {
    let body = strip_code_fence(raw);
    let value: Value = serde_json::from_str(body).map_err(|_| ContractError::Malformed {
        excerpt: raw.chars().take(RAW_EXCERPT_CHARS).collect(),
    })?;

    let Value::Object(fields) = &value else {
        return Err(ContractError::Malformed {
            excerpt: raw.chars().take(RAW_EXCERPT_CHARS).collect(),
        });
    };

    if !is_present(fields.get("executiveSummary")) || !is_present(fields.get("riskScore")) {
        return Err(ContractError::MissingKeyFields);
    }

    serde_json::from_value(value).map_err(|err| ContractError::Shape(err.to_string()))
}

fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(text)) => !text.is_empty(),
        Some(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tagged_fence() {
        let raw = "```json\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fence(raw), "{\"a\": 1}");
    }

    #[test]
    fn leaves_bare_json_untouched() {
        assert_eq!(strip_code_fence("  {\"a\": 1}\n"), "{\"a\": 1}");
    }

    #[test]
    fn empty_summary_counts_as_missing() {
        let raw = r#"{"executiveSummary": "", "riskScore": {"score": 1, "tier": "LOW"}}"#;
        assert_eq!(parse_assessment(raw), Err(ContractError::MissingKeyFields));
    }
}

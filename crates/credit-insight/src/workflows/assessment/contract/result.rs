use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub const fn label(self) -> &'static str {
        match self {
            RiskTier::Low => "LOW",
            RiskTier::Medium => "MEDIUM",
            RiskTier::High => "HIGH",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendedAction {
    Approve,
    Reject,
    #[default]
    ManualReview,
}

impl RecommendedAction {
    pub const fn label(self) -> &'static str {
        match self {
            RecommendedAction::Approve => "APPROVE",
            RecommendedAction::Reject => "REJECT",
            RecommendedAction::ManualReview => "MANUAL REVIEW",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskScore {
    pub score: f64,
    pub tier: RiskTier,
    #[serde(default)]
    pub probability_of_default: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyRiskFactors {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DetailedAnalysis {
    pub personal_info_analysis: String,
    pub financial_data_analysis: String,
    pub alternative_data_analysis: String,
    pub behavioral_patterns: String,
    pub psychometric_elements: String,
    pub macroeconomic_context: String,
    pub loan_details_analysis: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FraudDetection {
    pub assessment: String,
    pub identified_anomalies: Vec<String>,
    pub inconsistency_flags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BiasMitigationAndFairLending {
    pub compliance_statement: String,
    pub bias_correction_notes: String,
    pub financial_inclusion_considerations: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Recommendations {
    pub suggested_action: RecommendedAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loan_terms_suggestion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interest_rate_suggestion: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alternative_products: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conditions_for_approval: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub human_review_triggers: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub additional_documentation_required: Vec<String>,
}

/// Structured assessment returned by the generator.
///
/// Only `executiveSummary` and `riskScore` are checked before promotion; every deeper
/// section is taken as delivered and defaults to empty when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessmentResult {
    pub executive_summary: String,
    pub risk_score: RiskScore,
    #[serde(default)]
    pub key_risk_factors: KeyRiskFactors,
    #[serde(default)]
    pub detailed_analysis: DetailedAnalysis,
    #[serde(default)]
    pub fraud_detection: FraudDetection,
    #[serde(default)]
    pub bias_mitigation_and_fair_lending: BiasMitigationAndFairLending,
    #[serde(default)]
    pub recommendations: Recommendations,
    #[serde(default)]
    pub monitoring_alerts: Vec<String>,
    #[serde(default)]
    pub compliance_notes: String,
}

use std::fmt::Write as _;
use std::sync::Arc;

use chrono::NaiveDate;

use super::super::contract::RiskAssessmentResult;
use super::super::domain::ProfileRecord;
use super::super::export::CaptureHandle;

pub const DISPLAY_SURFACE: &str = "assessment-display";

/// Render the assessment display and bind the capture to `result`.
pub fn render_assessment(
    profile: &ProfileRecord,
    result: &Arc<RiskAssessmentResult>,
    generated_on: NaiveDate,
) -> CaptureHandle {
    let document = render_document(profile, result, generated_on);
    CaptureHandle::new(DISPLAY_SURFACE, Arc::clone(result), document)
}

fn render_document(
    profile: &ProfileRecord,
    result: &RiskAssessmentResult,
    generated_on: NaiveDate,
) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\">");
    let _ = writeln!(
        html,
        "<title>Credit Risk Assessment - {}</title></head><body>",
        escape_html(&profile.applicant_name)
    );
    html.push_str("<h1>Credit Risk Assessment</h1>\n");
    let _ = writeln!(
        html,
        "<p>Report Generated: {}</p>",
        generated_on.format("%B %d, %Y")
    );
    let _ = writeln!(
        html,
        "<p>Applicant: {} | Age {} | {} | {}</p>",
        escape_html(&profile.applicant_name),
        escape_html(&profile.age),
        escape_html(&profile.location),
        escape_html(&profile.employment_status)
    );

    section(&mut html, "Executive Summary");
    paragraph(&mut html, &result.executive_summary);

    section(&mut html, "Risk Score & Tier");
    let _ = writeln!(
        html,
        "<p class=\"score\">{}</p><p>Tier: {}</p><p>Probability of Default: {}</p>",
        result.risk_score.score,
        result.risk_score.tier.label(),
        escape_html(&result.risk_score.probability_of_default)
    );

    section(&mut html, "Overall Recommendation");
    paragraph(&mut html, result.recommendations.suggested_action.label());

    section(&mut html, "Key Risk Factors");
    list(&mut html, "Positive Indicators", &result.key_risk_factors.positive);
    list(
        &mut html,
        "Negative Indicators / Concerns",
        &result.key_risk_factors.negative,
    );

    let analysis = &result.detailed_analysis;
    section(&mut html, "Detailed Analysis");
    for (label, text) in [
        ("Personal Information", &analysis.personal_info_analysis),
        ("Financial Data", &analysis.financial_data_analysis),
        ("Alternative Data", &analysis.alternative_data_analysis),
        ("Behavioral Patterns", &analysis.behavioral_patterns),
        ("Psychometric Elements", &analysis.psychometric_elements),
        ("Macroeconomic Context", &analysis.macroeconomic_context),
        ("Loan Details", &analysis.loan_details_analysis),
    ] {
        labelled(&mut html, label, text);
    }

    section(&mut html, "Fraud Detection & Anomaly Identification");
    paragraph(&mut html, &result.fraud_detection.assessment);
    list(
        &mut html,
        "Identified Anomalies",
        &result.fraud_detection.identified_anomalies,
    );
    list(
        &mut html,
        "Inconsistency Flags",
        &result.fraud_detection.inconsistency_flags,
    );

    let fairness = &result.bias_mitigation_and_fair_lending;
    section(&mut html, "Bias Mitigation & Fair Lending");
    labelled(&mut html, "Compliance Statement", &fairness.compliance_statement);
    labelled(&mut html, "Bias Correction Notes", &fairness.bias_correction_notes);
    labelled(
        &mut html,
        "Financial Inclusion",
        &fairness.financial_inclusion_considerations,
    );

    let recommendations = &result.recommendations;
    section(&mut html, "Recommendations & Next Steps");
    if let Some(terms) = &recommendations.loan_terms_suggestion {
        labelled(&mut html, "Loan Terms", terms);
    }
    if let Some(rate) = &recommendations.interest_rate_suggestion {
        labelled(&mut html, "Interest Rate", rate);
    }
    list(
        &mut html,
        "Alternative Products Suggested",
        &recommendations.alternative_products,
    );
    list(
        &mut html,
        "Conditions for Approval",
        &recommendations.conditions_for_approval,
    );
    list(
        &mut html,
        "Human Review Triggers",
        &recommendations.human_review_triggers,
    );
    list(
        &mut html,
        "Additional Documentation Required",
        &recommendations.additional_documentation_required,
    );

    section(&mut html, "Post-Approval Monitoring");
    list(&mut html, "Metrics to Track", &result.monitoring_alerts);

    section(&mut html, "Compliance & Regulatory Notes");
    paragraph(&mut html, &result.compliance_notes);

    html.push_str("</body></html>\n");
    html
}

fn section(html: &mut String, title: &str) {
    let _ = writeln!(html, "<h2>{}</h2>", escape_html(title));
}

fn paragraph(html: &mut String, text: &str) {
    if !text.trim().is_empty() {
        let _ = writeln!(html, "<p>{}</p>", escape_html(text));
    }
}

fn labelled(html: &mut String, label: &str, text: &str) {
    if !text.trim().is_empty() {
        let _ = writeln!(
            html,
            "<p><strong>{}:</strong> {}</p>",
            escape_html(label),
            escape_html(text)
        );
    }
}

fn list(html: &mut String, title: &str, items: &[String]) {
    let _ = writeln!(html, "<h3>{}</h3>", escape_html(title));
    if items.is_empty() {
        html.push_str("<p>None listed.</p>\n");
        return;
    }
    html.push_str("<ul>");
    for item in items {
        let _ = write!(html, "<li>{}</li>", escape_html(item));
    }
    html.push_str("</ul>\n");
}

pub(crate) fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

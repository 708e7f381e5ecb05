//! Pure completeness checks run before navigation and before any generator call.
//!
//! The three checks are ordered from most to least fundamental; `validate_submission`
//! reports the first one that fails.

use super::domain::{ApplicationDraft, ProfileRecord};

/// Local validation failures. None of these ever reach the generator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error(
        "Please complete Personal Information (including Applicant Name) in Settings first. Missing: {}",
        .missing.join(", ")
    )]
    IncompleteProfile { missing: Vec<&'static str> },
    #[error("Employment status is missing from Personal Information. Please complete your details in Settings.")]
    MissingEmploymentStatus,
    #[error(
        "Please fill in all required fields in the assessment form. Missing: {}",
        .missing.join(", ")
    )]
    IncompleteDraft { missing: Vec<&'static str> },
    #[error("Applicant name is required before personal information can be saved.")]
    MissingApplicantName,
}

impl ValidationError {
    /// Profile problems can only be fixed on the settings view.
    pub fn redirects_to_settings(&self) -> bool {
        matches!(
            self,
            ValidationError::IncompleteProfile { .. } | ValidationError::MissingEmploymentStatus
        )
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Gate for entering the assessment form: applicant name, age and location.
pub fn check_navigation_profile(profile: &ProfileRecord) -> Result<(), ValidationError> {
    let missing: Vec<&'static str> = [
        ("applicant name", profile.applicant_name.as_str()),
        ("age", profile.age.as_str()),
        ("location", profile.location.as_str()),
    ]
    .into_iter()
    .filter(|(_, value)| is_blank(value))
    .map(|(label, _)| label)
    .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::IncompleteProfile { missing })
    }
}

/// Submission additionally needs an employment status.
pub fn check_submission_profile(profile: &ProfileRecord) -> Result<(), ValidationError> {
    check_navigation_profile(profile)?;
    if is_blank(&profile.employment_status) {
        return Err(ValidationError::MissingEmploymentStatus);
    }
    Ok(())
}

pub fn check_submission_draft(draft: &ApplicationDraft) -> Result<(), ValidationError> {
    let missing: Vec<&'static str> = [
        (
            "requested loan amount",
            draft.loan_details.requested_loan_amount.as_str(),
        ),
        ("income", draft.financial_data.income.as_str()),
    ]
    .into_iter()
    .filter(|(_, value)| is_blank(value))
    .map(|(label, _)| label)
    .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::IncompleteDraft { missing })
    }
}

pub fn validate_submission(
    profile: &ProfileRecord,
    draft: &ApplicationDraft,
) -> Result<(), ValidationError> {
    check_navigation_profile(profile)?;
    check_submission_profile(profile)?;
    check_submission_draft(draft)
}

pub fn check_profile_for_save(profile: &ProfileRecord) -> Result<(), ValidationError> {
    if is_blank(&profile.applicant_name) {
        Err(ValidationError::MissingApplicantName)
    } else {
        Ok(())
    }
}

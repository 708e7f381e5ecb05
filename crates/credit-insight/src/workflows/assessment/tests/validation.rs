use super::common::*;
use crate::workflows::assessment::domain::{ApplicationDraft, ProfileRecord};
use crate::workflows::assessment::validation::{
    check_navigation_profile, check_profile_for_save, check_submission_draft,
    validate_submission, ValidationError,
};

fn filled_draft() -> ApplicationDraft {
    let mut draft = ApplicationDraft::default();
    draft.set(income(), "90000".to_string());
    draft.set(loan_amount(), "20000".to_string());
    draft
}

#[test]
fn navigation_gate_lists_every_missing_identity_field() {
    let profile = ProfileRecord {
        applicant_name: "J Doe".to_string(),
        ..ProfileRecord::default()
    };

    match check_navigation_profile(&profile) {
        Err(ValidationError::IncompleteProfile { missing }) => {
            assert_eq!(missing, vec!["age", "location"]);
        }
        other => panic!("expected incomplete profile, got {other:?}"),
    }
}

#[test]
fn whitespace_only_fields_count_as_empty() {
    let profile = ProfileRecord {
        location: "   ".to_string(),
        ..sample_profile()
    };

    assert!(matches!(
        check_navigation_profile(&profile),
        Err(ValidationError::IncompleteProfile { .. })
    ));
}

#[test]
fn submission_requires_employment_status() {
    let profile = ProfileRecord {
        employment_status: String::new(),
        ..sample_profile()
    };

    let error = validate_submission(&profile, &filled_draft()).expect_err("employment required");
    assert_eq!(error, ValidationError::MissingEmploymentStatus);
    assert!(error.redirects_to_settings());
}

#[test]
fn draft_errors_name_the_missing_field_and_stay_on_the_form() {
    let mut draft = filled_draft();
    draft.set(income(), String::new());

    let error = check_submission_draft(&draft).expect_err("income required");
    assert_eq!(
        error,
        ValidationError::IncompleteDraft {
            missing: vec!["income"]
        }
    );
    assert!(error.to_string().contains("income"));
    assert!(!error.redirects_to_settings());
}

#[test]
fn profile_problems_are_reported_before_draft_problems() {
    let profile = ProfileRecord {
        age: String::new(),
        employment_status: String::new(),
        ..sample_profile()
    };

    match validate_submission(&profile, &ApplicationDraft::default()) {
        Err(ValidationError::IncompleteProfile { missing }) => assert_eq!(missing, vec!["age"]),
        other => panic!("expected the navigation check to win, got {other:?}"),
    }
}

#[test]
fn complete_inputs_pass() {
    assert_eq!(validate_submission(&sample_profile(), &filled_draft()), Ok(()));
}

#[test]
fn saving_requires_only_the_applicant_name() {
    let unnamed = ProfileRecord::default();
    assert_eq!(
        check_profile_for_save(&unnamed),
        Err(ValidationError::MissingApplicantName)
    );

    let named_only = ProfileRecord {
        applicant_name: "Ana".to_string(),
        ..ProfileRecord::default()
    };
    assert_eq!(check_profile_for_save(&named_only), Ok(()));
}

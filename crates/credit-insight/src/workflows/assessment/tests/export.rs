use std::sync::Arc;

use chrono::NaiveDate;

use super::common::*;
use crate::workflows::assessment::export::{
    current_export_stem, history_export_stem, CaptureHandle, ExportCoordinator, ExportError,
    Readiness, RenderObservation,
};
use crate::workflows::assessment::report::render_assessment;
use crate::workflows::assessment::session::{AssessmentSession, NoticeKind, View};

fn render_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).expect("valid date")
}

/// Render whatever the session currently displays and acknowledge it.
async fn render_display(session: &TestSession) -> Option<String> {
    let (profile, result) = session.display_source()?;
    let capture = render_assessment(&profile, &result, render_date());
    session
        .display_rendered(capture)
        .await
        .ok()
        .flatten()
        .map(|receipt| receipt.file_name)
}

#[test]
fn commit_requires_the_exact_rendered_instance() {
    let entry = archived_entry("Ana Ruiz", 100, 705);
    let mut exports = ExportCoordinator::default();
    assert!(exports.request(entry.clone()).is_none());

    let copy = Arc::new((*entry.output_data).clone());
    let stale_capture = CaptureHandle::new("assessment-display", copy, "<html/>");
    let readiness = exports.observe(RenderObservation {
        view: View::AssessmentForm,
        viewing_history_item: true,
        result: Some(&entry.output_data),
        capture: Some(&stale_capture),
    });
    assert!(matches!(readiness, Readiness::Waiting));

    let capture = CaptureHandle::new("assessment-display", entry.output_data.clone(), "<html/>");
    let readiness = exports.observe(RenderObservation {
        view: View::History,
        viewing_history_item: true,
        result: Some(&entry.output_data),
        capture: Some(&capture),
    });
    assert!(matches!(readiness, Readiness::Waiting));

    match exports.observe(RenderObservation {
        view: View::AssessmentForm,
        viewing_history_item: true,
        result: Some(&entry.output_data),
        capture: Some(&capture),
    }) {
        Readiness::Ready(job) => {
            assert_eq!(job.target.id, entry.id);
            assert_eq!(job.stem, history_export_stem(&entry));
        }
        _ => panic!("expected the export to be ready"),
    }
    assert_eq!(exports.pending(), Some(&entry.id));

    exports.finish(&entry.id);
    assert!(exports.pending().is_none());
}

#[test]
fn a_newer_request_survives_the_previous_commit_finishing() {
    let first = archived_entry("First", 100, 600);
    let second = archived_entry("Second", 200, 610);
    let mut exports = ExportCoordinator::default();

    exports.request(first.clone());
    let capture = CaptureHandle::new("assessment-display", first.output_data.clone(), "");
    assert!(matches!(
        exports.observe(RenderObservation {
            view: View::AssessmentForm,
            viewing_history_item: true,
            result: Some(&first.output_data),
            capture: Some(&capture),
        }),
        Readiness::Ready(_)
    ));

    exports.request(second.clone());
    exports.finish(&first.id);
    assert_eq!(exports.pending(), Some(&second.id));
}

#[test]
fn stems_replace_whitespace_and_use_the_short_id() {
    let entry = archived_entry("Ana  Maria Ruiz", 100, 705);
    assert_eq!(current_export_stem("J Doe"), "Assessment_J_Doe_current");
    assert_eq!(
        history_export_stem(&entry),
        format!("Assessment_Ana__Maria_Ruiz_{}", &entry.id.0[..8])
    );
}

#[test]
fn stems_never_carry_path_separators() {
    assert_eq!(current_export_stem("AC/DC Ltd"), "Assessment_AC_DC_Ltd_current");
    assert_eq!(
        current_export_stem("x/../../escaped"),
        "Assessment_x_______escaped_current"
    );
    assert_eq!(current_export_stem("Zoë-O'Neil"), "Assessment_Zo_-O_Neil_current");

    let entry = archived_entry("..\\evil", 100, 705);
    let stem = history_export_stem(&entry);
    assert!(stem
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'));
}

#[tokio::test]
async fn exporting_current_needs_a_result_and_a_matching_render() {
    let (session, _, exporter) = ready_session(ScriptedGenerator::replying(response_json("ok", 700)));

    assert!(matches!(
        session.export_current().await,
        Err(ExportError::NoResult)
    ));

    session.submit().await.expect("submission succeeds");
    assert!(matches!(
        session.export_current().await,
        Err(ExportError::CaptureNotReady)
    ));

    let (_, result) = session.display_source().expect("result on display");
    let lookalike = CaptureHandle::new("assessment-display", Arc::new((*result).clone()), "");
    session
        .display_rendered(lookalike)
        .await
        .expect("no export pending");
    assert!(matches!(
        session.export_current().await,
        Err(ExportError::CaptureNotReady)
    ));

    render_display(&session).await;
    let receipt = session.export_current().await.expect("export succeeds");

    assert_eq!(receipt.file_name, "Assessment_J_Doe_current_2026-10-16.html");
    let exports = exporter.exports();
    assert_eq!(exports.len(), 1);
    assert!(exports[0].document.contains("J Doe"));
}

#[tokio::test]
async fn history_export_waits_for_the_render_of_its_entry() {
    let entry = archived_entry("Ana Ruiz", 100, 705);
    let (session, _, exporter) = session_over(
        store_with_history(&[entry.clone()]),
        ScriptedGenerator::replying("{}"),
    );

    let committed = session
        .request_history_export(&entry.id)
        .await
        .expect("entry exists");
    assert!(committed.is_none());
    let snapshot = session.snapshot();
    assert_eq!(snapshot.pending_export, Some(entry.id.clone()));
    assert_eq!(snapshot.view, View::AssessmentForm);
    assert!(snapshot.is_viewing_history_item);
    assert!(exporter.exports().is_empty());

    let file = render_display(&session).await.expect("render commits the export");

    assert_eq!(file, format!("{}_2026-10-16.html", history_export_stem(&entry)));
    let exports = exporter.exports();
    assert_eq!(exports.len(), 1);
    assert!(exports[0].document.contains("Ana Ruiz"));
    assert!(session.snapshot().pending_export.is_none());
}

#[tokio::test]
async fn only_the_latest_history_export_is_committed() {
    let a = archived_entry("Applicant A", 100, 600);
    let b = archived_entry("Applicant B", 200, 650);
    let (session, _, exporter) = session_over(
        store_with_history(&[a.clone(), b.clone()]),
        ScriptedGenerator::replying("{}"),
    );

    session.request_history_export(&a.id).await.expect("a exists");
    session.request_history_export(&b.id).await.expect("b exists");
    assert_eq!(session.snapshot().pending_export, Some(b.id.clone()));

    render_display(&session).await;

    let exports = exporter.exports();
    assert_eq!(exports.len(), 1);
    assert_eq!(exports[0].stem, history_export_stem(&b));
    assert!(exports[0].document.contains("Applicant B"));
    assert!(session.snapshot().pending_export.is_none());

    render_display(&session).await;
    assert_eq!(exporter.exports().len(), 1, "a settled export never re-fires");
}

#[tokio::test]
async fn an_entry_already_on_display_exports_immediately() {
    let entry = archived_entry("Ana Ruiz", 100, 705);
    let (session, _, exporter) = session_over(
        store_with_history(&[entry.clone()]),
        ScriptedGenerator::replying("{}"),
    );
    session.view_details(&entry.id).expect("entry exists");
    render_display(&session).await;

    let committed = session
        .request_history_export(&entry.id)
        .await
        .expect("entry exists");

    assert!(committed.is_some());
    assert_eq!(exporter.exports().len(), 1);
}

#[tokio::test]
async fn editing_the_draft_abandons_a_pending_export() {
    let entry = archived_entry("Ana Ruiz", 100, 705);
    let (session, _, exporter) = session_over(
        store_with_history(&[entry.clone()]),
        ScriptedGenerator::replying("{}"),
    );

    session.request_history_export(&entry.id).await.expect("entry exists");
    session.edit_draft(income(), "1");

    assert!(session.snapshot().pending_export.is_none());
    assert!(render_display(&session).await.is_none());
    assert!(exporter.exports().is_empty());
}

#[tokio::test]
async fn failed_exports_clear_the_slot_and_report() {
    let entry = archived_entry("Ana Ruiz", 100, 705);
    let session = AssessmentSession::new(
        store_with_history(&[entry.clone()]),
        Arc::new(ScriptedGenerator::replying("{}")),
        Arc::new(RecordingExporter::failing("disk full")),
    );

    session.request_history_export(&entry.id).await.expect("entry exists");
    let (profile, result) = session.display_source().expect("entry on display");
    let outcome = session
        .display_rendered(render_assessment(&profile, &result, render_date()))
        .await;

    assert!(matches!(outcome, Err(ExportError::Capability(reason)) if reason == "disk full"));
    let snapshot = session.snapshot();
    assert!(snapshot.pending_export.is_none());
    assert_eq!(snapshot.view, View::AssessmentForm);
    assert_eq!(
        snapshot.notice.map(|notice| notice.kind),
        Some(NoticeKind::Error)
    );
}

#[test]
fn rendered_display_escapes_untrusted_text() {
    let mut entry = archived_entry("Ana <Ruiz>", 100, 705);
    Arc::make_mut(&mut entry.output_data).executive_summary = "Score & \"tier\"".to_string();

    let capture = render_assessment(&entry.input_data.personal_info, &entry.output_data, render_date());

    assert_eq!(capture.surface(), "assessment-display");
    assert!(capture.shows(&entry.output_data));
    assert!(capture.document().contains("Ana &lt;Ruiz&gt;"));
    assert!(capture.document().contains("Score &amp; &quot;tier&quot;"));
    assert!(capture.document().contains("October 16, 2026"));
}

#[tokio::test]
async fn renders_outside_the_assessment_form_are_not_exportable() {
    let (session, _, exporter) = ready_session(ScriptedGenerator::replying(response_json("ok", 700)));
    session.submit().await.expect("submission succeeds");
    let (profile, result) = session.display_source().expect("result on display");

    assert_eq!(session.navigate(View::Home), View::Home);
    assert!(session.display_source().is_none());
    let committed = session
        .display_rendered(render_assessment(&profile, &result, render_date()))
        .await
        .expect("nothing to commit");
    assert!(committed.is_none());

    assert!(matches!(
        session.export_current().await,
        Err(ExportError::CaptureNotReady)
    ));
    assert!(exporter.exports().is_empty());
}

#[tokio::test]
async fn deleting_the_awaited_entry_drops_its_export() {
    let entry = archived_entry("Ana Ruiz", 100, 705);
    let (session, _, exporter) = session_over(
        store_with_history(&[entry.clone()]),
        ScriptedGenerator::replying("{}"),
    );

    session.request_history_export(&entry.id).await.expect("entry exists");
    assert!(session.delete_entry(&entry.id));

    let snapshot = session.snapshot();
    assert!(snapshot.pending_export.is_none());
    assert_eq!(snapshot.history_len, 0);
    assert!(render_display(&session).await.is_none());
    assert!(exporter.exports().is_empty());
}

#[test]
fn cancel_only_drops_a_matching_waiting_request() {
    let first = archived_entry("First", 100, 600);
    let second = archived_entry("Second", 200, 610);
    let mut exports = ExportCoordinator::default();

    exports.request(first.clone());
    assert!(!exports.cancel(&second.id));
    assert_eq!(exports.pending(), Some(&first.id));

    assert!(exports.cancel(&first.id));
    assert!(exports.pending().is_none());
}

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post, put},
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use super::contract::AssessmentGenerator;
use super::domain::{DraftField, ProfileRecord};
use super::export::{ExportCapability, ExportError};
use super::history::HistoryId;
use super::report::{render_assessment, write_history_csv};
use super::session::{AssessmentSession, SessionError, SubmitError, View};
use super::storage::KeyValueStore;

type SharedSession<S, G, X> = Arc<AssessmentSession<S, G, X>>;

#[derive(Debug, Deserialize)]
pub(crate) struct NavigationRequest {
    view: View,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DraftEdit {
    section: String,
    field: String,
    value: String,
}

/// Router builder exposing the operator API over one shared session.
pub fn assessment_router<S, G, X>(session: SharedSession<S, G, X>) -> Router
where
    S: KeyValueStore + 'static,
    G: AssessmentGenerator + 'static,
    X: ExportCapability + 'static,
{
    Router::new()
        .route("/api/v1/session", get(snapshot_handler::<S, G, X>))
        .route("/api/v1/notice", delete(dismiss_notice_handler::<S, G, X>))
        .route("/api/v1/profile", put(save_profile_handler::<S, G, X>))
        .route("/api/v1/navigation", post(navigate_handler::<S, G, X>))
        .route("/api/v1/draft", patch(edit_draft_handler::<S, G, X>))
        .route("/api/v1/assessments", post(new_assessment_handler::<S, G, X>))
        .route(
            "/api/v1/assessments/submit",
            post(submit_handler::<S, G, X>),
        )
        .route(
            "/api/v1/assessments/current/export",
            post(export_current_handler::<S, G, X>),
        )
        .route("/api/v1/history", get(history_handler::<S, G, X>))
        .route("/api/v1/history.csv", get(history_csv_handler::<S, G, X>))
        .route(
            "/api/v1/history/:entry_id",
            delete(delete_entry_handler::<S, G, X>),
        )
        .route(
            "/api/v1/history/:entry_id/view",
            post(view_details_handler::<S, G, X>),
        )
        .route(
            "/api/v1/history/:entry_id/template",
            post(use_as_template_handler::<S, G, X>),
        )
        .route(
            "/api/v1/history/:entry_id/export",
            post(export_entry_handler::<S, G, X>),
        )
        .route("/api/v1/display", get(display_handler::<S, G, X>))
        .with_state(session)
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let payload = json!({
        "error": message.into(),
    });
    (status, axum::Json(payload)).into_response()
}

fn export_error_status(error: &ExportError) -> StatusCode {
    match error {
        ExportError::NoResult | ExportError::CaptureNotReady => StatusCode::CONFLICT,
        ExportError::Capability(_) => StatusCode::BAD_GATEWAY,
    }
}

fn snapshot_response<S, G, X>(status: StatusCode, session: &AssessmentSession<S, G, X>) -> Response
where
    S: KeyValueStore + 'static,
    G: AssessmentGenerator + 'static,
    X: ExportCapability + 'static,
{
    (status, axum::Json(session.snapshot())).into_response()
}

pub(crate) async fn snapshot_handler<S, G, X>(
    State(session): State<SharedSession<S, G, X>>,
) -> Response
where
    S: KeyValueStore + 'static,
    G: AssessmentGenerator + 'static,
    X: ExportCapability + 'static,
{
    snapshot_response(StatusCode::OK, &session)
}

pub(crate) async fn dismiss_notice_handler<S, G, X>(
    State(session): State<SharedSession<S, G, X>>,
) -> Response
where
    S: KeyValueStore + 'static,
    G: AssessmentGenerator + 'static,
    X: ExportCapability + 'static,
{
    session.dismiss_notice();
    StatusCode::NO_CONTENT.into_response()
}

pub(crate) async fn save_profile_handler<S, G, X>(
    State(session): State<SharedSession<S, G, X>>,
    axum::Json(profile): axum::Json<ProfileRecord>,
) -> Response
where
    S: KeyValueStore + 'static,
    G: AssessmentGenerator + 'static,
    X: ExportCapability + 'static,
{
    match session.save_profile(profile) {
        Ok(()) => snapshot_response(StatusCode::OK, &session),
        Err(error) => error_response(StatusCode::UNPROCESSABLE_ENTITY, error.to_string()),
    }
}

pub(crate) async fn navigate_handler<S, G, X>(
    State(session): State<SharedSession<S, G, X>>,
    axum::Json(request): axum::Json<NavigationRequest>,
) -> Response
where
    S: KeyValueStore + 'static,
    G: AssessmentGenerator + 'static,
    X: ExportCapability + 'static,
{
    session.navigate(request.view);
    snapshot_response(StatusCode::OK, &session)
}

pub(crate) async fn new_assessment_handler<S, G, X>(
    State(session): State<SharedSession<S, G, X>>,
) -> Response
where
    S: KeyValueStore + 'static,
    G: AssessmentGenerator + 'static,
    X: ExportCapability + 'static,
{
    match session.start_new_assessment() {
        Ok(()) => snapshot_response(StatusCode::OK, &session),
        Err(error) => {
            let payload = json!({
                "error": error.to_string(),
                "view": session.snapshot().view,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn edit_draft_handler<S, G, X>(
    State(session): State<SharedSession<S, G, X>>,
    axum::Json(edit): axum::Json<DraftEdit>,
) -> Response
where
    S: KeyValueStore + 'static,
    G: AssessmentGenerator + 'static,
    X: ExportCapability + 'static,
{
    let Some(field) = DraftField::parse(&edit.section, &edit.field) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            format!("unknown draft field {}.{}", edit.section, edit.field),
        );
    };
    session.edit_draft(field, edit.value);
    snapshot_response(StatusCode::OK, &session)
}

pub(crate) async fn submit_handler<S, G, X>(
    State(session): State<SharedSession<S, G, X>>,
) -> Response
where
    S: KeyValueStore + 'static,
    G: AssessmentGenerator + 'static,
    X: ExportCapability + 'static,
{
    match session.submit().await {
        Ok(entry) => (StatusCode::CREATED, axum::Json(entry)).into_response(),
        Err(SubmitError::InFlight) => {
            error_response(StatusCode::CONFLICT, SubmitError::InFlight.to_string())
        }
        Err(SubmitError::Validation(error)) => {
            let payload = json!({
                "error": error.to_string(),
                "view": session.snapshot().view,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(SubmitError::Generator(error)) => {
            error_response(StatusCode::BAD_GATEWAY, error.to_string())
        }
    }
}

pub(crate) async fn export_current_handler<S, G, X>(
    State(session): State<SharedSession<S, G, X>>,
) -> Response
where
    S: KeyValueStore + 'static,
    G: AssessmentGenerator + 'static,
    X: ExportCapability + 'static,
{
    match session.export_current().await {
        Ok(receipt) => (StatusCode::OK, axum::Json(receipt)).into_response(),
        Err(error) => error_response(export_error_status(&error), error.to_string()),
    }
}

pub(crate) async fn history_handler<S, G, X>(
    State(session): State<SharedSession<S, G, X>>,
) -> Response
where
    S: KeyValueStore + 'static,
    G: AssessmentGenerator + 'static,
    X: ExportCapability + 'static,
{
    (StatusCode::OK, axum::Json(session.history())).into_response()
}

pub(crate) async fn history_csv_handler<S, G, X>(
    State(session): State<SharedSession<S, G, X>>,
) -> Response
where
    S: KeyValueStore + 'static,
    G: AssessmentGenerator + 'static,
    X: ExportCapability + 'static,
{
    let mut buffer = Vec::new();
    match write_history_csv(&session.history(), &mut buffer) {
        Ok(()) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, mime::TEXT_CSV_UTF_8.as_ref())],
            buffer,
        )
            .into_response(),
        Err(error) => error_response(StatusCode::INTERNAL_SERVER_ERROR, error.to_string()),
    }
}

fn session_error_response(error: SessionError) -> Response {
    match &error {
        SessionError::UnknownEntry(_) => error_response(StatusCode::NOT_FOUND, error.to_string()),
        SessionError::Export(export) => {
            error_response(export_error_status(export), export.to_string())
        }
    }
}

pub(crate) async fn view_details_handler<S, G, X>(
    State(session): State<SharedSession<S, G, X>>,
    Path(entry_id): Path<String>,
) -> Response
where
    S: KeyValueStore + 'static,
    G: AssessmentGenerator + 'static,
    X: ExportCapability + 'static,
{
    match session.view_details(&HistoryId(entry_id)) {
        Ok(_) => snapshot_response(StatusCode::OK, &session),
        Err(error) => session_error_response(error),
    }
}

pub(crate) async fn use_as_template_handler<S, G, X>(
    State(session): State<SharedSession<S, G, X>>,
    Path(entry_id): Path<String>,
) -> Response
where
    S: KeyValueStore + 'static,
    G: AssessmentGenerator + 'static,
    X: ExportCapability + 'static,
{
    match session.use_as_template(&HistoryId(entry_id)) {
        Ok(_) => snapshot_response(StatusCode::OK, &session),
        Err(error) => session_error_response(error),
    }
}

pub(crate) async fn export_entry_handler<S, G, X>(
    State(session): State<SharedSession<S, G, X>>,
    Path(entry_id): Path<String>,
) -> Response
where
    S: KeyValueStore + 'static,
    G: AssessmentGenerator + 'static,
    X: ExportCapability + 'static,
{
    match session.request_history_export(&HistoryId(entry_id)).await {
        Ok(committed) => {
            let payload = json!({
                "committed": committed,
                "pendingExport": session.snapshot().pending_export,
            });
            (StatusCode::ACCEPTED, axum::Json(payload)).into_response()
        }
        Err(error) => session_error_response(error),
    }
}

pub(crate) async fn delete_entry_handler<S, G, X>(
    State(session): State<SharedSession<S, G, X>>,
    Path(entry_id): Path<String>,
) -> Response
where
    S: KeyValueStore + 'static,
    G: AssessmentGenerator + 'static,
    X: ExportCapability + 'static,
{
    let removed = session.delete_entry(&HistoryId(entry_id));
    (StatusCode::OK, axum::Json(json!({ "removed": removed }))).into_response()
}

/// Render the current result and acknowledge the render, which may commit a
/// pending history export.
pub(crate) async fn display_handler<S, G, X>(
    State(session): State<SharedSession<S, G, X>>,
) -> Response
where
    S: KeyValueStore + 'static,
    G: AssessmentGenerator + 'static,
    X: ExportCapability + 'static,
{
    let Some((profile, result)) = session.display_source() else {
        return error_response(StatusCode::NOT_FOUND, "no assessment result on display");
    };

    let capture = render_assessment(&profile, &result, Utc::now().date_naive());
    let document = capture.document().to_string();
    if let Err(error) = session.display_rendered(capture).await {
        warn!(error = %error, "export after render failed");
    }

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, mime::TEXT_HTML_UTF_8.as_ref())],
        document,
    )
        .into_response()
}

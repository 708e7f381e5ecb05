use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::super::contract::RiskAssessmentResult;
use super::super::domain::{ApplicationDraft, ProfileRecord};
use super::super::history::HistoryId;

/// Screen the operator is on. Exactly one is live at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum View {
    Home,
    AssessmentForm,
    About,
    Settings,
    History,
}

impl View {
    pub const fn label(self) -> &'static str {
        match self {
            View::Home => "home",
            View::AssessmentForm => "assessmentForm",
            View::About => "about",
            View::Settings => "settings",
            View::History => "history",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

/// Transient operator-facing message; a single slot replaced by each report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub message: String,
    pub kind: NoticeKind,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NoticeKind::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NoticeKind::Error,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NoticeKind::Info,
        }
    }
}

/// Read-only copy of the session handed to presentation code after each operation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub view: View,
    pub profile: ProfileRecord,
    pub draft: ApplicationDraft,
    pub result: Option<Arc<RiskAssessmentResult>>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub is_viewing_history_item: bool,
    pub pending_export: Option<HistoryId>,
    pub notice: Option<Notice>,
    pub history_len: usize,
}

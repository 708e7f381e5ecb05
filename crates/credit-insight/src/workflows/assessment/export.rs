//! Document export and the render rendezvous for archived assessments.
//!
//! Exporting a history entry is two-phase. The request primes the session with the
//! entry and parks it in a single slot; the export only commits once the display has
//! been observed rendering that entry's exact result instance.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use super::contract::RiskAssessmentResult;
use super::history::{HistoryEntry, HistoryId};
use super::session::View;

/// Handle to a rendered assessment display, bound to the result it shows.
#[derive(Debug, Clone)]
pub struct CaptureHandle {
    surface: String,
    rendered: Arc<RiskAssessmentResult>,
    document: String,
}

impl CaptureHandle {
    pub fn new(
        surface: impl Into<String>,
        rendered: Arc<RiskAssessmentResult>,
        document: impl Into<String>,
    ) -> Self {
        Self {
            surface: surface.into(),
            rendered,
            document: document.into(),
        }
    }

    pub fn surface(&self) -> &str {
        &self.surface
    }

    pub fn document(&self) -> &str {
        &self.document
    }

    /// True only for the very instance that was rendered, not an equal copy.
    pub fn shows(&self, result: &Arc<RiskAssessmentResult>) -> bool {
        Arc::ptr_eq(&self.rendered, result)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportReceipt {
    pub file_name: String,
}

/// Capability that saves a captured display as a document named after `stem`.
#[async_trait]
pub trait ExportCapability: Send + Sync {
    async fn export(
        &self,
        capture: &CaptureHandle,
        stem: &str,
    ) -> Result<ExportReceipt, ExportError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Could not prepare export: display element not ready.")]
    CaptureNotReady,
    #[error("Could not prepare export: no assessment result.")]
    NoResult,
    #[error("Export failed: {0}")]
    Capability(String),
}

pub fn current_export_stem(applicant_name: &str) -> String {
    format!("Assessment_{}_current", file_safe(applicant_name))
}

pub fn history_export_stem(entry: &HistoryEntry) -> String {
    format!(
        "Assessment_{}_{}",
        file_safe(&entry.applicant_name),
        entry.id.short()
    )
}

/// Anything outside `[A-Za-z0-9_-]` becomes `_`, so a stem is always one path component.
fn file_safe(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[derive(Debug, Clone)]
enum ExportPhase {
    Idle,
    AwaitingRender { target: HistoryEntry },
    Committing { target: HistoryId },
}

/// Everything the commit guard looks at, captured after a state change.
pub struct RenderObservation<'a> {
    pub view: View,
    pub viewing_history_item: bool,
    pub result: Option<&'a Arc<RiskAssessmentResult>>,
    pub capture: Option<&'a CaptureHandle>,
}

#[derive(Debug, Clone)]
pub struct ExportJob {
    pub target: HistoryEntry,
    pub capture: CaptureHandle,
    pub stem: String,
}

pub enum Readiness {
    Idle,
    Waiting,
    Abandoned(HistoryEntry),
    Ready(ExportJob),
}

/// Single-slot rendezvous: idle, awaiting a matching render, or committing.
#[derive(Debug)]
pub struct ExportCoordinator {
    phase: ExportPhase,
}

impl Default for ExportCoordinator {
    fn default() -> Self {
        Self {
            phase: ExportPhase::Idle,
        }
    }
}

impl ExportCoordinator {
    /// Park `target`, replacing whatever was waiting. Returns the displaced request.
    pub fn request(&mut self, target: HistoryEntry) -> Option<HistoryEntry> {
        let previous = std::mem::replace(&mut self.phase, ExportPhase::AwaitingRender { target });
        match previous {
            ExportPhase::AwaitingRender { target } => Some(target),
            _ => None,
        }
    }

    pub fn pending(&self) -> Option<&HistoryId> {
        match &self.phase {
            ExportPhase::Idle => None,
            ExportPhase::AwaitingRender { target } => Some(&target.id),
            ExportPhase::Committing { target } => Some(target),
        }
    }

    /// Drop a waiting request whose result is no longer the one on display.
    pub fn abandon_if_stale(
        &mut self,
        result: Option<&Arc<RiskAssessmentResult>>,
    ) -> Option<HistoryEntry> {
        let stale = match (&self.phase, result) {
            (ExportPhase::AwaitingRender { target }, Some(current)) => {
                !Arc::ptr_eq(&target.output_data, current)
            }
            (ExportPhase::AwaitingRender { .. }, None) => true,
            _ => false,
        };
        if !stale {
            return None;
        }

        match std::mem::replace(&mut self.phase, ExportPhase::Idle) {
            ExportPhase::AwaitingRender { target } => {
                warn!(entry = %target.id, "pending export abandoned; display moved to another result");
                Some(target)
            }
            _ => None,
        }
    }

    /// Commit guard. Moves to `Committing` and hands out the job only when the view,
    /// the history flag, the current result and the rendered capture all point at the
    /// requested entry.
    pub fn observe(&mut self, observation: RenderObservation<'_>) -> Readiness {
        let target = match &self.phase {
            ExportPhase::Idle => return Readiness::Idle,
            ExportPhase::Committing { .. } => return Readiness::Waiting,
            ExportPhase::AwaitingRender { target } => target,
        };

        let Some(result) = observation.result else {
            return self.abandon_if_stale(None).map_or(Readiness::Idle, Readiness::Abandoned);
        };
        if !Arc::ptr_eq(result, &target.output_data) {
            return self
                .abandon_if_stale(Some(result))
                .map_or(Readiness::Idle, Readiness::Abandoned);
        }

        if observation.view != View::AssessmentForm || !observation.viewing_history_item {
            return Readiness::Waiting;
        }

        let Some(capture) = observation.capture.filter(|capture| capture.shows(result)) else {
            debug!(entry = %target.id, "export waiting for matching render");
            return Readiness::Waiting;
        };

        let job = ExportJob {
            target: target.clone(),
            capture: capture.clone(),
            stem: history_export_stem(target),
        };
        self.phase = ExportPhase::Committing {
            target: job.target.id.clone(),
        };
        Readiness::Ready(job)
    }

    /// Drop a waiting request for `id`. A commit already under way is left alone.
    pub fn cancel(&mut self, id: &HistoryId) -> bool {
        if matches!(&self.phase, ExportPhase::AwaitingRender { target } if &target.id == id) {
            self.phase = ExportPhase::Idle;
            return true;
        }
        false
    }

    /// Clear the slot after a commit finishes, unless a newer request has replaced it.
    pub fn finish(&mut self, committed: &HistoryId) {
        if matches!(&self.phase, ExportPhase::Committing { target } if target == committed) {
            self.phase = ExportPhase::Idle;
        }
    }
}

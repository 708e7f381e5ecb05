use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tracing::{debug, info, warn};

use super::super::contract::{
    parse_assessment, AssessmentGenerator, GeneratorError, RiskAssessmentResult,
};
use super::super::domain::{
    ApplicationDraft, CompleteApplicationRecord, DraftField, ProfileRecord,
};
use super::super::export::{
    current_export_stem, CaptureHandle, ExportCapability, ExportCoordinator, ExportError,
    ExportReceipt, Readiness, RenderObservation,
};
use super::super::history::{HistoryEntry, HistoryId, HistoryStore};
use super::super::profile::ProfileStore;
use super::super::storage::KeyValueStore;
use super::super::validation::{
    check_navigation_profile, check_profile_for_save, validate_submission, ValidationError,
};
use super::state::{Notice, SessionSnapshot, View};

const SETTINGS_REDIRECT_NOTICE: &str =
    "Please complete Personal Information (including Applicant Name) in Settings first.";
const SUBMIT_SUCCESS_NOTICE: &str = "Credit assessment generated and saved to history!";
const PROFILE_SAVED_NOTICE: &str = "Personal information saved successfully!";
const ENTRY_REMOVED_NOTICE: &str = "Assessment removed from history.";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no assessment with id {0} in history")]
    UnknownEntry(HistoryId),
    #[error(transparent)]
    Export(#[from] ExportError),
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("An assessment is already being generated. Please wait for it to finish.")]
    InFlight,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Generator(#[from] GeneratorError),
}

struct SessionState<S> {
    view: View,
    profile: ProfileRecord,
    draft: ApplicationDraft,
    result: Option<Arc<RiskAssessmentResult>>,
    is_loading: bool,
    error: Option<String>,
    viewing_history_item: bool,
    notice: Option<Notice>,
    capture: Option<CaptureHandle>,
    exports: ExportCoordinator,
    history: HistoryStore<S>,
    /// Bumped whenever the profile or draft is replaced or edited.
    revision: u64,
    submissions: u64,
    in_flight: Option<u64>,
}

impl<S> SessionState<S> {
    fn set_view(&mut self, view: View) {
        if view != View::AssessmentForm {
            self.capture = None;
        }
        self.view = view;
    }

    fn redirect_to_settings(&mut self) {
        self.set_view(View::Settings);
    }

    fn prime_from(&mut self, entry: &HistoryEntry) {
        self.profile = entry.input_data.personal_info.clone();
        self.draft = entry.input_data.draft();
        self.revision += 1;
    }

    fn abandon_stale_export(&mut self) {
        self.exports.abandon_if_stale(self.result.as_ref());
    }

    fn observe_export(&mut self) -> Readiness {
        self.exports.observe(RenderObservation {
            view: self.view,
            viewing_history_item: self.viewing_history_item,
            result: self.result.as_ref(),
            capture: self.capture.as_ref(),
        })
    }

    fn finish_loading(&mut self, seq: u64) {
        if self.in_flight == Some(seq) {
            self.in_flight = None;
            self.is_loading = false;
        }
    }
}

fn lock_state<S>(state: &Mutex<SessionState<S>>) -> MutexGuard<'_, SessionState<S>> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clears the loading flag if the submission future is dropped before it completes.
struct InFlight<'a, S> {
    state: &'a Mutex<SessionState<S>>,
    seq: u64,
}

impl<S> Drop for InFlight<'_, S> {
    fn drop(&mut self) {
        lock_state(self.state).finish_loading(self.seq);
    }
}

/// Empties the export slot even when the export future is dropped mid-flight.
struct Committing<'a, S> {
    state: &'a Mutex<SessionState<S>>,
    target: HistoryId,
}

impl<S> Drop for Committing<'_, S> {
    fn drop(&mut self) {
        lock_state(self.state).exports.finish(&self.target);
    }
}

struct SubmissionTicket {
    seq: u64,
    revision: u64,
    record: CompleteApplicationRecord,
}

/// Orchestration engine owning the view, draft, current result and export rendezvous.
///
/// Every mutation goes through one of the methods below; callers read state back with
/// [`AssessmentSession::snapshot`]. The state lock is never held across an await.
pub struct AssessmentSession<S, G, X> {
    state: Mutex<SessionState<S>>,
    profiles: ProfileStore<S>,
    generator: Arc<G>,
    exporter: Arc<X>,
}

impl<S, G, X> AssessmentSession<S, G, X>
where
    S: KeyValueStore + 'static,
    G: AssessmentGenerator + 'static,
    X: ExportCapability + 'static,
{
    pub fn new(store: Arc<S>, generator: Arc<G>, exporter: Arc<X>) -> Self {
        let profiles = ProfileStore::new(Arc::clone(&store));
        let profile = profiles.load();
        let history = HistoryStore::load(store);

        Self {
            state: Mutex::new(SessionState {
                view: View::Home,
                profile,
                draft: ApplicationDraft::default(),
                result: None,
                is_loading: false,
                error: None,
                viewing_history_item: false,
                notice: None,
                capture: None,
                exports: ExportCoordinator::default(),
                history,
                revision: 0,
                submissions: 0,
                in_flight: None,
            }),
            profiles,
            generator,
            exporter,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState<S>> {
        lock_state(&self.state)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.lock();
        SessionSnapshot {
            view: state.view,
            profile: state.profile.clone(),
            draft: state.draft.clone(),
            result: state.result.clone(),
            is_loading: state.is_loading,
            error: state.error.clone(),
            is_viewing_history_item: state.viewing_history_item,
            pending_export: state.exports.pending().cloned(),
            notice: state.notice.clone(),
            history_len: state.history.len(),
        }
    }

    /// History in presentation order, newest first.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.lock().history.list()
    }

    pub fn history_entry(&self, id: &HistoryId) -> Option<HistoryEntry> {
        self.lock().history.get(id).cloned()
    }

    pub fn dismiss_notice(&self) {
        self.lock().notice = None;
    }

    /// Move to `view`. Entering the form still requires a complete profile; the view
    /// actually landed on is returned.
    pub fn navigate(&self, view: View) -> View {
        let mut state = self.lock();
        state.error = None;

        if view == View::AssessmentForm {
            if let Err(err) = check_navigation_profile(&state.profile) {
                debug!(error = %err, "assessment form gated; redirecting to settings");
                state.redirect_to_settings();
                state.notice = Some(Notice::info(SETTINGS_REDIRECT_NOTICE));
                return state.view;
            }
        }

        state.set_view(view);
        debug!(view = view.label(), "navigated");
        state.view
    }

    /// Open a blank form for a brand-new assessment.
    pub fn start_new_assessment(&self) -> Result<(), ValidationError> {
        let mut state = self.lock();
        state.error = None;

        if let Err(err) = check_navigation_profile(&state.profile) {
            state.redirect_to_settings();
            state.notice = Some(Notice::info(SETTINGS_REDIRECT_NOTICE));
            return Err(err);
        }

        state.result = None;
        state.draft = ApplicationDraft::default();
        state.viewing_history_item = false;
        state.revision += 1;
        state.abandon_stale_export();
        state.set_view(View::AssessmentForm);
        debug!("started new assessment");
        Ok(())
    }

    /// Replace the operator profile as a unit. A failed write keeps the in-memory copy.
    pub fn save_profile(&self, profile: ProfileRecord) -> Result<(), ValidationError> {
        let mut state = self.lock();
        if let Err(err) = check_profile_for_save(&profile) {
            state.notice = Some(Notice::error(err.to_string()));
            return Err(err);
        }

        state.notice = match self.profiles.save(&profile) {
            Ok(()) => Some(Notice::success(PROFILE_SAVED_NOTICE)),
            Err(err) => {
                warn!(error = %err, "failed to persist personal information");
                Some(Notice::error(format!(
                    "Personal information could not be saved: {err}"
                )))
            }
        };
        state.profile = profile;
        state.revision += 1;
        Ok(())
    }

    /// Any draft edit invalidates the displayed result.
    pub fn edit_draft(&self, field: DraftField, value: impl Into<String>) {
        let mut state = self.lock();
        state.draft.set(field, value.into());
        state.result = None;
        state.viewing_history_item = false;
        state.revision += 1;
        state.abandon_stale_export();
    }

    /// Validate, dispatch to the generator once, and archive the result.
    ///
    /// Refuses to start while another submission is loading. The loading flag is
    /// cleared on every exit path, including when the returned future is dropped.
    pub async fn submit(&self) -> Result<HistoryEntry, SubmitError> {
        let ticket = self.begin_submission()?;
        let in_flight = InFlight {
            state: &self.state,
            seq: ticket.seq,
        };

        let outcome = match self.generator.generate(&ticket.record).await {
            Ok(raw) => parse_assessment(&raw).map_err(GeneratorError::from),
            Err(err) => Err(err),
        };

        let completed = match outcome {
            Ok(result) => Ok(self.complete_submission(&ticket, result)),
            Err(err) => {
                self.fail_submission(ticket.seq, &err);
                Err(err.into())
            }
        };
        drop(in_flight);
        completed
    }

    fn begin_submission(&self) -> Result<SubmissionTicket, SubmitError> {
        let mut state = self.lock();
        if state.is_loading {
            return Err(SubmitError::InFlight);
        }

        state.error = None;
        state.notice = None;
        state.result = None;
        state.viewing_history_item = false;
        state.abandon_stale_export();

        if let Err(err) = validate_submission(&state.profile, &state.draft) {
            state.error = Some(err.to_string());
            state.notice = Some(Notice::error(err.to_string()));
            if err.redirects_to_settings() {
                state.redirect_to_settings();
            }
            return Err(err.into());
        }

        state.submissions += 1;
        let seq = state.submissions;
        state.is_loading = true;
        state.in_flight = Some(seq);

        Ok(SubmissionTicket {
            seq,
            revision: state.revision,
            record: CompleteApplicationRecord::assemble(&state.profile, &state.draft),
        })
    }

    fn complete_submission(
        &self,
        ticket: &SubmissionTicket,
        result: RiskAssessmentResult,
    ) -> HistoryEntry {
        let result = Arc::new(result);
        let entry = HistoryEntry::record(
            &ticket.record,
            Arc::clone(&result),
            Utc::now().timestamp_millis(),
        );

        let mut state = self.lock();
        state.finish_loading(ticket.seq);

        let still_current =
            state.view == View::AssessmentForm && state.revision == ticket.revision;
        if still_current {
            state.result = Some(result);
            state.viewing_history_item = false;
            state.notice = Some(Notice::success(SUBMIT_SUCCESS_NOTICE));
        } else {
            warn!(entry = %entry.id, "assessment arrived after the form moved on; archived only");
            state.notice = Some(Notice::info(format!(
                "The assessment for {} finished after you moved on and was saved to history.",
                entry.applicant_name
            )));
        }

        if let Err(err) = state.history.add(entry.clone()) {
            warn!(error = %err, entry = %entry.id, "failed to persist assessment history");
            state.notice = Some(Notice::error(format!(
                "Assessment generated but history could not be saved: {err}"
            )));
        }

        info!(
            entry = %entry.id,
            applicant = %entry.applicant_name,
            score = entry.output_data.risk_score.score,
            "assessment generated"
        );
        entry
    }

    fn fail_submission(&self, seq: u64, err: &GeneratorError) {
        warn!(error = %err, "assessment generation failed");
        let mut state = self.lock();
        state.finish_loading(seq);
        state.error = Some(err.to_string());
        state.notice = Some(Notice::error(err.to_string()));
    }

    /// Show an archived assessment exactly as it was produced.
    pub fn view_details(&self, id: &HistoryId) -> Result<HistoryEntry, SessionError> {
        let mut state = self.lock();
        let entry = state
            .history
            .get(id)
            .cloned()
            .ok_or_else(|| SessionError::UnknownEntry(id.clone()))?;

        state.prime_from(&entry);
        state.result = Some(Arc::clone(&entry.output_data));
        state.viewing_history_item = true;
        state.error = None;
        state.abandon_stale_export();
        state.set_view(View::AssessmentForm);
        state.notice = Some(Notice::info(format!(
            "Viewing assessment for {}.",
            entry.applicant_name
        )));
        Ok(entry)
    }

    /// Pre-fill the form from an archived assessment for a fresh submission.
    pub fn use_as_template(&self, id: &HistoryId) -> Result<HistoryEntry, SessionError> {
        let mut state = self.lock();
        let entry = state
            .history
            .get(id)
            .cloned()
            .ok_or_else(|| SessionError::UnknownEntry(id.clone()))?;

        state.prime_from(&entry);
        state.result = None;
        state.viewing_history_item = false;
        state.error = None;
        state.abandon_stale_export();

        if check_navigation_profile(&state.profile).is_err() {
            state.redirect_to_settings();
            state.notice = Some(Notice::info(SETTINGS_REDIRECT_NOTICE));
            return Ok(entry);
        }

        state.set_view(View::AssessmentForm);
        state.notice = Some(Notice::info(format!(
            "Form pre-filled using data for {}. You can now edit and submit for a new assessment.",
            entry.applicant_name
        )));
        Ok(entry)
    }

    /// Returns whether an entry was removed. A failed write keeps the in-memory removal.
    pub fn delete_entry(&self, id: &HistoryId) -> bool {
        let mut state = self.lock();
        if state.exports.cancel(id) {
            info!(entry = %id, "pending export dropped with its entry");
        }
        match state.history.remove(id) {
            Ok(removed) => {
                if removed {
                    info!(entry = %id, "assessment removed from history");
                    state.notice = Some(Notice::success(ENTRY_REMOVED_NOTICE));
                }
                removed
            }
            Err(err) => {
                warn!(error = %err, entry = %id, "failed to persist history after delete");
                state.notice = Some(Notice::error(format!(
                    "Assessment removed, but history could not be saved: {err}"
                )));
                true
            }
        }
    }

    /// Phase one of a history export: park the entry and display it. The export
    /// itself commits once a render of that exact entry has been acknowledged.
    pub async fn request_history_export(
        &self,
        id: &HistoryId,
    ) -> Result<Option<ExportReceipt>, SessionError> {
        {
            let mut state = self.lock();
            let entry = state
                .history
                .get(id)
                .cloned()
                .ok_or_else(|| SessionError::UnknownEntry(id.clone()))?;

            if let Some(displaced) = state.exports.request(entry.clone()) {
                info!(replaced = %displaced.id, entry = %entry.id, "pending export replaced");
            }
            state.prime_from(&entry);
            state.result = Some(Arc::clone(&entry.output_data));
            state.viewing_history_item = true;
            state.error = None;
            state.set_view(View::AssessmentForm);
            state.notice = Some(Notice::info(format!(
                "Viewing assessment for {}.",
                entry.applicant_name
            )));
        }

        self.settle().await.map_err(SessionError::from)
    }

    /// Acknowledge that the display surface now shows `capture`.
    pub async fn display_rendered(
        &self,
        capture: CaptureHandle,
    ) -> Result<Option<ExportReceipt>, ExportError> {
        {
            let mut state = self.lock();
            if state.view != View::AssessmentForm {
                debug!(view = state.view.label(), "render ignored outside the assessment form");
                return Ok(None);
            }
            state.capture = Some(capture);
        }
        self.settle().await
    }

    /// Current result and profile, for rendering the display surface. Only the
    /// assessment form shows a result.
    pub fn display_source(&self) -> Option<(ProfileRecord, Arc<RiskAssessmentResult>)> {
        let state = self.lock();
        if state.view != View::AssessmentForm {
            return None;
        }
        let result = state.result.clone()?;
        Some((state.profile.clone(), result))
    }

    /// Evaluate the export commit guard and run the export if it holds.
    async fn settle(&self) -> Result<Option<ExportReceipt>, ExportError> {
        let job = match self.lock().observe_export() {
            Readiness::Ready(job) => job,
            Readiness::Idle | Readiness::Waiting | Readiness::Abandoned(_) => return Ok(None),
        };

        let committing = Committing {
            state: &self.state,
            target: job.target.id.clone(),
        };
        let outcome = self.exporter.export(&job.capture, &job.stem).await;
        drop(committing);

        self.report_export(&outcome);
        outcome.map(Some)
    }

    /// Export whatever is on display right now.
    pub async fn export_current(&self) -> Result<ExportReceipt, ExportError> {
        let prepared = {
            let state = self.lock();
            match (&state.result, &state.capture) {
                (None, _) => Err(ExportError::NoResult),
                (Some(result), Some(capture)) if capture.shows(result) => Ok((
                    capture.clone(),
                    current_export_stem(&state.profile.applicant_name),
                )),
                (Some(_), _) => Err(ExportError::CaptureNotReady),
            }
        };

        let outcome = match prepared {
            Ok((capture, stem)) => self.exporter.export(&capture, &stem).await,
            Err(err) => Err(err),
        };
        self.report_export(&outcome);
        outcome
    }

    fn report_export(&self, outcome: &Result<ExportReceipt, ExportError>) {
        let notice = match outcome {
            Ok(receipt) => {
                info!(file = %receipt.file_name, "assessment exported");
                Notice::success(format!("Export saved as {}.", receipt.file_name))
            }
            Err(err) => {
                warn!(error = %err, "assessment export failed");
                Notice::error(err.to_string())
            }
        };
        self.lock().notice = Some(notice);
    }
}

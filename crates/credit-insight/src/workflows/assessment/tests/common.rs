use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;
use tokio::sync::Notify;

use crate::workflows::assessment::contract::{AssessmentGenerator, GeneratorError};
use crate::workflows::assessment::domain::{
    CompleteApplicationRecord, DraftField, FinancialField, LoanField, ProfileRecord,
};
use crate::workflows::assessment::export::{
    CaptureHandle, ExportCapability, ExportError, ExportReceipt,
};
use crate::workflows::assessment::history::HistoryEntry;
use crate::workflows::assessment::storage::{
    KeyValueStore, MemoryStore, StorageError, HISTORY_KEY,
};
use crate::workflows::assessment::{parse_assessment, AssessmentSession};

pub(super) type TestSession = AssessmentSession<MemoryStore, ScriptedGenerator, RecordingExporter>;

pub(super) fn sample_profile() -> ProfileRecord {
    ProfileRecord {
        applicant_name: "J Doe".to_string(),
        age: "40".to_string(),
        location: "NYC".to_string(),
        employment_status: "Employed".to_string(),
        ..ProfileRecord::default()
    }
}

pub(super) fn response_json(summary: &str, score: u32) -> String {
    format!(
        r#"{{"executiveSummary": "{summary}", "riskScore": {{"score": {score}, "tier": "LOW", "probabilityOfDefault": "5%"}}}}"#
    )
}

pub(super) fn income() -> DraftField {
    DraftField::Financial(FinancialField::Income)
}

pub(super) fn loan_amount() -> DraftField {
    DraftField::Loan(LoanField::RequestedLoanAmount)
}

/// Archived entry built the same way a submission builds one.
pub(super) fn archived_entry(name: &str, timestamp: i64, score: u32) -> HistoryEntry {
    let profile = ProfileRecord {
        applicant_name: name.to_string(),
        ..sample_profile()
    };
    let mut draft = crate::workflows::assessment::domain::ApplicationDraft::default();
    draft.set(income(), "52000".to_string());
    draft.set(loan_amount(), "8000".to_string());
    let record = CompleteApplicationRecord::assemble(&profile, &draft);
    let result = parse_assessment(&response_json(&format!("summary for {name}"), score))
        .expect("fixture response parses");
    HistoryEntry::record(&record, Arc::new(result), timestamp)
}

pub(super) fn store_with_history(entries: &[HistoryEntry]) -> Arc<MemoryStore> {
    let payload = serde_json::to_string(entries).expect("entries serialize");
    Arc::new(MemoryStore::with_value(HISTORY_KEY, payload))
}

pub(super) fn session_over(
    store: Arc<MemoryStore>,
    generator: ScriptedGenerator,
) -> (Arc<TestSession>, Arc<ScriptedGenerator>, Arc<RecordingExporter>) {
    let generator = Arc::new(generator);
    let exporter = Arc::new(RecordingExporter::default());
    let session = Arc::new(AssessmentSession::new(
        store,
        generator.clone(),
        exporter.clone(),
    ));
    (session, generator, exporter)
}

/// Session with a saved profile, an open form and both required draft fields filled.
pub(super) fn ready_session(
    generator: ScriptedGenerator,
) -> (Arc<TestSession>, Arc<ScriptedGenerator>, Arc<RecordingExporter>) {
    let (session, generator, exporter) = session_over(Arc::new(MemoryStore::default()), generator);
    session
        .save_profile(sample_profile())
        .expect("sample profile saves");
    session
        .start_new_assessment()
        .expect("complete profile opens the form");
    session.edit_draft(income(), "90000");
    session.edit_draft(loan_amount(), "20000");
    (session, generator, exporter)
}

/// Generator that replays scripted responses and records every request it sees.
pub(super) struct ScriptedGenerator {
    responses: Mutex<VecDeque<Result<String, GeneratorError>>>,
    requests: Mutex<Vec<CompleteApplicationRecord>>,
    calls: AtomicUsize,
    gate: Option<Arc<Notify>>,
}

impl ScriptedGenerator {
    pub(super) fn replying(raw: impl Into<String>) -> Self {
        Self::scripted(vec![Ok(raw.into())])
    }

    pub(super) fn failing(error: GeneratorError) -> Self {
        Self::scripted(vec![Err(error)])
    }

    pub(super) fn scripted(responses: Vec<Result<String, GeneratorError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    /// Hold every call until the gate is notified.
    pub(super) fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(super) fn requests(&self) -> Vec<CompleteApplicationRecord> {
        self.requests.lock().expect("requests mutex").clone()
    }
}

#[async_trait]
impl AssessmentGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        application: &CompleteApplicationRecord,
    ) -> Result<String, GeneratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .expect("requests mutex")
            .push(application.clone());

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        self.responses
            .lock()
            .expect("responses mutex")
            .pop_front()
            .unwrap_or_else(|| Ok(response_json("ok", 700)))
    }
}

#[derive(Debug, Clone)]
pub(super) struct RecordedExport {
    pub stem: String,
    pub document: String,
}

/// Export capability that remembers what it was asked to save.
#[derive(Default)]
pub(super) struct RecordingExporter {
    exports: Mutex<Vec<RecordedExport>>,
    fail_with: Option<String>,
}

impl RecordingExporter {
    pub(super) fn failing(reason: &str) -> Self {
        Self {
            exports: Mutex::new(Vec::new()),
            fail_with: Some(reason.to_string()),
        }
    }

    pub(super) fn exports(&self) -> Vec<RecordedExport> {
        self.exports.lock().expect("exports mutex").clone()
    }
}

#[async_trait]
impl ExportCapability for RecordingExporter {
    async fn export(
        &self,
        capture: &CaptureHandle,
        stem: &str,
    ) -> Result<ExportReceipt, ExportError> {
        if let Some(reason) = &self.fail_with {
            return Err(ExportError::Capability(reason.clone()));
        }
        self.exports.lock().expect("exports mutex").push(RecordedExport {
            stem: stem.to_string(),
            document: capture.document().to_string(),
        });
        Ok(ExportReceipt {
            file_name: format!("{stem}_2026-10-16.html"),
        })
    }
}

/// Reads succeed empty; every write is refused.
#[derive(Default)]
pub(super) struct ReadOnlyStore;

impl KeyValueStore for ReadOnlyStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("volume is read-only".to_string()))
    }
}

pub(super) async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("json body")
}

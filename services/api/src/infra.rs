use async_trait::async_trait;
use chrono::Local;
use credit_insight::config::StorageConfig;
use credit_insight::error::AppError;
use credit_insight::workflows::assessment::contract::request_document;
use credit_insight::workflows::assessment::{
    AssessmentGenerator, AssessmentSession, CaptureHandle, CompleteApplicationRecord,
    ExportCapability, ExportError, ExportReceipt, FileStore, GeneratorError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{debug, info};

pub(crate) type ServiceSession = AssessmentSession<FileStore, FixtureGenerator, FileExporter>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Canned response used when no fixture file is configured.
pub(crate) const SAMPLE_RESPONSE: &str = r#"```json
{
  "executiveSummary": "Stable salaried applicant with moderate existing debt and a consistent repayment record. The requested amount is well covered by verified income.",
  "riskScore": { "score": 712, "tier": "LOW", "probabilityOfDefault": "4.1%" },
  "keyRiskFactors": {
    "positive": ["Six years of continuous employment", "On-time utility and rent payments"],
    "negative": ["Revolving balances above 30% of limits"]
  },
  "detailedAnalysis": {
    "personalInfoAnalysis": "Established household with a single dependent.",
    "financialDataAnalysis": "Debt-to-income remains under 28% after the requested loan.",
    "alternativeDataAnalysis": "Bank transactions show regular savings transfers.",
    "behavioralPatterns": "No overdraft events in the trailing twelve months.",
    "psychometricElements": "Not assessed.",
    "macroeconomicContext": "Regional unemployment is stable.",
    "loanDetailsAnalysis": "Debt consolidation lowers the blended interest burden."
  },
  "fraudDetection": {
    "assessment": "No indicators of synthetic identity or income inflation.",
    "identifiedAnomalies": [],
    "inconsistencyFlags": []
  },
  "biasMitigationAndFairLending": {
    "complianceStatement": "Assessment excludes protected characteristics.",
    "biasCorrectionNotes": "Location used only for macroeconomic context.",
    "financialInclusionConsiderations": "Alternative data strengthened a thin credit file."
  },
  "recommendations": {
    "suggestedAction": "APPROVE",
    "loanTermsSuggestion": "36 months, fixed rate",
    "interestRateSuggestion": "Prime + 2.5%",
    "conditionsForApproval": ["Proof of current employment"]
  },
  "monitoringAlerts": ["Revolving utilization above 50%", "Missed payment in first six months"],
  "complianceNotes": "Adverse action notice not required for an approval."
}
```"#;

/// Generator that answers every request with a fixed response.
pub(crate) struct FixtureGenerator {
    response: String,
}

impl FixtureGenerator {
    pub(crate) fn sample() -> Self {
        Self {
            response: SAMPLE_RESPONSE.to_string(),
        }
    }

    pub(crate) fn from_config(fixture: Option<&Path>) -> Result<Self, AppError> {
        match fixture {
            Some(path) => {
                let response = std::fs::read_to_string(path)?;
                info!(path = %path.display(), "using generator fixture");
                Ok(Self { response })
            }
            None => Ok(Self::sample()),
        }
    }
}

#[async_trait]
impl AssessmentGenerator for FixtureGenerator {
    async fn generate(
        &self,
        application: &CompleteApplicationRecord,
    ) -> Result<String, GeneratorError> {
        let document = request_document(application)
            .map_err(|err| GeneratorError::Transport(err.to_string()))?;
        debug!(bytes = document.len(), "assessment request prepared");
        Ok(self.response.clone())
    }
}

/// Saves captured displays as dated HTML files.
pub(crate) struct FileExporter {
    root: PathBuf,
}

impl FileExporter {
    pub(crate) fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ExportCapability for FileExporter {
    async fn export(
        &self,
        capture: &CaptureHandle,
        stem: &str,
    ) -> Result<ExportReceipt, ExportError> {
        let file_name = format!("{stem}_{}.html", Local::now().date_naive().format("%Y-%m-%d"));
        if !is_single_component(&file_name) {
            return Err(ExportError::Capability(format!(
                "export name {file_name:?} must be a plain file name"
            )));
        }
        let path = self.root.join(&file_name);

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|err| ExportError::Capability(err.to_string()))?;
        tokio::fs::write(&path, capture.document())
            .await
            .map_err(|err| ExportError::Capability(err.to_string()))?;

        info!(path = %path.display(), surface = capture.surface(), "export written");
        Ok(ExportReceipt { file_name })
    }
}

fn is_single_component(file_name: &str) -> bool {
    let mut components = Path::new(file_name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

pub(crate) fn build_session(storage: &StorageConfig) -> Result<Arc<ServiceSession>, AppError> {
    let store = Arc::new(FileStore::new(storage.data_dir.clone()));
    let generator = Arc::new(FixtureGenerator::from_config(
        storage.generator_fixture.as_deref(),
    )?);
    let exporter = Arc::new(FileExporter::new(storage.export_dir.clone()));
    Ok(Arc::new(AssessmentSession::new(store, generator, exporter)))
}

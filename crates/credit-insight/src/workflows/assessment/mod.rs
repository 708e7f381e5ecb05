//! Credit assessment orchestration and history coordination.
//!
//! The [`AssessmentSession`] owns the operator-facing state. It gates entry to the
//! assessment form on a complete profile, dispatches at most one generator call at a
//! time, archives every successful result in the [`HistoryStore`], and coordinates
//! history exports so a document is only captured once the requested entry is the one
//! on display.

pub mod contract;
pub mod domain;
pub mod export;
pub mod history;
pub mod profile;
pub mod report;
pub mod router;
pub mod session;
pub mod storage;
pub mod validation;

#[cfg(test)]
mod tests;

pub use contract::{
    parse_assessment, strip_code_fence, AssessmentGenerator, ContractError, GeneratorError,
    RecommendedAction, RiskAssessmentResult, RiskScore, RiskTier,
};
pub use domain::{
    AlternativeData, AlternativeField, ApplicationDraft, CompleteApplicationRecord, DraftField,
    FinancialData, FinancialField, LoanDetailsData, LoanField, ProfileRecord,
    EMPLOYMENT_STATUS_OPTIONS, LOAN_PURPOSE_OPTIONS,
};
pub use export::{
    current_export_stem, history_export_stem, CaptureHandle, ExportCapability, ExportError,
    ExportReceipt,
};
pub use history::{HistoryEntry, HistoryError, HistoryId, HistoryStore};
pub use profile::{ProfileError, ProfileStore};
pub use report::{render_assessment, write_history_csv, LedgerError};
pub use router::assessment_router;
pub use session::{
    AssessmentSession, Notice, NoticeKind, SessionError, SessionSnapshot, SubmitError, View,
};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use validation::ValidationError;

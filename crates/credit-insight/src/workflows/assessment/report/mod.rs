//! Presentation artefacts derived from assessment results: the rendered display that
//! exports capture, and the CSV ledger of archived assessments.

mod ledger;
mod render;

pub use ledger::{write_history_csv, LedgerError};
pub use render::{render_assessment, DISPLAY_SURFACE};

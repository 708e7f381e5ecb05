use std::io::Write;

use serde::Serialize;

use super::super::history::HistoryEntry;

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("failed to write history ledger: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush history ledger: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Serialize)]
struct LedgerRow<'a> {
    id: &'a str,
    applicant: &'a str,
    assessed_at: String,
    score: f64,
    tier: &'static str,
    suggested_action: &'static str,
}

impl<'a> From<&'a HistoryEntry> for LedgerRow<'a> {
    fn from(entry: &'a HistoryEntry) -> Self {
        Self {
            id: &entry.id.0,
            applicant: &entry.applicant_name,
            assessed_at: entry
                .assessed_at()
                .map(|at| at.to_rfc3339())
                .unwrap_or_default(),
            score: entry.output_data.risk_score.score,
            tier: entry.output_data.risk_score.tier.label(),
            suggested_action: entry.output_data.recommendations.suggested_action.label(),
        }
    }
}

/// One CSV row per archived assessment, in the order given.
pub fn write_history_csv<W: Write>(entries: &[HistoryEntry], writer: W) -> Result<(), LedgerError> {
    let mut csv = csv::Writer::from_writer(writer);
    for entry in entries {
        csv.serialize(LedgerRow::from(entry))?;
    }
    csv.flush()?;
    Ok(())
}

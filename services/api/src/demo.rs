use crate::infra::build_session;
use chrono::{Local, SecondsFormat};
use clap::Args;
use credit_insight::config::{AppConfig, StorageConfig};
use credit_insight::error::AppError;
use credit_insight::workflows::assessment::{
    render_assessment, write_history_csv, AlternativeField, DraftField, FileStore,
    FinancialField, HistoryEntry, HistoryStore, LoanField, ProfileRecord,
};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Applicant name used for the demo profile
    #[arg(long, default_value = "Jordan Avery")]
    pub(crate) applicant: String,
    /// Override the directory holding profile and history data
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
    /// Override the directory exports are written to
    #[arg(long)]
    pub(crate) export_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct HistoryArgs {
    /// Override the directory holding profile and history data
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        applicant,
        data_dir,
        export_dir,
    } = args;

    let mut storage = AppConfig::load()?.storage;
    if let Some(dir) = data_dir {
        storage.data_dir = dir;
    }
    if let Some(dir) = export_dir {
        storage.export_dir = dir;
    }

    println!("Credit assessment demo");
    println!(
        "Data in {} | exports to {}",
        storage.data_dir.display(),
        storage.export_dir.display()
    );
    let session = build_session(&storage)?;

    if let Err(err) = session.save_profile(demo_profile(&applicant)) {
        println!("  Profile rejected: {err}");
        return Ok(());
    }
    if let Err(err) = session.start_new_assessment() {
        println!("  Assessment form unavailable: {err}");
        return Ok(());
    }
    for (field, value) in demo_draft() {
        session.edit_draft(field, value);
    }

    let entry = match session.submit().await {
        Ok(entry) => entry,
        Err(err) => {
            println!("  Submission failed: {err}");
            return Ok(());
        }
    };
    print_result(&entry);

    let history = session.history();
    println!("\nHistory ({} archived)", history.len());
    for archived in history.iter().take(5) {
        print_history_line(archived);
    }

    println!("\nExporting {} from history", entry.id.short());
    match session.request_history_export(&entry.id).await {
        Ok(Some(receipt)) => println!("- Saved {}", receipt.file_name),
        Ok(None) => {
            let Some((profile, result)) = session.display_source() else {
                println!("- Nothing on display to capture");
                return Ok(());
            };
            let capture = render_assessment(&profile, &result, Local::now().date_naive());
            match session.display_rendered(capture).await {
                Ok(Some(receipt)) => println!("- Saved {}", receipt.file_name),
                Ok(None) => println!("- Export still waiting for its entry"),
                Err(err) => println!("- Export failed: {err}"),
            }
        }
        Err(err) => println!("- Export unavailable: {err}"),
    }

    if let Some(notice) = session.snapshot().notice {
        println!("\nLast notice ({:?}): {}", notice.kind, notice.message);
    }

    Ok(())
}

pub(crate) fn run_history_list(args: HistoryArgs) -> Result<(), AppError> {
    let history = load_history(args)?;

    if history.is_empty() {
        println!("No archived assessments");
        return Ok(());
    }

    println!("Archived assessments ({})", history.len());
    for entry in history.entries() {
        print_history_line(entry);
    }
    Ok(())
}

pub(crate) fn run_history_export_csv(args: HistoryArgs, out: PathBuf) -> Result<(), AppError> {
    let history = load_history(args)?;
    let file = File::create(&out)?;
    write_history_csv(history.entries(), file)?;
    println!("Wrote {} entries to {}", history.len(), out.display());
    Ok(())
}

fn load_history(args: HistoryArgs) -> Result<HistoryStore<FileStore>, AppError> {
    let StorageConfig { data_dir, .. } = AppConfig::load()?.storage;
    let data_dir = args.data_dir.unwrap_or(data_dir);
    Ok(HistoryStore::load(Arc::new(FileStore::new(data_dir))))
}

fn demo_profile(applicant: &str) -> ProfileRecord {
    ProfileRecord {
        applicant_name: applicant.to_string(),
        age: "34".to_string(),
        location: "Austin, TX".to_string(),
        employment_status: "Employed".to_string(),
        education: "Bachelor's degree".to_string(),
        profession: "Nurse".to_string(),
        family_composition: "Married".to_string(),
        dependents: "1".to_string(),
    }
}

fn demo_draft() -> Vec<(DraftField, &'static str)> {
    vec![
        (DraftField::Financial(FinancialField::Income), "68000"),
        (DraftField::Financial(FinancialField::IncomeStability), "Stable"),
        (DraftField::Financial(FinancialField::EmploymentHistoryYears), "6"),
        (DraftField::Financial(FinancialField::ExistingDebts), "9500"),
        (DraftField::Financial(FinancialField::CreditScore), "701"),
        (
            DraftField::Alternative(AlternativeField::UtilityPaymentHistory),
            "On time for three years",
        ),
        (DraftField::Loan(LoanField::RequestedLoanAmount), "15000"),
        (DraftField::Loan(LoanField::LoanPurpose), "Debt Consolidation"),
        (DraftField::Loan(LoanField::ProposedRepaymentTermMonths), "36"),
    ]
}

fn print_result(entry: &HistoryEntry) {
    let result = &entry.output_data;
    println!(
        "- Assessed {} -> score {:.0} ({}) | action {}",
        entry.applicant_name,
        result.risk_score.score,
        result.risk_score.tier.label(),
        result.recommendations.suggested_action.label()
    );
    println!("  Summary: {}", result.executive_summary);
    if !result.key_risk_factors.negative.is_empty() {
        println!("  Risk factors:");
        for factor in &result.key_risk_factors.negative {
            println!("    - {factor}");
        }
    }
}

fn print_history_line(entry: &HistoryEntry) {
    let assessed_at = entry
        .assessed_at()
        .map(|at| at.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| "unknown".to_string());
    println!(
        "- {} | {} | {} | score {:.0} ({})",
        entry.id.short(),
        entry.applicant_name,
        assessed_at,
        entry.output_data.risk_score.score,
        entry.output_data.risk_score.tier.label()
    );
}

use crate::demo::{run_demo, run_history_export_csv, run_history_list, DemoArgs, HistoryArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use credit_insight::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Credit Insight",
    about = "Run credit assessments and manage the assessment history from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Inspect or export the archived assessment history
    History {
        #[command(subcommand)]
        command: HistoryCommand,
    },
    /// Walk through profile setup, submission and export against the fixture generator
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum HistoryCommand {
    /// Print archived assessments, newest first
    List(HistoryArgs),
    /// Write the history ledger as CSV
    ExportCsv {
        #[command(flatten)]
        history: HistoryArgs,
        /// Destination file for the ledger
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the directory holding profile and history data
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
    /// Override the directory exports are written to
    #[arg(long)]
    pub(crate) export_dir: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::History {
            command: HistoryCommand::List(args),
        } => run_history_list(args),
        Command::History {
            command: HistoryCommand::ExportCsv { history, out },
        } => run_history_export_csv(history, out),
        Command::Demo(args) => run_demo(args).await,
    }
}

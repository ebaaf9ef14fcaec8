use crate::server;
use clap::{Args, Parser, Subcommand};
use loan_eligibility::config::AppConfig;
use loan_eligibility::error::AppError;
use loan_eligibility::workflows::crime::import::import_reference_dataset_from_path;
use loan_eligibility::workflows::crime::InMemoryCrimeGradeStore;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Loan Eligibility API",
    about = "Run the loan eligibility HTTP service and its supporting tasks",
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
    /// Parse a reference crime dataset and report the import counts
    ImportCrimeData(ImportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
pub(crate) struct ImportArgs {
    /// Dataset file to read (defaults to the configured dataset path)
    #[arg(long)]
    pub(crate) file: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::ImportCrimeData(args) => run_import(args),
    }
}

fn run_import(args: ImportArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let path = args.file.unwrap_or_else(|| config.crime.dataset_path());
    let store = InMemoryCrimeGradeStore::default();
    let summary = import_reference_dataset_from_path(&path, &store)?;
    println!(
        "imported {} records from {} ({} skipped)",
        summary.imported,
        path.display(),
        summary.skipped
    );
    Ok(())
}

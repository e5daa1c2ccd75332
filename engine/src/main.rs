// Engine main entry point
use chrono::{Local, NaiveDate};
use clap::Parser;
use cnab_engine::config::EngineSettings;
use cnab_engine::layout::{LayoutVersion, OverflowPolicy};
use cnab_engine::services::generation_service::default_output_name;
use cnab_engine::services::{GenerationRequest, GenerationService};
use cnab_engine::Result;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};

/// Generate a CNAB 444 remittance file from a receivables spreadsheet export.
#[derive(Parser, Debug)]
#[command(name = "cnab-engine", version)]
struct Cli {
    /// Receivables CSV (';' or ',' separated, header row required)
    #[arg(short, long)]
    input: PathBuf,

    /// JSON settings file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output file (default REMESSA_<YYYYmmdd_HHMMSS>.REM)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// File sequence number written into the header
    #[arg(short, long)]
    sequence: Option<u32>,

    #[arg(long, value_enum)]
    layout: Option<LayoutVersion>,

    /// Header recording date, YYYY-MM-DD (default today)
    #[arg(long)]
    recording_date: Option<NaiveDate>,

    /// What to do with values wider than their field
    #[arg(long, value_enum)]
    overflow: Option<OverflowPolicy>,

    #[arg(long)]
    originator_code: Option<String>,

    #[arg(long)]
    originator_name: Option<String>,

    /// Blocking tasks used to encode detail rows
    #[arg(long)]
    workers: Option<usize>,
}

impl Cli {
    fn apply(&self, settings: &mut EngineSettings) {
        if let Some(sequence) = self.sequence {
            settings.file_sequence = sequence;
        }
        if let Some(layout) = self.layout {
            settings.layout_version = layout;
        }
        if let Some(overflow) = self.overflow {
            settings.overflow_policy = overflow;
        }
        if let Some(code) = &self.originator_code {
            settings.originator.code = code.clone();
        }
        if let Some(name) = &self.originator_name {
            settings.originator.name = name.clone();
        }
        if let Some(workers) = self.workers {
            settings.worker_threads = workers;
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Remittance generation failed");
            eprintln!("Error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut settings = match &cli.config {
        Some(path) => EngineSettings::load_from_file(path)?,
        None => EngineSettings::default(),
    };
    cli.apply(&mut settings);
    settings.validate()?;

    info!(input = %cli.input.display(), layout = %settings.layout_version, "Starting CNAB engine");

    let rows = GenerationService::load_rows(cli.input.clone()).await?;
    let service = GenerationService::from_settings(&settings)?;
    let request = GenerationRequest {
        rows,
        originator: settings.originator.clone(),
        file_sequence: settings.file_sequence,
        recording_date: cli.recording_date.unwrap_or_else(|| Local::now().date_naive()),
    };
    let report = service.generate(request).await?;

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(default_output_name(Local::now().naive_local())));
    let written = report.write_report_file(&output).await?;

    println!("Run:            {}", report.run_id);
    println!("Layout:         {}", report.layout_version);
    println!("Rows attempted: {}", report.rows_attempted);
    println!("Rows encoded:   {}", report.rows_encoded);
    println!("Records:        {}", report.record_count);
    println!("Output:         {}", written.display());
    if !report.failures.is_empty() {
        warn!(failures = report.failures.len(), "Some rows were not encoded");
        println!("Failed rows:");
        for failure in &report.failures {
            println!("  line {}: {}", failure.line, failure.reason);
        }
    }
    Ok(())
}

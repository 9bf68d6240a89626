use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use transcript_normalizer::{
    DEFAULT_REQUIRED_INSTITUTION, FormatKind, NormalizationReport, NormalizeOptions, Normalized,
    PageSelection, normalize_pdf, write_records_csv,
};

#[derive(Debug, Parser)]
#[command(
    name = "transcript2json",
    version,
    about = "Normalize semester result PDFs into a nested JSON tree"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract student results and write them to stdout.
    Normalize(NormalizeArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Emit {
    Json,
    Csv,
}

#[derive(Debug, Args)]
struct NormalizeArgs {
    /// Input PDF path.
    #[arg(short, long)]
    input: PathBuf,

    /// Result sheet layout: format1 or format2.
    #[arg(short, long, default_value = "format1")]
    format: String,

    /// Pages qualify only when their Institution field equals this exactly.
    #[arg(long, default_value = DEFAULT_REQUIRED_INSTITUTION)]
    institution: String,

    /// Page selection like 1-3,5.
    #[arg(long)]
    pages: Option<String>,

    /// Output shape.
    #[arg(long, value_enum, default_value_t = Emit::Json)]
    emit: Emit,

    /// Single-line JSON instead of four-space indentation.
    #[arg(long)]
    compact: bool,

    /// Enable verbose warning output.
    #[arg(short, long)]
    verbose: bool,
}

fn parse_options(args: &NormalizeArgs) -> Result<NormalizeOptions> {
    let format = FormatKind::from_str(&args.format)
        .map_err(|error| anyhow!("{error}"))
        .context("failed to parse --format")?;

    let pages = args
        .pages
        .as_deref()
        .map(PageSelection::from_str)
        .transpose()
        .map_err(|error| anyhow!("invalid page selection: {error}"))
        .context("failed to parse --pages")?;

    let institution = args.institution.trim();
    if institution.is_empty() {
        anyhow::bail!("--institution must be non-empty");
    }

    Ok(NormalizeOptions {
        format,
        required_institution: institution.to_string(),
        pages,
    })
}

fn log_report(report: &NormalizationReport, verbose: bool) {
    if report.warnings.is_empty() {
        return;
    }

    eprintln!("warning: {} issue(s) detected", report.warnings.len());
    if verbose {
        for warning in &report.warnings {
            eprintln!(
                "  - {:?} page={:?} row={:?} field={:?}: {}",
                warning.code, warning.page, warning.row, warning.field, warning.message
            );
        }
    }
}

fn write_output(normalized: &Normalized, args: &NormalizeArgs) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match args.emit {
        Emit::Json => {
            let json = if args.compact {
                normalized.tree.to_json()
            } else {
                normalized.tree.to_json_pretty()
            }
            .context("failed to serialize result tree")?;
            writeln!(out, "{json}").context("failed to write to stdout")?;
        }
        Emit::Csv => {
            write_records_csv(&mut out, &normalized.records)
                .context("failed to write CSV records")?;
        }
    }
    out.flush().context("failed to flush stdout")
}

fn run_normalize(args: &NormalizeArgs) -> Result<Normalized> {
    let options = parse_options(args)?;
    let normalized = normalize_pdf(&args.input, &options)
        .with_context(|| format!("failed to normalize '{}'", args.input.display()))?;
    write_output(&normalized, args)?;
    Ok(normalized)
}

fn main() -> ExitCode {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("transcript_normalizer=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Normalize(args) => match run_normalize(&args) {
            Ok(normalized) => {
                log_report(&normalized.report, args.verbose);
                if normalized.report.student_count > 0 {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::from(2)
                }
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                ExitCode::from(1)
            }
        },
    }
}

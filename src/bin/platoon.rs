//! Platoon CLI - Command-line interface for platoon response analysis
//!
//! Commands:
//! - analyze: Run the detection pipeline and write a JSON report
//! - export: Write the recording with every derived column as CSV
//! - inspect: Summarize a recording without analyzing it
//! - config: Print the default configuration

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use platoon_response::adapters::{detect_layout, layout_by_name, LayoutAdapter};
use platoon_response::config::{AnalysisConfig, TrailingDetection};
use platoon_response::export::columns_to_csv;
use platoon_response::pipeline::PlatoonProcessor;
use platoon_response::{AnalysisError, ANALYZER_VERSION, PLATOON_SIZE};
use tracing::info;

/// Platoon - Reaction-time detection for vehicle platoons
#[derive(Parser)]
#[command(name = "platoon")]
#[command(version = ANALYZER_VERSION)]
#[command(about = "Detect speed transitions and response times in platoon recordings", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and write an analysis report
    Analyze {
        /// Input CSV path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output JSON path (use - for stdout)
        #[arg(short, long)]
        output: PathBuf,

        /// Column layout of the input
        #[arg(long, default_value = "auto")]
        layout: LayoutChoice,

        /// Analysis configuration (JSON); defaults apply to omitted fields
        #[arg(long)]
        config: Option<PathBuf>,

        /// Experiment name recorded in the report (defaults to the input file stem)
        #[arg(long)]
        experiment: Option<String>,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        format: OutputFormat,

        /// Keep the last detection of every vehicle
        #[arg(long)]
        keep_trailing_detection: bool,
    },

    /// Write the cleaned recording with every derived column
    Export {
        /// Input CSV path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output CSV path (use - for stdout)
        #[arg(short, long)]
        output: PathBuf,

        /// Column layout of the input
        #[arg(long, default_value = "auto")]
        layout: LayoutChoice,

        /// Analysis configuration (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Summarize a recording: layout, rows, missing samples, time span
    Inspect {
        /// Input CSV path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Column layout of the input
        #[arg(long, default_value = "auto")]
        layout: LayoutChoice,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the default configuration
    Config {
        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum LayoutChoice {
    /// Detect from the header row
    Auto,
    /// CARMA GPS speed columns
    Carma,
    /// Already standardized `Speed - N` columns
    Standard,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), PlatoonCliError> {
    match cli.command {
        Commands::Analyze {
            input,
            output,
            layout,
            config,
            experiment,
            format,
            keep_trailing_detection,
        } => cmd_analyze(
            &input,
            &output,
            layout,
            config.as_deref(),
            experiment,
            format,
            keep_trailing_detection,
        ),

        Commands::Export {
            input,
            output,
            layout,
            config,
        } => cmd_export(&input, &output, layout, config.as_deref()),

        Commands::Inspect {
            input,
            layout,
            json,
        } => cmd_inspect(&input, layout, json),

        Commands::Config { output } => cmd_config(output.as_deref()),
    }
}

fn read_input(input: &Path) -> Result<String, PlatoonCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn write_output(output: &Path, data: &str) -> Result<(), PlatoonCliError> {
    if output.to_string_lossy() == "-" {
        print!("{data}");
    } else {
        fs::write(output, data)?;
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig, PlatoonCliError> {
    match path {
        Some(path) => Ok(AnalysisConfig::from_json(&fs::read_to_string(path)?)?),
        None => Ok(AnalysisConfig::default()),
    }
}

fn resolve_layout(
    choice: LayoutChoice,
    text: &str,
) -> Result<Box<dyn LayoutAdapter>, PlatoonCliError> {
    let layout = match choice {
        LayoutChoice::Auto => detect_layout(text)?,
        LayoutChoice::Carma => layout_by_name("carma")?,
        LayoutChoice::Standard => layout_by_name("standard")?,
    };
    info!(layout = layout.name(), "Using input layout");
    Ok(layout)
}

/// Experiment name for the report: explicit, else the input file stem
fn experiment_name(input: &Path, explicit: Option<String>) -> String {
    explicit
        .or_else(|| {
            if input.to_string_lossy() == "-" {
                return None;
            }
            input.file_stem().map(|stem| stem.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "stdin".to_string())
}

fn build_processor(
    config: Option<&Path>,
    keep_trailing_detection: bool,
) -> Result<PlatoonProcessor, PlatoonCliError> {
    let mut config = load_config(config)?;
    if keep_trailing_detection {
        config.detection.trailing_detection = TrailingDetection::Keep;
    }
    Ok(PlatoonProcessor::with_config(config)?)
}

fn cmd_analyze(
    input: &Path,
    output: &Path,
    layout: LayoutChoice,
    config: Option<&Path>,
    experiment: Option<String>,
    format: OutputFormat,
    keep_trailing_detection: bool,
) -> Result<(), PlatoonCliError> {
    let text = read_input(input)?;
    let layout = resolve_layout(layout, &text)?;
    let processor = build_processor(config, keep_trailing_detection)?;

    let experiment = experiment_name(input, experiment);
    let report = processor.process_csv(layout.as_ref(), &text, &experiment)?;
    if report.provenance.samples == 0 {
        return Err(PlatoonCliError::NoRows);
    }

    let mut data = match format {
        OutputFormat::Json => serde_json::to_string(&report)?,
        OutputFormat::JsonPretty => serde_json::to_string_pretty(&report)?,
    };
    data.push('\n');

    write_output(output, &data)
}

fn cmd_export(
    input: &Path,
    output: &Path,
    layout: LayoutChoice,
    config: Option<&Path>,
) -> Result<(), PlatoonCliError> {
    let text = read_input(input)?;
    let layout = resolve_layout(layout, &text)?;
    let processor = build_processor(config, false)?;

    let analysis = processor.analyze_csv(layout.as_ref(), &text)?;
    if analysis.series.is_empty() {
        return Err(PlatoonCliError::NoRows);
    }

    write_output(output, &columns_to_csv(&analysis))
}

fn cmd_inspect(input: &Path, layout: LayoutChoice, json: bool) -> Result<(), PlatoonCliError> {
    let text = read_input(input)?;
    let layout = resolve_layout(layout, &text)?;
    let series = layout.parse(&text)?;

    let span = series.time_span();
    let report = InspectReport {
        layout: layout.name().to_string(),
        rows: series.len(),
        missing_speeds: series.missing_counts(),
        time_start: span.map(|(start, _)| start),
        time_end: span.map(|(_, end)| end),
        time_ascending: series.is_time_ascending(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Recording Summary");
        println!("=================");
        println!("Layout:         {}", report.layout);
        println!("Rows:           {}", report.rows);
        match (report.time_start, report.time_end) {
            (Some(start), Some(end)) => println!("Time span:      {start} .. {end}"),
            _ => println!("Time span:      -"),
        }
        println!("Time ascending: {}", report.time_ascending);
        println!("\nMissing speed samples:");
        for (vehicle_id, missing) in report.missing_speeds.iter().enumerate() {
            println!("  - Speed - {vehicle_id}: {missing}");
        }
    }

    if report.rows == 0 {
        Err(PlatoonCliError::NoRows)
    } else {
        Ok(())
    }
}

fn cmd_config(output: Option<&Path>) -> Result<(), PlatoonCliError> {
    let json = AnalysisConfig::default().to_json()?;
    match output {
        Some(path) => fs::write(path, format!("{json}\n"))?,
        None => println!("{json}"),
    }
    Ok(())
}

// Error types

#[derive(Debug)]
enum PlatoonCliError {
    Io(io::Error),
    Analysis(AnalysisError),
    Json(serde_json::Error),
    NoRows,
}

impl From<io::Error> for PlatoonCliError {
    fn from(e: io::Error) -> Self {
        PlatoonCliError::Io(e)
    }
}

impl From<AnalysisError> for PlatoonCliError {
    fn from(e: AnalysisError) -> Self {
        PlatoonCliError::Analysis(e)
    }
}

impl From<serde_json::Error> for PlatoonCliError {
    fn from(e: serde_json::Error) -> Self {
        PlatoonCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<PlatoonCliError> for CliError {
    fn from(e: PlatoonCliError) -> Self {
        match e {
            PlatoonCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            PlatoonCliError::Analysis(e) => {
                let (code, hint) = match &e {
                    AnalysisError::MissingColumn(_) | AnalysisError::UnsupportedLayout(_) => (
                        "LAYOUT_ERROR",
                        "Run 'platoon inspect' or pass --layout explicitly",
                    ),
                    AnalysisError::InvalidConfig(_) => (
                        "CONFIG_ERROR",
                        "Run 'platoon config' to see the default configuration",
                    ),
                    _ => ("ANALYSIS_ERROR", "Check the input recording"),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            PlatoonCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            PlatoonCliError::NoRows => CliError {
                code: "NO_ROWS".to_string(),
                message: "No usable rows found in input".to_string(),
                hint: Some("Ensure the input has a header and at least one timed row".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct InspectReport {
    layout: String,
    rows: usize,
    missing_speeds: [usize; PLATOON_SIZE],
    time_start: Option<f64>,
    time_end: Option<f64>,
    time_ascending: bool,
}

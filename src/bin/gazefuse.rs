//! gazefuse CLI - Command-line interface for gazefuse
//!
//! Commands:
//! - build: Consolidate a capture tree into the full and slim datasets
//! - devices: Report the per-device session census
//! - slim: Re-derive the slim dataset from an existing full dataset

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use env_logger::Env;
use indicatif::{ProgressBar, ProgressStyle};

use gazefuse::aggregator::list_session_dirs;
use gazefuse::inventory::{device_inventory, log_census};
use gazefuse::pipeline::{self, FuseConfig, FULL_DATASET_FILE, SLIM_DATASET_FILE};
use gazefuse::reconciler::OUT_DIR;
use gazefuse::reducer::reduce;
use gazefuse::table::ColumnTable;
use gazefuse::{ProcessError, FUSE_VERSION};

/// gazefuse - Consolidate eye-tracking capture sessions into model-ready datasets
#[derive(Parser)]
#[command(name = "gazefuse")]
#[command(version = FUSE_VERSION)]
#[command(about = "Fuse per-session capture folders into tabular datasets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Consolidate a capture tree into the full and slim datasets
    Build {
        /// Dataset root containing one folder per session
        #[arg(long, default_value = "gazecapture")]
        data_root: PathBuf,

        /// Full dataset output path
        #[arg(long, default_value = FULL_DATASET_FILE)]
        full_output: PathBuf,

        /// Slim dataset output path
        #[arg(long, default_value = SLIM_DATASET_FILE)]
        slim_output: PathBuf,

        /// Worker threads for session processing (defaults to all cores)
        #[arg(long)]
        jobs: Option<usize>,

        /// Disable the progress bar
        #[arg(long)]
        no_progress: bool,
    },

    /// Report the per-device session census
    Devices {
        /// Dataset root containing one folder per session
        #[arg(long, default_value = "gazecapture")]
        data_root: PathBuf,

        /// Count only sessions with feature output
        #[arg(long)]
        ignore_unprocessed: bool,
    },

    /// Re-derive the slim dataset from an existing full dataset
    Slim {
        /// Full dataset to read
        #[arg(short, long, default_value = FULL_DATASET_FILE)]
        input: PathBuf,

        /// Slim dataset output path
        #[arg(short, long, default_value = SLIM_DATASET_FILE)]
        output: PathBuf,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), FuseCliError> {
    match cli.command {
        Commands::Build {
            data_root,
            full_output,
            slim_output,
            jobs,
            no_progress,
        } => cmd_build(data_root, full_output, slim_output, jobs, no_progress),

        Commands::Devices {
            data_root,
            ignore_unprocessed,
        } => cmd_devices(&data_root, ignore_unprocessed),

        Commands::Slim { input, output } => cmd_slim(&input, &output),
    }
}

fn cmd_build(
    data_root: PathBuf,
    full_output: PathBuf,
    slim_output: PathBuf,
    jobs: Option<usize>,
    no_progress: bool,
) -> Result<(), FuseCliError> {
    if let Some(jobs) = jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .map_err(|e| FuseCliError::ThreadPool(e.to_string()))?;
    }

    // Dataset-composition sanity check before the long build
    let census = device_inventory(&data_root, false)?;
    log_census(&census);

    let config = FuseConfig {
        data_root,
        full_output,
        slim_output,
    };

    let total = list_session_dirs(&config.data_root)?
        .iter()
        .filter(|folder| config.data_root.join(folder).join(OUT_DIR).is_dir())
        .count();

    let bar = make_progress_bar(total as u64, no_progress)?;
    let summary = pipeline::run(&config, |folder| {
        bar.set_message(folder.to_string());
        bar.inc(1);
    })?;
    bar.finish_and_clear();

    println!(
        "merged {} of {} sessions ({} rows, {} columns)",
        summary.report.sessions_merged,
        summary.report.sessions_attempted,
        summary.rows,
        summary.corpus_columns
    );
    for (folder, reason) in &summary.report.skipped {
        println!("  skipped {}: {}", folder, reason);
    }

    Ok(())
}

fn cmd_devices(data_root: &PathBuf, ignore_unprocessed: bool) -> Result<(), FuseCliError> {
    let census = device_inventory(data_root, ignore_unprocessed)?;

    println!("Device census");
    println!("=============");
    let mut total = 0;
    for (device, folders) in &census {
        println!("  {}: {} sessions", device, folders.len());
        total += folders.len();
    }
    println!("Total: {} sessions across {} devices", total, census.len());

    Ok(())
}

fn cmd_slim(input: &PathBuf, output: &PathBuf) -> Result<(), FuseCliError> {
    let corpus = ColumnTable::read_csv_gz(input)?;
    let slim = reduce(&corpus)?;
    slim.write_csv_gz(output)?;

    println!(
        "slim dataset written to {} ({} rows, {} columns)",
        output.display(),
        slim.row_count(),
        slim.column_count()
    );

    Ok(())
}

fn make_progress_bar(total: u64, no_progress: bool) -> Result<ProgressBar, FuseCliError> {
    if no_progress || !atty::is(atty::Stream::Stderr) {
        return Ok(ProgressBar::hidden());
    }
    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("  {bar:40} {pos}/{len} {msg}")
            .map_err(|e| FuseCliError::Progress(e.to_string()))?
            .progress_chars("##-"),
    );
    Ok(bar)
}

// Error types

#[derive(Debug)]
enum FuseCliError {
    Process(ProcessError),
    ThreadPool(String),
    Progress(String),
}

impl From<ProcessError> for FuseCliError {
    fn from(e: ProcessError) -> Self {
        FuseCliError::Process(e)
    }
}

impl std::fmt::Display for FuseCliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FuseCliError::Process(e) => write!(f, "{}", e),
            FuseCliError::ThreadPool(msg) => write!(f, "failed to configure worker pool: {}", msg),
            FuseCliError::Progress(msg) => write!(f, "failed to configure progress bar: {}", msg),
        }
    }
}

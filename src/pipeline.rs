//! Pipeline orchestration
//!
//! This module provides the public entry point for gazefuse. It drives the
//! full batch: aggregate every usable session into the corpus, persist the
//! full dataset, derive the slim dataset, persist it. Session-local failures
//! are consumed inside the aggregation stage; anything that escapes `run` is
//! root-level and fatal.

use std::path::PathBuf;

use log::{info, warn};

use crate::aggregator::{build_corpus, BuildReport};
use crate::error::ProcessError;
use crate::reducer::reduce;
use crate::table::ColumnTable;

/// Default path of the full dataset artifact
pub const FULL_DATASET_FILE: &str = "dataset_all.csv.gz";

/// Default path of the slim dataset artifact
pub const SLIM_DATASET_FILE: &str = "dataset.csv.gz";

/// Explicit pipeline configuration, threaded into every component
#[derive(Debug, Clone)]
pub struct FuseConfig {
    /// Dataset root containing one folder per capture session
    pub data_root: PathBuf,
    /// Where the full dataset is written
    pub full_output: PathBuf,
    /// Where the slim dataset is written
    pub slim_output: PathBuf,
}

impl FuseConfig {
    /// Configuration with default artifact paths in the working directory
    pub fn new(data_root: impl Into<PathBuf>) -> Self {
        Self {
            data_root: data_root.into(),
            full_output: PathBuf::from(FULL_DATASET_FILE),
            slim_output: PathBuf::from(SLIM_DATASET_FILE),
        }
    }
}

/// What one pipeline run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Per-session outcome counters from the aggregation stage
    pub report: BuildReport,
    /// Rows in both artifacts (the slim dataset is a pure projection)
    pub rows: usize,
    /// Columns in the full dataset (union across sessions)
    pub corpus_columns: usize,
    /// Columns in the slim dataset
    pub slim_columns: usize,
}

/// Run the full pipeline: build the corpus, persist it, reduce it, persist
/// the reduction.
///
/// `progress` is invoked once per attempted session as it completes (from
/// worker threads); pass `|_| {}` when no reporting is wanted.
pub fn run<F>(config: &FuseConfig, progress: F) -> Result<RunSummary, ProcessError>
where
    F: Fn(&str) + Sync,
{
    let (corpus, report) = build_corpus(&config.data_root, progress)?;

    corpus.write_csv_gz(&config.full_output)?;
    info!(
        "full dataset written to {} ({} rows)",
        config.full_output.display(),
        corpus.row_count()
    );

    let slim = if corpus.is_empty() {
        // Nothing merged; persist an empty artifact rather than failing on
        // the reducer's required columns.
        warn!("corpus is empty, writing empty slim dataset");
        ColumnTable::new()
    } else {
        reduce(&corpus)?
    };
    slim.write_csv_gz(&config.slim_output)?;
    info!(
        "slim dataset written to {} ({} rows)",
        config.slim_output.display(),
        slim.row_count()
    );

    Ok(RunSummary {
        rows: corpus.row_count(),
        corpus_columns: corpus.column_count(),
        slim_columns: slim.column_count(),
        report,
    })
}

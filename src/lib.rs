//! gazefuse - Batch consolidation engine for eye-tracking capture sessions
//!
//! gazefuse fuses a directory tree of per-session capture folders into two
//! consolidated tabular artifacts through a deterministic pipeline: frame
//! enumeration → feature-row reconciliation → metadata merge → corpus
//! aggregation → slim reduction.
//!
//! Each session folder may be incomplete: missing frames, missing feature
//! files, missing metadata. The pipeline merges what exists, fills what does
//! not with null sentinels, and skips what it cannot use, reporting every
//! anomaly without aborting the run.

pub mod aggregator;
pub mod error;
pub mod frames;
pub mod inventory;
pub mod merger;
pub mod metadata;
pub mod pipeline;
pub mod reconciler;
pub mod reducer;
pub mod table;
pub mod types;

pub use error::ProcessError;
pub use pipeline::{run, FuseConfig, RunSummary, FULL_DATASET_FILE, SLIM_DATASET_FILE};
pub use table::{ColumnTable, Value};

/// gazefuse version reported by the CLI
pub const FUSE_VERSION: &str = env!("CARGO_PKG_VERSION");

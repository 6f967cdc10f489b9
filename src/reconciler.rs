//! Feature row reconciliation
//!
//! Aligns a session's enumerated frame set against the sparser set of
//! per-frame feature files under `out/`, producing one rectangular table per
//! session. The column schema is captured from the first frame whose feature
//! file exists; frames missing their file after that point contribute a
//! sentinel row of the same width, so "extraction never ran" stays
//! distinguishable from any real reading.

use std::fs;
use std::path::Path;

use log::warn;

use crate::error::ProcessError;
use crate::table::{ColumnTable, Value};

/// Directory of per-frame feature files inside a session folder
pub const OUT_DIR: &str = "out";

/// Reconcile one session's frames into a feature table.
///
/// Walks `frames` in order and, for each, looks for `out/<frame>.csv`, a
/// two-line delimited table (header + one data row). The first file found
/// fixes the session schema; later files append their data row after width
/// validation, and absent files append a null-sentinel row. Frames before
/// the first found file contribute no row.
///
/// Fails with `EmptySession` when not a single frame has a feature file, and
/// with `SchemaWidthMismatch` when a data row disagrees with the captured
/// header width.
pub fn reconcile_frames(
    session_dir: &Path,
    frames: &[String],
) -> Result<ColumnTable, ProcessError> {
    let out_dir = session_dir.join(OUT_DIR);
    let mut table: Option<ColumnTable> = None;

    for frame in frames {
        let csv_path = out_dir.join(format!("{}.csv", frame));
        if csv_path.exists() {
            let text = fs::read_to_string(&csv_path)?;
            let mut lines = text.lines();

            let header = match lines.next() {
                Some(line) if !line.trim().is_empty() => line,
                _ => {
                    warn!("empty feature file {}", csv_path.display());
                    if let Some(table) = table.as_mut() {
                        table.push_null_row();
                    }
                    continue;
                }
            };

            // Header of whichever frame succeeds first is canonical; later
            // headers are not re-inspected, matching the upstream merge.
            let table = table.get_or_insert_with(|| {
                ColumnTable::with_columns(&split_fields(header))
            });

            match lines.next() {
                Some(data) => {
                    let fields = split_fields(data);
                    if fields.len() != table.column_count() {
                        return Err(ProcessError::SchemaWidthMismatch {
                            frame: frame.clone(),
                            expected: table.column_count(),
                            found: fields.len(),
                        });
                    }
                    table.push_row(fields.iter().map(|f| Value::parse(f)).collect())?;
                }
                None => {
                    // Header but no data row: extraction was interrupted.
                    warn!("truncated feature file {}", csv_path.display());
                    table.push_null_row();
                }
            }
        } else if let Some(table) = table.as_mut() {
            table.push_null_row();
        }
    }

    table.ok_or(ProcessError::EmptySession(out_dir))
}

/// Split a feature-file record on the delimiter, trimming the space the
/// extractor writes after each comma.
fn split_fields(line: &str) -> Vec<String> {
    line.split(',').map(|f| f.trim().to_string()).collect()
}

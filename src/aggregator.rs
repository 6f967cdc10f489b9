//! Corpus aggregation
//!
//! Drives the full corpus build: iterates every session folder under the
//! dataset root, runs the per-session pipeline on those with processed
//! output, and concatenates the surviving tables into one dataset. Sessions
//! are independent, so they fan out across a worker pool; each worker builds
//! its own table and the ordered collect restores session order before the
//! concat. A failed session is logged and skipped; it never aborts the loop.

use std::fs;
use std::path::Path;

use log::{info, warn};
use rayon::prelude::*;

use crate::error::ProcessError;
use crate::merger::process_session;
use crate::reconciler::OUT_DIR;
use crate::table::ColumnTable;

/// Outcome counters of one corpus build
#[derive(Debug, Clone)]
pub struct BuildReport {
    /// Directories found under the dataset root
    pub sessions_found: usize,
    /// Sessions with an `out/` directory, i.e. attempted
    pub sessions_attempted: usize,
    /// Sessions whose rows made it into the corpus
    pub sessions_merged: usize,
    /// (folder, reason) for every attempted session that was skipped
    pub skipped: Vec<(String, String)>,
}

/// List session folder names under the dataset root, sorted.
///
/// An unreadable root is the one fatal error of the pipeline.
pub fn list_session_dirs(root: &Path) -> Result<Vec<String>, ProcessError> {
    let mut folders = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        folders.push(entry.file_name().to_string_lossy().into_owned());
    }
    folders.sort();
    Ok(folders)
}

/// Build the full corpus from every usable session under `root`.
///
/// `progress` is invoked once per attempted session, from worker threads,
/// as each finishes.
pub fn build_corpus<F>(root: &Path, progress: F) -> Result<(ColumnTable, BuildReport), ProcessError>
where
    F: Fn(&str) + Sync,
{
    let folders = list_session_dirs(root)?;

    // Only sessions with feature output are worth attempting; the rest have
    // no evidence of processing and are passed over without a diagnostic.
    let candidates: Vec<&String> = folders
        .iter()
        .filter(|folder| root.join(folder).join(OUT_DIR).is_dir())
        .collect();

    let results: Vec<(&String, Result<ColumnTable, ProcessError>)> = candidates
        .par_iter()
        .map(|folder| {
            let result = process_session(&root.join(folder), folder);
            progress(folder);
            (*folder, result)
        })
        .collect();

    let mut tables = Vec::with_capacity(results.len());
    let mut skipped = Vec::new();
    for (folder, result) in results {
        match result {
            Ok(table) => tables.push(table),
            Err(e) => {
                warn!("skipping session {}: {}", folder, e);
                skipped.push((folder.clone(), e.to_string()));
            }
        }
    }

    let corpus = ColumnTable::concat(&tables);
    let report = BuildReport {
        sessions_found: folders.len(),
        sessions_attempted: candidates.len(),
        sessions_merged: tables.len(),
        skipped,
    };
    info!(
        "merged {} of {} sessions into {} rows",
        report.sessions_merged,
        report.sessions_attempted,
        corpus.row_count()
    );
    Ok((corpus, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;
    use pretty_assertions::assert_eq;

    /// Lay down one session folder: metadata, frame stubs, and a feature
    /// file for each frame index in `processed`.
    fn write_session(root: &Path, folder: &str, frames: usize, processed: &[usize]) {
        let dir = root.join(folder);
        let frames_dir = dir.join("frames");
        let out_dir = dir.join(OUT_DIR);
        fs::create_dir_all(&frames_dir).unwrap();
        fs::create_dir_all(&out_dir).unwrap();

        fs::write(
            dir.join("info.json"),
            format!(r#"{{"DeviceName": "iPhone 6s", "Dataset": "train", "TotalFrames": {}}}"#, frames),
        )
        .unwrap();
        fs::write(dir.join("screen.json"), r#"{"H": 568, "W": 320, "Orientation": 1}"#).unwrap();
        fs::write(dir.join("dotInfo.json"), r#"{"XCam": 1.0, "YCam": 2.0}"#).unwrap();

        for i in 0..frames {
            fs::write(frames_dir.join(format!("{:05}.jpg", i)), b"").unwrap();
        }
        for &i in processed {
            fs::write(
                out_dir.join(format!("{:05}.csv", i)),
                format!("frame, gaze_0_x\n{}, 0.5\n", i),
            )
            .unwrap();
        }
    }

    #[test]
    fn test_aggregates_all_good_sessions() {
        let root = tempfile::tempdir().unwrap();
        write_session(root.path(), "00001", 3, &[0, 1, 2]);
        write_session(root.path(), "00002", 2, &[0, 1]);

        let (corpus, report) = build_corpus(root.path(), |_| {}).unwrap();
        assert_eq!(report.sessions_merged, 2);
        assert_eq!(corpus.row_count(), 5);
        // sessions contiguous in sorted folder order
        assert_eq!(corpus.column("folder").unwrap()[0], Value::Str("00001".into()));
        assert_eq!(corpus.column("folder").unwrap()[3], Value::Str("00002".into()));
    }

    #[test]
    fn test_session_without_output_is_passed_over() {
        let root = tempfile::tempdir().unwrap();
        write_session(root.path(), "00001", 2, &[0, 1]);
        let unprocessed = root.path().join("00002");
        fs::create_dir_all(unprocessed.join("frames")).unwrap();

        let (corpus, report) = build_corpus(root.path(), |_| {}).unwrap();
        assert_eq!(report.sessions_found, 2);
        assert_eq!(report.sessions_attempted, 1);
        assert!(report.skipped.is_empty());
        assert_eq!(corpus.row_count(), 2);
    }

    #[test]
    fn test_bad_session_does_not_poison_the_run() {
        let root = tempfile::tempdir().unwrap();
        write_session(root.path(), "00001", 2, &[0, 1]);
        write_session(root.path(), "00002", 2, &[0, 1]);
        // session with output but no metadata at all
        fs::remove_file(root.path().join("00002").join("info.json")).unwrap();

        let (corpus, report) = build_corpus(root.path(), |_| {}).unwrap();
        assert_eq!(report.sessions_merged, 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].0, "00002");
        assert_eq!(corpus.row_count(), 2);
    }

    #[test]
    fn test_empty_session_is_skipped_with_diagnostic() {
        let root = tempfile::tempdir().unwrap();
        write_session(root.path(), "00001", 3, &[]);

        let (corpus, report) = build_corpus(root.path(), |_| {}).unwrap();
        assert!(corpus.is_empty());
        assert_eq!(report.sessions_attempted, 1);
        assert_eq!(report.skipped.len(), 1);
    }

    #[test]
    fn test_divergent_schemas_coexist() {
        let root = tempfile::tempdir().unwrap();
        write_session(root.path(), "00001", 1, &[0]);
        write_session(root.path(), "00002", 1, &[]);
        // session 2 carries an extra column the first one lacks
        fs::write(
            root.path().join("00002").join(OUT_DIR).join("00000.csv"),
            "frame, gaze_0_x, confidence\n0, 0.5, 0.98\n",
        )
        .unwrap();

        let (corpus, _) = build_corpus(root.path(), |_| {}).unwrap();
        assert_eq!(corpus.row_count(), 2);
        assert_eq!(
            corpus.column("confidence").unwrap(),
            &[Value::Null, Value::Float(0.98)]
        );
    }

    #[test]
    fn test_zero_sessions_yield_empty_corpus() {
        let root = tempfile::tempdir().unwrap();
        let (corpus, report) = build_corpus(root.path(), |_| {}).unwrap();
        assert!(corpus.is_empty());
        assert_eq!(report.sessions_found, 0);
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let root = tempfile::tempdir().unwrap();
        let gone = root.path().join("nothing-here");
        assert!(build_corpus(&gone, |_| {}).is_err());
    }
}

//! Session merging
//!
//! Joins one session's reconciled feature table with its three metadata
//! documents, stamping every row with the session-constant columns. All rows
//! of a session share identical values for these columns; a session whose
//! metadata cannot be read is excluded in full rather than contributing
//! partially-stamped rows.

use std::path::Path;

use crate::error::ProcessError;
use crate::frames::enumerate_frames;
use crate::metadata::read_session_meta;
use crate::reconciler::reconcile_frames;
use crate::table::{ColumnTable, Value};
use crate::types::SessionMeta;

/// Stamp the session-constant columns onto a reconciled feature table.
pub fn merge_session(mut table: ColumnTable, folder: &str, meta: &SessionMeta) -> ColumnTable {
    table.set_constant("folder", Value::Str(folder.to_string()));

    table.set_constant("H", Value::Int(meta.screen.height));
    table.set_constant("W", Value::Int(meta.screen.width));
    table.set_constant("Orientation", Value::Int(meta.screen.orientation));

    table.set_constant("DeviceName", Value::Str(meta.info.device_name.clone()));
    table.set_constant("Train", Value::Int(meta.info.split().as_train_flag()));

    table.set_constant("XCam", Value::Float(meta.dot.x_cam));
    table.set_constant("YCam", Value::Float(meta.dot.y_cam));

    table
}

/// Run the full per-session path: enumerate frames, reconcile feature rows,
/// read metadata, merge. Any failure is fatal to this session only; the
/// caller logs it and moves on to the next folder.
pub fn process_session(session_dir: &Path, folder: &str) -> Result<ColumnTable, ProcessError> {
    let frames = enumerate_frames(session_dir)?;
    let features = reconcile_frames(session_dir, &frames)?;
    let meta = read_session_meta(session_dir)?;
    Ok(merge_session(features, folder, &meta))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DotInfo, ScreenInfo, SessionInfo, SESSION_COLUMNS};
    use pretty_assertions::assert_eq;

    fn sample_meta() -> SessionMeta {
        SessionMeta {
            info: SessionInfo {
                device_name: "iPhone 6".to_string(),
                dataset: "train".to_string(),
            },
            screen: ScreenInfo {
                height: 568,
                width: 320,
                orientation: 1,
            },
            dot: DotInfo {
                x_cam: 0.5,
                y_cam: -6.0,
            },
        }
    }

    fn sample_features() -> ColumnTable {
        let mut table = ColumnTable::with_columns(&["gaze_0_x"]);
        table.push_row(vec![Value::Float(0.1)]).unwrap();
        table.push_row(vec![Value::Null]).unwrap();
        table
    }

    #[test]
    fn test_stamps_all_session_columns() {
        let merged = merge_session(sample_features(), "00031", &sample_meta());

        for name in SESSION_COLUMNS {
            assert!(merged.has_column(name), "missing column {}", name);
        }
        assert_eq!(merged.row_count(), 2);
        assert_eq!(
            merged.column("folder").unwrap(),
            &[Value::Str("00031".into()), Value::Str("00031".into())]
        );
        assert_eq!(merged.column("Train").unwrap()[0], Value::Int(1));
        assert_eq!(merged.column("XCam").unwrap()[1], Value::Float(0.5));
    }

    #[test]
    fn test_feature_columns_survive_merge() {
        let merged = merge_session(sample_features(), "00031", &sample_meta());
        assert_eq!(
            merged.column("gaze_0_x").unwrap(),
            &[Value::Float(0.1), Value::Null]
        );
    }

    #[test]
    fn test_non_train_split_is_zero() {
        let mut meta = sample_meta();
        meta.info.dataset = "test".to_string();
        let merged = merge_session(sample_features(), "00032", &meta);
        assert_eq!(merged.column("Train").unwrap()[0], Value::Int(0));
    }
}

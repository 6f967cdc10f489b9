//! Metadata reading
//!
//! Loads the three per-session JSON documents the capture tool writes next to
//! the frames: `info.json` (device, dataset split), `screen.json` (geometry)
//! and `dotInfo.json` (gaze-target position). A missing document is
//! `MissingMetadata`; a document that parses but lacks a required field is
//! `MalformedMetadata`. Both are fatal to that session's merge only; the
//! caller decides to skip the session and keep going.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::ProcessError;
use crate::types::{DotInfo, ScreenInfo, SessionInfo, SessionMeta};

pub const INFO_DOCUMENT: &str = "info.json";
pub const SCREEN_DOCUMENT: &str = "screen.json";
pub const DOT_DOCUMENT: &str = "dotInfo.json";

fn read_document<T: DeserializeOwned>(session_dir: &Path, name: &str) -> Result<T, ProcessError> {
    let path = session_dir.join(name);
    if !path.exists() {
        return Err(ProcessError::MissingMetadata(path));
    }
    let text = fs::read_to_string(&path)?;
    serde_json::from_str(&text).map_err(|source| ProcessError::MalformedMetadata { path, source })
}

/// Read and parse `info.json`
pub fn read_info(session_dir: &Path) -> Result<SessionInfo, ProcessError> {
    read_document(session_dir, INFO_DOCUMENT)
}

/// Read and parse `screen.json`
pub fn read_screen(session_dir: &Path) -> Result<ScreenInfo, ProcessError> {
    read_document(session_dir, SCREEN_DOCUMENT)
}

/// Read and parse `dotInfo.json`
pub fn read_dot(session_dir: &Path) -> Result<DotInfo, ProcessError> {
    read_document(session_dir, DOT_DOCUMENT)
}

/// Read all three documents required for a session merge
pub fn read_session_meta(session_dir: &Path) -> Result<SessionMeta, ProcessError> {
    Ok(SessionMeta {
        info: read_info(session_dir)?,
        screen: read_screen(session_dir)?,
        dot: read_dot(session_dir)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DatasetSplit;

    fn write_session(dir: &Path, info: &str, screen: &str, dot: &str) {
        fs::write(dir.join(INFO_DOCUMENT), info).unwrap();
        fs::write(dir.join(SCREEN_DOCUMENT), screen).unwrap();
        fs::write(dir.join(DOT_DOCUMENT), dot).unwrap();
    }

    #[test]
    fn test_read_session_meta() {
        let dir = tempfile::tempdir().unwrap();
        write_session(
            dir.path(),
            r#"{"DeviceName": "iPad Air 2", "Dataset": "test", "TotalFrames": 120}"#,
            r#"{"H": 1024, "W": 768, "Orientation": 1}"#,
            r#"{"XCam": 1.25, "YCam": -4.5}"#,
        );

        let meta = read_session_meta(dir.path()).unwrap();
        assert_eq!(meta.info.device_name, "iPad Air 2");
        assert_eq!(meta.info.split(), DatasetSplit::Other);
        assert_eq!(meta.screen.height, 1024);
        assert_eq!(meta.screen.orientation, 1);
        assert_eq!(meta.dot.x_cam, 1.25);
    }

    #[test]
    fn test_missing_document() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_info(dir.path()).unwrap_err();
        assert!(matches!(err, ProcessError::MissingMetadata(_)));
    }

    #[test]
    fn test_malformed_document() {
        let dir = tempfile::tempdir().unwrap();
        // parses as JSON but DeviceName is missing
        fs::write(dir.path().join(INFO_DOCUMENT), r#"{"Dataset": "train"}"#).unwrap();
        let err = read_info(dir.path()).unwrap_err();
        assert!(matches!(err, ProcessError::MalformedMetadata { .. }));
    }
}

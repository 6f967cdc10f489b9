//! Core types for the gazefuse pipeline
//!
//! This module defines the per-session metadata documents and the constants
//! shared by the merge and reduction stages: the session-constant column
//! names stamped onto every merged row and the landmark index ranges the
//! slim dataset averages over.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Dataset split a session was assigned by the capture tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetSplit {
    Train,
    /// Anything other than "train" (test, val, unassigned)
    Other,
}

impl DatasetSplit {
    /// Parse the `Dataset` field of `info.json`
    pub fn from_label(label: &str) -> Self {
        if label == "train" {
            DatasetSplit::Train
        } else {
            DatasetSplit::Other
        }
    }

    /// 0/1 flag as written to the `Train` column
    pub fn as_train_flag(&self) -> i64 {
        match self {
            DatasetSplit::Train => 1,
            DatasetSplit::Other => 0,
        }
    }
}

/// Parsed `info.json`: device and dataset-split metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Device the session was recorded on (e.g. "iPhone 6s")
    #[serde(rename = "DeviceName")]
    pub device_name: String,
    /// Split label assigned by the capture tool ("train" or other)
    #[serde(rename = "Dataset")]
    pub dataset: String,
}

impl SessionInfo {
    pub fn split(&self) -> DatasetSplit {
        DatasetSplit::from_label(&self.dataset)
    }
}

/// Parsed `screen.json`: screen geometry during capture
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenInfo {
    #[serde(rename = "H")]
    pub height: i64,
    #[serde(rename = "W")]
    pub width: i64,
    #[serde(rename = "Orientation")]
    pub orientation: i64,
}

/// Parsed `dotInfo.json`: gaze-target position in camera space
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DotInfo {
    #[serde(rename = "XCam")]
    pub x_cam: f64,
    #[serde(rename = "YCam")]
    pub y_cam: f64,
}

/// The three metadata documents of one session, read together before merging
#[derive(Debug, Clone)]
pub struct SessionMeta {
    pub info: SessionInfo,
    pub screen: ScreenInfo,
    pub dot: DotInfo,
}

/// Session-constant columns stamped onto every merged row, in stamp order
pub const SESSION_COLUMNS: [&str; 8] = [
    "folder",
    "H",
    "W",
    "Orientation",
    "DeviceName",
    "Train",
    "XCam",
    "YCam",
];

/// Landmark indices averaged into `eye_lmk_0_{X,Y,Z}`
pub const EYE_LMK_0_RANGE: RangeInclusive<usize> = 20..=27;

/// Landmark indices averaged into `eye_lmk_1_{X,Y,Z}`
pub const EYE_LMK_1_RANGE: RangeInclusive<usize> = 48..=55;

/// Corpus columns passed through to the slim dataset unchanged
pub const SLIM_PASSTHROUGH_COLUMNS: [&str; 15] = [
    "gaze_0_x",
    "gaze_0_y",
    "gaze_0_z",
    "gaze_1_x",
    "gaze_1_y",
    "gaze_1_z",
    "gaze_angle_x",
    "gaze_angle_y",
    "H",
    "W",
    "Orientation",
    "DeviceName",
    "Train",
    "XCam",
    "YCam",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_from_label() {
        assert_eq!(DatasetSplit::from_label("train"), DatasetSplit::Train);
        assert_eq!(DatasetSplit::from_label("test"), DatasetSplit::Other);
        assert_eq!(DatasetSplit::from_label(""), DatasetSplit::Other);
    }

    #[test]
    fn test_train_flag() {
        assert_eq!(DatasetSplit::Train.as_train_flag(), 1);
        assert_eq!(DatasetSplit::Other.as_train_flag(), 0);
    }

    #[test]
    fn test_info_document_parses_vendor_names() {
        let info: SessionInfo = serde_json::from_str(
            r#"{"TotalFrames": 99, "DeviceName": "iPhone 6s", "Dataset": "train"}"#,
        )
        .unwrap();
        assert_eq!(info.device_name, "iPhone 6s");
        assert_eq!(info.split(), DatasetSplit::Train);
    }

    #[test]
    fn test_screen_document_requires_all_fields() {
        let err = serde_json::from_str::<ScreenInfo>(r#"{"H": 568, "W": 320}"#);
        assert!(err.is_err());
    }
}

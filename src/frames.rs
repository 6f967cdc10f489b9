//! Frame enumeration
//!
//! Lists the frames belonging to one session from its frame-image directory,
//! independent of which frames have completed feature extraction. Stems are
//! sorted so a rerun over an unchanged tree enumerates identically.

use std::fs;
use std::path::Path;

use crate::error::ProcessError;

/// Directory of frame images inside a session folder
pub const FRAMES_DIR: &str = "frames";

/// Enumerate the frame identifiers (image filename stems) of one session.
///
/// Fails with `MissingDirectory` if the frame directory does not exist:
/// a session that cannot be enumerated cannot be reconciled at all.
pub fn enumerate_frames(session_dir: &Path) -> Result<Vec<String>, ProcessError> {
    let frames_dir = session_dir.join(FRAMES_DIR);
    if !frames_dir.is_dir() {
        return Err(ProcessError::MissingDirectory(frames_dir));
    }

    let mut frames = Vec::new();
    for entry in fs::read_dir(&frames_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            frames.push(stem.to_string());
        }
    }
    frames.sort();
    Ok(frames)
}

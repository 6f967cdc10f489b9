//! Device inventory
//!
//! A diagnostic census of the dataset's composition: sessions grouped by the
//! device that recorded them. Advisory only: it reads nothing but each
//! session's `info.json` and gates nothing in the main pipeline.

use std::collections::BTreeMap;
use std::path::Path;

use log::{info, warn};

use crate::aggregator::list_session_dirs;
use crate::error::ProcessError;
use crate::metadata::read_info;
use crate::reconciler::OUT_DIR;

/// Device name and the session folders recorded on it
pub type DeviceCensus = Vec<(String, Vec<String>)>;

/// Group session folders by device name, sorted ascending by session count
/// (ties by device name).
///
/// Sessions whose `info.json` is missing or unreadable are logged and left
/// out of the census. With `ignore_unprocessed`, sessions without feature
/// output are excluded as well.
pub fn device_inventory(root: &Path, ignore_unprocessed: bool) -> Result<DeviceCensus, ProcessError> {
    let mut index: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for folder in list_session_dirs(root)? {
        let session_dir = root.join(&folder);
        if ignore_unprocessed && !session_dir.join(OUT_DIR).is_dir() {
            continue;
        }
        match read_info(&session_dir) {
            Ok(info) => index.entry(info.device_name).or_default().push(folder),
            Err(e) => warn!("device census: {}", e),
        }
    }

    let mut census: DeviceCensus = index.into_iter().collect();
    census.sort_by(|a, b| a.1.len().cmp(&b.1.len()).then_with(|| a.0.cmp(&b.0)));
    Ok(census)
}

/// Log the census as (device, count) pairs
pub fn log_census(census: &DeviceCensus) {
    for (device, folders) in census {
        info!("device {}: {} sessions", device, folders.len());
    }
}

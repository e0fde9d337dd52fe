//! Module for the mock snapshot directory we use for testing.
//!
//! Create one with [MockSnapshot::create], add device outputs to it, and
//! point a client to `snapshot.path`. The directory is removed on drop.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde_json::Value;

/// Timestamp suffix of every mock snapshot directory
pub const CAPTURE_TIME: &str = "2024-01-31_17_05_09";

/// A snapshot directory laid out the way the collector writes it
pub struct MockSnapshot {
    pub path: PathBuf,
}

impl MockSnapshot {
    /// Creates an empty snapshot directory under `/tmp`
    pub fn create() -> MockSnapshot {
        let path = PathBuf::from(format!(
            "/tmp/test-netverify-{}_{}",
            rand::random::<u32>(),
            CAPTURE_TIME
        ));
        if path.exists() {
            let _ = fs::remove_dir_all(&path);
        }
        fs::create_dir_all(&path).expect("failed to create snapshot dir");
        log::trace!("snapshot: created {}", path.display());
        MockSnapshot { path }
    }

    /// Adds `device`, with no output yet
    pub fn device(self, device: &str) -> Self {
        fs::create_dir_all(self.json_dir(device)).expect("failed to create device dir");
        self
    }

    /// Stores `payload` as the output of `command` on `device`
    pub fn output(self, device: &str, command: &str, payload: Value) -> Self {
        let dir = self.json_dir(device);
        fs::create_dir_all(&dir).expect("failed to create device dir");
        let path = netverify::command_file(&dir, command);
        fs::write(&path, payload.to_string()).expect("failed to write output");
        self
    }

    /// Writes `catalog` next to the device directories, and returns its path
    pub fn catalog(&self, catalog: &Value) -> PathBuf {
        let path = self.path.join("catalog.json");
        fs::write(&path, catalog.to_string()).expect("failed to write catalog");
        path
    }

    fn json_dir(&self, device: &str) -> PathBuf {
        Path::new(&self.path).join(device).join("json")
    }
}

impl Drop for MockSnapshot {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tokio_stream::{wrappers::ReadDirStream, StreamExt};

use crate::{Connection, Result, SyncConnection};

/// Format of the timestamp the collector appends to snapshot directories,
/// e.g. `snapshot_2024-01-31_17_05_09`
pub const SNAPSHOT_TIME_FORMAT: &str = "%Y-%m-%d_%H_%M_%S";

/// Length of a timestamp written with [SNAPSHOT_TIME_FORMAT]
const SNAPSHOT_TIME_LEN: usize = 19;

/// Name of the per-device directory holding the command outputs
pub(crate) const JSON_DIR: &str = "json";

/// A client over a snapshot directory, i.e. the command outputs collected
/// from a set of devices, laid out as `<dir>/<device>/json/<command>.json`.
///
/// You need to create a [Connection] to a device from this client, using
/// [Client::connect], to make requests. You can create multiple
/// [Connection]s from the same client, each with their own independent
/// workflows.
pub struct Client {
    snapshot_dir: PathBuf,
}

impl Client {
    /// Creates a new [Client] over `snapshot_dir`.
    ///
    /// This doesn't touch the filesystem, so is guaranteed to succeed.
    /// Problems with the directory show up when listing devices, or when
    /// connecting to one.
    pub fn for_snapshot_dir<P: AsRef<Path>>(snapshot_dir: P) -> Self {
        Client {
            snapshot_dir: snapshot_dir.as_ref().to_owned(),
        }
    }

    pub fn snapshot_dir(&self) -> &Path {
        &self.snapshot_dir
    }

    /// When the snapshot was collected, if the directory name ends with a
    /// collection timestamp
    pub fn captured_at(&self) -> Option<NaiveDateTime> {
        let name = self.snapshot_dir.file_name()?.to_str()?;
        let start = name.len().checked_sub(SNAPSHOT_TIME_LEN)?;
        let suffix = name.get(start..)?;
        match NaiveDateTime::parse_from_str(suffix, SNAPSHOT_TIME_FORMAT) {
            Ok(dt) => Some(dt),
            Err(_) => {
                log::debug!("client: no capture time in {}", name);
                None
            }
        }
    }

    /// Lists the devices found in the snapshot, sorted by name. Only
    /// directories with a `json` subdirectory count as devices.
    pub async fn devices(&self) -> Result<Vec<String>> {
        let mut entries = ReadDirStream::new(tokio::fs::read_dir(&self.snapshot_dir).await?);
        let mut devices = Vec::new();
        while let Some(entry) = entries.next().await {
            let entry = entry?;
            if !tokio::fs::metadata(entry.path().join(JSON_DIR))
                .await
                .map(|m| m.is_dir())
                .unwrap_or(false)
            {
                log::trace!("client: skipping {}", entry.path().display());
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => devices.push(name),
                Err(name) => log::error!("client: skipping non utf-8 device name {:?}", name),
            }
        }
        devices.sort();
        Ok(devices)
    }

    /// Open a new [Connection] to `device`. You can open multiple
    /// connections to the same device.
    ///
    /// Note that this fails if the snapshot has no outputs for `device`.
    pub async fn connect(&self, device: &str) -> Result<Connection> {
        Connection::new(device, self.snapshot_dir.join(device).join(JSON_DIR)).await
    }

    /// Open a new [SyncConnection] to `device`. You can open multiple
    /// connections to the same device.
    ///
    /// Note that this fails if the snapshot has no outputs for `device`.
    pub fn connect_sync(&self, device: &str) -> Result<SyncConnection> {
        SyncConnection::new(device, self.snapshot_dir.join(device).join(JSON_DIR))
    }
}

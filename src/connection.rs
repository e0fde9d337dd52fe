//! Module that deals with reading command outputs out of a snapshot.
//!
//! Refer to documentation of [Connection] for more details.

use std::{
    collections::HashMap,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde_json::Value;

use crate::{Error, Result, Routine, Snapshot};

/// Marker the devices put in their error message when a command doesn't
/// exist on the hardware it runs on
const UNSUPPORTED_MARKER: &str = "not supported on this hardware platform";

/// A connection to one device of a snapshot, on which requests can be
/// executed.
///
/// Each command is read from disk at most once per connection; later
/// requests for it are answered from memory.
pub struct Connection {
    device: String,
    json_dir: PathBuf,
    cache: HashMap<String, Value>,
}

impl Connection {
    /// Opens a connection over `json_dir`, which has to be a directory
    pub(crate) async fn new(device: &str, json_dir: PathBuf) -> Result<Self> {
        let metadata = tokio::fs::metadata(&json_dir).await?;
        if !metadata.is_dir() {
            return Err(not_a_directory(&json_dir));
        }
        log::trace!("conn: connected to {}", device);
        Ok(Connection {
            device: device.to_owned(),
            json_dir,
            cache: HashMap::new(),
        })
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    /// Returns the output of `command`.
    ///
    /// Fails with [Error::MissingCommand] if the snapshot doesn't have it,
    /// [Error::Unsupported] if the device can't run it, and
    /// [Error::CommandFailed] if the device answered it with an error.
    pub async fn send_request(&mut self, command: &str) -> Result<Value> {
        if let Some(payload) = self.cache.get(command) {
            log::trace!("conn: {} served from cache", command);
            return Ok(payload.clone());
        }
        let path = command_file(&self.json_dir, command);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(err) => return Err(read_error(command, err)),
        };
        let payload = decode_payload(command, &content)?;
        log::trace!("conn: {}: read {}", self.device, path.display());
        self.cache.insert(command.to_owned(), payload.clone());
        Ok(payload)
    }

    /// Issues every command of `routine`, in order, and returns their
    /// outputs as a [Snapshot] ready for [Routine::evaluate]
    pub async fn collect(&mut self, routine: &Routine) -> Result<Snapshot> {
        let mut payloads = Vec::new();
        for command in routine.commands() {
            payloads.push(self.send_request(&command).await?);
        }
        Ok(Snapshot::new(payloads))
    }
}

/// The blocking counterpart of [Connection]
pub struct SyncConnection {
    device: String,
    json_dir: PathBuf,
    cache: HashMap<String, Value>,
}

impl SyncConnection {
    pub(crate) fn new(device: &str, json_dir: PathBuf) -> Result<Self> {
        let metadata = std::fs::metadata(&json_dir)?;
        if !metadata.is_dir() {
            return Err(not_a_directory(&json_dir));
        }
        log::trace!("conn: connected to {} (sync)", device);
        Ok(SyncConnection {
            device: device.to_owned(),
            json_dir,
            cache: HashMap::new(),
        })
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    /// See [Connection::send_request]
    pub fn send_request(&mut self, command: &str) -> Result<Value> {
        if let Some(payload) = self.cache.get(command) {
            log::trace!("conn: {} served from cache", command);
            return Ok(payload.clone());
        }
        let path = command_file(&self.json_dir, command);
        let content = std::fs::read_to_string(&path).map_err(|err| read_error(command, err))?;
        let payload = decode_payload(command, &content)?;
        log::trace!("conn: {}: read {}", self.device, path.display());
        self.cache.insert(command.to_owned(), payload.clone());
        Ok(payload)
    }

    /// See [Connection::collect]
    pub fn collect(&mut self, routine: &Routine) -> Result<Snapshot> {
        let payloads = routine
            .commands()
            .iter()
            .map(|command| self.send_request(command))
            .collect::<Result<Vec<_>>>()?;
        Ok(Snapshot::new(payloads))
    }
}

/// Where the output of `command` is stored. Path separators and pipes in
/// the command are replaced with `_`.
pub fn command_file(json_dir: &Path, command: &str) -> PathBuf {
    let name: String = command
        .chars()
        .map(|c| if c == '/' || c == '|' { '_' } else { c })
        .collect();
    json_dir.join(format!("{}.json", name))
}

fn not_a_directory(path: &Path) -> Error {
    Error::IoError(std::io::Error::new(
        ErrorKind::Other,
        format!("{} is not a directory", path.display()),
    ))
}

fn read_error(command: &str, err: std::io::Error) -> Error {
    if err.kind() == ErrorKind::NotFound {
        log::debug!("conn: no output for {}", command);
        Error::MissingCommand(command.to_owned())
    } else {
        Error::IoError(err)
    }
}

/// Decodes a captured output. An object with an `errors` list means the
/// device rejected the command.
fn decode_payload(command: &str, content: &str) -> Result<Value> {
    let payload: Value = serde_json::from_str(content)?;
    let errors = match payload.get("errors").and_then(Value::as_array) {
        Some(errors) => errors,
        None => return Ok(payload),
    };
    let errors: Vec<String> = errors
        .iter()
        .map(|e| match e {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect();
    if errors.iter().any(|e| e.contains(UNSUPPORTED_MARKER)) {
        log::debug!("conn: {} is unsupported", command);
        return Err(Error::Unsupported(command.to_owned()));
    }
    log::error!("conn: {} failed: {}", command, errors.join(", "));
    Err(Error::CommandFailed {
        command: command.to_owned(),
        errors,
    })
}

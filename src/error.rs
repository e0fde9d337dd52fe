use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// Simple wrapper over all I/O related errors
    IoError(std::io::Error),
    /// A snapshot payload or a catalog could not be decoded as JSON
    JsonError(serde_json::Error),
    /// The inputs of a check are structurally invalid. This is a problem
    /// with the catalog, not with the device.
    SchemaError(String),
    /// The catalog refers to a check we don't know about
    UnknownTest(String),
    /// The catalog document itself doesn't have the expected layout
    InvalidCatalog(String),
    /// The snapshot has no output captured for this command
    MissingCommand(String),
    /// The device answered this command with an error
    CommandFailed { command: String, errors: Vec<String> },
    /// The device doesn't support this command on its platform
    Unsupported(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::IoError(err) => write!(f, "IO operation failed: {}", err),
            Error::JsonError(err) => write!(f, "failed to decode json: {}", err),
            Error::SchemaError(msg) => write!(f, "invalid inputs: {}", msg),
            Error::UnknownTest(name) => write!(f, "unknown test {}", name),
            Error::InvalidCatalog(msg) => write!(f, "invalid catalog: {}", msg),
            Error::MissingCommand(cmd) => write!(f, "no output captured for '{}'", cmd),
            Error::CommandFailed { command, errors } => {
                write!(f, "command '{}' failed", command)?;
                if !errors.is_empty() {
                    write!(f, ": {}", errors.join(", "))?;
                }
                Ok(())
            }
            Error::Unsupported(cmd) => {
                write!(f, "'{}' is not supported on this hardware platform", cmd)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::IoError(err) => Some(err),
            Self::JsonError(err) => Some(err),
            _ => None,
        }
    }
}

impl Error {
    pub fn schema<S: Into<String>>(msg: S) -> Self {
        Self::SchemaError(msg.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::JsonError(err)
    }
}

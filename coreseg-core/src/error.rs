use std::fmt;
use std::process::ExitStatus;

/// Errors produced while extracting segments.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The introspection tool could not be started.
    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The introspection tool ran but did not exit successfully.
    #[error("`{program}` exited unsuccessfully ({status})")]
    ToolExit { program: String, status: ExitStatus },

    /// The tool output did not follow the expected marker layout.
    #[error("tool output out of sync: {0}")]
    Desync(#[from] Desync),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse object file: {0}")]
    Object(#[from] goblin::error::Error),

    #[error("unsupported object file: {0}")]
    Unsupported(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// A point where a scanner lost track of the segment layout.
///
/// When a scanner reports one of these its state machine has already moved
/// on. The caller decides whether the event is fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Desync {
    /// An address was captured but never paired with a size.
    UnmatchedAddress { address: String, line: usize },
    /// A marker or size line had fewer fields than expected.
    MissingField { field: &'static str, line: usize },
}

impl fmt::Display for Desync {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Desync::UnmatchedAddress { address, line } => {
                write!(f, "address {address} from line {line} has no matching size")
            }
            Desync::MissingField { field, line } => {
                write!(f, "line {line} is missing the {field} value")
            }
        }
    }
}

impl std::error::Error for Desync {}

impl Error {
    /// Failures that lenient mode logs and moves past instead of aborting.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Spawn { .. } | Error::ToolExit { .. } | Error::Desync(_)
        )
    }
}

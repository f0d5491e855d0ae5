//! Errors raised while reading experiment logs.

use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Fatal conditions met while reading experiment files.
///
/// None of them is recoverable: the report tool prints the message and exits with [`exit_code()`](Self::exit_code).
#[derive(Debug)]
pub enum ReportError {
    /// Input file could not be opened or read, or an output file could not be written.
    Io { path: PathBuf, source: std::io::Error },
    /// Run header or event directory names a placement algorithm missing from the name table.
    UnknownAlgorithm(String),
    /// Run header does not carry the `-D<property>=<class>` part naming the algorithm.
    MissingAlgorithm(String),
    /// Token is not one of `true`, `True`, `false`, `False`.
    InvalidBoolean(String),
    /// Numeric field does not fit its type.
    InvalidNumber(String),
    /// Node is turned on while it is already on.
    NodeAlreadyOn { node: String, since: f64, time: f64 },
    /// Node is turned off while it is not on.
    NodeNotOn { node: String, time: f64 },
    /// Line of the energy table does not follow the expected layout.
    MalformedEnergyLine { line_no: usize, line: String },
    /// Energy table is read before the run log has provided the simulation duration.
    UnknownDuration,
    /// Simulation ended before its first whole second, so energy cannot be averaged over it.
    ZeroDuration,
    /// Event line appears before any run header.
    NoActiveRun { line_no: usize, line: String },
    /// Chart could not be drawn or saved.
    Render { path: PathBuf, message: String },
}

impl ReportError {
    /// Returns the process exit code for this error.
    ///
    /// Bad boolean tokens keep their own code 3, every other failure exits with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            ReportError::InvalidBoolean(_) => 3,
            _ => 1,
        }
    }

    pub fn io(path: &Path) -> impl FnOnce(std::io::Error) -> ReportError + '_ {
        move |source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl Display for ReportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportError::Io { path, source } => write!(f, "{}: {}", path.display(), source),
            ReportError::UnknownAlgorithm(name) => write!(f, "Unknown algorithm {}", name),
            ReportError::MissingAlgorithm(line) => write!(f, "No algorithm in run header: {}", line),
            ReportError::InvalidBoolean(token) => write!(f, "{} is not a boolean", token),
            ReportError::InvalidNumber(token) => write!(f, "{} is not a valid number", token),
            ReportError::NodeAlreadyOn { node, since, time } => {
                write!(f, "Node {} was already on since {:.2} (at {:.2})", node, since, time)
            }
            ReportError::NodeNotOn { node, time } => write!(f, "Node {} was not on (at {:.2})", node, time),
            ReportError::MalformedEnergyLine { line_no, line } => {
                write!(f, "Malformed energy line {}: {:?}", line_no, line)
            }
            ReportError::UnknownDuration => {
                f.write_str("Simulation duration is unknown, no End of Injection in run log")
            }
            ReportError::ZeroDuration => f.write_str("Simulation lasted less than one second"),
            ReportError::NoActiveRun { line_no, line } => {
                write!(f, "Line {} comes before any run header: {:?}", line_no, line)
            }
            ReportError::Render { path, message } => write!(f, "Cannot draw {}: {}", path.display(), message),
        }
    }
}

impl std::error::Error for ReportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReportError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

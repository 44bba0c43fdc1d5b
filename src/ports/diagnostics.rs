use std::fmt;

/// Notable, non-fatal events raised while running the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The storage file could not be used and the store starts empty
    StoreReset { path: String, reason: String },
    /// A required parameter had no example value
    MissingExample { endpoint: String, parameter: String },
    /// An endpoint was left out of the probe set
    EndpointExcluded { endpoint: String, reason: String },
    /// Old observations were evicted to respect the space budget
    HistoryTrimmed { endpoint: String, from: usize, to: usize },
    /// Endpoints present in storage but no longer probed
    EndpointsDropped { endpoints: Vec<String> },
    /// An alert sink returned an error
    AlertFailed { endpoint: String, sink: String, reason: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StoreReset { path, reason } => {
                write!(f, "no usable storage at {path}, starting fresh: {reason}")
            }
            Self::MissingExample { endpoint, parameter } => {
                write!(f, "no example value for parameter {parameter} in {endpoint}")
            }
            Self::EndpointExcluded { endpoint, reason } => write!(f, "skipping {endpoint}: {reason}"),
            Self::HistoryTrimmed { endpoint, from, to } => {
                write!(f, "trimmed history for {endpoint} from {from} to {to} items")
            }
            Self::EndpointsDropped { endpoints } => {
                write!(f, "dropped {} stale endpoint(s): {}", endpoints.len(), endpoints.join(", "))
            }
            Self::AlertFailed { endpoint, sink, reason } => {
                write!(f, "alert {sink} failed for {endpoint}: {reason}")
            }
        }
    }
}

/// Port for reporting diagnostics
pub trait Diagnostics: Send + Sync {
    fn emit(&self, diagnostic: Diagnostic);
}

use thiserror::Error;

/// Errors produced while loading a result log or assembling a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// A record in the result log could not be parsed. This is fatal for the
    /// whole load: a partial dataset would corrupt the derived start/finish
    /// timestamps.
    #[error("malformed record at line {line}: {reason}")]
    MalformedRecord { line: u64, reason: String },

    /// No records were retained within the run time limit.
    #[error("no records retained within the run time limit")]
    EmptyDataset,

    /// A timer produced no samples, so no statistics can be computed over it.
    #[error("cannot compute statistics over an empty sample set")]
    EmptySeries,

    /// Interval width must be strictly positive.
    #[error("interval width must be positive, got {interval}")]
    InvalidInterval { interval: f64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;

use std::path::PathBuf;

/// Errors produced while building a report.
///
/// Every variant is fatal: the run stops at the first one and nothing is
/// written unless extraction already finished.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error on {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("invalid config {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },

    #[error("invalid counter pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("counter pattern needs two capture groups (name, value), found {0}")]
    PatternGroups(usize),
}

impl ReportError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReportError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        ReportError::Csv {
            path: path.into(),
            source,
        }
    }
}

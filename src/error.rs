use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failures that abort an invocation or that a caller must decide about.
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("failed to launch browser session: {0}")]
    Launch(String),
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },
    #[error("timed out after {timeout:?} waiting for `{selector}`")]
    WaitTimeout { selector: String, timeout: Duration },
    #[error("script evaluation failed: {0}")]
    Script(String),
    #[error("could not read page content: {0}")]
    Content(String),
    #[error("failed to write {path}: {source}")]
    Sink {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("invalid configuration value for {key}: {value}")]
    Config { key: &'static str, value: String },
}

impl ScrapeError {
    /// Launch, sink and configuration failures end the run; everything else is absorbed per target.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ScrapeError::Launch(_) | ScrapeError::Sink { .. } | ScrapeError::Config { .. })
    }
}

/// Why a single field fell back to the sentinel.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("selector `{0}` matched nothing")]
    NoMatch(String),
    #[error("nested selector `{selector}` (step {step}) matched nothing")]
    MissingNested { step: usize, selector: String },
    #[error("attribute `{0}` not present")]
    MissingAttribute(&'static str),
    #[error("matched element has no text")]
    Empty,
    #[error("invalid selector `{0}`")]
    InvalidSelector(String),
}

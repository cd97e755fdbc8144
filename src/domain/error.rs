// ============================================================
// Layer 3: Error Taxonomy
// ============================================================
// Every fallible operation below the application layer returns
// a QaResult. The variants follow the failure classes of the
// pipeline:
//
//   Cancelled  : a cancellation checkpoint fired (terminal)
//   Download   : transport failure while fetching an artifact;
//                the retry loop recovers from these
//   ModelLoad  : the engine could not load the artifact, even
//                after a fresh download
//   Inference  : the engine failed while running
//   Tokenizer  : the tokenizer could not be loaded or failed
//   Config     : invalid configuration values, reported by
//                QaConfig::validate before anything starts
//   Io         : local filesystem failures
//
// The enum is Clone because one acquisition result is handed
// to every request waiting on it, so causes are kept as
// strings rather than boxed sources.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QaError {
    #[error("operation cancelled")]
    Cancelled,

    #[error("download failed: {0}")]
    Download(String),

    #[error("model load failed: {0}")]
    ModelLoad(String),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("tokenizer error: {0}")]
    Tokenizer(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl QaError {
    /// True for failures the download loop retries after a backoff.
    pub fn is_transient(&self) -> bool {
        matches!(self, QaError::Download(_))
    }
}

impl From<std::io::Error> for QaError {
    fn from(e: std::io::Error) -> Self {
        QaError::Io(e.to_string())
    }
}

pub type QaResult<T> = Result<T, QaError>;

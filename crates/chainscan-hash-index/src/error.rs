use chainscan_primitives::ScriptError;
use std::path::PathBuf;

/// Hash index error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("no hash index store at {}", .0.display())]
    StoreMissing(PathBuf),

    /// The dedup script store served a missing or garbled record. Fatal for
    /// the transaction being indexed; an incorrect hash entry would corrupt
    /// lookups permanently.
    #[error(transparent)]
    Script(#[from] ScriptError),
}

pub type Result<T> = std::result::Result<T, Error>;

use std::fmt;

use locsync_store::StoreError;

#[derive(Debug)]
pub enum SyncError {
    /// The external store failed; the pass aborts with nothing applied.
    Store(StoreError),
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (no tables, blank column names, etc.).
    ConfigValidation(String),
    /// A value could not be flattened into record fields (not a JSON
    /// object, or the key field is missing).
    RecordEncode(String),
    /// An apply was requested without a preceding diff pass.
    NoDiffPass,
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::RecordEncode(msg) => write!(f, "record encode error: {msg}"),
            Self::NoDiffPass => write!(f, "no diff pass: compute_diffs must run before apply"),
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for SyncError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

use std::fmt;

#[derive(Debug)]
pub enum StoreError {
    /// The store could not be reached or refused the operation
    /// (network, auth, missing table).
    Unavailable(String),
    /// The table grid cannot serve as a key-addressed table
    /// (e.g. no header row).
    MalformedTable(String),
    /// A write was addressed with an unparseable or out-of-table range.
    BadRange(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(msg) => write!(f, "store unavailable: {msg}"),
            Self::MalformedTable(msg) => write!(f, "malformed table: {msg}"),
            Self::BadRange(msg) => write!(f, "bad range: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

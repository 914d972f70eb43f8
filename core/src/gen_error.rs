use std::path::PathBuf;

/// GenError denotes errors that can occur while building or saving test programs.
#[derive(Debug, thiserror::Error)]
pub enum GenError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid catalog: {0}")]
    Catalog(#[from] serde_json::Error),

    #[error("Invalid request for `{mnemonic}`: {reason}")]
    InvalidRequest { mnemonic: String, reason: String },

    #[error("No {pool} register left to pick for `{mnemonic}`")]
    EmptyPool { mnemonic: String, pool: &'static str },

    #[error("Jump offset {offset} for `{mnemonic}` does not fit a 12-bit signed immediate")]
    JumpOutOfRange { mnemonic: String, offset: u64 },

    #[error("Jump offset `{offset}` of `{mnemonic}` does not land on a body label up to {exit}")]
    BadJumpOffset { mnemonic: String, offset: String, exit: usize },

    #[error("Label `{0}` is referenced but never defined")]
    UndefinedLabel(String),

    #[error("Label `{label}` is defined {count} times")]
    DuplicateLabel { label: String, count: usize },
}

impl GenError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GenError::Io { path: path.into(), source }
    }
}

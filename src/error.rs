//! Error types shared by the classifier, the rewriter and the CLI.
//!
//! Library code only ever returns these; deciding the process exit status
//! is left to `main.rs` through [`BomError::exit_code`].

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Everything that can stop a strip operation
#[derive(Debug, Error)]
pub enum BomError {
    /// Bad command line invocation
    #[error("Invalid syntax, please pass file name as argument")]
    Usage,

    /// Open/seek/read/write failure not explained by end-of-file
    #[error("Failed to {context} {}: {source}", path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// End-of-file arrived before the expected number of bytes
    #[error(
        "Error reading {}: unexpected end of file (expected {expected} bytes, got {actual})",
        path.display()
    )]
    TruncatedInput {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },

    /// The file is now smaller than the signature that was classified
    #[error(
        "{} shrank to {total} bytes, smaller than its {signature_len}-byte signature",
        path.display()
    )]
    CorruptState {
        path: PathBuf,
        total: u64,
        signature_len: usize,
    },

    #[error("Failed to allocate {bytes} bytes for new file")]
    AllocationFailure { bytes: u64 },

    /// Output name would be the input name (file has no extension)
    #[error(
        "Refusing to overwrite {}: file name has no extension to insert a suffix before",
        path.display()
    )]
    NamingConflict { path: PathBuf },

    #[error("Verification failed: {} does not match the stripped payload", path.display())]
    VerificationFailed { path: PathBuf },

    #[error("Invalid configuration: {0:#}")]
    Config(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, BomError>;

impl BomError {
    /// Build an [`BomError::Io`] for the given action and path
    pub fn io(context: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            context,
            path: path.into(),
            source,
        }
    }

    /// Process exit status for this error.
    ///
    /// Usage errors exit 0, everything else gets its own non-zero code.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Usage => 0,
            Self::Io { .. } => 1,
            Self::TruncatedInput { .. } => 2,
            Self::CorruptState { .. } => 3,
            Self::AllocationFailure { .. } => 4,
            Self::NamingConflict { .. } => 5,
            Self::VerificationFailed { .. } => 6,
            Self::Config(_) => 7,
        }
    }

    /// Short machine-readable kind, used in JSON output
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Usage => "usage",
            Self::Io { .. } => "io",
            Self::TruncatedInput { .. } => "truncated_input",
            Self::CorruptState { .. } => "corrupt_state",
            Self::AllocationFailure { .. } => "allocation_failure",
            Self::NamingConflict { .. } => "naming_conflict",
            Self::VerificationFailed { .. } => "verification_failed",
            Self::Config(_) => "config",
        }
    }
}

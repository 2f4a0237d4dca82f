//! Error taxonomy for a remediation run.
//!
//! Fetch failures and validation failures never appear here: they are
//! absorbed into `ResearchItem` and `ValidationResult` values respectively.

use std::path::PathBuf;

/// Errors that stop (or degrade) a remediation run.
#[derive(Debug, thiserror::Error)]
pub enum RemediationError {
    #[error("missing credential: environment variable {var} is not set")]
    MissingCredential { var: String },

    #[error("invalid configuration: {0}")]
    Setup(String),

    #[error("cannot read target artifact {path:?}: {source}")]
    ArtifactRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("target artifact {path:?} is empty")]
    EmptyArtifact { path: PathBuf },

    #[error("analysis failed: {0}")]
    Analysis(String),

    #[error("patch synthesis failed: {0}")]
    Synthesis(String),

    #[error("report synthesis failed: {0}")]
    Report(String),

    #[error("cannot write {path:?}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("backup {path:?} does not match original content: expected {expected}, got {actual}")]
    BackupMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RemediationError {
    /// Startup conditions abort before any stage runs or any file is written.
    pub fn is_startup(&self) -> bool {
        matches!(
            self,
            RemediationError::MissingCredential { .. }
                | RemediationError::Setup(_)
                | RemediationError::ArtifactRead { .. }
                | RemediationError::EmptyArtifact { .. }
        )
    }

    /// Write failures are recorded in-band rather than aborting the run.
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            RemediationError::Persistence { .. } | RemediationError::BackupMismatch { .. }
        )
    }
}

/// Result type for remediation operations.
pub type Result<T> = std::result::Result<T, RemediationError>;

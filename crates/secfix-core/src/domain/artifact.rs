//! The artifact under repair and its on-disk lifecycle.
//!
//! The original content is read once and never mutated. Overwriting the live
//! path requires a [`BackupReceipt`], which only [`RemediationArtifact::write_backup`]
//! can produce after the backup has been written and its digest verified.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::domain::error::{RemediationError, Result};

/// SHA-256 hex digest of artifact content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDigest(String);

impl ContentDigest {
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        ContentDigest(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form (first 12 hex chars).
    pub fn short(&self) -> &str {
        &self.0[..12.min(self.0.len())]
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Proof that a verified backup of the original content exists on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupReceipt {
    path: PathBuf,
    digest: ContentDigest,
}

impl BackupReceipt {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn digest(&self) -> &ContentDigest {
        &self.digest
    }
}

/// Target artifact: original content, backup location, and patched content
/// once applied.
#[derive(Debug, Clone)]
pub struct RemediationArtifact {
    target_path: PathBuf,
    backup_path: PathBuf,
    original_content: String,
    patched_content: Option<String>,
}

impl RemediationArtifact {
    /// Read the target artifact. Failure here is a startup error, and so is
    /// a blank file: there is nothing to analyze.
    pub fn load(target_path: impl Into<PathBuf>) -> Result<Self> {
        let target_path = target_path.into();
        let original_content = std::fs::read_to_string(&target_path).map_err(|source| {
            RemediationError::ArtifactRead {
                path: target_path.clone(),
                source,
            }
        })?;
        if original_content.trim().is_empty() {
            return Err(RemediationError::EmptyArtifact { path: target_path });
        }
        Ok(Self::from_content(target_path, original_content))
    }

    pub fn from_content(target_path: impl Into<PathBuf>, original_content: String) -> Self {
        let target_path = target_path.into();
        let backup_path = Self::backup_path_for(&target_path);
        Self {
            target_path,
            backup_path,
            original_content,
            patched_content: None,
        }
    }

    /// `<target>.bak`, keeping the original extension in place.
    pub fn backup_path_for(target: &Path) -> PathBuf {
        let mut raw = target.as_os_str().to_owned();
        raw.push(".bak");
        PathBuf::from(raw)
    }

    pub fn target_path(&self) -> &Path {
        &self.target_path
    }

    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }

    pub fn original_content(&self) -> &str {
        &self.original_content
    }

    pub fn patched_content(&self) -> Option<&str> {
        self.patched_content.as_deref()
    }

    pub fn original_digest(&self) -> ContentDigest {
        ContentDigest::from_bytes(self.original_content.as_bytes())
    }

    pub fn patched_digest(&self) -> Option<ContentDigest> {
        self.patched_content
            .as_ref()
            .map(|c| ContentDigest::from_bytes(c.as_bytes()))
    }

    /// Write the original content to the backup path and verify it by digest.
    pub fn write_backup(&self) -> Result<BackupReceipt> {
        let expected = self.original_digest();
        std::fs::write(&self.backup_path, self.original_content.as_bytes()).map_err(|source| {
            RemediationError::Persistence {
                path: self.backup_path.clone(),
                source,
            }
        })?;

        let written =
            std::fs::read(&self.backup_path).map_err(|source| RemediationError::Persistence {
                path: self.backup_path.clone(),
                source,
            })?;
        let actual = ContentDigest::from_bytes(&written);
        if actual != expected {
            return Err(RemediationError::BackupMismatch {
                path: self.backup_path.clone(),
                expected: expected.to_string(),
                actual: actual.to_string(),
            });
        }

        debug!(path = %self.backup_path.display(), digest = %expected.short(), "backup verified");
        Ok(BackupReceipt {
            path: self.backup_path.clone(),
            digest: expected,
        })
    }

    /// Overwrite the live path with `patched`.
    ///
    /// The receipt must belong to this artifact's backup.
    pub fn apply_patch(&mut self, receipt: &BackupReceipt, patched: String) -> Result<()> {
        if receipt.path != self.backup_path || receipt.digest != self.original_digest() {
            return Err(RemediationError::BackupMismatch {
                path: receipt.path.clone(),
                expected: self.original_digest().to_string(),
                actual: receipt.digest.to_string(),
            });
        }

        std::fs::write(&self.target_path, patched.as_bytes()).map_err(|source| {
            RemediationError::Persistence {
                path: self.target_path.clone(),
                source,
            }
        })?;
        self.patched_content = Some(patched);
        Ok(())
    }

    /// Line counts (original, patched) for the report's fix summary.
    pub fn line_counts(&self) -> (usize, Option<usize>) {
        (
            self.original_content.lines().count(),
            self.patched_content.as_ref().map(|p| p.lines().count()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn backup_path_appends_suffix() {
        let p = RemediationArtifact::backup_path_for(Path::new("src/file_reader.py"));
        assert_eq!(p, PathBuf::from("src/file_reader.py.bak"));
    }

    #[test]
    fn load_missing_file_is_artifact_read_error() {
        let dir = tempdir().unwrap();
        let err = RemediationArtifact::load(dir.path().join("absent.py")).unwrap_err();
        assert!(matches!(err, RemediationError::ArtifactRead { .. }));
    }

    #[test]
    fn load_blank_file_is_startup_error() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("blank.py");
        std::fs::write(&target, " \n\t\n").unwrap();

        let err = RemediationArtifact::load(&target).unwrap_err();
        assert!(matches!(err, RemediationError::EmptyArtifact { .. }));
        assert!(err.is_startup());
        assert!(!RemediationArtifact::backup_path_for(&target).exists());
    }

    #[test]
    fn backup_then_patch_preserves_original() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("app.py");
        std::fs::write(&target, "print('old')\n").unwrap();

        let mut artifact = RemediationArtifact::load(&target).unwrap();
        let receipt = artifact.write_backup().unwrap();
        artifact
            .apply_patch(&receipt, "print('new')\n".to_string())
            .unwrap();

        assert_eq!(
            std::fs::read_to_string(artifact.backup_path()).unwrap(),
            "print('old')\n"
        );
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "print('new')\n");
        assert_eq!(artifact.original_content(), "print('old')\n");
        assert_eq!(artifact.line_counts(), (1, Some(1)));
    }

    #[test]
    fn receipt_from_another_artifact_is_refused() {
        let dir = tempdir().unwrap();
        let a_path = dir.path().join("a.py");
        let b_path = dir.path().join("b.py");
        std::fs::write(&a_path, "a = 1\n").unwrap();
        std::fs::write(&b_path, "b = 2\n").unwrap();

        let a = RemediationArtifact::load(&a_path).unwrap();
        let mut b = RemediationArtifact::load(&b_path).unwrap();
        let receipt = a.write_backup().unwrap();

        let err = b.apply_patch(&receipt, "b = 3\n".to_string()).unwrap_err();
        assert!(matches!(err, RemediationError::BackupMismatch { .. }));
        assert_eq!(std::fs::read_to_string(&b_path).unwrap(), "b = 2\n");
    }

    #[test]
    fn digest_short_form() {
        let d = ContentDigest::from_bytes(b"hello");
        assert_eq!(d.as_str().len(), 64);
        assert_eq!(d.short().len(), 12);
    }
}

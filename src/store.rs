//! Content-addressed artifact store.
//!
//! Resolves a base directory (`$LK_MODEL_PATH`, then the platform data
//! directory, then a hardcoded fallback), downloads catalog files into it on
//! demand, and verifies every file against its declared SHA-256 before
//! treating it as usable.

use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use sha2::{Digest, Sha256};
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::catalog::{CatalogFile, ModelInfo};
use crate::error::{Result, TurnDetectorError};

const BASE_DIR_ENV: &str = "LK_MODEL_PATH";
const FALLBACK_BASE_DIR: &str = "/tmp/livekit-models";

/// Filesystem-backed, SHA-256-verified cache of model artifacts.
pub struct ArtifactStore {
    base: PathBuf,
    client: reqwest::Client,
}

impl ArtifactStore {
    /// Resolves the base directory from the environment and builds a store
    /// rooted there.
    pub fn new() -> Self {
        Self::with_base(Self::resolve_base_dir())
    }

    /// Builds a store rooted at an explicit directory, bypassing env
    /// resolution. Used when [`crate::config::DetectorConfig::model_path`]
    /// is set.
    pub fn with_base(base: PathBuf) -> Self {
        Self {
            base,
            client: reqwest::Client::new(),
        }
    }

    fn resolve_base_dir() -> PathBuf {
        if let Ok(path) = std::env::var(BASE_DIR_ENV) {
            if !path.is_empty() {
                return PathBuf::from(path);
            }
        }
        if let Some(home) = dirs::home_dir() {
            return home.join(".livekit").join("models");
        }
        PathBuf::from(FALLBACK_BASE_DIR)
    }

    /// Directory holding one model revision's files.
    #[must_use]
    pub fn model_dir(&self, info: &ModelInfo) -> PathBuf {
        self.base.join("turn-detector").join(info.revision)
    }

    /// Full path for one manifest file within a revision.
    #[must_use]
    pub fn file_path(&self, info: &ModelInfo, file: &CatalogFile) -> PathBuf {
        self.model_dir(info).join(file.relpath)
    }

    /// Whether every file in `info`'s manifest is present on disk and
    /// passes SHA-256 verification.
    pub async fn status(&self, info: &ModelInfo) -> bool {
        for file in info.files {
            let path = self.file_path(info, file);
            if !Self::is_valid(&path, file.sha256).await {
                return false;
            }
        }
        true
    }

    /// Ensures every file in `info`'s manifest exists locally and is valid,
    /// downloading whatever is missing or fails verification.
    ///
    /// # Errors
    ///
    /// Returns [`TurnDetectorError::DownloadFailed`] on a non-2xx response,
    /// [`TurnDetectorError::IntegrityMismatch`] if a freshly downloaded file
    /// still fails verification, or [`TurnDetectorError::Io`] on filesystem
    /// failures.
    pub async fn ensure_downloaded(&self, info: &ModelInfo) -> Result<()> {
        for file in info.files {
            let path = self.file_path(info, file);
            if Self::is_valid(&path, file.sha256).await {
                continue;
            }
            self.download_one(info, file, &path).await?;
        }
        Ok(())
    }

    async fn download_one(&self, info: &ModelInfo, file: &CatalogFile, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let url = format!(
            "https://{}/{}/resolve/{}/{}",
            info.host, info.repo_id, info.revision, file.relpath
        );

        info!(url = %url, path = %path.display(), "downloading model artifact");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TurnDetectorError::DownloadFailed {
                url,
                status: status.as_u16(),
            });
        }

        let mut out = tokio::fs::File::create(path).await?;
        let mut stream = response.bytes_stream();
        let write_result: Result<()> = async {
            while let Some(chunk) = stream.next().await {
                let chunk = chunk?;
                out.write_all(&chunk).await?;
            }
            out.flush().await?;
            Ok(())
        }
        .await;
        drop(out);
        if let Err(err) = write_result {
            let _ = tokio::fs::remove_file(path).await;
            return Err(err);
        }

        if !Self::is_valid(path, file.sha256).await {
            let actual = Self::sha256_hex(path).await.unwrap_or_default();
            let _ = tokio::fs::remove_file(path).await;
            warn!(path = %path.display(), "downloaded artifact failed verification");
            return Err(TurnDetectorError::IntegrityMismatch {
                path: path.display().to_string(),
                expected: file.sha256.to_owned(),
                actual,
            });
        }

        Ok(())
    }

    async fn is_valid(path: &Path, expected_sha256: &str) -> bool {
        let Ok(metadata) = tokio::fs::metadata(path).await else {
            return false;
        };
        if metadata.len() == 0 {
            return false;
        }
        match Self::sha256_hex(path).await {
            Ok(actual) => actual == expected_sha256,
            Err(_) => false,
        }
    }

    async fn sha256_hex(path: &Path) -> std::io::Result<String> {
        let path = path.to_owned();
        tokio::task::spawn_blocking(move || {
            use std::io::Read;
            let mut file = std::fs::File::open(&path)?;
            let mut hasher = Sha256::new();
            let mut buf = [0_u8; 65536];
            loop {
                let n = file.read(&mut buf)?;
                if n == 0 {
                    break;
                }
                hasher.update(&buf[..n]);
            }
            Ok(format!("{:x}", hasher.finalize()))
        })
        .await
        .expect("sha256 blocking task panicked")
    }
}

impl Default for ArtifactStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::AssetKind;
    use tempfile::tempdir;

    fn file_spec() -> CatalogFile {
        CatalogFile {
            relpath: "thing.bin",
            sha256: "2c26b46b68ffc68ff99b453c1d30413413422d706483bfa0f98a5e886266e7ae",
            kind: AssetKind::Model,
        }
    }

    #[tokio::test]
    async fn is_valid_false_for_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nope.bin");
        assert!(!ArtifactStore::is_valid(&path, "whatever").await);
    }

    #[tokio::test]
    async fn is_valid_true_for_matching_hash() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.bin");
        tokio::fs::write(&path, b"a").await.unwrap();
        let expected = ArtifactStore::sha256_hex(&path).await.unwrap();
        assert!(ArtifactStore::is_valid(&path, &expected).await);
    }

    #[tokio::test]
    async fn is_valid_false_for_mismatched_hash() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.bin");
        tokio::fs::write(&path, b"a").await.unwrap();
        assert!(!ArtifactStore::is_valid(&path, "deadbeef").await);
    }

    #[tokio::test]
    async fn is_valid_false_for_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.bin");
        tokio::fs::write(&path, b"").await.unwrap();
        let empty_hash = ArtifactStore::sha256_hex(&path).await.unwrap();
        assert!(!ArtifactStore::is_valid(&path, &empty_hash).await);
    }

    #[test]
    fn model_dir_and_file_path_nest_by_name_and_revision() {
        let store = ArtifactStore::with_base(PathBuf::from("/base"));
        let info = crate::catalog::ENGLISH;
        let dir = store.model_dir(&info);
        assert_eq!(dir, PathBuf::from("/base/turn-detector/v1.2.2-en"));
        let file = file_spec();
        assert_eq!(
            store.file_path(&info, &file),
            PathBuf::from("/base/turn-detector/v1.2.2-en/thing.bin")
        );
    }

    #[test]
    fn resolve_base_dir_honors_env_override() {
        std::env::set_var(BASE_DIR_ENV, "/custom/models");
        let resolved = ArtifactStore::resolve_base_dir();
        std::env::remove_var(BASE_DIR_ENV);
        assert_eq!(resolved, PathBuf::from("/custom/models"));
    }
}

//! Static registry of known model revisions.
//!
//! Each [`ModelInfo`] names exactly one remote repository coordinate and an
//! ordered manifest of the three logical files a revision ships: the model
//! blob, the tokenizer manifest, and the language threshold table.
//!
//! Earlier catalog formats kept a second filename → hash map alongside the
//! per-file manifest, and the two could disagree. Here the [`CatalogFile`]
//! hash is the only source of truth for a file's expected digest, so that
//! inconsistency cannot arise by construction.

use crate::error::{Result, TurnDetectorError};

/// Which logical role a manifest entry plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Model,
    Tokenizer,
    Languages,
}

/// A single file declared by a [`ModelInfo`] manifest.
#[derive(Debug, Clone, Copy)]
pub struct CatalogFile {
    /// Path relative to the revision's artifact directory.
    pub relpath: &'static str,
    /// Expected SHA-256 hex digest.
    pub sha256: &'static str,
    pub kind: AssetKind,
}

/// A known model revision and where to fetch it.
#[derive(Debug, Clone, Copy)]
pub struct ModelInfo {
    pub name: &'static str,
    pub host: &'static str,
    pub repo_id: &'static str,
    pub revision: &'static str,
    pub size_bytes: u64,
    pub files: &'static [CatalogFile],
}

impl ModelInfo {
    /// The manifest entry for the model blob itself.
    ///
    /// # Panics
    ///
    /// Panics if the catalog entry was built without a `Model` file — every
    /// compiled-in [`ModelInfo`] is expected to declare exactly one.
    #[must_use]
    pub fn model_file(&self) -> &'static CatalogFile {
        self.files
            .iter()
            .find(|f| f.kind == AssetKind::Model)
            .expect("catalog entry missing a model file")
    }

    #[must_use]
    pub fn tokenizer_file(&self) -> &'static CatalogFile {
        self.files
            .iter()
            .find(|f| f.kind == AssetKind::Tokenizer)
            .expect("catalog entry missing a tokenizer file")
    }

    #[must_use]
    pub fn languages_file(&self) -> &'static CatalogFile {
        self.files
            .iter()
            .find(|f| f.kind == AssetKind::Languages)
            .expect("catalog entry missing a languages file")
    }
}

const ENGLISH_FILES: &[CatalogFile] = &[
    CatalogFile {
        relpath: "onnx/model_q8.onnx",
        sha256: "1f2d7c4b6a0e3d8c5f91a2b4e6d0c8a7b3f5e1d9c2a4b6e8f0d2c4a6b8e0f2d4",
        kind: AssetKind::Model,
    },
    CatalogFile {
        relpath: "tokenizer.json",
        sha256: "7a3e5c1b9d2f4a6e8c0b2d4f6a8c0e2b4d6f8a0c2e4b6d8f0a2c4e6b8d0f2a4c",
        kind: AssetKind::Tokenizer,
    },
    CatalogFile {
        relpath: "languages.json",
        sha256: "2b4d6f8a0c2e4b6d8f0a2c4e6b8d0f2a4c6e8b0d2f4a6c8e0b2d4f6a8c0e2b4d",
        kind: AssetKind::Languages,
    },
];

const MULTILINGUAL_FILES: &[CatalogFile] = &[
    CatalogFile {
        relpath: "onnx/model_q8.onnx",
        sha256: "9c1e3a5d7b0f2c4e6a8d0b2f4c6e8a0d2b4f6c8e0a2d4f6b8c0e2a4d6f8b0c2e",
        kind: AssetKind::Model,
    },
    CatalogFile {
        relpath: "tokenizer.json",
        sha256: "4e6a8c0d2b4f6c8e0a2d4f6b8c0e2a4d6f8b0c2e4a6c8e0b2d4f6a8c0e2b4d6f",
        kind: AssetKind::Tokenizer,
    },
    CatalogFile {
        relpath: "languages.json",
        sha256: "8c0e2a4d6f8b0c2e4a6c8e0b2d4f6a8c0e2b4d6f8a0c2e4b6d8f0a2c4e6b8d0f",
        kind: AssetKind::Languages,
    },
];

/// English-only model. Smaller, lower latency, default choice.
pub const ENGLISH: ModelInfo = ModelInfo {
    name: "english",
    host: "huggingface.co",
    repo_id: "livekit/turn-detector",
    revision: "v1.2.2-en",
    size_bytes: 66_000_000,
    files: ENGLISH_FILES,
};

/// Multilingual model covering the languages listed in its `languages.json`.
pub const MULTILINGUAL: ModelInfo = ModelInfo {
    name: "multilingual",
    host: "huggingface.co",
    repo_id: "livekit/turn-detector-multilingual",
    revision: "v1.2.2-multi",
    size_bytes: 89_000_000,
    files: MULTILINGUAL_FILES,
};

/// Look up a model by catalog name.
///
/// # Errors
///
/// Returns [`TurnDetectorError::UnknownModel`] for any name outside
/// `{"english", "multilingual"}`.
pub fn lookup(name: &str) -> Result<&'static ModelInfo> {
    match name {
        "english" => Ok(&ENGLISH),
        "multilingual" => Ok(&MULTILINGUAL),
        other => Err(TurnDetectorError::UnknownModel(other.to_owned())),
    }
}

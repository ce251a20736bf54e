//! Error types for the turn detector.

/// Top-level error type for the end-of-utterance detector.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TurnDetectorError {
    /// Requested model name is not in the catalog.
    #[error("unknown model: {0}")]
    UnknownModel(String),

    /// A required artifact file is absent on disk.
    #[error("required asset missing: {0}")]
    AssetMissing(String),

    /// An artifact file exists but could not be parsed/loaded.
    #[error("asset corrupt or unreadable: {0}")]
    AssetCorrupt(String),

    /// A downloaded file's SHA-256 disagrees with the catalog.
    #[error("integrity mismatch for {path}: expected {expected}, got {actual}")]
    IntegrityMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    /// An HTTP download of a model artifact failed.
    #[error("download failed for {url} (status {status})")]
    DownloadFailed { url: String, status: u16 },

    /// The native inference runtime failed to initialize.
    #[error("runtime initialization failed: {0}")]
    RuntimeInit(String),

    /// The tokenizer rejected the input.
    #[error("tokenization failed: {0}")]
    TokenizationFailed(String),

    /// The native inference call failed.
    #[error("inference failed: {0}")]
    InferenceFailed(String),

    /// The remote detector failed and no fallback was configured.
    #[error("remote detector unavailable: {0}")]
    RemoteUnavailable(String),

    /// A threshold was requested for a language the table doesn't know.
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// The caller's cancellation handle fired.
    #[error("operation cancelled")]
    Cancelled,

    /// Filesystem I/O error.
    ///
    /// Stored as a message rather than `std::io::Error` directly so this
    /// type stays `Clone` — lazy assets cache their load outcome for the
    /// lifetime of the detector and need to hand the same error back to
    /// every caller (see [`crate::asset::OnceAsset`]).
    #[error("I/O error: {0}")]
    Io(String),

    /// HTTP transport or decode error.
    #[error("HTTP error: {0}")]
    Http(String),
}

impl From<std::io::Error> for TurnDetectorError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<reqwest::Error> for TurnDetectorError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.to_string())
    }
}

impl TurnDetectorError {
    /// Whether the underlying cause is likely to succeed on retry
    /// (transport blips, timeouts) as opposed to fatal (bad config,
    /// corrupt artifacts, unknown model).
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Http(_) | Self::DownloadFailed { .. } | Self::Cancelled)
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, TurnDetectorError>;

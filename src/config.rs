//! Configuration for the turn detector.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable that selects the remote endpoint when
/// [`DetectorConfig::remote_url`] is left unset.
pub const REMOTE_URL_ENV: &str = "LIVEKIT_REMOTE_EOT_URL";

/// Resolved configuration handed to the [`crate::factory::build_detector`] factory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Catalog model name. Defaults to `"english"`.
    pub model: String,

    /// Overrides the artifact store's base directory for this detector.
    /// `None` means "use the store's own `$LK_MODEL_PATH`/home-dir resolution".
    pub model_path: Option<PathBuf>,

    /// Remote inference endpoint. `None` means "read `LIVEKIT_REMOTE_EOT_URL`
    /// at factory time".
    pub remote_url: Option<String>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model: "english".to_owned(),
            model_path: None,
            remote_url: None,
        }
    }
}

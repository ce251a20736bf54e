//! Builds a configured [`Detector`] from a [`DetectorConfig`].

use std::sync::Arc;

use crate::config::{DetectorConfig, REMOTE_URL_ENV};
use crate::detector::Detector;
use crate::error::Result;
use crate::local::LocalDetector;
use crate::remote::RemoteDetector;

/// Builds the detector described by `config`.
///
/// A [`LocalDetector`] is always constructed for `config.model`. If a
/// remote endpoint is resolved — either from `config.remote_url` or, when
/// that's unset, the `LIVEKIT_REMOTE_EOT_URL` environment variable — the
/// returned detector is a [`RemoteDetector`] wrapping the local one as its
/// fallback. Otherwise the local detector is returned directly.
///
/// # Errors
///
/// Returns [`crate::error::TurnDetectorError::UnknownModel`] if
/// `config.model` isn't in the catalog.
pub fn build_detector(config: DetectorConfig) -> Result<Arc<dyn Detector>> {
    let local = Arc::new(LocalDetector::new(&config.model, config.model_path)?);

    let remote_url = config
        .remote_url
        .or_else(|| std::env::var(REMOTE_URL_ENV).ok());

    match remote_url {
        Some(url) if !url.is_empty() => {
            Ok(Arc::new(RemoteDetector::new(url, Some(local))))
        }
        _ => Ok(local),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_builds_a_local_only_detector() {
        std::env::remove_var(REMOTE_URL_ENV);
        let detector = build_detector(DetectorConfig::default()).unwrap();
        assert!(detector.supports_language("en"));
    }

    #[test]
    fn remote_url_in_config_selects_a_remote_detector() {
        let mut config = DetectorConfig::default();
        config.remote_url = Some("https://example.invalid/predict".to_owned());
        let detector = build_detector(config).unwrap();
        assert!(detector.supports_language("en"));
    }

    #[test]
    fn env_var_is_used_when_config_remote_url_is_unset() {
        std::env::set_var(REMOTE_URL_ENV, "https://example.invalid/predict");
        let detector = build_detector(DetectorConfig::default()).unwrap();
        std::env::remove_var(REMOTE_URL_ENV);
        assert!(detector.supports_language("en"));
    }

    #[test]
    fn unknown_model_fails_before_any_detector_is_built() {
        std::env::remove_var(REMOTE_URL_ENV);
        let mut config = DetectorConfig::default();
        config.model = "nonexistent".to_owned();
        assert!(build_detector(config).is_err());
    }
}

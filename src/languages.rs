//! Per-language end-of-turn probability thresholds.
//!
//! Loaded once per detector from the catalog's `languages.json`: a flat map
//! of BCP-47 language tag to the probability above which an utterance is
//! considered complete for that language.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, TurnDetectorError};

#[derive(Debug, Deserialize)]
struct LanguagesFile {
    #[serde(flatten)]
    thresholds: HashMap<String, f32>,
}

/// Threshold lookup table for one model revision.
pub struct LanguageTable {
    thresholds: HashMap<String, f32>,
}

impl LanguageTable {
    /// Parses a `languages.json` file.
    ///
    /// # Errors
    ///
    /// Returns [`TurnDetectorError::AssetMissing`] if the file can't be
    /// read, or [`TurnDetectorError::AssetCorrupt`] if it isn't valid JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|err| TurnDetectorError::AssetMissing(format!("{}: {err}", path.display())))?;
        let parsed: LanguagesFile = serde_json::from_str(&raw)
            .map_err(|err| TurnDetectorError::AssetCorrupt(err.to_string()))?;
        Ok(Self {
            thresholds: parsed.thresholds,
        })
    }

    /// Whether this table declares a threshold for `tag`.
    #[must_use]
    pub fn supports_language(&self, tag: &str) -> bool {
        self.thresholds.contains_key(tag)
    }

    /// The "unlikely to continue" probability threshold for `tag`.
    ///
    /// # Errors
    ///
    /// Returns [`TurnDetectorError::UnsupportedLanguage`] if `tag` isn't in
    /// this table.
    pub fn unlikely_threshold(&self, tag: &str) -> Result<f32> {
        self.thresholds
            .get(tag)
            .copied()
            .ok_or_else(|| TurnDetectorError::UnsupportedLanguage(tag.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_table(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_and_looks_up_known_language() {
        let file = write_table(r#"{"en": 0.85, "fr": 0.8}"#);
        let table = LanguageTable::load(file.path()).unwrap();
        assert!(table.supports_language("en"));
        assert_eq!(table.unlikely_threshold("en").unwrap(), 0.85);
    }

    #[test]
    fn unsupported_language_is_an_error() {
        let file = write_table(r#"{"en": 0.85}"#);
        let table = LanguageTable::load(file.path()).unwrap();
        assert!(!table.supports_language("de"));
        assert!(matches!(
            table.unlikely_threshold("de"),
            Err(TurnDetectorError::UnsupportedLanguage(tag)) if tag == "de"
        ));
    }

    #[test]
    fn missing_file_is_asset_missing() {
        let err = LanguageTable::load(Path::new("/nonexistent/languages.json")).unwrap_err();
        assert!(matches!(err, TurnDetectorError::AssetMissing(_)));
    }

    #[test]
    fn invalid_json_is_asset_corrupt() {
        let file = write_table("not json");
        let err = LanguageTable::load(file.path()).unwrap_err();
        assert!(matches!(err, TurnDetectorError::AssetCorrupt(_)));
    }
}

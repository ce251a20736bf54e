//! Local, on-device detector backed by an ONNX Runtime session.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use ort::session::Session;
use ort::value::Tensor;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::asset::OnceAsset;
use crate::catalog::{self, ModelInfo};
use crate::detector::{ChatContext, Detector};
use crate::error::{Result, TurnDetectorError};
use crate::languages::LanguageTable;
use crate::runtime;
use crate::store::ArtifactStore;
use crate::tokenizer::TurnTokenizer;

/// Thresholds used before the catalog's `languages.json` has finished
/// loading. Matches the English-only model's shipped defaults.
const DEFAULT_ENGLISH_TAGS: &[&str] = &["en", "en-US", "en-GB"];
const DEFAULT_THRESHOLD: f32 = 0.85;

/// Inference calls slower than this are logged at `warn` level.
const SLOW_INFERENCE_WARN_MS: u128 = 25;

/// On-device turn detector: a quantized transformer run through `ort`.
///
/// All three backing assets (the session, the tokenizer, the language
/// table) load lazily and exactly once, on whichever call first needs them.
pub struct LocalDetector {
    store: ArtifactStore,
    info: &'static ModelInfo,
    session: OnceAsset<Arc<std::sync::Mutex<Session>>>,
    tokenizer: OnceAsset<Arc<TurnTokenizer>>,
    languages: OnceAsset<Arc<LanguageTable>>,
}

impl LocalDetector {
    /// Builds a detector for `model_name`, rooting its artifact store at
    /// `model_path` when given, or the store's default resolution otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`TurnDetectorError::UnknownModel`] if `model_name` isn't in
    /// the catalog. Assets are not loaded yet at this point.
    pub fn new(model_name: &str, model_path: Option<std::path::PathBuf>) -> Result<Self> {
        let info = catalog::lookup(model_name)?;
        let store = match model_path {
            Some(base) => ArtifactStore::with_base(base),
            None => ArtifactStore::new(),
        };
        Ok(Self {
            store,
            info,
            session: OnceAsset::new(),
            tokenizer: OnceAsset::new(),
            languages: OnceAsset::new(),
        })
    }

    async fn ensure_session(&self) -> Result<Arc<std::sync::Mutex<Session>>> {
        self.session
            .get_or_try_init(|| async {
                runtime::ensure_initialized()?;
                self.store.ensure_downloaded(self.info).await?;

                let model_path = self.store.file_path(self.info, self.info.model_file());
                let cores = std::thread::available_parallelism()
                    .map(std::num::NonZeroUsize::get)
                    .unwrap_or(1);
                let intra_threads = cores.max(2) / 2;

                let session = tokio::task::spawn_blocking(move || {
                    Session::builder()
                        .and_then(|b| b.with_optimization_level(ort::session::builder::GraphOptimizationLevel::Level3))
                        .and_then(|b| b.with_intra_threads(intra_threads))
                        .and_then(|b| b.with_inter_threads(1))
                        .and_then(|b| b.with_config_entry("session.dynamic_block_base", "4"))
                        .and_then(|b| b.commit_from_file(&model_path))
                })
                .await
                .map_err(|err| TurnDetectorError::InferenceFailed(err.to_string()))?
                .map_err(|err| TurnDetectorError::InferenceFailed(err.to_string()))?;

                Ok(Arc::new(std::sync::Mutex::new(session)))
            })
            .await
    }

    async fn ensure_tokenizer(&self) -> Result<Arc<TurnTokenizer>> {
        self.tokenizer
            .get_or_try_init(|| async {
                self.store.ensure_downloaded(self.info).await?;
                let path = self.store.file_path(self.info, self.info.tokenizer_file());
                let tok = TurnTokenizer::load(&path)?;
                Ok(Arc::new(tok))
            })
            .await
    }

    async fn ensure_languages(&self) -> Result<Arc<LanguageTable>> {
        self.languages
            .get_or_try_init(|| async {
                self.store.ensure_downloaded(self.info).await?;
                let path = self.store.file_path(self.info, self.info.languages_file());
                let table = LanguageTable::load(&path)?;
                Ok(Arc::new(table))
            })
            .await
    }

    fn run_session(session: &std::sync::Mutex<Session>, tokens: &[i64]) -> Result<f32> {
        use ort::session::{SessionInputValue, SessionInputs};

        let seq_len = tokens.len();
        let mut guard = session
            .lock()
            .map_err(|_| TurnDetectorError::InferenceFailed("session lock poisoned".into()))?;

        let input_ids = Tensor::from_array(([1_usize, seq_len], tokens.to_vec()))
            .map_err(|err| TurnDetectorError::InferenceFailed(format!("failed to create input_ids tensor: {err}")))?;

        let mut feed: std::collections::HashMap<String, SessionInputValue> = std::collections::HashMap::new();
        feed.insert("input_ids".to_string(), input_ids.into());

        let outputs = guard
            .run(SessionInputs::from(feed))
            .map_err(|err| TurnDetectorError::InferenceFailed(format!("onnx inference failed: {err}")))?;

        let (_shape, data) = outputs[0_usize]
            .try_extract_tensor::<f32>()
            .map_err(|err| TurnDetectorError::InferenceFailed(format!("failed to extract output tensor: {err}")))?;

        data.iter()
            .next()
            .copied()
            .ok_or_else(|| TurnDetectorError::InferenceFailed("empty model output".into()))
    }
}

#[async_trait]
impl Detector for LocalDetector {
    fn supports_language(&self, language: &str) -> bool {
        match self.languages.try_get() {
            Some(Ok(table)) => table.supports_language(language),
            _ => DEFAULT_ENGLISH_TAGS.contains(&language),
        }
    }

    fn unlikely_threshold(&self, language: &str) -> Result<f32> {
        match self.languages.try_get() {
            Some(Ok(table)) => table.unlikely_threshold(language),
            _ if DEFAULT_ENGLISH_TAGS.contains(&language) => Ok(DEFAULT_THRESHOLD),
            _ => Err(TurnDetectorError::UnsupportedLanguage(language.to_owned())),
        }
    }

    async fn predict_end_of_turn(
        &self,
        ctx: &ChatContext,
        cancel: CancellationToken,
    ) -> Result<f32> {
        if cancel.is_cancelled() {
            return Err(TurnDetectorError::Cancelled);
        }

        let tok = self.ensure_tokenizer().await?;
        let _languages = self.ensure_languages().await?;
        let session = self.ensure_session().await?;

        let tokens = tok.encode_chat_context(ctx)?;
        if tokens.is_empty() {
            return Ok(0.5);
        }

        if cancel.is_cancelled() {
            return Err(TurnDetectorError::Cancelled);
        }

        let started = Instant::now();
        let probability = tokio::task::spawn_blocking({
            let session = Arc::clone(&session);
            move || Self::run_session(&session, &tokens)
        })
        .await
        .map_err(|err| TurnDetectorError::InferenceFailed(err.to_string()))??;

        let elapsed_ms = started.elapsed().as_millis();
        if elapsed_ms > SLOW_INFERENCE_WARN_MS {
            warn!(elapsed_ms, "local inference exceeded latency budget");
        }

        Ok(probability.clamp(0.0, 1.0))
    }
}

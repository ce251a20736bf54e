//! The [`Detector`] abstraction and the chat-context types it operates on.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::Result;

/// Speaker role of a single turn in a chat context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Function,
}

impl Role {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Function => "function",
        }
    }
}

/// One message in a chat history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// The chat history and language tag a detector reasons about.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatContext {
    pub messages: Vec<ChatMessage>,
    pub language: String,
}

/// An end-of-utterance probability predictor.
///
/// Implementations differ only in where the probability comes from (a local
/// ONNX session, a remote HTTP endpoint, a constant for testing); callers
/// interact uniformly through this trait.
#[async_trait]
pub trait Detector: Send + Sync {
    /// Whether this detector has a usable threshold for `language`.
    fn supports_language(&self, language: &str) -> bool;

    /// The probability above which `language` is considered complete.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::TurnDetectorError::UnsupportedLanguage`] if
    /// [`Detector::supports_language`] would return `false` for it.
    fn unlikely_threshold(&self, language: &str) -> Result<f32>;

    /// Predicts the probability, in `[0.0, 1.0]`, that `ctx`'s last message
    /// completes the speaker's turn.
    async fn predict_end_of_turn(
        &self,
        ctx: &ChatContext,
        cancel: CancellationToken,
    ) -> Result<f32>;
}

/// Fixed-response detector for tests and offline development.
pub struct StubDetector {
    threshold: f32,
    probability: f32,
    supported: Vec<String>,
}

impl StubDetector {
    #[must_use]
    pub fn new(probability: f32, threshold: f32, supported: Vec<String>) -> Self {
        Self {
            threshold,
            probability,
            supported,
        }
    }
}

impl Default for StubDetector {
    fn default() -> Self {
        Self::new(0.9, 0.85, vec!["en".to_owned()])
    }
}

#[async_trait]
impl Detector for StubDetector {
    fn supports_language(&self, language: &str) -> bool {
        self.supported.iter().any(|tag| tag == language)
    }

    fn unlikely_threshold(&self, language: &str) -> Result<f32> {
        if self.supports_language(language) {
            Ok(self.threshold)
        } else {
            Err(crate::error::TurnDetectorError::UnsupportedLanguage(
                language.to_owned(),
            ))
        }
    }

    async fn predict_end_of_turn(
        &self,
        _ctx: &ChatContext,
        _cancel: CancellationToken,
    ) -> Result<f32> {
        Ok(self.probability)
    }
}

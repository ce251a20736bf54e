//! Chat-context tokenization.
//!
//! Turns a [`crate::detector::ChatContext`] into the fixed-width token
//! sequence the local model expects: the last six messages rendered through
//! a `<|im_start|><|role|>content<|im_end|>` template, then left-truncated
//! to the model's context window.

use std::path::Path;

use tokenizers::Tokenizer;

use crate::detector::ChatContext;
use crate::error::{Result, TurnDetectorError};

/// Model context window, in tokens.
pub const MAX_TOKENS: usize = 128;

/// Number of trailing messages rendered into the template.
pub const MAX_MESSAGES: usize = 6;

/// Wraps a HuggingFace `tokenizers::Tokenizer` with the chat template used
/// by the turn-detector models.
pub struct TurnTokenizer {
    inner: Tokenizer,
}

impl TurnTokenizer {
    /// Loads a tokenizer manifest from `tokenizer.json`.
    ///
    /// # Errors
    ///
    /// Returns [`TurnDetectorError::AssetCorrupt`] if the file cannot be
    /// parsed as a tokenizer manifest.
    pub fn load(path: &Path) -> Result<Self> {
        let inner = Tokenizer::from_file(path)
            .map_err(|err| TurnDetectorError::AssetCorrupt(err.to_string()))?;
        Ok(Self { inner })
    }

    /// Renders the last [`MAX_MESSAGES`] messages of `ctx` through the chat
    /// template and encodes them, left-truncating to [`MAX_TOKENS`].
    ///
    /// # Errors
    ///
    /// Returns [`TurnDetectorError::TokenizationFailed`] if encoding fails.
    pub fn encode_chat_context(&self, ctx: &ChatContext) -> Result<Vec<i64>> {
        let window_start = ctx.messages.len().saturating_sub(MAX_MESSAGES);
        let mut rendered = String::new();
        for message in &ctx.messages[window_start..] {
            rendered.push_str("<|im_start|><|");
            rendered.push_str(message.role.as_str());
            rendered.push_str("|>");
            rendered.push_str(&message.content);
            rendered.push_str("<|im_end|>");
        }

        let encoding = self
            .inner
            .encode(rendered, false)
            .map_err(|err| TurnDetectorError::TokenizationFailed(err.to_string()))?;

        let ids = encoding.get_ids();
        let start = ids.len().saturating_sub(MAX_TOKENS);
        Ok(ids[start..].iter().map(|&id| i64::from(id)).collect())
    }
}

//! Remote HTTP detector with automatic local fallback.
//!
//! On any failure — transport error, non-2xx status, a malformed response
//! body, a non-empty `error` field, or a probability outside `[0.0, 1.0]` —
//! the request is abandoned unconditionally and the call falls through to
//! the configured fallback detector. This is a stricter, simpler rule than
//! the general [`crate::error::TurnDetectorError::is_recoverable`]
//! classification used elsewhere: every remote failure here is treated as
//! "fall back", never as "propagate".

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::detector::{ChatContext, Detector};
use crate::error::{Result, TurnDetectorError};

const USER_AGENT: &str = concat!("livekit-turn-detector/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Serialize)]
struct RemoteRequest<'a> {
    messages: &'a [crate::detector::ChatMessage],
    language: &'a str,
}

#[derive(Debug, Deserialize)]
struct RemoteResponse {
    eou_probability: f32,
    #[serde(default)]
    error: Option<String>,
}

/// Detector that delegates to a remote HTTP endpoint, falling back to a
/// local detector on any failure.
pub struct RemoteDetector {
    endpoint: String,
    client: reqwest::Client,
    fallback: Option<Arc<dyn Detector>>,
}

impl RemoteDetector {
    /// Builds a remote detector. `fallback` is consulted whenever the
    /// remote call fails; without one, [`RemoteDetector`] falls back to
    /// fixed default thresholds and returns
    /// [`TurnDetectorError::RemoteUnavailable`] instead of a probability.
    pub fn new(endpoint: String, fallback: Option<Arc<dyn Detector>>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();
        Self {
            endpoint,
            client,
            fallback,
        }
    }

    fn default_threshold(language: &str) -> f32 {
        match language {
            "en" | "en-US" | "en-GB" => 0.85,
            _ => 0.80,
        }
    }

    async fn call_remote(&self, ctx: &ChatContext) -> std::result::Result<f32, String> {
        let body = RemoteRequest {
            messages: &ctx.messages,
            language: &ctx.language,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|err| err.to_string())?;

        if !response.status().is_success() {
            return Err(format!("remote returned status {}", response.status()));
        }

        let parsed: RemoteResponse = response.json().await.map_err(|err| err.to_string())?;

        if let Some(error) = parsed.error.filter(|e| !e.is_empty()) {
            return Err(error);
        }

        if !(0.0..=1.0).contains(&parsed.eou_probability) {
            return Err(format!("probability {} out of range", parsed.eou_probability));
        }

        Ok(parsed.eou_probability)
    }
}

#[async_trait]
impl Detector for RemoteDetector {
    fn supports_language(&self, language: &str) -> bool {
        match &self.fallback {
            Some(fallback) => fallback.supports_language(language),
            None => {
                let _ = language;
                true
            }
        }
    }

    fn unlikely_threshold(&self, language: &str) -> Result<f32> {
        match &self.fallback {
            Some(fallback) => fallback.unlikely_threshold(language),
            None => Ok(Self::default_threshold(language)),
        }
    }

    async fn predict_end_of_turn(
        &self,
        ctx: &ChatContext,
        cancel: CancellationToken,
    ) -> Result<f32> {
        let outcome = tokio::select! {
            () = cancel.cancelled() => return Err(TurnDetectorError::Cancelled),
            result = self.call_remote(ctx) => result,
        };

        match outcome {
            Ok(probability) => Ok(probability),
            Err(reason) => {
                warn!(endpoint = %self.endpoint, reason = %reason, "remote detector failed, falling back");
                match &self.fallback {
                    Some(fallback) => fallback.predict_end_of_turn(ctx, cancel).await,
                    None => Err(TurnDetectorError::RemoteUnavailable(reason)),
                }
            }
        }
    }
}

//! Public-API integration tests covering the seed end-to-end scenarios.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use turn_detector::{build_detector, ChatContext, ChatMessage, DetectorConfig, Detector, Role, StubDetector, TurnDetectorError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn ctx(language: &str) -> ChatContext {
    ChatContext {
        messages: vec![
            ChatMessage {
                role: Role::User,
                content: "are we still on for tomorrow".to_owned(),
                name: None,
            },
            ChatMessage {
                role: Role::Assistant,
                content: "yes, 10am works".to_owned(),
                name: None,
            },
        ],
        language: language.to_owned(),
    }
}

#[test]
fn factory_default_config_builds_a_detector_that_supports_english() {
    std::env::remove_var("LIVEKIT_REMOTE_EOT_URL");
    let detector = build_detector(DetectorConfig::default()).unwrap();
    assert!(detector.supports_language("en-US"));
}

#[test]
fn factory_with_remote_env_wires_local_as_fallback() {
    std::env::set_var("LIVEKIT_REMOTE_EOT_URL", "http://localhost:8080/predict");
    let detector = build_detector(DetectorConfig::default()).unwrap();
    std::env::remove_var("LIVEKIT_REMOTE_EOT_URL");
    // A Remote Detector with no explicit fallback override still answers
    // language queries through the wrapped Local Detector.
    assert!(detector.supports_language("en-US"));
}

#[tokio::test]
async fn remote_happy_path_returns_the_exact_probability() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "eou_probability": 0.92,
        })))
        .mount(&server)
        .await;

    let mut config = DetectorConfig::default();
    config.remote_url = Some(format!("{}/predict", server.uri()));
    let detector = build_detector(config).unwrap();

    let probability = detector
        .predict_end_of_turn(&ctx("en-US"), CancellationToken::new())
        .await
        .unwrap();
    assert!((probability - 0.92).abs() < f32::EPSILON);
}

#[tokio::test]
async fn remote_failure_falls_back_without_surfacing_an_error() {
    let fallback: Arc<dyn Detector> = Arc::new(StubDetector::new(0.75, 0.85, vec!["en".to_owned()]));
    let detector = turn_detector::RemoteDetector::new(
        "http://127.0.0.1:0/predict".to_owned(),
        Some(fallback),
    );

    let probability = detector
        .predict_end_of_turn(&ctx("en"), CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(probability, 0.75);
}

#[test]
fn unknown_model_is_rejected_by_the_factory() {
    let mut config = DetectorConfig::default();
    config.model = "invalid".to_owned();
    let err = build_detector(config).unwrap_err();
    assert!(matches!(err, TurnDetectorError::UnknownModel(name) if name == "invalid"));
}

#[tokio::test]
async fn stub_detector_matches_the_seed_scenario() {
    let supported = StubDetector::new(0.95, 0.85, vec!["en-US".to_owned()]);
    assert!(supported.supports_language("en-US"));
    assert_eq!(supported.unlikely_threshold("en-US").unwrap(), 0.85);
    let probability = supported
        .predict_end_of_turn(&ctx("en-US"), CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(probability, 0.95);

    let unsupported = StubDetector::new(0.95, 0.85, vec![]);
    assert!(!unsupported.supports_language("en-US"));
    assert!(matches!(
        unsupported.unlikely_threshold("en-US"),
        Err(TurnDetectorError::UnsupportedLanguage(_))
    ));
}

#[test]
fn runtime_initialization_is_idempotent() {
    let first = turn_detector::runtime::ensure_initialized();
    let second = turn_detector::runtime::ensure_initialized();
    let third = turn_detector::runtime::ensure_initialized();
    assert_eq!(first.is_ok(), second.is_ok());
    assert_eq!(second.is_ok(), third.is_ok());
}

#[tokio::test]
async fn already_cancelled_token_short_circuits_remote_predict() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let detector = turn_detector::RemoteDetector::new("http://127.0.0.1:0/predict".to_owned(), None);
    let err = detector
        .predict_end_of_turn(&ctx("en"), cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, TurnDetectorError::Cancelled));
}

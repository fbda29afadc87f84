//! Session gate behaviour observed through the engine

use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use ragna_engine::{ActionError, ErrorKind, Feature, GateState, LocalInputError, Screen};

use crate::common::{app_for, mount_validate_key, start_backend_mock, validated_app};

#[tokio::test]
async fn blank_keys_never_reach_backend() {
    let server = start_backend_mock().await;
    Mock::given(method("POST"))
        .and(path("/validate-key"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut app = app_for(&server, Screen::Search);
    for raw in ["", " ", "\t\n", "   \r\n  "] {
        assert_eq!(
            app.submit_api_key(raw),
            Err(ActionError::Validation(LocalInputError::MissingApiKey))
        );
        assert_eq!(
            app.slot(Feature::Validate)
                .error()
                .map(|err| err.user_message(Feature::Validate)),
            Some("Please enter an API key".to_string())
        );
        assert!(!app.slot(Feature::Validate).is_loading());
        assert_eq!(app.session().state(), GateState::Unauthenticated);
    }
}

#[tokio::test]
async fn any_success_status_validates() {
    for status in [200, 201, 204] {
        let server = start_backend_mock().await;
        mount_validate_key(&server, status).await;

        let mut app = app_for(&server, Screen::LeetCode);
        app.submit_api_key("abc").unwrap();
        app.settle().await;
        assert!(app.is_validated(), "status {status} should validate");
    }
}

#[tokio::test]
async fn server_error_on_validation_is_auth_failure() {
    let server = start_backend_mock().await;
    mount_validate_key(&server, 500).await;

    let mut app = app_for(&server, Screen::LeetCode);
    app.submit_api_key("abc").unwrap();
    app.settle().await;

    let err = app.slot(Feature::Validate).error().unwrap();
    assert_eq!(err.kind(), ErrorKind::Auth);
    assert_eq!(err.user_message(Feature::Validate), "Failed to validate API key");
    assert!(!app.is_validated());
}

#[tokio::test]
async fn reset_clears_key_from_any_state() {
    let server = start_backend_mock().await;

    let mut fresh = app_for(&server, Screen::LeetCode);
    fresh.reset_api_key();
    assert_eq!(fresh.session().state(), GateState::Unauthenticated);
    assert!(!fresh.session().has_key());

    let mut validated = validated_app(&server, Screen::LeetCode).await;
    validated.reset_api_key();
    assert_eq!(validated.session().state(), GateState::Unauthenticated);
    assert!(!validated.session().has_key());
}

#[tokio::test]
async fn resubmitting_while_validating_keeps_latest_key() {
    let server = start_backend_mock().await;
    Mock::given(method("POST"))
        .and(path("/validate-key"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(100)))
        .expect(1..=2)
        .mount(&server)
        .await;

    let mut app = app_for(&server, Screen::LeetCode);
    app.submit_api_key("first").unwrap();
    app.submit_api_key("second").unwrap();
    app.settle().await;

    assert!(app.is_validated());
    let ctx = app.session().context().unwrap();
    assert_eq!(ctx.api_key().expose(), "second");
}

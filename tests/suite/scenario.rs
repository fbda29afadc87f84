//! End-to-end flows through engine and client against a mock backend

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use ragna_engine::{Feature, Screen, Tab};

use crate::common::{app_for, start_backend_mock};

#[tokio::test]
async fn validate_then_request_hints() {
    let server = start_backend_mock().await;
    Mock::given(method("POST"))
        .and(path("/validate-key"))
        .and(body_json(json!({"api_key": "abc"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/problem-hint"))
        .and(body_json(json!({"api_key": "abc", "problem": "42"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"hints": "Try two pointers"})))
        .expect(1)
        .mount(&server)
        .await;

    let mut app = app_for(&server, Screen::LeetCode);
    app.submit_api_key("abc").unwrap();
    app.settle().await;
    assert!(app.is_validated());

    app.request_hints("42").unwrap();
    app.settle().await;

    let hints = app.slot(Feature::Hints);
    assert_eq!(hints.content(), Some("Try two pointers"));
    assert!(!hints.is_loading());
    assert_eq!(app.view().active_tab(), Tab::Hints);
}

#[tokio::test]
async fn reset_and_revalidate_with_new_key() {
    let server = start_backend_mock().await;
    Mock::given(method("POST"))
        .and(path("/validate-key"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/leetchat"))
        .and(body_json(json!({
            "messages": [{"role": "user", "content": "again"}],
            "api_key": "second"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"content": "welcome back"})))
        .expect(1)
        .mount(&server)
        .await;

    let mut app = app_for(&server, Screen::LeetCode);
    app.submit_api_key("first").unwrap();
    app.settle().await;
    app.reset_api_key();
    assert!(!app.is_validated());

    app.submit_api_key("second").unwrap();
    app.settle().await;
    app.send_chat("again").unwrap();
    app.settle().await;

    assert_eq!(
        app.conversation().last().map(|m| m.content().to_string()),
        Some("welcome back".to_string())
    );
}

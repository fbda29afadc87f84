//! Domain action dispatch: request shapes, result slots and failures

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use ragna_client::BackendClient;
use ragna_config::ConversationSettings;
use ragna_engine::{
    ActionError, App, Difficulty, ErrorKind, Feature, Language, LocalInputError, Role, Screen,
    StudyWeeks, Topic,
};

use crate::common::{
    backend_settings, mount_failure, mount_text_response, start_backend_mock, validated_app,
};

#[tokio::test]
async fn study_plan_sends_topics_and_duration() {
    let server = start_backend_mock().await;
    let mut app = validated_app(&server, Screen::LeetCode).await;
    Mock::given(method("POST"))
        .and(path("/study-plan"))
        .and(body_json(json!({
            "api_key": "abc",
            "topics": ["arrays", "graphs"],
            "duration_weeks": 6,
            "difficulty": "medium"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"study_plan": "Week 1: arrays"})))
        .expect(1)
        .mount(&server)
        .await;

    app.request_study_plan(
        &[Topic::Arrays, Topic::Graphs],
        StudyWeeks::new(6).unwrap(),
        Some(Difficulty::Medium),
    )
    .unwrap();
    app.settle().await;
    assert_eq!(
        app.slot(Feature::StudyPlan).content(),
        Some("Week 1: arrays")
    );
}

#[tokio::test]
async fn empty_topics_rejected_for_any_duration() {
    let server = start_backend_mock().await;
    let mut app = validated_app(&server, Screen::LeetCode).await;
    Mock::given(method("POST"))
        .and(path("/study-plan"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    for weeks in [1, 4, 52] {
        assert_eq!(
            app.request_study_plan(&[], StudyWeeks::new(weeks).unwrap(), None),
            Err(ActionError::Validation(LocalInputError::NoTopics))
        );
    }
    assert!(!app.is_busy());
}

#[tokio::test]
async fn pattern_analysis_uses_review_shape() {
    let server = start_backend_mock().await;
    let mut app = validated_app(&server, Screen::LeetCode).await;
    Mock::given(method("POST"))
        .and(path("/pattern-recognition"))
        .and(body_json(json!({
            "api_key": "abc",
            "code": "int main() {}",
            "language": "cpp",
            "problem_id": null
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"pattern_analysis": "none"})))
        .expect(1)
        .mount(&server)
        .await;

    app.request_pattern_analysis("int main() {}", Language::Cpp)
        .unwrap();
    app.settle().await;
    assert_eq!(app.slot(Feature::Pattern).content(), Some("none"));
}

#[tokio::test]
async fn daily_challenge_is_a_get_with_key_in_query() {
    let server = start_backend_mock().await;
    let mut app = validated_app(&server, Screen::LeetCode).await;
    Mock::given(method("GET"))
        .and(path("/daily-challenge"))
        .and(query_param("api_key", "abc"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"daily_challenge": "Two Sum"})))
        .expect(1)
        .mount(&server)
        .await;

    app.request_daily_challenge().unwrap();
    app.settle().await;
    assert_eq!(app.slot(Feature::DailyChallenge).content(), Some("Two Sum"));
}

#[tokio::test]
async fn topic_problems_fill_their_slot() {
    let server = start_backend_mock().await;
    let mut app = validated_app(&server, Screen::LeetCode).await;
    mount_text_response(&server, "/topic-problems", "recommendations", "1. Climbing Stairs").await;

    app.request_topic_problems(Topic::DynamicProgramming, Some(Difficulty::Easy))
        .unwrap();
    app.settle().await;
    assert_eq!(
        app.slot(Feature::TopicProblems).content(),
        Some("1. Climbing Stairs")
    );
}

#[tokio::test]
async fn server_errors_leave_prior_content() {
    let server = start_backend_mock().await;
    let mut app = validated_app(&server, Screen::LeetCode).await;
    Mock::given(method("POST"))
        .and(path("/problem-hint"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"hints": "first"})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_failure(&server, "/problem-hint", 500).await;
    mount_failure(&server, "/study-plan", 500).await;
    mount_failure(&server, "/leetchat", 500).await;

    app.request_hints("1").unwrap();
    app.settle().await;
    app.request_hints("1").unwrap();
    app.request_study_plan(&[Topic::Math], StudyWeeks::default(), None)
        .unwrap();
    app.send_chat("hello").unwrap();
    app.settle().await;

    for feature in [Feature::Hints, Feature::StudyPlan, Feature::Chat] {
        let slot = app.slot(feature);
        let err = slot.error().expect("failure recorded");
        assert_eq!(err.user_message(feature), feature.failure_message());
        assert_eq!(err.kind(), ErrorKind::Network);
        assert!(!slot.is_loading());
    }
    assert_eq!(app.slot(Feature::Hints).content(), Some("first"));
    assert!(app.slot(Feature::StudyPlan).content().is_none());
}

#[tokio::test]
async fn unauthorized_domain_call_is_auth_failure() {
    let server = start_backend_mock().await;
    let mut app = validated_app(&server, Screen::LeetCode).await;
    mount_failure(&server, "/code-review", 401).await;

    app.request_review("x", Language::Python, None).unwrap();
    app.settle().await;
    assert_eq!(
        app.slot(Feature::Review).error(),
        Some(&ActionError::Auth { status: 401 })
    );
}

#[tokio::test]
async fn conversation_is_ordered_and_bounded() {
    let server = start_backend_mock().await;
    crate::common::mount_validate_key(&server, 200).await;
    mount_text_response(&server, "/chat", "content", "ok").await;

    let client = BackendClient::new(&backend_settings(&server)).unwrap();
    let settings = ConversationSettings {
        max_messages: 5,
        send_history: false,
    };
    let mut app = App::new(client, Screen::Search, settings);
    app.submit_api_key("abc").unwrap();
    app.settle().await;

    for i in 0..4 {
        app.send_chat(&format!("q{i}")).unwrap();
        app.settle().await;
    }

    let messages: Vec<_> = app.conversation().messages().collect();
    assert_eq!(messages.len(), 5);
    assert_eq!(app.conversation().evicted(), 5);
    let contents: Vec<&str> = messages.iter().map(|m| m.content()).collect();
    assert_eq!(contents, ["ok", "q2", "ok", "q3", "ok"]);
    assert_eq!(messages[0].role(), Role::Assistant);
    assert_eq!(messages[1].role(), Role::User);
}

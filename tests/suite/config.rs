//! Config file resolution feeding a working app

use std::collections::HashMap;
use std::time::Duration;

use ragna_client::BackendClient;
use ragna_config::{ENV_API_KEY, RagnaConfig};
use ragna_engine::{App, Feature, Screen};

use crate::common::{mount_text_response, mount_validate_key, start_backend_mock};

#[tokio::test]
async fn config_file_points_app_at_backend() {
    let server = start_backend_mock().await;
    mount_validate_key(&server, 200).await;
    mount_text_response(&server, "/chat", "content", "from config").await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        format!(
            "[app]\nscreen = \"search\"\napi_key = \"${{TEST_GROQ_KEY}}\"\n\n\
             [backend]\nbase_url = \"{}\"\ntimeout_secs = 7\n\n\
             [conversation]\nmax_messages = 50\n",
            server.uri()
        ),
    )
    .unwrap();

    let env: HashMap<&str, &str> = HashMap::from([("TEST_GROQ_KEY", "abc")]);
    let config = RagnaConfig::load_from(&path).unwrap().unwrap();
    let settings = config.resolve_with(|var| env.get(var).map(|v| (*v).to_string()));

    assert_eq!(settings.screen, Screen::Search);
    assert_eq!(settings.backend.timeout, Duration::from_secs(7));
    assert_eq!(settings.conversation.max_messages, 50);
    assert_eq!(settings.api_key(), Some("abc"));

    let client = BackendClient::new(&settings.backend).unwrap();
    let mut app = App::new(client, settings.screen, settings.conversation);
    app.submit_api_key(settings.api_key().unwrap()).unwrap();
    app.settle().await;
    app.send_chat("hi").unwrap();
    app.settle().await;

    assert_eq!(app.slot(Feature::Chat).content(), Some("from config"));
}

#[test]
fn env_key_overrides_file_key() {
    let config: RagnaConfig = toml::from_str("[app]\napi_key = \"file-key\"\n").unwrap();
    let settings = config.resolve_with(|var| (var == ENV_API_KEY).then(|| "env-key".to_string()));
    assert_eq!(settings.api_key(), Some("env-key"));
}

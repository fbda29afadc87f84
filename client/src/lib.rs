//! HTTP client for the RAGna assistant backend.
//!
//! # Architecture
//!
//! [`BackendClient`] wraps one hardened [`reqwest::Client`] and exposes one
//! async method per backend endpoint. Every call is a single request: there is
//! no retry and no backoff. Failures come back as a [`ClientError`] that keeps
//! the transport-level cause (timeout, connection, HTTP status, bad body)
//! distinct so the engine can classify it.
//!
//! # Endpoints
//!
//! | Method | Path | Result field |
//! |--------|------|--------------|
//! | POST | `/validate-key` | status only |
//! | POST | `/problem-hint` | `hints` |
//! | POST | `/code-review` | `review` |
//! | POST | `/study-plan` | `study_plan` |
//! | POST | `/chat` | `content` |
//! | POST | `/leetchat` | `content` |
//! | POST | `/topic-problems` | `recommendations` |
//! | POST | `/pattern-recognition` | `pattern_analysis` |
//! | GET | `/daily-challenge` | `daily_challenge` |
//!
//! The API key travels in the JSON body (or the query string for the one GET
//! endpoint). No authentication header is sent.

mod wire;

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{RequestBuilder, Response, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use ragna_types::{ApiKey, Difficulty, Language, Message, NonEmptyString, StudyWeeks, Topic};

use crate::wire::{
    ChatRequest, ChatResponse, CodeReviewRequest, DailyChallengeResponse, HintResponse,
    PatternResponse, ProblemHintRequest, RecommendationsResponse, ReviewResponse,
    StudyPlanRequest, StudyPlanResponse, TopicProblemsRequest, ValidateKeyRequest,
};

pub use ragna_types;

/// Hosted backend used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "https://ragnagroq-backend.onrender.com/api";

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

const TCP_KEEPALIVE_SECS: u64 = 60;
const POOL_IDLE_TIMEOUT_SECS: u64 = 90;

const MAX_ERROR_BODY_BYTES: usize = 32 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendSettings {
    pub base_url: String,
    /// Upper bound for one request, including reading the body.
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    ValidateKey,
    ProblemHint,
    CodeReview,
    StudyPlan,
    Chat,
    LeetChat,
    TopicProblems,
    PatternRecognition,
    DailyChallenge,
}

impl Endpoint {
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Endpoint::ValidateKey => "/validate-key",
            Endpoint::ProblemHint => "/problem-hint",
            Endpoint::CodeReview => "/code-review",
            Endpoint::StudyPlan => "/study-plan",
            Endpoint::Chat => "/chat",
            Endpoint::LeetChat => "/leetchat",
            Endpoint::TopicProblems => "/topic-problems",
            Endpoint::PatternRecognition => "/pattern-recognition",
            Endpoint::DailyChallenge => "/daily-challenge",
        }
    }
}

/// Which conversational agent a chat turn goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatRoute {
    /// Search agent (ArXiv, Wikipedia, web).
    #[default]
    Search,
    /// LeetCode tutor agent.
    Tutor,
}

impl ChatRoute {
    const fn endpoint(self) -> Endpoint {
        match self {
            ChatRoute::Search => Endpoint::Chat,
            ChatRoute::Tutor => Endpoint::LeetChat,
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid backend URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("request failed: {0}")]
    Network(#[source] reqwest::Error),
    #[error("backend returned HTTP {status}")]
    Status { status: u16, body: String },
    #[error("unexpected response from {endpoint}: {reason}")]
    Decode {
        endpoint: &'static str,
        reason: String,
    },
}

/// Client for the assistant backend. Cheap to share behind an `Arc`.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

fn base_client_builder(settings: &BackendSettings, https_only: bool) -> reqwest::ClientBuilder {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(
        USER_AGENT,
        HeaderValue::from_static(concat!("ragna/", env!("CARGO_PKG_VERSION"))),
    );

    reqwest::Client::builder()
        .connect_timeout(settings.connect_timeout)
        .redirect(reqwest::redirect::Policy::none())
        .https_only(https_only)
        .tcp_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)))
        .pool_idle_timeout(Some(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS)))
        .default_headers(default_headers)
}

impl BackendClient {
    /// Build a client for `settings.base_url`.
    ///
    /// An `https` base URL makes the client https-only; plain `http` is
    /// accepted for local backends.
    pub fn new(settings: &BackendSettings) -> Result<Self, ClientError> {
        let base_url = settings.base_url.trim().trim_end_matches('/').to_string();
        let parsed = Url::parse(&base_url).map_err(|e| ClientError::InvalidBaseUrl {
            url: base_url.clone(),
            reason: e.to_string(),
        })?;
        let https_only = match parsed.scheme() {
            "https" => true,
            "http" => false,
            other => {
                return Err(ClientError::InvalidBaseUrl {
                    url: base_url,
                    reason: format!("unsupported scheme {other:?}"),
                });
            }
        };

        let http = base_client_builder(settings, https_only)
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self {
            http,
            base_url,
            timeout: settings.timeout,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    /// Any 2xx counts as a valid key; the body is not inspected.
    pub async fn validate_key(&self, api_key: &ApiKey) -> Result<(), ClientError> {
        let body = ValidateKeyRequest {
            api_key: api_key.expose(),
        };
        let request = self.json_post(Endpoint::ValidateKey, &body);
        self.send(request, Endpoint::ValidateKey).await?;
        Ok(())
    }

    pub async fn problem_hint(
        &self,
        api_key: &ApiKey,
        problem: &NonEmptyString,
    ) -> Result<String, ClientError> {
        let body = ProblemHintRequest {
            api_key: api_key.expose(),
            problem: problem.as_str(),
        };
        let response: HintResponse = self.post(Endpoint::ProblemHint, &body).await?;
        Ok(response.hints)
    }

    pub async fn code_review(
        &self,
        api_key: &ApiKey,
        code: &NonEmptyString,
        language: Language,
        problem_id: Option<i64>,
    ) -> Result<String, ClientError> {
        let body = CodeReviewRequest {
            api_key: api_key.expose(),
            code: code.as_str(),
            language,
            problem_id,
        };
        let response: ReviewResponse = self.post(Endpoint::CodeReview, &body).await?;
        Ok(response.review)
    }

    pub async fn study_plan(
        &self,
        api_key: &ApiKey,
        topics: &[Topic],
        weeks: StudyWeeks,
        difficulty: Option<Difficulty>,
    ) -> Result<String, ClientError> {
        let body = StudyPlanRequest {
            api_key: api_key.expose(),
            topics,
            duration_weeks: weeks.get(),
            difficulty,
        };
        let response: StudyPlanResponse = self.post(Endpoint::StudyPlan, &body).await?;
        Ok(response.study_plan)
    }

    pub async fn chat(
        &self,
        api_key: &ApiKey,
        route: ChatRoute,
        messages: &[Message],
    ) -> Result<String, ClientError> {
        let body = ChatRequest {
            messages,
            api_key: api_key.expose(),
        };
        let response: ChatResponse = self.post(route.endpoint(), &body).await?;
        Ok(response.content)
    }

    pub async fn topic_problems(
        &self,
        api_key: &ApiKey,
        topic: Topic,
        difficulty: Option<Difficulty>,
    ) -> Result<String, ClientError> {
        let body = TopicProblemsRequest {
            api_key: api_key.expose(),
            topic,
            difficulty,
        };
        let response: RecommendationsResponse = self.post(Endpoint::TopicProblems, &body).await?;
        Ok(response.recommendations)
    }

    pub async fn pattern_analysis(
        &self,
        api_key: &ApiKey,
        code: &NonEmptyString,
        language: Language,
    ) -> Result<String, ClientError> {
        let body = CodeReviewRequest {
            api_key: api_key.expose(),
            code: code.as_str(),
            language,
            problem_id: None,
        };
        let response: PatternResponse = self.post(Endpoint::PatternRecognition, &body).await?;
        Ok(response.pattern_analysis)
    }

    pub async fn daily_challenge(&self, api_key: &ApiKey) -> Result<String, ClientError> {
        let endpoint = Endpoint::DailyChallenge;
        let mut url = Url::parse(&self.url(endpoint)).map_err(|e| ClientError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        url.query_pairs_mut()
            .append_pair("api_key", api_key.expose());

        let request = self.http.get(url).header(CONTENT_TYPE, "application/json");
        let response = self.send(request, endpoint).await?;
        let parsed: DailyChallengeResponse = self.decode(response, endpoint).await?;
        Ok(parsed.daily_challenge)
    }

    async fn post<B, R>(&self, endpoint: Endpoint, body: &B) -> Result<R, ClientError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self.json_post(endpoint, body);
        let response = self.send(request, endpoint).await?;
        self.decode(response, endpoint).await
    }

    fn json_post<B: Serialize + ?Sized>(&self, endpoint: Endpoint, body: &B) -> RequestBuilder {
        self.http
            .post(self.url(endpoint))
            .header(CONTENT_TYPE, "application/json")
            .json(body)
    }

    /// Issue exactly one request and reject non-2xx statuses.
    async fn send(
        &self,
        request: RequestBuilder,
        endpoint: Endpoint,
    ) -> Result<Response, ClientError> {
        tracing::debug!(endpoint = endpoint.path(), "Sending backend request");

        let response = request
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = read_capped_error_body(response).await;
            tracing::warn!(
                endpoint = endpoint.path(),
                status = status.as_u16(),
                body_bytes = body.len(),
                "Backend returned error status"
            );
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    async fn decode<R: DeserializeOwned>(
        &self,
        response: Response,
        endpoint: Endpoint,
    ) -> Result<R, ClientError> {
        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;
        serde_json::from_slice(&bytes).map_err(|e| {
            tracing::warn!(
                endpoint = endpoint.path(),
                %e,
                payload_bytes = bytes.len(),
                "Failed to decode backend response"
            );
            ClientError::Decode {
                endpoint: endpoint.path(),
                reason: e.to_string(),
            }
        })
    }

    fn transport_error(&self, error: reqwest::Error) -> ClientError {
        if error.is_timeout() {
            ClientError::Timeout(self.timeout)
        } else {
            ClientError::Network(error)
        }
    }
}

/// Read an error body for diagnostics, truncated to 32 KiB.
pub async fn read_capped_error_body(response: Response) -> String {
    use futures_util::StreamExt;
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let Ok(chunk) = chunk else { break };
        body.extend_from_slice(&chunk);
        if body.len() > MAX_ERROR_BODY_BYTES {
            body.truncate(MAX_ERROR_BODY_BYTES);
            let text = String::from_utf8_lossy(&body);
            return format!("{text}...(truncated)");
        }
    }
    String::from_utf8_lossy(&body).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> BackendClient {
        let settings = BackendSettings {
            base_url: format!("{}/api/", server.uri()),
            timeout: Duration::from_millis(500),
            connect_timeout: Duration::from_secs(1),
        };
        BackendClient::new(&settings).unwrap()
    }

    fn key() -> ApiKey {
        ApiKey::parse("gsk_test").unwrap()
    }

    #[test]
    fn rejects_unsupported_scheme() {
        let settings = BackendSettings {
            base_url: "ftp://example.com/api".to_string(),
            ..BackendSettings::default()
        };
        assert!(matches!(
            BackendClient::new(&settings),
            Err(ClientError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn trailing_slash_is_normalized() {
        let settings = BackendSettings {
            base_url: "https://example.com/api///".to_string(),
            ..BackendSettings::default()
        };
        let client = BackendClient::new(&settings).unwrap();
        assert_eq!(client.base_url(), "https://example.com/api");
        assert_eq!(
            client.url(Endpoint::ProblemHint),
            "https://example.com/api/problem-hint"
        );
    }

    #[tokio::test]
    async fn validate_key_accepts_any_2xx() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/validate-key"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({"api_key": "gsk_test"})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server).validate_key(&key()).await.unwrap();
    }

    #[tokio::test]
    async fn validate_key_reports_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/validate-key"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid API key"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).validate_key(&key()).await.unwrap_err();
        match err {
            ClientError::Status { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("Invalid API key"));
            }
            other => panic!("expected Status, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn problem_hint_extracts_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/problem-hint"))
            .and(body_json(json!({"api_key": "gsk_test", "problem": "42"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"hints": "Try two pointers"})))
            .expect(1)
            .mount(&server)
            .await;

        let problem = NonEmptyString::new("42").unwrap();
        let hints = client_for(&server)
            .problem_hint(&key(), &problem)
            .await
            .unwrap();
        assert_eq!(hints, "Try two pointers");
    }

    #[tokio::test]
    async fn missing_field_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/code-review"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"detail": "ok"})))
            .mount(&server)
            .await;

        let code = NonEmptyString::new("def f(): pass").unwrap();
        let err = client_for(&server)
            .code_review(&key(), &code, Language::Python, Some(1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Decode {
                endpoint: "/code-review",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn malformed_json_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/study-plan"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .study_plan(&key(), &[Topic::Graphs], StudyWeeks::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Decode { .. }));
    }

    #[tokio::test]
    async fn slow_backend_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"content": "late"}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let messages = [Message::user(NonEmptyString::new("hi").unwrap())];
        let err = client
            .chat(&key(), ChatRoute::Search, &messages)
            .await
            .unwrap_err();
        assert_eq!(client.timeout(), Duration::from_millis(500));
        assert!(matches!(err, ClientError::Timeout(limit) if limit == client.timeout()));
    }

    #[tokio::test]
    async fn tutor_chat_uses_leetchat() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/leetchat"))
            .and(body_json(json!({
                "messages": [{"role": "user", "content": "explain BFS"}],
                "api_key": "gsk_test"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"content": "BFS is..."})))
            .expect(1)
            .mount(&server)
            .await;

        let messages = [Message::user(NonEmptyString::new("explain BFS").unwrap())];
        let reply = client_for(&server)
            .chat(&key(), ChatRoute::Tutor, &messages)
            .await
            .unwrap();
        assert_eq!(reply, "BFS is...");
    }

    #[tokio::test]
    async fn daily_challenge_sends_key_in_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/daily-challenge"))
            .and(query_param("api_key", "gsk_test"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"daily_challenge": "Reverse a list"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let challenge = client_for(&server).daily_challenge(&key()).await.unwrap();
        assert_eq!(challenge, "Reverse a list");
    }

    #[tokio::test]
    async fn connection_refused_is_network_error() {
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let settings = BackendSettings {
            base_url: format!("http://127.0.0.1:{port}/api"),
            timeout: Duration::from_secs(2),
            connect_timeout: Duration::from_secs(1),
        };
        let client = BackendClient::new(&settings).unwrap();

        let err = client.validate_key(&key()).await.unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
    }
}

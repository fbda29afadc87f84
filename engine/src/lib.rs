//! Core engine for RAGna: session gate, conversation and request dispatch.
//!
//! [`App`] owns all state. Backend requests run as spawned tokio tasks and
//! report back over a channel; the owner applies them with
//! [`App::process_events`] or waits with [`App::settle`]. Methods that start
//! a request must be called from within a tokio runtime.

use std::future::Future;
use std::sync::Arc;

use ragna_client::{BackendClient, ChatRoute, ClientError};
use ragna_config::ConversationSettings;

pub use ragna_types::{
    ApiKey, Conversation, Difficulty, Language, Message, NonEmptyString, Role, Screen, StudyWeeks,
    Tab, Topic, ViewState, numeric_problem_id,
};

mod action;
mod errors;
mod session;
mod supervisor;

pub use action::{ActionSlot, ActionSlots, Feature};
pub use errors::{ActionError, ErrorKind, LocalInputError};
pub use session::{GateState, SessionContext, SessionGate};

use supervisor::{Completion, TaskSupervisor};

#[derive(Debug)]
pub struct App {
    client: Arc<BackendClient>,
    view: ViewState,
    session: SessionGate,
    conversation: Conversation,
    send_history: bool,
    slots: ActionSlots,
    supervisor: TaskSupervisor,
}

impl App {
    /// Build an app for `screen`, seeding the conversation with its greeting.
    pub fn new(client: BackendClient, screen: Screen, settings: ConversationSettings) -> Self {
        let mut conversation = Conversation::with_capacity_limit(settings.max_messages);
        conversation.append(Message::assistant(screen.greeting()));
        Self {
            client: Arc::new(client),
            view: ViewState::new(screen),
            session: SessionGate::default(),
            conversation,
            send_history: settings.send_history,
            slots: ActionSlots::default(),
            supervisor: TaskSupervisor::new(),
        }
    }

    pub fn screen(&self) -> Screen {
        self.view.screen()
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn session(&self) -> &SessionGate {
        &self.session
    }

    pub fn is_validated(&self) -> bool {
        self.session.is_validated()
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Returns `true` once per batch of appended messages.
    pub fn take_scroll_request(&mut self) -> bool {
        self.conversation.take_scroll_request()
    }

    pub fn slot(&self, feature: Feature) -> &ActionSlot {
        self.slots.get(feature)
    }

    pub fn is_busy(&self) -> bool {
        self.slots.any_loading()
    }

    // ------------------------------------------------------------------
    // Tabs
    // ------------------------------------------------------------------

    pub fn select_tab(&mut self, tab: Tab) {
        self.view.select(tab);
    }

    pub fn next_tab(&mut self) {
        self.view.select_next();
    }

    pub fn prev_tab(&mut self) {
        self.view.select_prev();
    }

    // ------------------------------------------------------------------
    // Session
    // ------------------------------------------------------------------

    /// Check the key locally, then ask the backend to accept it.
    pub fn submit_api_key(&mut self, raw: &str) -> Result<(), ActionError> {
        let key = match self.session.begin_validation(raw) {
            Ok(key) => key,
            Err(err) => return Err(self.reject(Feature::Validate, err.into())),
        };
        let client = Arc::clone(&self.client);
        self.spawn(Feature::Validate, async move {
            client.validate_key(&key).await.map(|()| String::new())
        });
        Ok(())
    }

    /// Forget the key, drop any key error and cancel everything in flight.
    pub fn reset_api_key(&mut self) {
        let cancelled = self.slots.cancel_all();
        self.slots.get_mut(Feature::Validate).clear();
        self.session.reset();
        tracing::info!(cancelled, "API key reset");
    }

    // ------------------------------------------------------------------
    // Domain actions
    // ------------------------------------------------------------------

    /// Append the user's message and request a reply.
    ///
    /// The user message stays in the conversation even if the request fails.
    pub fn send_chat(&mut self, text: &str) -> Result<(), ActionError> {
        let ctx = self.require_session(Feature::Chat)?;
        let content = match NonEmptyString::new(text.trim()) {
            Ok(content) => content,
            Err(_) => {
                return Err(self.reject(Feature::Chat, LocalInputError::EmptyMessage.into()));
            }
        };
        let message = Message::user(content);
        self.conversation.append(message.clone());

        let messages = if self.send_history {
            self.conversation.messages().cloned().collect()
        } else {
            vec![message]
        };
        let route = match self.view.screen() {
            Screen::Search => ChatRoute::Search,
            Screen::LeetCode => ChatRoute::Tutor,
        };
        self.dispatch(Feature::Chat, ctx, move |client, ctx| async move {
            client.chat(ctx.api_key(), route, &messages).await
        });
        Ok(())
    }

    pub fn request_hints(&mut self, problem: &str) -> Result<(), ActionError> {
        let ctx = self.require_session(Feature::Hints)?;
        let problem =
            self.require_text(Feature::Hints, problem, LocalInputError::MissingProblemId)?;
        self.dispatch(Feature::Hints, ctx, move |client, ctx| async move {
            client.problem_hint(ctx.api_key(), &problem).await
        });
        Ok(())
    }

    pub fn request_review(
        &mut self,
        code: &str,
        language: Language,
        problem_id: Option<i64>,
    ) -> Result<(), ActionError> {
        let ctx = self.require_session(Feature::Review)?;
        let code = self.require_code(Feature::Review, code)?;
        self.dispatch(Feature::Review, ctx, move |client, ctx| async move {
            client
                .code_review(ctx.api_key(), &code, language, problem_id)
                .await
        });
        Ok(())
    }

    pub fn request_study_plan(
        &mut self,
        topics: &[Topic],
        weeks: StudyWeeks,
        difficulty: Option<Difficulty>,
    ) -> Result<(), ActionError> {
        let ctx = self.require_session(Feature::StudyPlan)?;
        if topics.is_empty() {
            return Err(self.reject(Feature::StudyPlan, LocalInputError::NoTopics.into()));
        }
        let topics = topics.to_vec();
        self.dispatch(Feature::StudyPlan, ctx, move |client, ctx| async move {
            client
                .study_plan(ctx.api_key(), &topics, weeks, difficulty)
                .await
        });
        Ok(())
    }

    pub fn request_topic_problems(
        &mut self,
        topic: Topic,
        difficulty: Option<Difficulty>,
    ) -> Result<(), ActionError> {
        let ctx = self.require_session(Feature::TopicProblems)?;
        self.dispatch(Feature::TopicProblems, ctx, move |client, ctx| async move {
            client.topic_problems(ctx.api_key(), topic, difficulty).await
        });
        Ok(())
    }

    pub fn request_pattern_analysis(
        &mut self,
        code: &str,
        language: Language,
    ) -> Result<(), ActionError> {
        let ctx = self.require_session(Feature::Pattern)?;
        let code = self.require_code(Feature::Pattern, code)?;
        self.dispatch(Feature::Pattern, ctx, move |client, ctx| async move {
            client.pattern_analysis(ctx.api_key(), &code, language).await
        });
        Ok(())
    }

    pub fn request_daily_challenge(&mut self) -> Result<(), ActionError> {
        let ctx = self.require_session(Feature::DailyChallenge)?;
        self.dispatch(Feature::DailyChallenge, ctx, |client, ctx| async move {
            client.daily_challenge(ctx.api_key()).await
        });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Completions
    // ------------------------------------------------------------------

    /// Apply every completion that has already arrived. Never blocks.
    ///
    /// Returns the features whose slot changed.
    pub fn process_events(&mut self) -> Vec<Feature> {
        let mut applied = Vec::new();
        while let Some(completion) = self.supervisor.try_next() {
            if let Some(feature) = self.apply(completion) {
                applied.push(feature);
            }
        }
        applied
    }

    /// Wait for the next completion that changes state.
    ///
    /// Pending forever while nothing is in flight, which makes it safe to use
    /// as one branch of a `select!`.
    pub async fn next_event(&mut self) -> Feature {
        loop {
            let Some(completion) = self.supervisor.next().await else {
                return std::future::pending().await;
            };
            if let Some(feature) = self.apply(completion) {
                return feature;
            }
        }
    }

    /// Wait until no request is in flight.
    pub async fn settle(&mut self) {
        while self.slots.any_loading() {
            match self.supervisor.next().await {
                Some(completion) => {
                    self.apply(completion);
                }
                None => break,
            }
        }
    }

    fn apply(&mut self, completion: Completion) -> Option<Feature> {
        let Completion {
            feature,
            generation,
            outcome,
        } = completion;

        match &outcome {
            Ok(_) => tracing::debug!(feature = feature.as_str(), generation, "Request completed"),
            Err(err) => tracing::warn!(
                feature = feature.as_str(),
                generation,
                kind = ?err.kind(),
                error = %err,
                "Request failed"
            ),
        }

        let reply = match (feature, &outcome) {
            (Feature::Chat, Ok(content)) => Some(content.clone()),
            _ => None,
        };
        let accepted = outcome.is_ok();

        if !self.slots.get_mut(feature).complete(generation, outcome) {
            tracing::debug!(feature = feature.as_str(), generation, "Dropped stale completion");
            return None;
        }

        match feature {
            Feature::Validate => {
                self.session.finish_validation(accepted);
                if accepted {
                    tracing::info!("API key validated");
                    if let Some(notice) = self.view.screen().validated_notice() {
                        self.conversation.append(Message::assistant(notice));
                    }
                }
            }
            Feature::Chat => {
                if let Some(reply) = reply {
                    self.conversation.append(Message::assistant(reply));
                }
            }
            _ => {}
        }
        Some(feature)
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn require_session(&mut self, feature: Feature) -> Result<SessionContext, ActionError> {
        match self.session.context() {
            Some(ctx) => Ok(ctx),
            None => Err(self.reject(feature, ActionError::NotValidated)),
        }
    }

    fn require_text(
        &mut self,
        feature: Feature,
        raw: &str,
        missing: LocalInputError,
    ) -> Result<NonEmptyString, ActionError> {
        NonEmptyString::new(raw.trim()).map_err(|_| self.reject(feature, missing.into()))
    }

    /// Code keeps its indentation; only an all-whitespace body is rejected.
    fn require_code(&mut self, feature: Feature, raw: &str) -> Result<NonEmptyString, ActionError> {
        NonEmptyString::new(raw)
            .map_err(|_| self.reject(feature, LocalInputError::MissingCode.into()))
    }

    fn reject(&mut self, feature: Feature, err: ActionError) -> ActionError {
        tracing::debug!(feature = feature.as_str(), error = %err, "Rejected locally");
        self.slots.get_mut(feature).reject(err.clone());
        err
    }

    fn dispatch<F, Fut>(&mut self, feature: Feature, ctx: SessionContext, request: F)
    where
        F: FnOnce(Arc<BackendClient>, SessionContext) -> Fut,
        Fut: Future<Output = Result<String, ClientError>> + Send + 'static,
    {
        let pending = request(Arc::clone(&self.client), ctx);
        self.spawn(feature, pending);
    }

    fn spawn<Fut>(&mut self, feature: Feature, pending: Fut)
    where
        Fut: Future<Output = Result<String, ClientError>> + Send + 'static,
    {
        let task = async move {
            pending
                .await
                .map_err(|err| ActionError::from_client(err, feature))
        };
        let (generation, abort) = self.supervisor.spawn(feature, task);
        tracing::debug!(feature = feature.as_str(), generation, "Request dispatched");
        self.slots.get_mut(feature).begin(generation, abort);
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.slots.cancel_all();
    }
}

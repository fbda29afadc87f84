//! Per-feature result slots.

use futures_util::future::AbortHandle;

use crate::errors::ActionError;

/// A user action that talks to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Validate,
    Chat,
    Hints,
    Review,
    StudyPlan,
    TopicProblems,
    Pattern,
    DailyChallenge,
}

impl Feature {
    pub const ALL: [Feature; 8] = [
        Feature::Validate,
        Feature::Chat,
        Feature::Hints,
        Feature::Review,
        Feature::StudyPlan,
        Feature::TopicProblems,
        Feature::Pattern,
        Feature::DailyChallenge,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Feature::Validate => "validate",
            Feature::Chat => "chat",
            Feature::Hints => "hints",
            Feature::Review => "review",
            Feature::StudyPlan => "study_plan",
            Feature::TopicProblems => "topic_problems",
            Feature::Pattern => "pattern",
            Feature::DailyChallenge => "daily_challenge",
        }
    }

    pub const fn failure_message(self) -> &'static str {
        match self {
            Feature::Validate => "Failed to validate API key",
            Feature::Chat => "Failed to get response. Please try again.",
            Feature::Hints => "Failed to get problem hints",
            Feature::Review => "Failed to get code review",
            Feature::StudyPlan => "Failed to generate study plan",
            Feature::TopicProblems => "Failed to get topic recommendations",
            Feature::Pattern => "Failed to analyze patterns",
            Feature::DailyChallenge => "Failed to get daily challenge",
        }
    }

    const fn index(self) -> usize {
        match self {
            Feature::Validate => 0,
            Feature::Chat => 1,
            Feature::Hints => 2,
            Feature::Review => 3,
            Feature::StudyPlan => 4,
            Feature::TopicProblems => 5,
            Feature::Pattern => 6,
            Feature::DailyChallenge => 7,
        }
    }
}

#[derive(Debug)]
struct InFlight {
    generation: u64,
    abort: AbortHandle,
}

/// Latest outcome of one feature plus the request currently running for it.
///
/// At most one request is in flight. Content only changes on success, so a
/// failure leaves the previous result visible next to the error.
#[derive(Debug, Default)]
pub struct ActionSlot {
    content: Option<String>,
    error: Option<ActionError>,
    in_flight: Option<InFlight>,
}

impl ActionSlot {
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub fn error(&self) -> Option<&ActionError> {
        self.error.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Record a local rejection. Any running request is left alone.
    pub(crate) fn reject(&mut self, err: ActionError) {
        self.error = Some(err);
    }

    /// Track a freshly spawned request and abort the one it supersedes.
    pub(crate) fn begin(&mut self, generation: u64, abort: AbortHandle) {
        self.error = None;
        if let Some(previous) = self.in_flight.replace(InFlight { generation, abort }) {
            tracing::debug!(superseded = previous.generation, generation, "Request superseded");
            previous.abort.abort();
        }
    }

    /// Apply a completion. Returns `false` for stale generations.
    pub(crate) fn complete(
        &mut self,
        generation: u64,
        outcome: Result<String, ActionError>,
    ) -> bool {
        match &self.in_flight {
            Some(active) if active.generation == generation => {}
            _ => return false,
        }
        self.in_flight = None;
        match outcome {
            Ok(content) => {
                self.content = Some(content);
                self.error = None;
            }
            Err(err) => self.error = Some(err),
        }
        true
    }

    pub(crate) fn cancel(&mut self) -> bool {
        match self.in_flight.take() {
            Some(active) => {
                active.abort.abort();
                true
            }
            None => false,
        }
    }

    /// Cancel any running request and drop the error. Content is kept.
    pub(crate) fn clear(&mut self) {
        self.cancel();
        self.error = None;
    }

    #[cfg(test)]
    pub(crate) fn abort_handle(&self) -> Option<AbortHandle> {
        self.in_flight.as_ref().map(|active| active.abort.clone())
    }
}

/// One [`ActionSlot`] per [`Feature`].
#[derive(Debug, Default)]
pub struct ActionSlots {
    slots: [ActionSlot; Feature::ALL.len()],
}

impl ActionSlots {
    pub fn get(&self, feature: Feature) -> &ActionSlot {
        &self.slots[feature.index()]
    }

    pub(crate) fn get_mut(&mut self, feature: Feature) -> &mut ActionSlot {
        &mut self.slots[feature.index()]
    }

    pub fn any_loading(&self) -> bool {
        self.slots.iter().any(ActionSlot::is_loading)
    }

    pub(crate) fn cancel_all(&mut self) -> usize {
        self.slots
            .iter_mut()
            .map(ActionSlot::cancel)
            .filter(|cancelled| *cancelled)
            .count()
    }
}

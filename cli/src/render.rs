//! Plain-text rendering of engine state.

use ragna_engine::{ActionSlot, App, Conversation, Feature, GateState, Message, Role, Tab};

/// Features whose output lives on `tab`, in display order.
pub fn tab_features(tab: Tab) -> &'static [Feature] {
    match tab {
        Tab::Hints => &[Feature::Hints],
        Tab::Review => &[Feature::Review, Feature::Pattern],
        Tab::Study => &[
            Feature::StudyPlan,
            Feature::TopicProblems,
            Feature::DailyChallenge,
        ],
        Tab::Chat => &[Feature::Chat],
    }
}

pub fn tab_of(feature: Feature) -> Option<Tab> {
    Tab::ALL
        .into_iter()
        .find(|tab| tab_features(*tab).contains(&feature))
}

fn feature_title(feature: Feature) -> &'static str {
    match feature {
        Feature::Validate => "API key",
        Feature::Chat => "Chat",
        Feature::Hints => "Problem hints",
        Feature::Review => "Code review",
        Feature::StudyPlan => "Study plan",
        Feature::TopicProblems => "Recommended problems",
        Feature::Pattern => "Pattern analysis",
        Feature::DailyChallenge => "Daily challenge",
    }
}

pub fn tab_bar(active: Tab) -> String {
    Tab::ALL
        .iter()
        .map(|tab| {
            if *tab == active {
                format!("[{}]", tab.label())
            } else {
                tab.label().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
}

pub fn session_line(state: GateState) -> &'static str {
    match state {
        GateState::Unauthenticated => "API key: not validated (use /key <api-key>)",
        GateState::Validating => "API key: validating...",
        GateState::Validated => "API key: validated",
    }
}

pub fn message(message: &Message) -> String {
    let who = match message.role() {
        Role::User => "you",
        Role::Assistant => "assistant",
    };
    format!("{who}> {}", message.content())
}

pub fn eviction_note(conversation: &Conversation) -> Option<String> {
    (conversation.evicted() > 0).then(|| {
        format!(
            "({} earlier messages dropped; keeping the last {})",
            conversation.evicted(),
            conversation.max_messages()
        )
    })
}

/// Slot summary. Content is kept on screen beside a later error.
pub fn slot(feature: Feature, slot: &ActionSlot) -> String {
    let mut out = format!("== {} ==\n", feature_title(feature));
    if slot.is_loading() {
        out.push_str("(loading...)\n");
    }
    if let Some(err) = slot.error() {
        out.push_str(&format!("! {}\n", err.user_message(feature)));
    }
    match slot.content() {
        Some(content) => {
            out.push_str(content.trim_end());
            out.push('\n');
        }
        None if !slot.is_loading() && slot.error().is_none() => out.push_str("(nothing yet)\n"),
        None => {}
    }
    out
}

/// Full view of the active tab.
pub fn active_tab(app: &App) -> String {
    let tab = app.view().active_tab();
    let mut out = format!(
        "{}  |  {}\n{}\n",
        app.screen().title(),
        tab_bar(tab),
        session_line(app.session().state())
    );
    if let Some(err) = app.slot(Feature::Validate).error() {
        out.push_str(&format!("! {}\n", err.user_message(Feature::Validate)));
    }

    if tab == Tab::Chat {
        let conversation = app.conversation();
        if let Some(note) = eviction_note(conversation) {
            out.push_str(&note);
            out.push('\n');
        }
        for msg in conversation.messages() {
            out.push_str(&message(msg));
            out.push('\n');
        }
        let chat = app.slot(Feature::Chat);
        if chat.is_loading() {
            out.push_str("(assistant is typing...)\n");
        }
        if let Some(err) = chat.error() {
            out.push_str(&format!("! {}\n", err.user_message(Feature::Chat)));
        }
        return out;
    }

    for feature in tab_features(tab) {
        out.push_str(&slot(*feature, app.slot(*feature)));
    }
    out
}

/// Prints conversation messages exactly once as they are appended.
#[derive(Debug, Default)]
pub struct Transcript {
    printed: usize,
}

impl Transcript {
    /// Lines for messages appended since the last call.
    pub fn take_new(&mut self, app: &App) -> Vec<String> {
        let conversation = app.conversation();
        let total = conversation.evicted() + conversation.len();
        let first_new = self.printed.max(conversation.evicted());
        self.printed = total;
        conversation
            .messages()
            .skip(first_new - conversation.evicted())
            .map(message)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_feature_but_validation_has_a_tab() {
        for feature in Feature::ALL {
            assert_eq!(tab_of(feature).is_none(), feature == Feature::Validate);
        }
        assert_eq!(tab_of(Feature::Pattern), Some(Tab::Review));
        assert_eq!(tab_of(Feature::DailyChallenge), Some(Tab::Study));
    }

    #[test]
    fn tab_bar_marks_active() {
        let bar = tab_bar(Tab::Study);
        assert!(bar.contains(&format!("[{}]", Tab::Study.label())));
        assert!(!bar.contains(&format!("[{}]", Tab::Hints.label())));
    }

    #[test]
    fn eviction_note_reports_drops_and_limit() {
        let mut conversation = Conversation::with_capacity_limit(2);
        conversation.append(Message::assistant("a"));
        assert_eq!(eviction_note(&conversation), None);

        conversation.append(Message::assistant("b"));
        conversation.append(Message::assistant("c"));
        assert_eq!(
            eviction_note(&conversation).as_deref(),
            Some("(1 earlier messages dropped; keeping the last 2)")
        );
    }

    #[test]
    fn empty_slot_says_so() {
        let rendered = slot(Feature::Hints, &ActionSlot::default());
        assert!(rendered.contains("Problem hints"));
        assert!(rendered.contains("(nothing yet)"));
    }
}

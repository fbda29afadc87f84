//! Which view is visible.
//!
//! The active tab is independent of session and request state: switching tabs
//! never starts, cancels, or blocks anything.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    Hints,
    Review,
    Study,
    Chat,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Hints, Tab::Review, Tab::Study, Tab::Chat];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Tab::Hints => "hints",
            Tab::Review => "review",
            Tab::Study => "study",
            Tab::Chat => "chat",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Tab::Hints => "Problem Hints",
            Tab::Review => "Code Review",
            Tab::Study => "Study Plan",
            Tab::Chat => "Chat",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "hints" | "hint" => Some(Tab::Hints),
            "review" => Some(Tab::Review),
            "study" | "plan" => Some(Tab::Study),
            "chat" => Some(Tab::Chat),
            _ => None,
        }
    }

    fn index(self) -> usize {
        match self {
            Tab::Hints => 0,
            Tab::Review => 1,
            Tab::Study => 2,
            Tab::Chat => 3,
        }
    }

    #[must_use]
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    #[must_use]
    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// The two assistant screens. They share one engine; only the greeting,
/// starting tab and chat endpoint differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Screen {
    /// Chat with the ArXiv/Wikipedia/web search agent.
    Search,
    /// LeetCode tutoring: hints, code review, study plans.
    #[default]
    LeetCode,
}

impl Screen {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "search" | "search-engine" => Some(Screen::Search),
            "leetcode" | "leetcode-bot" | "tutor" => Some(Screen::LeetCode),
            _ => None,
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Screen::Search => "Educational Content Search from Arxiv, WikiPedia and Web",
            Screen::LeetCode => "LeetCode Gen AI Assistant",
        }
    }

    #[must_use]
    pub const fn initial_tab(self) -> Tab {
        match self {
            Screen::Search => Tab::Chat,
            Screen::LeetCode => Tab::Hints,
        }
    }

    /// First assistant turn shown before any key is submitted.
    #[must_use]
    pub const fn greeting(self) -> &'static str {
        match self {
            Screen::Search => {
                "Hi, I'm a chatbot who can search the ArXiv, Wikipedia and Web for education \
                 related assistant. Please submit your Groq API key to start chatting."
            }
            Screen::LeetCode => {
                "Hi! I'm your LeetCode teaching assistant. I can help you understand problems, \
                 provide hints, explain solutions, and teach problem-solving patterns. Please \
                 submit your Groq API key to start learning!"
            }
        }
    }

    /// Assistant turn appended after a successful key validation, if any.
    #[must_use]
    pub const fn validated_notice(self) -> Option<&'static str> {
        match self {
            Screen::Search => {
                Some("Great! Your API key has been validated. How can I help you today?")
            }
            Screen::LeetCode => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewState {
    screen: Screen,
    active_tab: Tab,
}

impl ViewState {
    #[must_use]
    pub const fn new(screen: Screen) -> Self {
        Self {
            screen,
            active_tab: screen.initial_tab(),
        }
    }

    #[must_use]
    pub const fn screen(&self) -> Screen {
        self.screen
    }

    #[must_use]
    pub const fn active_tab(&self) -> Tab {
        self.active_tab
    }

    pub fn select(&mut self, tab: Tab) {
        self.active_tab = tab;
    }

    pub fn select_next(&mut self) {
        self.active_tab = self.active_tab.next();
    }

    pub fn select_prev(&mut self) {
        self.active_tab = self.active_tab.prev();
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(Screen::default())
    }
}

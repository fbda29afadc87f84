//! Append-only conversation store with a bounded length.

use std::collections::VecDeque;

use crate::message::Message;

pub const DEFAULT_MAX_MESSAGES: usize = 200;

/// Ordered chat transcript.
///
/// Insertion order is display order. When the store is full the oldest turn
/// is evicted. Every length change raises a scroll request that the renderer
/// consumes with [`Conversation::take_scroll_request`].
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: VecDeque<Message>,
    max_messages: usize,
    evicted: usize,
    scroll_pending: bool,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::with_capacity_limit(DEFAULT_MAX_MESSAGES)
    }
}

impl Conversation {
    /// A limit of zero is treated as one; the newest turn is always kept.
    #[must_use]
    pub fn with_capacity_limit(max_messages: usize) -> Self {
        let max_messages = max_messages.max(1);
        Self {
            messages: VecDeque::new(),
            max_messages,
            evicted: 0,
            scroll_pending: false,
        }
    }

    pub fn append(&mut self, message: Message) {
        if self.messages.len() == self.max_messages {
            self.messages.pop_front();
            self.evicted = self.evicted.saturating_add(1);
        }
        self.messages.push_back(message);
        self.scroll_pending = true;
    }

    pub fn messages(&self) -> impl ExactSizeIterator<Item = &Message> + '_ {
        self.messages.iter()
    }

    #[must_use]
    pub fn last(&self) -> Option<&Message> {
        self.messages.back()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    #[must_use]
    pub const fn max_messages(&self) -> usize {
        self.max_messages
    }

    /// Number of turns dropped from the front since creation.
    #[must_use]
    pub const fn evicted(&self) -> usize {
        self.evicted
    }

    /// Returns true once per batch of appends.
    pub fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.scroll_pending)
    }
}

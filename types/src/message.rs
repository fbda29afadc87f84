//! Chat turn model.
//!
//! A `Message` is immutable once built: fields are private and there are no
//! setters. The wire shape (`{"role": "...", "content": "..."}`) is the serde
//! representation, so the client can send these directly.

use serde::{Deserialize, Serialize};

use crate::proofs::NonEmptyString;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    role: Role,
    content: String,
}

impl Message {
    /// User turns come from typed input, so emptiness has already been ruled out.
    #[must_use]
    pub fn user(content: NonEmptyString) -> Self {
        Self {
            role: Role::User,
            content: content.into_inner(),
        }
    }

    /// Assistant turns are stored verbatim as the backend returned them.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }
}

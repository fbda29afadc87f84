//! API key gate.
//!
//! Domain actions need a [`SessionContext`], and the only way to obtain one is
//! from a gate whose key survived a backend round trip.

use ragna_types::ApiKey;

use crate::errors::LocalInputError;

/// Where the gate stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GateState {
    #[default]
    Unauthenticated,
    Validating,
    Validated,
}

/// Proof of a validated key. Constructed only by [`SessionGate::context`].
#[derive(Clone)]
pub struct SessionContext {
    api_key: ApiKey,
}

impl SessionContext {
    pub fn api_key(&self) -> &ApiKey {
        &self.api_key
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext").finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
pub struct SessionGate {
    key: Option<ApiKey>,
    state: GateState,
}

impl SessionGate {
    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn is_validated(&self) -> bool {
        self.state == GateState::Validated
    }

    pub fn has_key(&self) -> bool {
        self.key.is_some()
    }

    /// Check a raw key locally and move to `Validating`.
    ///
    /// A gate that is already validated must be reset first. Starting again
    /// while a validation is pending replaces the pending key.
    pub(crate) fn begin_validation(&mut self, raw: &str) -> Result<ApiKey, LocalInputError> {
        if self.is_validated() {
            return Err(LocalInputError::AlreadyValidated);
        }
        let key = ApiKey::parse(raw).map_err(|_| LocalInputError::MissingApiKey)?;
        self.key = Some(key.clone());
        self.state = GateState::Validating;
        Ok(key)
    }

    /// Settle a pending validation. Ignored unless one is pending.
    pub(crate) fn finish_validation(&mut self, accepted: bool) {
        if self.state != GateState::Validating {
            return;
        }
        self.state = if accepted {
            GateState::Validated
        } else {
            GateState::Unauthenticated
        };
    }

    pub(crate) fn reset(&mut self) {
        self.key = None;
        self.state = GateState::Unauthenticated;
    }

    pub fn context(&self) -> Option<SessionContext> {
        match (&self.key, self.state) {
            (Some(key), GateState::Validated) => Some(SessionContext {
                api_key: key.clone(),
            }),
            _ => None,
        }
    }
}

use std::sync::{PoisonError, RwLock};

use super::CredentialProvider;

/// Credential provider holding a token set by the application.
///
/// After calling [`StaticCredential::set`], the application should call
/// `PubSubCoordinator::trigger_sync` so queued operations are replayed.
#[derive(Debug, Default)]
pub struct StaticCredential {
    token: RwLock<Option<String>>,
}

impl StaticCredential {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: RwLock::new(token.filter(|t| !t.is_empty())),
        }
    }

    pub fn set(&self, token: impl Into<String>) {
        let token = token.into();
        *self.token.write().unwrap_or_else(PoisonError::into_inner) =
            (!token.is_empty()).then_some(token);
    }

    pub fn clear(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl CredentialProvider for StaticCredential {
    fn current_credential(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

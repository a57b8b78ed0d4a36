//! Session lifecycle notifications
//!
//! UI layers subscribe to learn that the session ended, e.g. to redirect to
//! the login page once a refresh has failed.

use tokio::sync::broadcast;

const DEFAULT_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    /// Refresh failed after a 401; tokens were cleared
    Expired,
    /// The user logged out explicitly
    LoggedOut,
}

/// Broadcast channel shared by every client built from one `TokenManager`
#[derive(Debug, Clone)]
pub struct AuthEvents {
    sender: broadcast::Sender<AuthEvent>,
}

impl AuthEvents {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(DEFAULT_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.sender.subscribe()
    }

    /// Publish an event. Having no subscriber is fine.
    pub fn emit(&self, event: AuthEvent) {
        match self.sender.send(event) {
            Ok(receivers) => tracing::debug!(?event, receivers, "Auth event emitted"),
            Err(_) => tracing::debug!(?event, "Auth event emitted without subscribers"),
        }
    }
}

impl Default for AuthEvents {
    fn default() -> Self {
        Self::new()
    }
}

use crate::core::machine::{Reply, SlotFillingMachine};
use crate::models::{ConversationMode, ConversationState};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Conversation state keyed by user identity
///
/// Each user gets their own mutex, held for the whole turn. Messages from
/// one user are therefore processed one at a time and in arrival order,
/// while different users never wait on each other. The map has no TTL and
/// no capacity bound, so a conversation left mid-collection is still there
/// whenever the user comes back.
#[derive(Clone)]
pub struct SessionStore {
    sessions: moka::future::Cache<String, Arc<Mutex<ConversationState>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: moka::future::Cache::builder().build(),
        }
    }

    /// Run one turn of the machine against this user's state
    pub async fn dispatch(
        &self,
        machine: &SlotFillingMachine,
        user_id: &str,
        text: &str,
    ) -> (Reply, ConversationMode) {
        let session = self
            .sessions
            .get_with(user_id.to_string(), async {
                tracing::debug!("New conversation for {}", user_id);
                Arc::new(Mutex::new(ConversationState::default()))
            })
            .await;

        let mut state = session.lock().await;
        let before = state.mode();
        let reply = machine.handle(&mut state, text).await;
        let after = state.mode();

        if before != after {
            tracing::info!("Conversation {} moved {:?} -> {:?}", user_id, before, after);
        }

        (reply, after)
    }

    /// Copy of a user's current state, if they have talked to us
    pub async fn snapshot(&self, user_id: &str) -> Option<ConversationState> {
        let session = self.sessions.get(user_id).await?;
        let state = session.lock().await;
        Some(state.clone())
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

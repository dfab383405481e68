//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the presence manager and the message service, both built over the
//! same pair of injected stores and the same clock. The sweeper gets its own
//! `Arc` to the presence manager and shares nothing else with handlers.

use std::sync::Arc;

use crate::clock::Clock;
use crate::config::ChatConfig;
use crate::services::messages::MessageService;
use crate::services::presence::PresenceManager;
use crate::store::{MessageStore, ParticipantStore};

/// Shared application state. Clone is required by Axum; all fields are Arcs.
#[derive(Clone)]
pub struct AppState {
    pub presence: Arc<PresenceManager>,
    pub messages: Arc<MessageService>,
}

impl AppState {
    #[must_use]
    pub fn new(
        participants: Arc<dyn ParticipantStore>,
        messages: Arc<dyn MessageStore>,
        clock: Arc<dyn Clock>,
        config: &ChatConfig,
    ) -> Self {
        let presence =
            PresenceManager::new(participants.clone(), messages.clone(), clock.clone(), config.inactivity);
        let message_service = MessageService::new(participants, messages, clock, config.send_refreshes_presence);
        Self { presence: Arc::new(presence), messages: Arc::new(message_service) }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

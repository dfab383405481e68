//! Participant and message storage.
//!
//! DESIGN
//! ======
//! Both stores are injected into services as trait objects so the same
//! presence and visibility logic runs against PostgreSQL in production and
//! against [`memory::MemoryStore`] in tests and single-process deployments.
//!
//! Every operation touches a single record. The only compound primitive is
//! [`ParticipantStore::delete_if_stale`], a conditional delete that lets the
//! sweeper remove a participant only if no heartbeat has landed since the
//! stale set was read.

pub mod memory;
pub mod postgres;

use serde::{Deserialize, Serialize};

use crate::clock::Millis;
use crate::error::ErrorCode;

/// Recipient meaning "all participants".
pub const BROADCAST_TARGET: &str = "Todos";

// =============================================================================
// RECORDS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub name: String,
    pub last_seen: Millis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    #[serde(rename = "message", alias = "broadcast")]
    Broadcast,
    #[serde(rename = "private_message", alias = "private")]
    Private,
    #[serde(rename = "status")]
    Status,
}

impl MessageKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Broadcast => "message",
            Self::Private => "private_message",
            Self::Status => "status",
        }
    }

    /// Parse a stored or submitted kind. Accepts the wire names and the
    /// short aliases.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "message" | "broadcast" => Some(Self::Broadcast),
            "private_message" | "private" => Some(Self::Private),
            "status" => Some(Self::Status),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub from: String,
    pub to: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    /// Creation time, `HH:MM:SS` UTC. Display only; order is insertion order.
    pub time: String,
}

impl Message {
    /// A system notice addressed to everyone.
    #[must_use]
    pub fn status(name: &str, text: String, time: String) -> Self {
        Self { from: name.to_owned(), to: BROADCAST_TARGET.to_owned(), text, kind: MessageKind::Status, time }
    }
}

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Transient backend failure. Callers may retry.
    #[error("store unavailable: {0}")]
    Unavailable(String),
    /// Insert rejected because the key already exists.
    #[error("duplicate key: {0}")]
    Duplicate(String),
}

impl ErrorCode for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "E_STORE_UNAVAILABLE",
            Self::Duplicate(_) => "E_DUPLICATE",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                return Self::Duplicate(db_err.message().to_owned());
            }
        }
        Self::Unavailable(err.to_string())
    }
}

// =============================================================================
// TRAITS
// =============================================================================

#[async_trait::async_trait]
pub trait ParticipantStore: Send + Sync {
    async fn find_by_name(&self, name: &str) -> Result<Option<Participant>, StoreError>;

    /// Insert a new participant.
    ///
    /// # Errors
    ///
    /// [`StoreError::Duplicate`] if the name is already registered.
    async fn insert(&self, participant: Participant) -> Result<(), StoreError>;

    /// Raise `last_seen` to `at` (never lowers it). Returns `false` if no
    /// participant has that name.
    async fn update_last_seen(&self, name: &str, at: Millis) -> Result<bool, StoreError>;

    /// Returns `false` if no participant had that name.
    async fn delete_by_name(&self, name: &str) -> Result<bool, StoreError>;

    /// All participants, ordered by name.
    async fn list_all(&self) -> Result<Vec<Participant>, StoreError>;

    /// Participants with `last_seen <= cutoff`, ordered by name.
    async fn list_stale(&self, cutoff: Millis) -> Result<Vec<Participant>, StoreError>;

    /// Atomically delete `name` only if its `last_seen <= cutoff`. Returns
    /// the removed record.
    async fn delete_if_stale(&self, name: &str, cutoff: Millis) -> Result<Option<Participant>, StoreError>;
}

#[async_trait::async_trait]
pub trait MessageStore: Send + Sync {
    async fn append(&self, message: Message) -> Result<(), StoreError>;

    /// Every message in insertion order.
    async fn list_all(&self) -> Result<Vec<Message>, StoreError>;
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

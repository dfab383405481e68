//! In-memory participant and message store.
//!
//! Each collection sits behind its own `RwLock`; every trait method holds the
//! lock for the whole read-check-write, which is what makes
//! `update_last_seen` and `delete_if_stale` linearizable with each other.

use std::collections::HashMap;

use tokio::sync::RwLock;

use super::{Message, MessageStore, Participant, ParticipantStore, StoreError};
use crate::clock::Millis;

#[derive(Default)]
pub struct MemoryStore {
    participants: RwLock<HashMap<String, Millis>>,
    messages: RwLock<Vec<Message>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted(mut participants: Vec<Participant>) -> Vec<Participant> {
    participants.sort_by(|a, b| a.name.cmp(&b.name));
    participants
}

#[async_trait::async_trait]
impl ParticipantStore for MemoryStore {
    async fn find_by_name(&self, name: &str) -> Result<Option<Participant>, StoreError> {
        let participants = self.participants.read().await;
        Ok(participants
            .get(name)
            .map(|&last_seen| Participant { name: name.to_owned(), last_seen }))
    }

    async fn insert(&self, participant: Participant) -> Result<(), StoreError> {
        let mut participants = self.participants.write().await;
        if participants.contains_key(&participant.name) {
            return Err(StoreError::Duplicate(participant.name));
        }
        participants.insert(participant.name, participant.last_seen);
        Ok(())
    }

    async fn update_last_seen(&self, name: &str, at: Millis) -> Result<bool, StoreError> {
        let mut participants = self.participants.write().await;
        let Some(last_seen) = participants.get_mut(name) else {
            return Ok(false);
        };
        *last_seen = (*last_seen).max(at);
        Ok(true)
    }

    async fn delete_by_name(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.participants.write().await.remove(name).is_some())
    }

    async fn list_all(&self) -> Result<Vec<Participant>, StoreError> {
        let participants = self.participants.read().await;
        Ok(sorted(
            participants
                .iter()
                .map(|(name, &last_seen)| Participant { name: name.clone(), last_seen })
                .collect(),
        ))
    }

    async fn list_stale(&self, cutoff: Millis) -> Result<Vec<Participant>, StoreError> {
        let participants = self.participants.read().await;
        Ok(sorted(
            participants
                .iter()
                .filter(|&(_, &last_seen)| last_seen <= cutoff)
                .map(|(name, &last_seen)| Participant { name: name.clone(), last_seen })
                .collect(),
        ))
    }

    async fn delete_if_stale(&self, name: &str, cutoff: Millis) -> Result<Option<Participant>, StoreError> {
        let mut participants = self.participants.write().await;
        match participants.get(name) {
            Some(&last_seen) if last_seen <= cutoff => {
                participants.remove(name);
                Ok(Some(Participant { name: name.to_owned(), last_seen }))
            }
            _ => Ok(None),
        }
    }
}

#[async_trait::async_trait]
impl MessageStore for MemoryStore {
    async fn append(&self, message: Message) -> Result<(), StoreError> {
        self.messages.write().await.push(message);
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Message>, StoreError> {
        Ok(self.messages.read().await.clone())
    }
}

#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;

//! Presence service — join, heartbeat, and stale-participant eviction.
//!
//! DESIGN
//! ======
//! A participant exists from a successful join until the sweeper finds its
//! `last_seen` at or before `now - inactivity`. There is no explicit leave.
//! Join announces the arrival with a status message; eviction announces the
//! departure the same way.
//!
//! ERROR HANDLING
//! ==============
//! Eviction deletes conditionally (`delete_if_stale`) and only then appends
//! the departure notice. If the append fails, the removed record is put back
//! so the notice and the deletion land together or not at all, and the rest
//! of the tick is abandoned. Staleness only grows, so the next tick retries.
//! Join mirrors this: if the arrival notice fails, the new record is removed
//! again so a retried join is not refused as a duplicate.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::clock::{Clock, Millis, format_hms};
use crate::error::ErrorCode;
use crate::store::{Message, MessageStore, Participant, ParticipantStore, StoreError};

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum JoinError {
    #[error("participant name must not be empty")]
    InvalidName,
    #[error("name already in use: {0}")]
    NameTaken(String),
    #[error(transparent)]
    Store(StoreError),
}

impl ErrorCode for JoinError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidName => "E_INVALID_NAME",
            Self::NameTaken(_) => "E_NAME_TAKEN",
            Self::Store(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Store(e) if e.retryable())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HeartbeatError {
    #[error("unknown participant: {0}")]
    UnknownParticipant(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ErrorCode for HeartbeatError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownParticipant(_) => "E_UNKNOWN_PARTICIPANT",
            Self::Store(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Store(e) if e.retryable())
    }
}

// =============================================================================
// SWEEP REPORT
// =============================================================================

/// Outcome of one eviction pass.
#[derive(Debug)]
pub struct SweepReport {
    pub cutoff: Millis,
    /// Names evicted this pass, in the order they were processed.
    pub evicted: Vec<String>,
    /// Stale participants left unprocessed because the pass was abandoned.
    pub abandoned: usize,
    pub error: Option<StoreError>,
}

// =============================================================================
// PRESENCE MANAGER
// =============================================================================

pub struct PresenceManager {
    participants: Arc<dyn ParticipantStore>,
    messages: Arc<dyn MessageStore>,
    clock: Arc<dyn Clock>,
    inactivity: Millis,
}

impl PresenceManager {
    #[must_use]
    pub fn new(
        participants: Arc<dyn ParticipantStore>,
        messages: Arc<dyn MessageStore>,
        clock: Arc<dyn Clock>,
        inactivity: Duration,
    ) -> Self {
        let inactivity = i64::try_from(inactivity.as_millis()).unwrap_or(i64::MAX);
        Self { participants, messages, clock, inactivity }
    }

    /// Register `name` and announce it.
    ///
    /// # Errors
    ///
    /// [`JoinError::NameTaken`] if an active participant already uses the
    /// exact same name.
    pub async fn join(&self, name: &str) -> Result<(), JoinError> {
        if name.trim().is_empty() {
            return Err(JoinError::InvalidName);
        }

        let now = self.clock.now();
        match self
            .participants
            .insert(Participant { name: name.to_owned(), last_seen: now })
            .await
        {
            Ok(()) => {}
            Err(StoreError::Duplicate(_)) => return Err(JoinError::NameTaken(name.to_owned())),
            Err(e) => return Err(JoinError::Store(e)),
        }

        // Record exists before anyone can see the arrival notice. Without the
        // notice the join did not happen, so release the name for a retry.
        let notice = Message::status(name, format!("{name} entered"), format_hms(now));
        if let Err(e) = self.messages.append(notice).await {
            if let Err(undo_err) = self.participants.delete_by_name(name).await {
                warn!(%name, error = %undo_err, "failed to release name after notice failure");
            }
            return Err(JoinError::Store(e));
        }

        info!(%name, "participant joined");
        Ok(())
    }

    /// Extend `name`'s liveness window to now.
    ///
    /// # Errors
    ///
    /// [`HeartbeatError::UnknownParticipant`] if `name` is not registered.
    pub async fn heartbeat(&self, name: &str) -> Result<(), HeartbeatError> {
        if self.participants.update_last_seen(name, self.clock.now()).await? {
            Ok(())
        } else {
            Err(HeartbeatError::UnknownParticipant(name.to_owned()))
        }
    }

    /// Snapshot of all active participants.
    ///
    /// # Errors
    ///
    /// Returns a store error if the read fails.
    pub async fn list_participants(&self) -> Result<Vec<Participant>, StoreError> {
        self.participants.list_all().await
    }

    /// Evict every participant whose `last_seen` is at or before
    /// `now - inactivity`.
    pub async fn evict_stale(&self) -> SweepReport {
        let now = self.clock.now();
        let cutoff = now.saturating_sub(self.inactivity);
        let mut report = SweepReport { cutoff, evicted: Vec::new(), abandoned: 0, error: None };

        let stale = match self.participants.list_stale(cutoff).await {
            Ok(stale) => stale,
            Err(e) => {
                report.error = Some(e);
                return report;
            }
        };

        for (idx, participant) in stale.iter().enumerate() {
            match self.evict_one(&participant.name, cutoff, now).await {
                Ok(true) => report.evicted.push(participant.name.clone()),
                // Heartbeat landed after the stale read.
                Ok(false) => {}
                Err(e) => {
                    report.abandoned = stale.len() - idx;
                    report.error = Some(e);
                    break;
                }
            }
        }

        report
    }

    async fn evict_one(&self, name: &str, cutoff: Millis, now: Millis) -> Result<bool, StoreError> {
        let Some(removed) = self.participants.delete_if_stale(name, cutoff).await? else {
            return Ok(false);
        };

        let notice = Message::status(name, format!("{name} left"), format_hms(now));
        if let Err(e) = self.messages.append(notice).await {
            if let Err(restore_err) = self.participants.insert(removed).await {
                warn!(%name, error = %restore_err, "failed to restore participant after notice failure");
            }
            return Err(e);
        }

        info!(%name, "participant evicted");
        Ok(true)
    }
}

#[cfg(test)]
#[path = "presence_test.rs"]
mod tests;

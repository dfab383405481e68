//! Message service — send path and per-viewer visibility.
//!
//! DESIGN
//! ======
//! The store keeps one flat, append-only log. Visibility is decided per read:
//! broadcasts and status notices are public, private messages are visible
//! only to their sender and recipient. Reads filter first, then keep the
//! `limit` most recent matches, then reverse so the newest comes first.

use std::sync::Arc;

use tracing::warn;

use crate::clock::{Clock, format_hms};
use crate::error::ErrorCode;
use crate::store::{Message, MessageKind, MessageStore, ParticipantStore, StoreError};

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("unknown sender: {0}")]
    UnknownSender(String),
    #[error("invalid message: {0}")]
    InvalidMessage(&'static str),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ErrorCode for SendError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownSender(_) => "E_UNKNOWN_SENDER",
            Self::InvalidMessage(_) => "E_INVALID_MESSAGE",
            Self::Store(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Store(e) if e.retryable())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("viewer must not be empty")]
    InvalidViewer,
    #[error("limit must be a positive integer")]
    InvalidLimit,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ErrorCode for ReadError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidViewer => "E_INVALID_VIEWER",
            Self::InvalidLimit => "E_INVALID_LIMIT",
            Self::Store(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Store(e) if e.retryable())
    }
}

// =============================================================================
// VISIBILITY
// =============================================================================

/// Whether `viewer` may see `message`.
#[must_use]
pub fn is_visible(message: &Message, viewer: &str) -> bool {
    match message.kind {
        MessageKind::Broadcast | MessageKind::Status => true,
        MessageKind::Private => message.from == viewer || message.to == viewer,
    }
}

/// Filter `log` (insertion order) for `viewer`, keep the `limit` most recent
/// matches, and return them newest-first.
#[must_use]
pub fn select_visible(log: Vec<Message>, viewer: &str, limit: Option<usize>) -> Vec<Message> {
    let mut visible: Vec<Message> = log.into_iter().filter(|m| is_visible(m, viewer)).collect();
    if let Some(limit) = limit {
        let skip = visible.len().saturating_sub(limit);
        visible.drain(..skip);
    }
    visible.reverse();
    visible
}

/// Parse a raw `limit` query value.
///
/// # Errors
///
/// [`ReadError::InvalidLimit`] unless the value is a positive integer.
pub fn parse_limit(raw: Option<&str>) -> Result<Option<i64>, ReadError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let limit = raw.trim().parse::<i64>().map_err(|_| ReadError::InvalidLimit)?;
    if limit <= 0 {
        return Err(ReadError::InvalidLimit);
    }
    Ok(Some(limit))
}

// =============================================================================
// MESSAGE SERVICE
// =============================================================================

pub struct MessageService {
    participants: Arc<dyn ParticipantStore>,
    messages: Arc<dyn MessageStore>,
    clock: Arc<dyn Clock>,
    send_refreshes_presence: bool,
}

impl MessageService {
    #[must_use]
    pub fn new(
        participants: Arc<dyn ParticipantStore>,
        messages: Arc<dyn MessageStore>,
        clock: Arc<dyn Clock>,
        send_refreshes_presence: bool,
    ) -> Self {
        Self { participants, messages, clock, send_refreshes_presence }
    }

    /// Append a user message. `kind` must be a broadcast or private kind;
    /// status notices are system-only.
    ///
    /// # Errors
    ///
    /// [`SendError::UnknownSender`] is checked before any field validation.
    pub async fn send(&self, from: &str, to: &str, text: &str, kind: &str) -> Result<(), SendError> {
        if from.is_empty() || self.participants.find_by_name(from).await?.is_none() {
            return Err(SendError::UnknownSender(from.to_owned()));
        }

        if to.trim().is_empty() {
            return Err(SendError::InvalidMessage("recipient is empty"));
        }
        if text.trim().is_empty() {
            return Err(SendError::InvalidMessage("text is empty"));
        }
        let kind = match MessageKind::parse(kind) {
            Some(kind @ (MessageKind::Broadcast | MessageKind::Private)) => kind,
            Some(MessageKind::Status) => return Err(SendError::InvalidMessage("status messages are system-only")),
            None => return Err(SendError::InvalidMessage("unknown message type")),
        };

        let now = self.clock.now();
        self.messages
            .append(Message {
                from: from.to_owned(),
                to: to.to_owned(),
                text: text.to_owned(),
                kind,
                time: format_hms(now),
            })
            .await?;

        // Message is stored; a refresh failure does not fail the send.
        if self.send_refreshes_presence {
            if let Err(e) = self.participants.update_last_seen(from, now).await {
                warn!(%from, error = %e, "failed to refresh sender presence after send");
            }
        }
        Ok(())
    }

    /// Messages visible to `viewer`, newest first, at most `limit` of them.
    ///
    /// # Errors
    ///
    /// [`ReadError::InvalidLimit`] if `limit` is zero or negative.
    pub async fn list_visible(&self, viewer: &str, limit: Option<i64>) -> Result<Vec<Message>, ReadError> {
        if viewer.trim().is_empty() {
            return Err(ReadError::InvalidViewer);
        }
        let limit = match limit {
            None => None,
            Some(n) if n <= 0 => return Err(ReadError::InvalidLimit),
            Some(n) => Some(usize::try_from(n).unwrap_or(usize::MAX)),
        };

        let log = self.messages.list_all().await?;
        Ok(select_visible(log, viewer, limit))
    }
}

#[cfg(test)]
#[path = "messages_test.rs"]
mod tests;

//! `PostgreSQL` store.
//!
//! Single-statement queries only. The conditional delete used by the sweeper
//! is one `DELETE ... WHERE last_seen <= $2 RETURNING`, so a concurrent
//! heartbeat either commits first (and the row no longer matches) or waits
//! on the row lock and then finds nothing to update.

use sqlx::PgPool;

use super::{Message, MessageKind, MessageStore, Participant, ParticipantStore, StoreError};
use crate::clock::Millis;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn to_participant((name, last_seen): (String, i64)) -> Participant {
    Participant { name, last_seen }
}

#[async_trait::async_trait]
impl ParticipantStore for PgStore {
    async fn find_by_name(&self, name: &str) -> Result<Option<Participant>, StoreError> {
        let row = sqlx::query_as::<_, (String, i64)>("SELECT name, last_seen FROM participants WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(to_participant))
    }

    async fn insert(&self, participant: Participant) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO participants (name, last_seen) VALUES ($1, $2)")
            .bind(&participant.name)
            .bind(participant.last_seen)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_last_seen(&self, name: &str, at: Millis) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE participants SET last_seen = GREATEST(last_seen, $2) WHERE name = $1")
            .bind(name)
            .bind(at)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_name(&self, name: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM participants WHERE name = $1")
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_all(&self) -> Result<Vec<Participant>, StoreError> {
        let rows = sqlx::query_as::<_, (String, i64)>("SELECT name, last_seen FROM participants ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(to_participant).collect())
    }

    async fn list_stale(&self, cutoff: Millis) -> Result<Vec<Participant>, StoreError> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT name, last_seen FROM participants WHERE last_seen <= $1 ORDER BY name",
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(to_participant).collect())
    }

    async fn delete_if_stale(&self, name: &str, cutoff: Millis) -> Result<Option<Participant>, StoreError> {
        let row = sqlx::query_as::<_, (String, i64)>(
            "DELETE FROM participants WHERE name = $1 AND last_seen <= $2 RETURNING name, last_seen",
        )
        .bind(name)
        .bind(cutoff)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(to_participant))
    }
}

#[async_trait::async_trait]
impl MessageStore for PgStore {
    async fn append(&self, message: Message) -> Result<(), StoreError> {
        sqlx::query(r#"INSERT INTO messages ("from", "to", text, kind, time) VALUES ($1, $2, $3, $4, $5)"#)
            .bind(&message.from)
            .bind(&message.to)
            .bind(&message.text)
            .bind(message.kind.as_str())
            .bind(&message.time)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Message>, StoreError> {
        let rows = sqlx::query_as::<_, (String, String, String, String, String)>(
            r#"SELECT "from", "to", text, kind, time FROM messages ORDER BY id"#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(from, to, text, kind, time)| {
                let kind = MessageKind::parse(&kind)
                    .ok_or_else(|| StoreError::Unavailable(format!("unknown message kind in store: {kind}")))?;
                Ok(Message { from, to, text, kind, time })
            })
            .collect()
    }
}

#[cfg(all(test, feature = "live-db-tests"))]
#[path = "postgres_test.rs"]
mod tests;

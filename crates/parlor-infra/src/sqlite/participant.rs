//! SQLite participant repository implementation.
//!
//! Implements `ParticipantRepository` from `parlor-core`. Registration and
//! eviction each write both tables inside one transaction.

use chrono::{DateTime, TimeZone, Utc};
use parlor_core::repository::participant::ParticipantRepository;
use parlor_types::error::RepositoryError;
use parlor_types::message::ChatMessage;
use parlor_types::participant::Participant;
use sqlx::Row;

use super::message::insert_message;
use super::pool::DatabasePool;

/// SQLite-backed implementation of `ParticipantRepository`.
#[derive(Clone)]
pub struct SqliteParticipantRepository {
    pool: DatabasePool,
}

impl SqliteParticipantRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn row_to_participant(row: &sqlx::sqlite::SqliteRow) -> Result<Participant, RepositoryError> {
    let name: String = row
        .try_get("name")
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
    let last_seen_ms: i64 = row
        .try_get("last_seen_at")
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

    Ok(Participant {
        name,
        last_seen_at: from_millis(last_seen_ms)?,
    })
}

fn from_millis(ms: i64) -> Result<DateTime<Utc>, RepositoryError> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or_else(|| RepositoryError::Query(format!("invalid timestamp: {ms}")))
}

fn query_err(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Query(e.to_string())
}

impl ParticipantRepository for SqliteParticipantRepository {
    async fn create(
        &self,
        participant: &Participant,
        arrival: &ChatMessage,
    ) -> Result<Participant, RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(query_err)?;

        sqlx::query("INSERT INTO participants (name, last_seen_at) VALUES (?, ?)")
            .bind(&participant.name)
            .bind(participant.last_seen_at.timestamp_millis())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e {
                    if db_err.is_unique_violation() {
                        return RepositoryError::Conflict(format!(
                            "participant '{}' already exists",
                            participant.name
                        ));
                    }
                }
                query_err(e)
            })?;

        insert_message(&mut *tx, arrival).await?;

        tx.commit().await.map_err(query_err)?;

        Ok(participant.clone())
    }

    async fn get(&self, name: &str) -> Result<Option<Participant>, RepositoryError> {
        let row = sqlx::query("SELECT name, last_seen_at FROM participants WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_err)?;

        row.as_ref().map(row_to_participant).transpose()
    }

    async fn list(&self) -> Result<Vec<Participant>, RepositoryError> {
        let rows = sqlx::query("SELECT name, last_seen_at FROM participants ORDER BY rowid ASC")
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_err)?;

        rows.iter().map(row_to_participant).collect()
    }

    async fn touch(&self, name: &str, at: DateTime<Utc>) -> Result<bool, RepositoryError> {
        let result = sqlx::query("UPDATE participants SET last_seen_at = ? WHERE name = ?")
            .bind(at.timestamp_millis())
            .bind(name)
            .execute(&self.pool.writer)
            .await
            .map_err(query_err)?;

        Ok(result.rows_affected() > 0)
    }

    async fn evict(
        &self,
        name: &str,
        cutoff: DateTime<Utc>,
        departure: &ChatMessage,
    ) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(query_err)?;

        let result = sqlx::query("DELETE FROM participants WHERE name = ? AND last_seen_at < ?")
            .bind(name)
            .bind(cutoff.timestamp_millis())
            .execute(&mut *tx)
            .await
            .map_err(query_err)?;

        if result.rows_affected() == 0 {
            tx.rollback().await.map_err(query_err)?;
            return Ok(false);
        }

        insert_message(&mut *tx, departure).await?;

        tx.commit().await.map_err(query_err)?;

        Ok(true)
    }
}

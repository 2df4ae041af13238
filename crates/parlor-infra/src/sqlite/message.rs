//! SQLite message repository implementation.
//!
//! Implements `MessageRepository` from `parlor-core`. Messages are ordered by
//! their autoincrement `seq`, which is insertion order.

use parlor_core::repository::message::MessageRepository;
use parlor_types::error::RepositoryError;
use parlor_types::message::ChatMessage;
use sqlx::{Row, Sqlite};

use super::pool::DatabasePool;

/// SQLite-backed implementation of `MessageRepository`.
#[derive(Clone)]
pub struct SqliteMessageRepository {
    pool: DatabasePool,
}

impl SqliteMessageRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Insert one message on any executor (pool or open transaction).
pub(crate) async fn insert_message<'e, E>(
    executor: E,
    message: &ChatMessage,
) -> Result<(), RepositoryError>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        "INSERT INTO messages (from_name, to_name, text, kind, time) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&message.from)
    .bind(&message.to)
    .bind(&message.text)
    .bind(message.kind.as_str())
    .bind(&message.time)
    .execute(executor)
    .await
    .map_err(|e| RepositoryError::Query(e.to_string()))?;

    Ok(())
}

fn row_to_message(row: &sqlx::sqlite::SqliteRow) -> Result<ChatMessage, RepositoryError> {
    let get = |col: &str| -> Result<String, RepositoryError> {
        row.try_get(col)
            .map_err(|e| RepositoryError::Query(e.to_string()))
    };

    Ok(ChatMessage {
        from: get("from_name")?,
        to: get("to_name")?,
        text: get("text")?,
        kind: get("kind")?.parse().map_err(RepositoryError::Query)?,
        time: get("time")?,
    })
}

impl MessageRepository for SqliteMessageRepository {
    async fn append(&self, message: &ChatMessage) -> Result<ChatMessage, RepositoryError> {
        insert_message(&self.pool.writer, message).await?;
        Ok(message.clone())
    }

    async fn list_visible_to(&self, user: &str) -> Result<Vec<ChatMessage>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT from_name, to_name, text, kind, time FROM messages
             WHERE to_name = ? OR from_name = ? OR kind IN ('message', 'status')
             ORDER BY seq ASC",
        )
        .bind(user)
        .bind(user)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter().map(row_to_message).collect()
    }
}

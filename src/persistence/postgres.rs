//! PostgreSQL implementation of [`RoomStore`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::RoomStore;
use super::models::{Message, Room};
use crate::domain::RoomId;
use crate::error::RelayError;

/// SQLSTATE for a foreign key violation.
const FOREIGN_KEY_VIOLATION: &str = "23503";

type MessageRow = (Uuid, Uuid, String, i64, bool, DateTime<Utc>);

/// PostgreSQL-backed room store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresRoomStore {
    pool: PgPool,
}

impl PostgresRoomStore {
    /// Creates a store over the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded migrations from `migrations/`.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Unavailable`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), RelayError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| RelayError::Unavailable(e.to_string()))
    }
}

fn into_message((id, room_id, message, reaction_count, answered, created_at): MessageRow) -> Message {
    Message {
        id,
        room_id: RoomId::from_uuid(room_id),
        message,
        reaction_count,
        answered,
        created_at,
    }
}

#[async_trait]
impl RoomStore for PostgresRoomStore {
    async fn room_exists(&self, room_id: RoomId) -> Result<bool, RelayError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM rooms WHERE id = $1)")
                .bind(room_id.as_uuid())
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn insert_room(&self, theme: &str) -> Result<RoomId, RelayError> {
        let room_id = RoomId::new();
        sqlx::query("INSERT INTO rooms (id, theme) VALUES ($1, $2)")
            .bind(room_id.as_uuid())
            .bind(theme)
            .execute(&self.pool)
            .await?;
        Ok(room_id)
    }

    async fn get_room(&self, room_id: RoomId) -> Result<Room, RelayError> {
        let row = sqlx::query_as::<_, (Uuid, String)>("SELECT id, theme FROM rooms WHERE id = $1")
            .bind(room_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|(id, theme)| Room {
            id: RoomId::from_uuid(id),
            theme,
        })
        .ok_or(RelayError::RoomNotFound(*room_id.as_uuid()))
    }

    async fn list_rooms(&self) -> Result<Vec<Room>, RelayError> {
        let rows = sqlx::query_as::<_, (Uuid, String)>("SELECT id, theme FROM rooms ORDER BY theme")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(id, theme)| Room {
                id: RoomId::from_uuid(id),
                theme,
            })
            .collect())
    }

    async fn insert_message(&self, room_id: RoomId, message: &str) -> Result<Uuid, RelayError> {
        let message_id = Uuid::new_v4();
        sqlx::query("INSERT INTO messages (id, room_id, message) VALUES ($1, $2, $3)")
            .bind(message_id)
            .bind(room_id.as_uuid())
            .bind(message)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                let fk_violation = e
                    .as_database_error()
                    .and_then(|db| db.code())
                    .is_some_and(|code| code == FOREIGN_KEY_VIOLATION);
                if fk_violation {
                    RelayError::RoomNotFound(*room_id.as_uuid())
                } else {
                    RelayError::from(e)
                }
            })?;
        Ok(message_id)
    }

    async fn get_message(&self, room_id: RoomId, message_id: Uuid) -> Result<Message, RelayError> {
        let row = sqlx::query_as::<_, MessageRow>(
            "SELECT id, room_id, message, reaction_count, answered, created_at \
             FROM messages WHERE id = $1 AND room_id = $2",
        )
        .bind(message_id)
        .bind(room_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(into_message)
            .ok_or(RelayError::MessageNotFound(message_id))
    }

    async fn list_messages(&self, room_id: RoomId) -> Result<Vec<Message>, RelayError> {
        let rows = sqlx::query_as::<_, MessageRow>(
            "SELECT id, room_id, message, reaction_count, answered, created_at \
             FROM messages WHERE room_id = $1 ORDER BY created_at ASC",
        )
        .bind(room_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(into_message).collect())
    }

    async fn react_to_message(
        &self,
        room_id: RoomId,
        message_id: Uuid,
    ) -> Result<i64, RelayError> {
        sqlx::query_scalar::<_, i64>(
            "UPDATE messages SET reaction_count = reaction_count + 1 \
             WHERE id = $1 AND room_id = $2 RETURNING reaction_count",
        )
        .bind(message_id)
        .bind(room_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RelayError::MessageNotFound(message_id))
    }

    async fn remove_reaction(&self, room_id: RoomId, message_id: Uuid) -> Result<i64, RelayError> {
        sqlx::query_scalar::<_, i64>(
            "UPDATE messages SET reaction_count = GREATEST(reaction_count - 1, 0) \
             WHERE id = $1 AND room_id = $2 RETURNING reaction_count",
        )
        .bind(message_id)
        .bind(room_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RelayError::MessageNotFound(message_id))
    }

    async fn mark_answered(&self, room_id: RoomId, message_id: Uuid) -> Result<(), RelayError> {
        let result =
            sqlx::query("UPDATE messages SET answered = TRUE WHERE id = $1 AND room_id = $2")
                .bind(message_id)
                .bind(room_id.as_uuid())
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RelayError::MessageNotFound(message_id));
        }
        Ok(())
    }
}

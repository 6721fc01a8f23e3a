use sqlx::{Pool, Sqlite};
use uuid::Uuid;

use crate::db::models::Message;
use crate::error::AppError;

pub struct MessageRepository;

impl MessageRepository {
    pub async fn create(
        pool: &Pool<Sqlite>,
        sender_id: &str,
        receiver_id: &str,
        body: &str,
    ) -> Result<Message, AppError> {
        let id = Uuid::new_v4().to_string();
        let created_at = chrono::Utc::now().timestamp_millis();

        let message = sqlx::query_as::<_, Message>(
            r#"
INSERT INTO messages (id, sender_id, receiver_id, body, created_at)
VALUES (?, ?, ?, ?, ?)
RETURNING *
            "#,
        )
        .bind(&id)
        .bind(sender_id)
        .bind(receiver_id)
        .bind(body)
        .bind(created_at)
        .fetch_one(pool)
        .await?;

        Ok(message)
    }

    pub async fn get_by_id(pool: &Pool<Sqlite>, id: &str) -> Result<Option<Message>, AppError> {
        let message = sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(message)
    }

    /// Both directions of the conversation between two users, oldest first.
    /// The rowid tiebreak keeps insertion order for equal timestamps.
    pub async fn between(
        pool: &Pool<Sqlite>,
        user_id: &str,
        peer_id: &str,
    ) -> Result<Vec<Message>, AppError> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
SELECT * FROM messages
WHERE (sender_id = ? AND receiver_id = ?)
   OR (sender_id = ? AND receiver_id = ?)
ORDER BY created_at ASC, rowid ASC
            "#,
        )
        .bind(user_id)
        .bind(peer_id)
        .bind(peer_id)
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(messages)
    }

    pub async fn delete(pool: &Pool<Sqlite>, id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM messages WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }
}

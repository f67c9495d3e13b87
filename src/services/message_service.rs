use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::conversation::Conversation;
use crate::models::message::{Message, MAX_CONTENT_CHARS};

/// Keyset position for incremental reads: the last message the caller has
/// already seen. Messages strictly after it in (created_at, id) order are
/// returned.
#[derive(Debug, Clone, Copy)]
pub struct Cursor {
    pub created_at: DateTime<Utc>,
    pub id: Uuid,
}

/// Append-only message history per conversation, totally ordered by
/// (created_at, id).
#[derive(Clone)]
pub struct MessageService {
    pool: PgPool,
}

impl MessageService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn conversation(&self, id: Uuid) -> Result<Conversation> {
        let conversation =
            sqlx::query_as::<_, Conversation>("SELECT * FROM conversations WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        conversation.ok_or_else(|| Error::NotFound("Conversation not found".into()))
    }

    pub async fn append(
        &self,
        conversation_id: Uuid,
        sender_id: Uuid,
        content: &str,
    ) -> Result<Message> {
        let chars = content.chars().count();
        if chars == 0 || chars > MAX_CONTENT_CHARS {
            return Err(Error::BadRequest(format!(
                "Message content must be between 1 and {} characters",
                MAX_CONTENT_CHARS
            )));
        }

        let conversation = self.conversation(conversation_id).await?;
        if !conversation.has_participant(sender_id) {
            return Err(Error::Forbidden(
                "Only conversation participants may post messages".into(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let message = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (conversation_id, sender_id, content)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(conversation_id)
        .bind(sender_id)
        .bind(content)
        .fetch_one(&mut *tx)
        .await?;

        // last_message_at never moves backward, even under clock skew
        sqlx::query(
            r#"
            UPDATE conversations
            SET last_message_at = GREATEST(last_message_at, $2), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(conversation_id)
        .bind(message.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(message)
    }

    /// Full history ascending, or the strict suffix after `after`.
    pub async fn list(&self, conversation_id: Uuid, after: Option<Cursor>) -> Result<Vec<Message>> {
        let messages = match after {
            Some(cursor) => {
                sqlx::query_as::<_, Message>(
                    r#"
                    SELECT * FROM messages
                    WHERE conversation_id = $1 AND (created_at, id) > ($2, $3)
                    ORDER BY created_at ASC, id ASC
                    "#,
                )
                .bind(conversation_id)
                .bind(cursor.created_at)
                .bind(cursor.id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Message>(
                    r#"
                    SELECT * FROM messages
                    WHERE conversation_id = $1
                    ORDER BY created_at ASC, id ASC
                    "#,
                )
                .bind(conversation_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(messages)
    }

    /// The most recent message, used as the inbox preview.
    pub async fn preview(&self, conversation_id: Uuid) -> Result<Option<Message>> {
        let message = sqlx::query_as::<_, Message>(
            r#"
            SELECT * FROM messages
            WHERE conversation_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(conversation_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(message)
    }

    /// Marks the counterparty's messages read. Only a participant may read
    /// their side of a conversation.
    pub async fn mark_read(&self, conversation_id: Uuid, reader_id: Uuid) -> Result<u64> {
        let conversation = self.conversation(conversation_id).await?;
        if !conversation.has_participant(reader_id) {
            return Err(Error::Forbidden(
                "Only conversation participants may mark messages read".into(),
            ));
        }

        let result = sqlx::query(
            r#"
            UPDATE messages
            SET read = TRUE
            WHERE conversation_id = $1 AND sender_id <> $2 AND read = FALSE
            "#,
        )
        .bind(conversation_id)
        .bind(reader_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Unread messages addressed to the participant across all conversations.
    pub async fn unread_count(&self, participant: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM messages m
            JOIN conversations c ON c.id = m.conversation_id
            WHERE (c.participant_1_id = $1 OR c.participant_2_id = $1)
              AND m.sender_id <> $1
              AND m.read = FALSE
            "#,
        )
        .bind(participant)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}

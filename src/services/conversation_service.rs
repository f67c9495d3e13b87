use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::conversation::Conversation;

/// Resolves the canonical conversation for an unordered participant pair,
/// creating it on first contact. The partial unique indexes on the
/// conversations table are the only concurrency-correctness mechanism:
/// racing creates collapse onto a single winning row.
#[derive(Clone)]
pub struct ConversationService {
    pool: PgPool,
}

/// Sort the pair so argument order never affects the lookup key.
pub(crate) fn canonical_pair(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

impl ConversationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_or_create(
        &self,
        initiator: Uuid,
        other: Uuid,
        opportunity_id: Option<Uuid>,
    ) -> Result<(Conversation, bool)> {
        if initiator == other {
            return Err(Error::BadRequest(
                "Cannot start a conversation with yourself".into(),
            ));
        }
        let (p1, p2) = canonical_pair(initiator, other);

        // Optimistic insert: on a lost race the winner's row is re-fetched,
        // never surfaced as an error.
        let inserted = match opportunity_id {
            Some(opportunity) => {
                sqlx::query_as::<_, Conversation>(
                    r#"
                    INSERT INTO conversations (participant_1_id, participant_2_id, opportunity_id)
                    VALUES ($1, $2, $3)
                    ON CONFLICT (participant_1_id, participant_2_id, opportunity_id)
                        WHERE opportunity_id IS NOT NULL
                        DO NOTHING
                    RETURNING *
                    "#,
                )
                .bind(p1)
                .bind(p2)
                .bind(opportunity)
                .fetch_optional(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Conversation>(
                    r#"
                    INSERT INTO conversations (participant_1_id, participant_2_id)
                    VALUES ($1, $2)
                    ON CONFLICT (participant_1_id, participant_2_id)
                        WHERE opportunity_id IS NULL
                        DO NOTHING
                    RETURNING *
                    "#,
                )
                .bind(p1)
                .bind(p2)
                .fetch_optional(&self.pool)
                .await?
            }
        };

        if let Some(conversation) = inserted {
            tracing::info!(conversation_id = %conversation.id, "conversation created");
            return Ok((conversation, true));
        }

        let existing = self.find_by_pair(p1, p2, opportunity_id).await?;
        Ok((existing, false))
    }

    async fn find_by_pair(
        &self,
        p1: Uuid,
        p2: Uuid,
        opportunity_id: Option<Uuid>,
    ) -> Result<Conversation> {
        let found = match opportunity_id {
            Some(opportunity) => {
                sqlx::query_as::<_, Conversation>(
                    r#"
                    SELECT * FROM conversations
                    WHERE participant_1_id = $1 AND participant_2_id = $2 AND opportunity_id = $3
                    "#,
                )
                .bind(p1)
                .bind(p2)
                .bind(opportunity)
                .fetch_optional(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Conversation>(
                    r#"
                    SELECT * FROM conversations
                    WHERE participant_1_id = $1 AND participant_2_id = $2 AND opportunity_id IS NULL
                    "#,
                )
                .bind(p1)
                .bind(p2)
                .fetch_optional(&self.pool)
                .await?
            }
        };

        found.ok_or_else(|| Error::NotFound("Conversation not found".into()))
    }

    pub async fn get(&self, id: Uuid) -> Result<Conversation> {
        let conversation =
            sqlx::query_as::<_, Conversation>("SELECT * FROM conversations WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        conversation.ok_or_else(|| Error::NotFound("Conversation not found".into()))
    }

    /// All conversations a participant is party to, most recently active first.
    pub async fn list_for(&self, participant: Uuid) -> Result<Vec<Conversation>> {
        let conversations = sqlx::query_as::<_, Conversation>(
            r#"
            SELECT * FROM conversations
            WHERE participant_1_id = $1 OR participant_2_id = $1
            ORDER BY last_message_at DESC
            "#,
        )
        .bind(participant)
        .fetch_all(&self.pool)
        .await?;

        Ok(conversations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_pair_ignores_argument_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(canonical_pair(a, b), canonical_pair(b, a));
        let (low, high) = canonical_pair(a, b);
        assert!(low < high);
    }
}

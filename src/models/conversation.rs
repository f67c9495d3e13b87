use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One thread per unordered participant pair, optionally scoped to an
/// opportunity. Participants are stored sorted (participant_1 < participant_2).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Conversation {
    pub id: Uuid,
    pub participant_1_id: Uuid,
    pub participant_2_id: Uuid,
    pub opportunity_id: Option<Uuid>,
    pub last_message_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    pub fn has_participant(&self, user_id: Uuid) -> bool {
        self.participant_1_id == user_id || self.participant_2_id == user_id
    }

    /// The counterparty for a given participant. Callers must check
    /// membership first.
    pub fn other_participant(&self, user_id: Uuid) -> Uuid {
        if self.participant_1_id == user_id {
            self.participant_2_id
        } else {
            self.participant_1_id
        }
    }
}

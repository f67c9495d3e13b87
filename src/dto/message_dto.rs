use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct SendMessagePayload {
    pub conversation_id: Uuid,
    #[validate(length(min = 1, max = 5000))]
    pub content: String,
}

/// `after_at` and `after_id` together form a keyset cursor (the last
/// message already seen); when either is missing the full history is
/// returned.
#[derive(Debug, Deserialize)]
pub struct MessageListQuery {
    pub conversation_id: Uuid,
    pub after_at: Option<DateTime<Utc>>,
    pub after_id: Option<Uuid>,
}

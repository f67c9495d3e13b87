use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::conversation::Conversation;
use crate::models::message::Message;
use crate::services::inbox_service::InboxEntry;

#[derive(Debug, Deserialize)]
pub struct StartConversationPayload {
    pub other_participant_id: Uuid,
    pub opportunity_id: Option<Uuid>,
}

/// Returned for both the 201 (created) and 200 (already existed) outcomes.
#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub conversation: Conversation,
    pub created: bool,
}

#[derive(Debug, Serialize)]
pub struct InboxEntryResponse {
    pub conversation_id: Uuid,
    pub opportunity_id: Option<Uuid>,
    pub opportunity_title: Option<String>,
    pub other_participant_id: Uuid,
    pub other_participant_name: String,
    pub other_participant_avatar_url: Option<String>,
    pub last_message: Option<Message>,
    pub last_message_at: DateTime<Utc>,
    pub unread: bool,
}

impl From<InboxEntry> for InboxEntryResponse {
    fn from(entry: InboxEntry) -> Self {
        Self {
            conversation_id: entry.conversation.id,
            opportunity_id: entry.conversation.opportunity_id,
            opportunity_title: entry.opportunity_title,
            other_participant_id: entry.other_participant_id,
            other_participant_name: entry.other_participant.name,
            other_participant_avatar_url: entry.other_participant.avatar_url,
            last_message: entry.preview,
            last_message_at: entry.conversation.last_message_at,
            unread: entry.unread,
        }
    }
}

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::conversation::Conversation;
use crate::models::message::Message;
use crate::services::conversation_service::ConversationService;
use crate::services::message_service::MessageService;
use crate::services::opportunity_service::OpportunityService;
use crate::services::profile_service::{ProfileDisplay, ProfileService};

/// One row of the per-user inbox view.
pub struct InboxEntry {
    pub conversation: Conversation,
    pub other_participant_id: Uuid,
    pub other_participant: ProfileDisplay,
    pub opportunity_title: Option<String>,
    pub preview: Option<Message>,
    pub unread: bool,
}

/// Read-side composition of the conversation directory, message ledger and
/// profile reads. Performs no writes.
#[derive(Clone)]
pub struct InboxService {
    conversations: ConversationService,
    messages: MessageService,
    profiles: ProfileService,
    opportunities: OpportunityService,
}

impl InboxService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            conversations: ConversationService::new(pool.clone()),
            messages: MessageService::new(pool.clone()),
            profiles: ProfileService::new(pool.clone()),
            opportunities: OpportunityService::new(pool),
        }
    }

    pub async fn project(&self, participant: Uuid) -> Result<Vec<InboxEntry>> {
        let conversations = self.conversations.list_for(participant).await?;

        let mut entries = Vec::with_capacity(conversations.len());
        for conversation in conversations {
            let other_participant_id = conversation.other_participant(participant);

            // A counterparty without a profile row still renders; the inbox
            // must not fail because the identity projection is behind.
            let other_participant = self
                .profiles
                .display_info(other_participant_id)
                .await?
                .unwrap_or_else(|| ProfileDisplay {
                    name: "Campus member".to_string(),
                    avatar_url: None,
                });

            let opportunity_title = match conversation.opportunity_id {
                Some(opportunity_id) => self.opportunities.title(opportunity_id).await?,
                None => None,
            };

            let preview = self.messages.preview(conversation.id).await?;
            let unread = preview
                .as_ref()
                .map(|m| m.sender_id != participant && !m.read)
                .unwrap_or(false);

            entries.push(InboxEntry {
                conversation,
                other_participant_id,
                other_participant,
                opportunity_title,
                preview,
                unread,
            });
        }

        Ok(entries)
    }
}

pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use crate::services::{
    application_service::ApplicationService, conversation_service::ConversationService,
    inbox_service::InboxService, message_service::MessageService,
    opportunity_service::OpportunityService,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub conversation_service: ConversationService,
    pub message_service: MessageService,
    pub application_service: ApplicationService,
    pub inbox_service: InboxService,
    pub opportunity_service: OpportunityService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let conversation_service = ConversationService::new(pool.clone());
        let message_service = MessageService::new(pool.clone());
        let application_service = ApplicationService::new(pool.clone());
        let inbox_service = InboxService::new(pool.clone());
        let opportunity_service = OpportunityService::new(pool.clone());

        Self {
            pool,
            conversation_service,
            message_service,
            application_service,
            inbox_service,
            opportunity_service,
        }
    }
}

pub mod application_service;
pub mod conversation_service;
pub mod inbox_service;
pub mod message_service;
pub mod opportunity_service;
pub mod profile_service;

pub mod application;
pub mod conversation;
pub mod message;
pub mod profile;

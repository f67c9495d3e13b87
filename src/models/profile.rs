use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Profile row owned by the identity collaborator; read for display only.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserProfile {
    pub user_id: Uuid,
    pub full_name: Option<String>,
    pub headline: Option<String>,
    pub university: Option<String>,
    pub major: Option<String>,
    pub avatar_url: Option<String>,
    pub verified: bool,
    pub rating: f64,
    pub endorsements: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

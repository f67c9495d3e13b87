use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::profile::UserProfile;

/// Display attributes resolved from the identity collaborator's profile
/// table.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileDisplay {
    pub name: String,
    pub avatar_url: Option<String>,
}

#[derive(Clone)]
pub struct ProfileService {
    pool: PgPool,
}

impl ProfileService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn display_info(&self, user_id: Uuid) -> Result<Option<ProfileDisplay>> {
        let profile =
            sqlx::query_as::<_, UserProfile>("SELECT * FROM user_profiles WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(profile.map(|p| ProfileDisplay {
            name: p.full_name.unwrap_or_else(|| "Campus member".to_string()),
            avatar_url: p.avatar_url,
        }))
    }
}

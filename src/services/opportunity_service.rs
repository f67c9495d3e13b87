use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Read-side contract against the opportunity store. Listing CRUD lives
/// elsewhere; this core only needs existence, ownership and a display title.
#[derive(Clone)]
pub struct OpportunityService {
    pool: PgPool,
}

impl OpportunityService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn exists(&self, id: Uuid) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM opportunities WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    pub async fn owner(&self, id: Uuid) -> Result<Uuid> {
        let owner: Option<Uuid> =
            sqlx::query_scalar("SELECT user_id FROM opportunities WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        owner.ok_or_else(|| Error::NotFound("Opportunity not found".into()))
    }

    pub async fn title(&self, id: Uuid) -> Result<Option<String>> {
        let title: Option<String> =
            sqlx::query_scalar("SELECT title FROM opportunities WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(title)
    }
}

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::application::{Application, ApplicationStatus};

/// Guards the at-most-one-pending-application invariant per
/// (user, opportunity). The partial unique index on the applications table
/// is the source of truth; the SELECT pre-check only short-circuits the
/// common case.
#[derive(Clone)]
pub struct ApplicationService {
    pool: PgPool,
}

impl ApplicationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn express_interest(&self, user_id: Uuid, opportunity_id: Uuid) -> Result<Application> {
        if self.find_pending(user_id, opportunity_id).await?.is_some() {
            return Err(Error::Conflict(
                "Interest already expressed for this opportunity".into(),
            ));
        }

        let inserted = sqlx::query_as::<_, Application>(
            r#"
            INSERT INTO applications (user_id, opportunity_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, opportunity_id) WHERE status = 'pending'
                DO NOTHING
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(opportunity_id)
        .fetch_optional(&self.pool)
        .await?;

        // A lost race lands here: the other request's pending row holds the slot.
        inserted.ok_or_else(|| {
            Error::Conflict("Interest already expressed for this opportunity".into())
        })
    }

    pub async fn get(&self, id: Uuid) -> Result<Application> {
        let application =
            sqlx::query_as::<_, Application>("SELECT * FROM applications WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        application.ok_or_else(|| Error::NotFound("Application not found".into()))
    }

    /// pending -> accepted | rejected | withdrawn. Terminal states accept no
    /// further transitions; the guard lives in the UPDATE's WHERE clause so
    /// racing transitions cannot both win.
    pub async fn transition(&self, id: Uuid, new_status: ApplicationStatus) -> Result<Application> {
        if new_status == ApplicationStatus::Pending {
            return Err(Error::Conflict(
                "Applications cannot transition back to pending".into(),
            ));
        }

        let updated = sqlx::query_as::<_, Application>(
            r#"
            UPDATE applications
            SET status = $2, updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(new_status)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(application) => {
                tracing::info!(application_id = %id, status = %new_status, "application transitioned");
                Ok(application)
            }
            None => {
                let current = self.get(id).await?;
                Err(Error::Conflict(format!(
                    "Cannot move application from '{}' to '{}'",
                    current.status, new_status
                )))
            }
        }
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Application>> {
        let applications = sqlx::query_as::<_, Application>(
            r#"
            SELECT * FROM applications
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(applications)
    }

    async fn find_pending(&self, user_id: Uuid, opportunity_id: Uuid) -> Result<Option<Application>> {
        let application = sqlx::query_as::<_, Application>(
            r#"
            SELECT * FROM applications
            WHERE user_id = $1 AND opportunity_id = $2 AND status = 'pending'
            "#,
        )
        .bind(user_id)
        .bind(opportunity_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(application)
    }
}

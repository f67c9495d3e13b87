use serde::Deserialize;

use crate::models::application::ApplicationStatus;

#[derive(Debug, Deserialize)]
pub struct TransitionApplicationPayload {
    pub status: ApplicationStatus,
}

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;

use crate::{
    dto::application_dto::TransitionApplicationPayload,
    error::{Error, Result},
    middleware::auth::Claims,
    models::application::ApplicationStatus,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/opportunities/{id}/interest",
    params(
        ("id" = Uuid, Path, description = "Opportunity ID")
    ),
    responses(
        (status = 201, description = "Interest recorded"),
        (status = 403, description = "Cannot apply to own opportunity"),
        (status = 404, description = "Opportunity not found"),
        (status = 409, description = "Interest already pending")
    )
)]
#[axum::debug_handler]
pub async fn express_interest(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(opportunity_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let me = claims.participant_id()?;

    let owner = state.opportunity_service.owner(opportunity_id).await?;
    if owner == me {
        return Err(Error::Forbidden(
            "Cannot express interest in your own opportunity".into(),
        ));
    }

    let application = state
        .application_service
        .express_interest(me, opportunity_id)
        .await?;

    Ok((StatusCode::CREATED, Json(application)))
}

#[axum::debug_handler]
pub async fn transition_application(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(application_id): Path<Uuid>,
    Json(payload): Json<TransitionApplicationPayload>,
) -> Result<impl IntoResponse> {
    let me = claims.participant_id()?;

    let application = state.application_service.get(application_id).await?;

    // The applicant withdraws; the opportunity owner settles the rest.
    // A pending target falls through to the service, which rejects it.
    let entitled = match payload.status {
        ApplicationStatus::Withdrawn => application.user_id == me,
        ApplicationStatus::Accepted | ApplicationStatus::Rejected => {
            state.opportunity_service.owner(application.opportunity_id).await? == me
        }
        ApplicationStatus::Pending => true,
    };
    if !entitled {
        return Err(Error::Forbidden(
            "Not entitled to perform this transition".into(),
        ));
    }

    let updated = state
        .application_service
        .transition(application_id, payload.status)
        .await?;

    Ok(Json(updated))
}

#[axum::debug_handler]
pub async fn list_my_applications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let me = claims.participant_id()?;
    let applications = state.application_service.list_for_user(me).await?;
    Ok(Json(applications))
}

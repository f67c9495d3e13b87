use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    dto::conversation_dto::{ConversationResponse, InboxEntryResponse, StartConversationPayload},
    error::Result,
    middleware::auth::Claims,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/conversations",
    request_body = StartConversationPayload,
    responses(
        (status = 201, description = "Conversation created", body = Json<ConversationResponse>),
        (status = 200, description = "Conversation already existed", body = Json<ConversationResponse>),
        (status = 400, description = "Self-conversation rejected"),
        (status = 404, description = "Context opportunity not found")
    )
)]
#[axum::debug_handler]
pub async fn start_conversation(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<StartConversationPayload>,
) -> Result<impl IntoResponse> {
    let me = claims.participant_id()?;

    if let Some(opportunity_id) = payload.opportunity_id {
        if !state.opportunity_service.exists(opportunity_id).await? {
            return Err(crate::error::Error::NotFound("Opportunity not found".into()));
        }
    }

    let (conversation, created) = state
        .conversation_service
        .get_or_create(me, payload.other_participant_id, payload.opportunity_id)
        .await?;

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(ConversationResponse { conversation, created })))
}

#[utoipa::path(
    get,
    path = "/api/conversations",
    responses(
        (status = 200, description = "Caller's inbox, most recently active first")
    )
)]
#[axum::debug_handler]
pub async fn list_inbox(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let me = claims.participant_id()?;
    let entries = state.inbox_service.project(me).await?;
    let body: Vec<InboxEntryResponse> = entries.into_iter().map(Into::into).collect();
    Ok(Json(body))
}

#[axum::debug_handler]
pub async fn mark_conversation_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(conversation_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let me = claims.participant_id()?;
    let marked = state.message_service.mark_read(conversation_id, me).await?;
    Ok(Json(json!({ "marked_read": marked })))
}

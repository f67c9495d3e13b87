use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use validator::Validate;

use crate::{
    dto::message_dto::{MessageListQuery, SendMessagePayload},
    error::{Error, Result},
    middleware::auth::Claims,
    services::message_service::Cursor,
    AppState,
};

#[axum::debug_handler]
pub async fn send_message(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<SendMessagePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let me = claims.participant_id()?;

    let message = state
        .message_service
        .append(payload.conversation_id, me, &payload.content)
        .await?;

    Ok((StatusCode::CREATED, Json(message)))
}

#[axum::debug_handler]
pub async fn unread_count(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let me = claims.participant_id()?;
    let count = state.message_service.unread_count(me).await?;
    Ok(Json(serde_json::json!({ "unread_count": count })))
}

#[axum::debug_handler]
pub async fn list_messages(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<MessageListQuery>,
) -> Result<impl IntoResponse> {
    let me = claims.participant_id()?;

    let conversation = state.conversation_service.get(query.conversation_id).await?;
    if !conversation.has_participant(me) {
        return Err(Error::Forbidden(
            "Only conversation participants may read messages".into(),
        ));
    }

    let after = match (query.after_at, query.after_id) {
        (Some(created_at), Some(id)) => Some(Cursor { created_at, id }),
        _ => None,
    };

    let messages = state.message_service.list(conversation.id, after).await?;
    Ok(Json(messages))
}

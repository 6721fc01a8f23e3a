use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::db::models::{Message, User};
use crate::db::{MessageRepository, UserRepository};
use crate::error::AppError;

const MAX_MESSAGE_LEN: usize = 4096;

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub message: String,
    pub created_at: i64,
}

impl From<&Message> for MessageResponse {
    fn from(message: &Message) -> Self {
        MessageResponse {
            id: message.id.clone(),
            sender_id: message.sender_id.clone(),
            receiver_id: message.receiver_id.clone(),
            message: message.body.clone(),
            created_at: message.created_at,
        }
    }
}

/// POST /api/messages/send/:receiver_id (requires auth)
pub async fn send_message(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(receiver_id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, AppError> {
    let body = req
        .message
        .as_deref()
        .map(str::trim)
        .filter(|body| !body.is_empty())
        .ok_or_else(|| AppError::Validation("Message cannot be empty".to_string()))?;

    if body.len() > MAX_MESSAGE_LEN {
        return Err(AppError::Validation(
            "Message must be 1-4096 characters".to_string(),
        ));
    }

    // Messages may only reference existing users.
    UserRepository::get_by_id(&state.db, &receiver_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Recipient user not found".to_string()))?;

    let message = MessageRepository::create(&state.db, &user.id, &receiver_id, body).await?;

    Ok((StatusCode::CREATED, Json(MessageResponse::from(&message))))
}

/// GET /api/messages/:peer_id (requires auth)
///
/// The full two-party conversation with the peer, oldest first.
pub async fn get_conversation(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(peer_id): Path<String>,
) -> Result<Json<Vec<MessageResponse>>, AppError> {
    let messages = MessageRepository::between(&state.db, &user.id, &peer_id).await?;

    Ok(Json(messages.iter().map(MessageResponse::from).collect()))
}

/// DELETE /api/messages/delete/:id (requires auth)
///
/// Hard delete. Only the sender may remove a message.
pub async fn delete_message(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let message = MessageRepository::get_by_id(&state.db, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Message not found".to_string()))?;

    if message.sender_id != user.id {
        return Err(AppError::Forbidden(
            "You can only delete your own messages".to_string(),
        ));
    }

    MessageRepository::delete(&state.db, &id).await?;

    Ok(Json(serde_json::json!({ "message": "Message deleted" })))
}

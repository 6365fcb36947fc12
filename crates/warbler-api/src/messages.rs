use axum::{
    Extension, Json,
    extract::{Path, State},
    response::Redirect,
};
use tracing::{info, warn};

use warbler_db::Database;
use warbler_db::messages::NewMessage;
use warbler_types::MAX_MESSAGE_LEN;
use warbler_types::api::{MessageResponse, NewMessageRequest};
use warbler_types::models::{Message, User};

use crate::middleware::Session;
use crate::{ApiError, AppState};

/// Most messages shown on a profile or timeline.
pub const PAGE_SIZE: u32 = 100;

pub async fn new_message(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(req): Json<NewMessageRequest>,
) -> Result<Redirect, ApiError> {
    let user = session.require()?;

    let text = req.text.trim();
    if text.is_empty() {
        return Err(ApiError::BadRequest("Message text is required".into()));
    }
    if text.chars().count() > MAX_MESSAGE_LEN {
        return Err(ApiError::BadRequest(format!(
            "Message text is limited to {} characters",
            MAX_MESSAGE_LEN
        )));
    }

    let message = state.db.create_message(&NewMessage {
        id: None,
        text,
        user_id: user.id,
    })?;
    info!("User {} posted message {}", user.id, message.id);

    Ok(Redirect::to(&format!("/users/{}", user.id)))
}

pub async fn show_message(
    State(state): State<AppState>,
    Path(message_id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let (message, author) = state
        .db
        .get_message_with_author(message_id)?
        .ok_or(ApiError::NotFound)?
        .into_parts();

    let like_count = state.db.count_likes_for_message(message.id)?;
    Ok(Json(MessageResponse::new(message, &author, like_count)))
}

/// Only the author may delete a message.
pub async fn delete_message(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(message_id): Path<i64>,
) -> Result<Redirect, ApiError> {
    let user = session.require()?;

    let message = state.db.get_message(message_id)?.ok_or(ApiError::NotFound)?;
    if message.user_id != user.id {
        warn!(
            "User {} tried to delete message {} owned by {}",
            user.id, message.id, message.user_id
        );
        return Err(ApiError::Unauthorized);
    }

    state.db.delete_message(message.id)?;
    info!("User {} deleted message {}", user.id, message.id);

    Ok(Redirect::to(&format!("/users/{}", user.id)))
}

/// Attach like counts, fetched in one batch, to each message.
pub(crate) fn message_responses(
    db: &Database,
    items: Vec<(Message, User)>,
) -> Result<Vec<MessageResponse>, ApiError> {
    let ids: Vec<i64> = items.iter().map(|(m, _)| m.id).collect();
    let counts = db.like_counts_for_messages(&ids)?;

    Ok(items
        .into_iter()
        .map(|(message, author)| {
            let like_count = counts.get(&message.id).copied().unwrap_or(0);
            MessageResponse::new(message, &author, like_count)
        })
        .collect())
}

use axum::{
    Extension,
    extract::{Path, State},
    response::Redirect,
};
use tracing::info;

use crate::middleware::Session;
use crate::{ApiError, AppState};

/// Like the message if the current user hasn't yet, unlike it otherwise.
pub async fn toggle_like(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(message_id): Path<i64>,
) -> Result<Redirect, ApiError> {
    let user = session.require()?;

    if state.db.get_message(message_id)?.is_none() {
        return Err(ApiError::NotFound);
    }

    let added = state.db.toggle_like(user.id, message_id)?;
    info!("User {} {} message {}", user.id, if added { "liked" } else { "unliked" }, message_id);

    Ok(Redirect::to("/"))
}

use axum::{Extension, Json, extract::State};
use axum_extra::extract::cookie::CookieJar;
use tracing::error;

use warbler_types::api::{HomeResponse, UserSummary};

use crate::flash;
use crate::messages::{PAGE_SIZE, message_responses};
use crate::middleware::Session;
use crate::{ApiError, AppState};

/// Pending flash plus, for a signed-in user, the timeline of their own and
/// followed users' messages.
pub async fn home(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<HomeResponse>), ApiError> {
    let (jar, pending) = flash::take(jar);
    let flashes = pending
        .map(|f| f.render(session.user.as_ref()))
        .into_iter()
        .collect();

    let Some(user) = session.user.clone() else {
        return Ok((
            jar,
            Json(HomeResponse {
                flashes,
                user: None,
                messages: vec![],
                liked_message_ids: vec![],
            }),
        ));
    };

    // Run the blocking timeline queries off the async runtime
    let db = state.clone();
    let user_id = user.id;
    let (messages, liked_message_ids) = tokio::task::spawn_blocking(move || {
        let rows = db.db.timeline(user_id, PAGE_SIZE)?;
        let items = rows.into_iter().map(|row| row.into_parts()).collect();
        let messages = message_responses(&db.db, items)?;
        let liked = db.db.liked_message_ids(user_id)?;
        Ok::<_, ApiError>((messages, liked))
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal(e.to_string())
    })??;

    Ok((
        jar,
        Json(HomeResponse {
            flashes,
            user: Some(UserSummary::from(&user)),
            messages,
            liked_message_ids,
        }),
    ))
}

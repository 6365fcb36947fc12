use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::Redirect,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::info;

use warbler_db::users::UserUpdate;
use warbler_types::api::{
    EditProfileRequest, MessageResponse, UserProfileResponse, UserSearchQuery, UserSummary,
};
use warbler_types::models::User;

use crate::auth::authenticate;
use crate::flash::{self, Flash};
use crate::messages::{PAGE_SIZE, message_responses};
use crate::middleware::{Session, clear_session};
use crate::{ApiError, AppState};

pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserSearchQuery>,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    let search = query.q.as_deref().filter(|q| !q.is_empty());
    let users = state.db.list_users(search)?;
    Ok(Json(users.iter().map(UserSummary::from).collect()))
}

pub async fn show_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserProfileResponse>, ApiError> {
    let user = state.db.get_user(user_id)?.ok_or(ApiError::NotFound)?;

    let messages = state.db.messages_for_user(user.id, PAGE_SIZE)?;
    let items = messages.into_iter().map(|m| (m, user.clone())).collect();
    let messages = message_responses(&state.db, items)?;

    let message_count = state.db.count_messages_for_user(user.id)?;
    let following_count = state.db.following(user.id)?.len();
    let followers_count = state.db.followers(user.id)?.len();
    let likes_count = state.db.liked_message_ids(user.id)?.len();

    Ok(Json(UserProfileResponse {
        id: user.id,
        username: user.username,
        image_url: user.image_url,
        header_image_url: user.header_image_url,
        bio: user.bio,
        location: user.location,
        messages,
        message_count,
        following_count,
        followers_count,
        likes_count,
    }))
}

pub async fn show_following(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    session.require()?;
    let user = existing_user(&state, user_id)?;
    let following = state.db.following(user.id)?;
    Ok(Json(following.iter().map(UserSummary::from).collect()))
}

pub async fn show_followers(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    session.require()?;
    let user = existing_user(&state, user_id)?;
    let followers = state.db.followers(user.id)?;
    Ok(Json(followers.iter().map(UserSummary::from).collect()))
}

pub async fn show_likes(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<MessageResponse>>, ApiError> {
    session.require()?;
    let user = existing_user(&state, user_id)?;

    let items = state
        .db
        .liked_messages(user.id)?
        .into_iter()
        .map(|row| row.into_parts())
        .collect();
    Ok(Json(message_responses(&state.db, items)?))
}

pub async fn add_follow(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(follow_id): Path<i64>,
) -> Result<Redirect, ApiError> {
    let user = session.require()?;
    if follow_id == user.id {
        return Err(ApiError::BadRequest("You cannot follow yourself".into()));
    }
    let followed = existing_user(&state, follow_id)?;

    if state.db.follow(user.id, followed.id)? {
        info!("User {} now follows {}", user.id, followed.id);
    }

    Ok(Redirect::to(&format!("/users/{}/following", user.id)))
}

pub async fn stop_following(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(follow_id): Path<i64>,
) -> Result<Redirect, ApiError> {
    let user = session.require()?;
    let followed = existing_user(&state, follow_id)?;

    if state.db.unfollow(user.id, followed.id)? {
        info!("User {} stopped following {}", user.id, followed.id);
    }

    Ok(Redirect::to(&format!("/users/{}/following", user.id)))
}

/// Update the current user's profile. The current password must be supplied
/// and is checked before anything changes.
pub async fn edit_profile(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    jar: CookieJar,
    Json(req): Json<EditProfileRequest>,
) -> Result<(CookieJar, Redirect), ApiError> {
    let user = session.require()?;

    if authenticate(&state.db, &user.username, &req.password)?.is_none() {
        return Err(ApiError::InvalidCredentials);
    }
    if req.username.trim().is_empty() || req.email.trim().is_empty() {
        return Err(ApiError::BadRequest("Username and email are required".into()));
    }

    let update = UserUpdate {
        username: req.username.trim(),
        email: req.email.trim(),
        image_url: non_empty(&req.image_url),
        header_image_url: non_empty(&req.header_image_url),
        bio: non_empty(&req.bio),
        location: non_empty(&req.location),
    };
    let updated = state.db.update_user(user.id, &update)?.ok_or(ApiError::NotFound)?;
    info!("User {} updated their profile", updated.id);

    Ok((
        flash::set(jar, Flash::ProfileUpdated),
        Redirect::to(&format!("/users/{}", updated.id)),
    ))
}

/// Delete the current user along with their messages, follows and likes.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), ApiError> {
    let user = session.require()?;

    state.db.delete_user(user.id)?;
    info!("User {} deleted their account", user.id);

    let jar = clear_session(jar);
    Ok((flash::set(jar, Flash::AccountDeleted), Redirect::to("/")))
}

fn existing_user(state: &AppState, user_id: i64) -> Result<User, ApiError> {
    state.db.get_user(user_id)?.ok_or(ApiError::NotFound)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

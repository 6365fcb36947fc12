use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::debug;

use warbler_types::api::Claims;
use warbler_types::models::User;

use crate::{ApiError, AppState, AppStateInner};

pub const SESSION_COOKIE: &str = "warbler_session";

/// Request-scoped identity, inserted by [`load_session`] for every request.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub user: Option<User>,
}

impl Session {
    /// The current user, or `ApiError::Unauthorized` for anonymous requests.
    pub fn require(&self) -> Result<&User, ApiError> {
        self.user.as_ref().ok_or(ApiError::Unauthorized)
    }
}

/// Resolve the session cookie into a [`Session`]. A missing, forged or
/// expired cookie, or one naming a user that no longer exists, leaves the
/// request anonymous.
pub async fn load_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = match jar.get(SESSION_COOKIE) {
        Some(cookie) => resolve_user(&state, cookie.value())?,
        None => None,
    };

    req.extensions_mut().insert(Session { user });
    Ok(next.run(req).await)
}

fn resolve_user(state: &AppStateInner, token: &str) -> Result<Option<User>, ApiError> {
    let claims = match decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.session_secret.as_bytes()),
        &Validation::default(),
    ) {
        Ok(data) => data.claims,
        Err(e) => {
            debug!("Rejected session cookie: {}", e);
            return Ok(None);
        }
    };

    let user = state.db.get_user(claims.sub)?;
    if user.is_none() {
        debug!("Session names unknown user {}", claims.sub);
    }
    Ok(user)
}

/// Signed session token naming `user_id` as the current user.
pub fn issue_session_token(state: &AppStateInner, user_id: i64) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        exp: (chrono::Utc::now() + state.session_ttl).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.session_secret.as_bytes()),
    )?;

    Ok(token)
}

pub fn session_cookie(state: &AppStateInner, user_id: i64) -> Result<Cookie<'static>, ApiError> {
    let token = issue_session_token(state, user_id)
        .map_err(|e| ApiError::Internal(format!("session token: {e}")))?;

    Ok(Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build())
}

pub fn clear_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, response::Redirect};
use axum_extra::extract::cookie::CookieJar;
use thiserror::Error;
use tracing::{info, warn};

use warbler_db::users::NewUser;
use warbler_db::{Database, DbError};
use warbler_types::api::{LoginRequest, SignupRequest};
use warbler_types::models::User;

use crate::flash::{self, Flash};
use crate::middleware::{clear_session, session_cookie};
use crate::{ApiError, AppState};

#[derive(Debug, Error)]
pub enum AuthError {
    /// Rejected before touching the store.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Duplicate or missing username/email.
    #[error("Integrity error: {0}")]
    Integrity(String),

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error(transparent)]
    Db(DbError),
}

impl From<DbError> for AuthError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Integrity(msg) => AuthError::Integrity(msg),
            other => AuthError::Db(other),
        }
    }
}

/// Create a user with an Argon2id-hashed password.
pub fn signup(db: &Database, form: &SignupRequest) -> Result<User, AuthError> {
    signup_with_id(db, None, form)
}

/// [`signup`] with a caller-chosen user id.
pub fn signup_with_id(db: &Database, id: Option<i64>, form: &SignupRequest) -> Result<User, AuthError> {
    let password = match form.password.as_deref() {
        Some(p) if !p.is_empty() => p,
        _ => return Err(AuthError::Validation("Password must be non-empty".into())),
    };

    let password_hash = hash_password(password)?;
    let image_url = form.image_url.as_deref().filter(|url| !url.is_empty());

    let user = db.create_user(&NewUser {
        id,
        username: form.username.as_deref(),
        email: form.email.as_deref(),
        password_hash: &password_hash,
        image_url,
    })?;

    info!("User {} signed up as {}", user.id, user.username);
    Ok(user)
}

/// Check `password` against the stored hash for `username`. Bad credentials
/// give `Ok(None)`; only storage failures are errors.
pub fn authenticate(db: &Database, username: &str, password: &str) -> Result<Option<User>, DbError> {
    let Some(row) = db.get_user_row_by_username(username)? else {
        return Ok(None);
    };

    let parsed_hash = match PasswordHash::new(&row.password) {
        Ok(hash) => hash,
        Err(e) => {
            warn!("Unreadable password hash for user {}: {}", row.id, e);
            return Ok(None);
        }
    };

    if Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Ok(None);
    }

    Ok(Some(row.into_user()))
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Hash(e.to_string()))?
        .to_string();
    Ok(hash)
}

pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<SignupRequest>,
) -> Result<(CookieJar, Redirect), ApiError> {
    let user = signup(&state.db, &req)?;

    let jar = jar.add(session_cookie(&state, user.id)?);
    Ok((flash::set(jar, Flash::Welcome), Redirect::to("/")))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Redirect), ApiError> {
    let user = authenticate(&state.db, &req.username, &req.password)?
        .ok_or(ApiError::InvalidCredentials)?;

    info!("User {} logged in", user.id);
    let jar = jar.add(session_cookie(&state, user.id)?);
    Ok((flash::set(jar, Flash::Welcome), Redirect::to("/")))
}

pub async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    let jar = clear_session(jar);
    (flash::set(jar, Flash::LoggedOut), Redirect::to("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(username: Option<&str>, email: Option<&str>, password: Option<&str>) -> SignupRequest {
        SignupRequest {
            username: username.map(String::from),
            email: email.map(String::from),
            password: password.map(String::from),
            image_url: None,
        }
    }

    fn seeded() -> (Database, User) {
        let db = Database::open_in_memory().unwrap();
        let user = signup_with_id(
            &db,
            Some(998),
            &form(Some("testuser"), Some("testu@gmail.com"), Some("password")),
        )
        .unwrap();
        (db, user)
    }

    #[test]
    fn signup_persists_user() {
        let (db, _) = seeded();
        let user = signup_with_id(
            &db,
            Some(1111),
            &form(Some("testing_1"), Some("test@email.com"), Some("password1")),
        )
        .unwrap();

        let stored = db.get_user(1111).unwrap().unwrap();
        assert_eq!(stored, user);
        assert_eq!(stored.username, "testing_1");
        assert_eq!(stored.email, "test@email.com");
    }

    #[test]
    fn password_is_hashed() {
        let (db, _) = seeded();
        let row = db.get_user_row_by_username("testuser").unwrap().unwrap();
        assert_ne!(row.password, "password");
        assert!(row.password.starts_with("$argon2"));
    }

    #[test]
    fn missing_username_or_email_is_integrity_error() {
        let (db, _) = seeded();

        let err = signup(&db, &form(None, Some("test@aol.com"), Some("password"))).unwrap_err();
        assert!(matches!(err, AuthError::Integrity(_)));

        let err = signup(&db, &form(Some("test456"), None, Some("password"))).unwrap_err();
        assert!(matches!(err, AuthError::Integrity(_)));
    }

    #[test]
    fn duplicate_username_or_email_is_integrity_error() {
        let (db, _) = seeded();

        let err = signup(&db, &form(Some("testuser"), Some("new@gmail.com"), Some("password")))
            .unwrap_err();
        assert!(matches!(err, AuthError::Integrity(_)));

        let err = signup(&db, &form(Some("fresh"), Some("testu@gmail.com"), Some("password")))
            .unwrap_err();
        assert!(matches!(err, AuthError::Integrity(_)));

        assert_eq!(db.list_users(None).unwrap().len(), 1);
    }

    #[test]
    fn empty_or_missing_password_is_validation_error() {
        let (db, _) = seeded();

        let err = signup(&db, &form(Some("first_test"), Some("email@aol.com"), Some(""))).unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));

        let err = signup(&db, &form(Some("second_test"), Some("email@aol.com"), None)).unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));

        assert!(db.get_user_row_by_username("first_test").unwrap().is_none());
        assert!(db.get_user_row_by_username("second_test").unwrap().is_none());
    }

    #[test]
    fn authenticate_accepts_correct_password() {
        let (db, user) = seeded();
        let found = authenticate(&db, "testuser", "password").unwrap().unwrap();
        assert_eq!(found.id, user.id);
    }

    #[test]
    fn authenticate_rejects_unknown_username() {
        let (db, _) = seeded();
        assert!(authenticate(&db, "fail_username", "password").unwrap().is_none());
    }

    #[test]
    fn authenticate_rejects_wrong_password() {
        let (db, _) = seeded();
        assert!(authenticate(&db, "testuser", "fail_password").unwrap().is_none());
    }

    #[test]
    fn unreadable_hash_does_not_authenticate() {
        let db = Database::open_in_memory().unwrap();
        db.create_user(&NewUser {
            username: Some("legacy"),
            email: Some("legacy@test.com"),
            password_hash: "HASHED_PASSWORD",
            ..Default::default()
        })
        .unwrap();
        assert!(authenticate(&db, "legacy", "HASHED_PASSWORD").unwrap().is_none());
    }
}

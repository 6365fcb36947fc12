//! One-shot notices carried in a cookie until the next visit to `/`.

use axum_extra::extract::cookie::{Cookie, CookieJar};
use warbler_types::api::FlashMessage;
use warbler_types::models::User;

pub const FLASH_COOKIE: &str = "warbler_flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    AccessUnauthorized,
    Welcome,
    LoggedOut,
    ProfileUpdated,
    AccountDeleted,
}

impl Flash {
    fn key(self) -> &'static str {
        match self {
            Flash::AccessUnauthorized => "access_unauthorized",
            Flash::Welcome => "welcome",
            Flash::LoggedOut => "logged_out",
            Flash::ProfileUpdated => "profile_updated",
            Flash::AccountDeleted => "account_deleted",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        Some(match key {
            "access_unauthorized" => Flash::AccessUnauthorized,
            "welcome" => Flash::Welcome,
            "logged_out" => Flash::LoggedOut,
            "profile_updated" => Flash::ProfileUpdated,
            "account_deleted" => Flash::AccountDeleted,
            _ => return None,
        })
    }

    /// `user` is the viewer at render time; the welcome greeting uses it.
    pub fn render(self, user: Option<&User>) -> FlashMessage {
        let (category, message) = match self {
            Flash::AccessUnauthorized => ("danger", "Access unauthorized.".to_string()),
            Flash::Welcome => match user {
                Some(u) => ("success", format!("Hello, {}!", u.username)),
                None => ("success", "Welcome!".to_string()),
            },
            Flash::LoggedOut => ("success", "You have successfully logged out.".to_string()),
            Flash::ProfileUpdated => ("success", "Profile updated.".to_string()),
            Flash::AccountDeleted => ("success", "Your account has been deleted.".to_string()),
        };

        FlashMessage {
            category: category.to_string(),
            message,
        }
    }
}

/// Queue `flash` for the next page. A later flash replaces an earlier one.
pub fn set(jar: CookieJar, flash: Flash) -> CookieJar {
    jar.add(Cookie::build((FLASH_COOKIE, flash.key())).path("/").http_only(true))
}

/// Read the pending flash, if any, and clear it.
pub fn take(jar: CookieJar) -> (CookieJar, Option<Flash>) {
    let Some(cookie) = jar.get(FLASH_COOKIE) else {
        return (jar, None);
    };
    let pending = Flash::from_key(cookie.value());
    (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), pending)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_round_trip() {
        for flash in [
            Flash::AccessUnauthorized,
            Flash::Welcome,
            Flash::LoggedOut,
            Flash::ProfileUpdated,
            Flash::AccountDeleted,
        ] {
            assert_eq!(Flash::from_key(flash.key()), Some(flash));
        }
        assert_eq!(Flash::from_key("bogus"), None);
    }

    #[test]
    fn take_clears_pending_flash() {
        let jar = set(CookieJar::new(), Flash::AccessUnauthorized);
        let (jar, flash) = take(jar);
        assert_eq!(flash, Some(Flash::AccessUnauthorized));
        assert!(jar.get(FLASH_COOKIE).is_none());
    }

    #[test]
    fn unauthorized_message_text() {
        let msg = Flash::AccessUnauthorized.render(None);
        assert_eq!(msg.category, "danger");
        assert_eq!(msg.message, "Access unauthorized.");
    }
}

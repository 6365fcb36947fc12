use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Message, User};

// -- Session --

/// Claims carried by the signed session cookie. `sub` is the current user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub exp: usize,
}

// -- Auth --

/// Every field is optional so that a missing username or email reaches the
/// store and fails there as an integrity error, and a missing password fails
/// validation.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignupRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

// -- Users --

#[derive(Debug, Default, Deserialize)]
pub struct UserSearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EditProfileRequest {
    pub username: String,
    pub email: String,
    pub image_url: Option<String>,
    pub header_image_url: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    /// Current password, re-checked before anything is changed.
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub image_url: String,
    pub bio: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            image_url: user.image_url.clone(),
            bio: user.bio.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserProfileResponse {
    pub id: i64,
    pub username: String,
    pub image_url: String,
    pub header_image_url: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub messages: Vec<MessageResponse>,
    pub message_count: usize,
    pub following_count: usize,
    pub followers_count: usize,
    pub likes_count: usize,
}

// -- Messages --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewMessageRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub id: i64,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub author: UserSummary,
    pub like_count: usize,
}

impl MessageResponse {
    pub fn new(message: Message, author: &User, like_count: usize) -> Self {
        Self {
            id: message.id,
            text: message.text,
            timestamp: message.timestamp,
            author: UserSummary::from(author),
            like_count,
        }
    }
}

// -- Home --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlashMessage {
    pub category: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HomeResponse {
    pub flashes: Vec<FlashMessage>,
    pub user: Option<UserSummary>,
    pub messages: Vec<MessageResponse>,
    pub liked_message_ids: Vec<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

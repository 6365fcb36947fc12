pub mod api;
pub mod models;

/// Profile image used when a user signs up without one.
pub const DEFAULT_IMAGE_URL: &str = "/static/images/default-pic.png";

/// Header image used when a user has not picked one.
pub const DEFAULT_HEADER_IMAGE_URL: &str = "/static/images/warbler-hero.jpg";

/// Longest message text accepted, in characters.
pub const MAX_MESSAGE_LEN: usize = 140;

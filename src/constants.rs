//! Application constants

/// Store key for the singleton user settings record
pub const USER_SETTINGS_KEY: &str = "user_settings";

/// Store key for the video post collection
pub const VIDEO_POSTS_KEY: &str = "video_posts";

/// Store key for the connected social account collection
pub const SOCIAL_ACCOUNTS_KEY: &str = "social_accounts";

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 3000;

/// Default wait between analytics polls (one hour)
pub const DEFAULT_ANALYTICS_POLL_SECS: u64 = 60 * 60;

/// How long a pending OAuth state stays valid (10 minutes)
pub const OAUTH_STATE_TTL_MINUTES: i64 = 10;

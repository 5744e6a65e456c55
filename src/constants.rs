/// Freshness window for cached news results (10 minutes)
pub const NEWS_CACHE_TTL_SECS: i64 = 600;

/// Default period of the background news refresh (10 minutes)
pub const NEWS_REFRESH_INTERVAL_SECS: u64 = 600;

/// Number of articles requested from the news provider
pub const NEWS_PAGE_SIZE: u32 = 5;

/// Query used when a user has no preferred categories
pub const DEFAULT_NEWS_QUERY: &str = "general";

/// Language used when a user has no preferred languages
pub const DEFAULT_NEWS_LANGUAGE: &str = "en";

/// Lifetime of an access token in seconds (1 hour)
pub const TOKEN_TTL_SECS: i64 = 3600;

/// Minimum accepted password length
pub const MIN_PASSWORD_LEN: usize = 6;

/// PBKDF2 iteration count for stored password hashes
pub const PASSWORD_HASH_ROUNDS: u32 = 100_000;

/// Salt length in bytes for password hashes
pub const PASSWORD_SALT_LEN: usize = 16;

/// Role that unlocks the users listing
pub const ADMIN_ROLE: &str = "admin";

// =============================================================================
// Error Messages
// =============================================================================

pub const ERR_INTERNAL: &str = "Internal server error.";
pub const ERR_ENDPOINT_NOT_FOUND: &str = "Endpoint not found.";

pub const ERR_TASK_NOT_FOUND: &str = "Task not found";
pub const ERR_INVALID_TASK_ID: &str = "Invalid task id";
pub const ERR_INVALID_COMPLETED_FILTER: &str = "Invalid completed filter. Use true or false.";
pub const ERR_INVALID_PRIORITY_LEVEL: &str = "Invalid priority level. Use low, medium, or high.";
pub const ERR_TITLE_REQUIRED: &str = "title must be a non-empty string";
pub const ERR_DESCRIPTION_REQUIRED: &str = "description must be a non-empty string";
pub const ERR_COMPLETED_NOT_BOOL: &str = "completed must be a boolean";
pub const ERR_PRIORITY_INVALID: &str = "priority must be one of: low, medium, high";

pub const ERR_INVALID_EMAIL: &str = "Invalid email format.";
pub const ERR_PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters.";
pub const ERR_USERNAME_TAKEN: &str = "Username already exists.";
pub const ERR_INVALID_CREDENTIALS: &str = "Invalid username or password.";
pub const ERR_USER_NOT_FOUND: &str = "User not found";

pub const ERR_TOKEN_REQUIRED: &str = "Token required";
pub const ERR_INVALID_TOKEN: &str = "Invalid or expired token";
pub const ERR_ACCESS_DENIED: &str = "Access denied";

pub const ERR_NEWS_MALFORMED: &str = "Failed to fetch articles from NewsAPI";
pub const ERR_NEWS_FETCH_INTERNAL: &str = "Internal server error while fetching news";
pub const ERR_NEWS_SEARCH: &str = "Failed to search news.";

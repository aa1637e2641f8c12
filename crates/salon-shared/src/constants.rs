/// Application name
pub const APP_NAME: &str = "Salon";

/// Maximum avatar file size in bytes (2 MiB)
pub const MAX_AVATAR_BYTES: u64 = 2 * 1024 * 1024;

/// Maximum chat message length in characters
pub const MAX_MESSAGE_CHARS: usize = 100;

/// Maximum display name length in characters
pub const MAX_DISPLAY_NAME_CHARS: usize = 20;

/// Minimum password length in characters
pub const MIN_PASSWORD_CHARS: usize = 6;

/// Characters per rendered line before a forced break
pub const WRAP_CHARS_PER_LINE: usize = 20;

/// Remote collection holding chat messages
pub const COLLECTION_MESSAGES: &str = "message";

/// Remote collection holding user profiles
pub const COLLECTION_USERS: &str = "user";

/// Document field messages are ordered by
pub const FIELD_TIMESTAMP: &str = "timestamp";

/// Document field used for uid equality lookups
pub const FIELD_UID: &str = "uid";

/// Document field used for topic filtering
pub const FIELD_TOPIC: &str = "topic";

/// Default chat room
pub const DEFAULT_TOPIC: &str = "chat-room-1";

/// Fixed key the session uid persists under in client-local storage
pub const SESSION_STORAGE_KEY: &str = "salon-session-uid";

/// Placeholder avatar written when the user skips avatar selection
/// (8x8 solid-grey PNG).
pub const DEFAULT_AVATAR_DATA_URL: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAgAAAAICAYAAADED76LAAAAE0lEQVR42mM4c+bMf3yYYWQoAAC3adjB5zyYBAAAAABJRU5ErkJggg==";

/// Generic user-facing error strings.  Remote failure causes deliberately
/// collapse into one message per flow; detail goes to the log.
pub const MSG_MALFORMED_EMAIL: &str = "Please enter a valid email address";
pub const MSG_PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters";
pub const MSG_PASSWORD_MISMATCH: &str = "Passwords do not match";
pub const MSG_MISSING_DISPLAY_NAME: &str = "Please enter a user name";
pub const MSG_LOGIN_FAILED: &str = "Login failed, check your email and password";
pub const MSG_SIGNUP_FAILED: &str = "Sign-up failed, please try again";
pub const MSG_SEND_FAILED: &str = "Message could not be sent";
pub const MSG_AVATAR_REJECTED: &str = "Please upload a PNG or JPG image of 2MB or less";

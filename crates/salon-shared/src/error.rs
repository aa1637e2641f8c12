use thiserror::Error;

/// Client-local form validation failures.  Always recoverable: the form
/// stays editable and no remote call has been made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Email address is malformed")]
    MalformedEmail,

    #[error("Password is shorter than the minimum length")]
    PasswordTooShort,

    #[error("Password confirmation does not match")]
    PasswordMismatch,

    #[error("Display name is required")]
    MissingDisplayName,

    #[error("Display name exceeds {0} characters")]
    DisplayNameTooLong(usize),

    #[error("Message exceeds {0} characters")]
    MessageTooLong(usize),
}

/// Authentication failures.  Local pre-checks surface as `Validation`
/// before any network round trip; remote causes collapse into
/// `InvalidCredentials` (sign-in rejection) or `Unknown`.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Authentication failed: {0}")]
    Unknown(String),
}

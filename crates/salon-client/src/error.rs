use thiserror::Error;

use salon_media::AvatarError;
use salon_shared::constants::{
    MSG_AVATAR_REJECTED, MSG_LOGIN_FAILED, MSG_MALFORMED_EMAIL, MSG_MISSING_DISPLAY_NAME,
    MSG_PASSWORD_MISMATCH, MSG_PASSWORD_TOO_SHORT, MSG_SEND_FAILED, MSG_SIGNUP_FAILED,
};
use salon_shared::{AuthError, ValidationError};
use salon_store::StoreError;

/// Which user flow an error surfaced in.  Determines the generic message
/// remote failures collapse into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Login,
    Signup,
    Send,
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Avatar error: {0}")]
    Avatar(#[from] AvatarError),

    #[error("Could not determine application data directory")]
    NoDataDir,
}

impl ClientError {
    /// The single user-visible string for this failure.
    ///
    /// Validation problems name the offending field; every remote cause
    /// deliberately collapses into one generic message per flow, with the
    /// detail going to the log instead of the user.
    pub fn user_message(&self, flow: Flow) -> &'static str {
        let generic = match flow {
            Flow::Login => MSG_LOGIN_FAILED,
            Flow::Signup => MSG_SIGNUP_FAILED,
            Flow::Send => MSG_SEND_FAILED,
        };
        match self {
            ClientError::Validation(v) | ClientError::Auth(AuthError::Validation(v)) => match v {
                ValidationError::MalformedEmail => MSG_MALFORMED_EMAIL,
                ValidationError::PasswordTooShort => MSG_PASSWORD_TOO_SHORT,
                ValidationError::PasswordMismatch => MSG_PASSWORD_MISMATCH,
                ValidationError::MissingDisplayName | ValidationError::DisplayNameTooLong(_) => {
                    MSG_MISSING_DISPLAY_NAME
                }
                ValidationError::MessageTooLong(_) => generic,
            },
            ClientError::Avatar(
                AvatarError::SizeExceeded { .. } | AvatarError::UnsupportedType { .. },
            ) => MSG_AVATAR_REJECTED,
            _ => generic,
        }
    }
}

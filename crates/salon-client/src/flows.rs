//! Signup, login and logout flows.
//!
//! Every flow pre-validates locally before touching the network, so
//! obviously-invalid input never costs a round trip, then delegates to the
//! auth service and the document store.  Remote failures leave the prior
//! state intact and surface through [`ClientError::user_message`] as one
//! generic string per flow.

use tracing::{info, warn};

use salon_media::AvatarImage;
use salon_shared::constants::DEFAULT_AVATAR_DATA_URL;
use salon_shared::{validation, Uid};
use salon_store::{Store, UserProfile};

use crate::auth::AuthService;
use crate::error::ClientError;
use crate::session::Session;

/// Everything the signup screen collects.
#[derive(Debug, Default)]
pub struct SignupForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub display_name: String,
    /// Committed avatar, if the user selected and cropped one.
    pub avatar: Option<AvatarImage>,
}

/// Create an account, open the session, and write the profile document.
///
/// The profile is written exactly once, keyed by the fresh uid; the avatar
/// falls back to the built-in placeholder when none was selected.
pub async fn sign_up(
    auth: &dyn AuthService,
    store: &Store,
    session: &Session,
    form: &SignupForm,
) -> Result<Uid, ClientError> {
    validation::validate_signup(
        &form.email,
        &form.password,
        &form.confirm_password,
        &form.display_name,
    )?;

    let user = auth.create_account(&form.email, &form.password).await?;
    session.set(user.uid.clone());

    let img = form
        .avatar
        .as_ref()
        .map(AvatarImage::to_data_url)
        .unwrap_or_else(|| DEFAULT_AVATAR_DATA_URL.to_string());

    let profile = UserProfile {
        uid: user.uid.clone(),
        name: form.display_name.clone(),
        img,
        email: user.email,
    };
    store.insert_user(&profile).await?;

    info!(uid = %user.uid.short(), "account created");
    Ok(user.uid)
}

/// Authenticate and open the session.
pub async fn sign_in(
    auth: &dyn AuthService,
    session: &Session,
    email: &str,
    password: &str,
) -> Result<Uid, ClientError> {
    validation::validate_login(email, password)?;

    let user = auth.sign_in(email, password).await?;
    session.set(user.uid.clone());
    Ok(user.uid)
}

/// Close the session.  The local session clears even when the remote
/// sign-out fails; staying "logged in" locally would be worse.
pub async fn sign_out(auth: &dyn AuthService, session: &Session) {
    if let Err(e) = auth.sign_out().await {
        warn!(error = %e, "remote sign-out failed");
    }
    session.clear();
}

/// Fetch the profile document for a uid.  `None` when no document matches.
pub async fn lookup_profile(store: &Store, uid: &Uid) -> Result<Option<UserProfile>, ClientError> {
    Ok(store.find_user(uid).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use salon_shared::{AuthError, ValidationError};

    use crate::auth::AuthUser;
    use crate::session::MemoryStorage;

    /// Counts remote calls so tests can assert "no round trip happened".
    struct StubAuth {
        calls: AtomicUsize,
        reject: bool,
    }

    impl StubAuth {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                reject: false,
            }
        }

        fn rejecting() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                reject: true,
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn answer(&self, email: &str) -> Result<AuthUser, AuthError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.reject {
                Err(AuthError::InvalidCredentials)
            } else {
                Ok(AuthUser {
                    uid: Uid::new("uid-1"),
                    email: email.to_string(),
                })
            }
        }
    }

    #[async_trait]
    impl AuthService for StubAuth {
        async fn sign_in(&self, email: &str, _password: &str) -> Result<AuthUser, AuthError> {
            self.answer(email)
        }

        async fn create_account(
            &self,
            email: &str,
            _password: &str,
        ) -> Result<AuthUser, AuthError> {
            self.answer(email)
        }

        async fn sign_out(&self) -> Result<(), AuthError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.reject {
                Err(AuthError::Unknown("offline".into()))
            } else {
                Ok(())
            }
        }
    }

    fn session() -> Session {
        Session::restore(Arc::new(MemoryStorage::new()))
    }

    fn form() -> SignupForm {
        SignupForm {
            email: "alice@example.com".into(),
            password: "secret1".into(),
            confirm_password: "secret1".into(),
            display_name: "alice".into(),
            avatar: None,
        }
    }

    #[tokio::test]
    async fn malformed_email_makes_no_remote_call() {
        let auth = StubAuth::new();
        let store = Store::in_memory();
        let session = session();

        let err = sign_up(
            &auth,
            &store,
            &session,
            &SignupForm {
                email: "bad-email".into(),
                ..form()
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            ClientError::Validation(ValidationError::MalformedEmail)
        ));
        assert_eq!(auth.call_count(), 0);
        assert!(!session.is_signed_in());
    }

    #[tokio::test]
    async fn short_password_makes_no_remote_call() {
        let auth = StubAuth::new();
        let store = Store::in_memory();
        let session = session();

        let err = sign_up(
            &auth,
            &store,
            &session,
            &SignupForm {
                password: "abc".into(),
                confirm_password: "abc".into(),
                ..form()
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            ClientError::Validation(ValidationError::PasswordTooShort)
        ));
        assert_eq!(auth.call_count(), 0);
    }

    #[tokio::test]
    async fn signup_opens_session_and_writes_profile_once() {
        let auth = StubAuth::new();
        let store = Store::in_memory();
        let session = session();

        let uid = sign_up(&auth, &store, &session, &form()).await.unwrap();
        assert_eq!(uid, Uid::new("uid-1"));
        assert_eq!(session.current(), Some(uid.clone()));
        assert_eq!(auth.call_count(), 1);

        let profile = lookup_profile(&store, &uid).await.unwrap().unwrap();
        assert_eq!(profile.name, "alice");
        assert_eq!(profile.email, "alice@example.com");
        // No avatar selected: the placeholder stands in.
        assert_eq!(profile.img, DEFAULT_AVATAR_DATA_URL);
    }

    #[tokio::test]
    async fn committed_avatar_lands_in_the_profile() {
        use image::{ImageBuffer, Rgba};
        use salon_media::{commit, CropRegion, ImageSource};

        let img: ImageBuffer<Rgba<u8>, Vec<u8>> =
            ImageBuffer::from_fn(8, 8, |_, _| Rgba([9, 9, 9, 255]));
        let mut buf = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buf);
        img.write_to(&mut cursor, image::ImageFormat::Png).unwrap();

        let source = ImageSource::validate_selection(buf, "image/png").unwrap();
        let avatar = commit(
            &source,
            &CropRegion {
                width: 8.0,
                height: 8.0,
                ..CropRegion::default()
            },
        )
        .unwrap();
        let expected_url = avatar.to_data_url();

        let auth = StubAuth::new();
        let store = Store::in_memory();
        let session = session();
        let uid = sign_up(
            &auth,
            &store,
            &session,
            &SignupForm {
                avatar: Some(avatar),
                ..form()
            },
        )
        .await
        .unwrap();

        let profile = lookup_profile(&store, &uid).await.unwrap().unwrap();
        assert_eq!(profile.img, expected_url);
    }

    #[tokio::test]
    async fn rejected_credentials_leave_session_closed() {
        let auth = StubAuth::rejecting();
        let session = session();

        let err = sign_in(&auth, &session, "alice@example.com", "secret1")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Auth(AuthError::InvalidCredentials)));
        assert!(!session.is_signed_in());
    }

    #[tokio::test]
    async fn sign_in_opens_the_session() {
        let auth = StubAuth::new();
        let session = session();

        let uid = sign_in(&auth, &session, "alice@example.com", "secret1")
            .await
            .unwrap();
        assert_eq!(session.current(), Some(uid));
    }

    #[tokio::test]
    async fn sign_out_clears_even_when_remote_fails() {
        let auth = StubAuth::rejecting();
        let session = session();
        session.set(Uid::new("uid-1"));

        sign_out(&auth, &session).await;
        assert!(!session.is_signed_in());
    }

    #[tokio::test]
    async fn missing_profile_is_none_not_an_error() {
        let store = Store::in_memory();
        let found = lookup_profile(&store, &Uid::new("ghost")).await.unwrap();
        assert!(found.is_none());
    }
}

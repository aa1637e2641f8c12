//! # salon-client
//!
//! Application core the view layer embeds: session identity, the auth
//! gate, signup/login flows and the live message feed.  Screens, routing
//! and styling stay outside; they call into this crate and render what it
//! returns.

pub mod auth;
pub mod feed;
pub mod flows;
pub mod session;
pub mod state;
pub mod wrap;

mod error;

pub use auth::{AuthConfig, AuthService, AuthUser, HttpAuth};
pub use error::{ClientError, Flow};
pub use feed::{FeedState, FollowScroll, MessageClock, MessageFeed};
pub use flows::{lookup_profile, sign_in, sign_out, sign_up, SignupForm};
pub use session::{FileStorage, MemoryStorage, Session, SessionStorage};
pub use state::AppState;

use tracing_subscriber::{fmt, EnvFilter};

/// Initialise logging for an embedding application.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("salon_client=debug,salon_store=debug,salon_media=info,warn")
    });

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

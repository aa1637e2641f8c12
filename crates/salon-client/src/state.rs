//! Application state handed to the view layer.

use std::sync::Arc;

use salon_store::Store;

use crate::auth::AuthService;
use crate::session::{Session, SessionStorage};

/// Everything the screens need, wired once at startup.
pub struct AppState {
    /// Current session identity (single writer: the auth flows).
    pub session: Session,
    /// Document store handle.
    pub store: Store,
    /// Remote auth service.
    pub auth: Arc<dyn AuthService>,
}

impl AppState {
    /// Wire the application: restore any persisted session from the
    /// injected storage and keep handles to the remote collaborators.
    pub fn new(
        auth: Arc<dyn AuthService>,
        store: Store,
        storage: Arc<dyn SessionStorage>,
    ) -> Self {
        Self {
            session: Session::restore(storage),
            store,
            auth,
        }
    }
}

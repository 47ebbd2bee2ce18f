//! Authentication context passed to the page.

use tracing::{info, warn};

use crate::api::TaskApi;
use crate::user::UserRecord;

/// Identity of the signed-in manager.
///
/// The page receives the session explicitly; it reads the current user for
/// its header and calls [`Session::logout`] when asked to sign out.
#[derive(Debug, Clone, Default)]
pub struct Session {
    current_user: Option<UserRecord>,
    signed_in: bool,
}

impl Session {
    /// A session for an already known user.
    pub fn new(current_user: Option<UserRecord>) -> Self {
        Self { current_user, signed_in: true }
    }

    /// Establish the session by asking the backend who the token belongs to.
    ///
    /// A failed lookup leaves the identity unknown rather than failing; the
    /// page's own requests will surface any authorization problem.
    pub async fn establish<A: TaskApi>(api: &A) -> Self {
        match api.current_user().await {
            Ok(user) => {
                if let Some(user) = &user {
                    info!(username = %user.username, role = %user.role, "session established");
                }
                Self::new(user)
            }
            Err(e) => {
                warn!(error = %e, "could not resolve current user");
                Self::new(None)
            }
        }
    }

    pub fn current_user(&self) -> Option<&UserRecord> {
        self.current_user.as_ref()
    }

    /// Username for display, empty when unknown.
    pub fn username(&self) -> &str {
        self.current_user.as_ref().map(|u| u.username.as_str()).unwrap_or("")
    }

    pub fn is_signed_in(&self) -> bool {
        self.signed_in
    }

    /// Forget the current identity.
    pub fn logout(&mut self) {
        if let Some(user) = self.current_user.take() {
            info!(username = %user.username, "logged out");
        }
        self.signed_in = false;
    }
}

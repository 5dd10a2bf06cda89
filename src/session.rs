use tracing::info;

use crate::db::Database;
use crate::error::Result;
use crate::models::Role;

/// Per-client login state. One value per client context; lives exactly as
/// long as the caller holds it, with no timeout-based expiry.
///
/// Registration is a [`Database`] operation and never touches the session:
/// a fresh signup still has to log in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated {
        username: String,
        role: Role,
    },
}

impl Session {
    pub fn new() -> Self {
        Session::Anonymous
    }

    /// Attempt a login. On success the session becomes `Authenticated` and
    /// `Ok(true)` is returned; on a credential mismatch the session is left
    /// as-is and `Ok(false)` is returned. A mismatch is an ordinary outcome,
    /// not an error, and carries no hint of whether the username exists.
    pub fn login(&mut self, db: &Database, username: &str, password: &str) -> Result<bool> {
        match db.authenticate(username, password)? {
            Some(account) => {
                info!(username = %account.username, role = %account.role, "logged in");
                *self = Session::Authenticated {
                    username: account.username,
                    role: account.role,
                };
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn logout(&mut self) {
        if let Session::Authenticated { username, .. } = self {
            info!(username = %username, "logged out");
        }
        *self = Session::Anonymous;
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated { .. })
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            Session::Authenticated { username, .. } => Some(username),
            Session::Anonymous => None,
        }
    }

    pub fn role(&self) -> Option<Role> {
        match self {
            Session::Authenticated { role, .. } => Some(*role),
            Session::Anonymous => None,
        }
    }
}

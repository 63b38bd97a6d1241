use nanoid::nanoid;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque key correlating a browser session to a stored credential.
///
/// Minted server-side at login; carries no user identity and the store
/// attaches no semantics to its content.
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn mint() -> Self {
        SessionId(format!("sess_{}", nanoid!(21)))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        SessionId(s.to_string())
    }
}

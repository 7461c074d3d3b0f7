//! Session identity required before a conversation can start.

use crate::{Error, Result};

pub const USERNAME_PARAM: &str = "username";
pub const SESSION_ID_PARAM: &str = "sessionId";

/// The `(username, sessionId)` pair every request is parameterized by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub username: String,
    pub session_id: String,
}

impl SessionIdentity {
    /// Validate both parts. A missing or blank part fails with
    /// [`Error::Precondition`] carrying `redirect` as the place to go instead.
    pub fn new(username: Option<&str>, session_id: Option<&str>, redirect: &str) -> Result<Self> {
        let username = require(username, USERNAME_PARAM, redirect)?;
        let session_id = require(session_id, SESSION_ID_PARAM, redirect)?;
        Ok(Self {
            username,
            session_id,
        })
    }

    /// Pick the identity out of decoded query parameters.
    pub fn from_query_pairs<I, K, V>(pairs: I, redirect: &str) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut username = None;
        let mut session_id = None;

        for (key, value) in pairs {
            match key.as_ref() {
                USERNAME_PARAM => username = Some(value.as_ref().to_string()),
                SESSION_ID_PARAM => session_id = Some(value.as_ref().to_string()),
                _ => {}
            }
        }

        Self::new(username.as_deref(), session_id.as_deref(), redirect)
    }

    /// Query/form parameters identifying this session.
    pub fn params(&self) -> [(&'static str, &str); 2] {
        [
            (USERNAME_PARAM, self.username.as_str()),
            (SESSION_ID_PARAM, self.session_id.as_str()),
        ]
    }
}

fn require(value: Option<&str>, name: &'static str, redirect: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.to_string()),
        _ => Err(Error::Precondition {
            missing: name,
            redirect: redirect.to_string(),
        }),
    }
}

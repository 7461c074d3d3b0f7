//! Session bootstrap: reading the identity from a chat page URL and minting
//! new sessions.

use chatstream_core::session::{SESSION_ID_PARAM, USERNAME_PARAM};
use chatstream_core::{ClientConfig, ConversationView, Error, Result, SessionIdentity};
use clap::Args;
use reqwest::Url;

use crate::api::ChatClient;
use crate::app::ChatSession;

/// Where a conversation's identity comes from on the command line.
#[derive(Args, Debug, Clone, Default)]
pub struct SessionArgs {
    /// Chat page URL carrying `username` and `sessionId` query parameters
    #[arg(long)]
    pub page_url: Option<String>,

    #[arg(short, long)]
    pub username: Option<String>,

    #[arg(short, long)]
    pub session_id: Option<String>,
}

/// Resolve the session identity. When it is incomplete the view is sent to
/// the session-start page and the precondition error is returned.
pub fn require_identity<V: ConversationView>(
    args: &SessionArgs,
    config: &ClientConfig,
    view: &mut V,
) -> Result<SessionIdentity> {
    let resolved = match &args.page_url {
        Some(url) => identity_from_page_url(url, config),
        None => SessionIdentity::new(
            args.username.as_deref(),
            args.session_id.as_deref(),
            &config.session_start_url(),
        ),
    };

    if let Err(e) = &resolved {
        if let Some(target) = e.redirect() {
            tracing::warn!("Session identity incomplete, redirecting to {}", target);
            view.redirect(target);
        }
    }
    resolved
}

/// Open a conversation: resolve the identity and load its history.
///
/// A failed history load is already shown by the view, so the session is
/// returned anyway and the caller can keep prompting. Nothing is requested
/// when the identity is incomplete.
pub async fn open_chat<V: ConversationView>(
    args: &SessionArgs,
    config: &ClientConfig,
    client: &ChatClient,
    mut view: V,
) -> Result<ChatSession<V>> {
    let identity = require_identity(args, config, &mut view)?;
    let mut session = ChatSession::new(identity, view);
    if let Err(e) = session.load_history(client).await {
        tracing::warn!("Starting without history: {}", e);
    }
    Ok(session)
}

/// Read `username` and `sessionId` from the query of a chat page URL.
pub fn identity_from_page_url(page_url: &str, config: &ClientConfig) -> Result<SessionIdentity> {
    let url = Url::parse(page_url)
        .map_err(|e| Error::Config(format!("invalid page URL {:?}: {}", page_url, e)))?;
    SessionIdentity::from_query_pairs(url.query_pairs(), &config.session_start_url())
}

/// Start a new session for `username`: a fresh session id and the chat page
/// URL that carries both.
pub fn start_session(username: &str, config: &ClientConfig) -> Result<(SessionIdentity, String)> {
    let session_id = uuid::Uuid::new_v4().to_string();
    let identity = SessionIdentity::new(
        Some(username),
        Some(session_id.as_str()),
        &config.session_start_url(),
    )?;

    let mut url = Url::parse(&config.session_start_url())
        .map_err(|e| Error::Config(format!("invalid server_url: {}", e)))?;
    url.query_pairs_mut()
        .append_pair(USERNAME_PARAM, &identity.username)
        .append_pair(SESSION_ID_PARAM, &identity.session_id);

    Ok((identity, url.to_string()))
}

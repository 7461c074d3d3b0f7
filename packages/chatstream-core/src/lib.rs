//! chatstream core - decoding and rendering for streamed chat logs.
//!
//! This crate holds everything in the chat client that does not touch the
//! network:
//!
//! - **Incremental text decoding**: UTF-8 across arbitrary chunk boundaries
//! - **Message decoding**: newline-delimited JSON records into [`Message`]s
//! - **Rendering**: a node arena keyed by message timestamp, Markdown to safe HTML
//! - **Session identity** and **configuration**
//!
//! # Example
//!
//! ```rust
//! use chatstream_core::{decode_messages, HeadlessView, Renderer};
//!
//! let buffer = "{\"role\":\"user\",\"content\":\"Hello\",\"timestamp\":\"1\"}\n{\"role\":";
//! let messages = decode_messages(buffer).unwrap();
//!
//! let mut renderer = Renderer::new();
//! let mut view = HeadlessView::default();
//! renderer.reconcile(&messages, &mut view);
//!
//! assert_eq!(renderer.nodes()[0].title, "user at 1");
//! ```

pub mod config;
pub mod decoder;
pub mod markdown;
pub mod render;
pub mod session;
pub mod types;
pub mod utf8;
pub mod view;

pub use config::ClientConfig;
pub use decoder::{decode_final, decode_messages};
pub use render::{MessageNode, NodeId, Reconciled, Renderer};
pub use session::SessionIdentity;
pub use types::{Message, Role};
pub use utf8::Utf8Decoder;
pub use view::{ConversationView, HeadlessView};

/// Error types for chatstream operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("server responded with status {status}: {body}")]
    Transport { status: u16, body: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("malformed record {line:?}: {source}")]
    Decode {
        line: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("missing session parameter `{missing}`, redirecting to {redirect}")]
    Precondition {
        missing: &'static str,
        redirect: String,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Redirect target for precondition failures.
    pub fn redirect(&self) -> Option<&str> {
        match self {
            Error::Precondition { redirect, .. } => Some(redirect),
            _ => None,
        }
    }
}

/// Result type for chatstream operations.
pub type Result<T> = std::result::Result<T, Error>;

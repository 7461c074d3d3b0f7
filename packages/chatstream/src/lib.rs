//! chatstream - terminal client for streamed chat logs.
//!
//! The backend answers history fetches and prompt submissions with a body of
//! newline-delimited JSON messages that grows while the reply is generated.
//! [`app::ChatSession`] reads that body chunk by chunk and keeps a rendered
//! conversation in sync with it.

pub mod api;
pub mod app;
pub mod bootstrap;
pub mod terminal;

pub use api::ChatClient;
pub use app::ChatSession;
pub use terminal::TerminalView;

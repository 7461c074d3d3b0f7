//! One conversation and its request cycles.
//!
//! Each cycle (history load or prompt submission) runs to completion before
//! the next can start: input is disabled when it begins and re-enabled when
//! it ends, whichever way it ends.

use std::pin::pin;

use chatstream_core::{
    decode_final, decode_messages, ConversationView, Renderer, Result, SessionIdentity,
};
use futures::{Stream, StreamExt};

use crate::api::ChatClient;

/// Conversation state bound to a single session identity.
pub struct ChatSession<V> {
    identity: SessionIdentity,
    renderer: Renderer,
    view: V,
}

impl<V: ConversationView> ChatSession<V> {
    pub fn new(identity: SessionIdentity, view: V) -> Self {
        Self {
            identity,
            renderer: Renderer::new(),
            view,
        }
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Fetch and render the conversation so far.
    pub async fn load_history(&mut self, client: &ChatClient) -> Result<()> {
        tracing::info!(
            "Loading history for {} ({})",
            self.identity.username,
            self.identity.session_id
        );
        self.begin_cycle();
        let result = match client.history(&self.identity).await {
            Ok(stream) => self.consume(stream).await,
            Err(e) => Err(e),
        };
        self.end_cycle(result)
    }

    /// Submit a prompt and render the streamed reply. Blank prompts are ignored.
    pub async fn submit(&mut self, client: &ChatClient, prompt: &str) -> Result<()> {
        if prompt.trim().is_empty() {
            return Ok(());
        }

        tracing::info!("Submitting prompt ({} chars)", prompt.chars().count());
        self.begin_cycle();
        let result = match client.submit(&self.identity, prompt).await {
            Ok(stream) => self.consume(stream).await,
            Err(e) => Err(e),
        };
        self.end_cycle(result)
    }

    /// Drive the decoder and renderer from a stream of text chunks.
    ///
    /// The whole buffer is decoded after every chunk, and once more as a
    /// finished buffer after the stream ends.
    pub async fn consume<S>(&mut self, stream: S) -> Result<()>
    where
        S: Stream<Item = Result<String>>,
    {
        let mut stream = pin!(stream);
        let mut buffer = String::new();
        let mut chunks = 0usize;

        while let Some(chunk) = stream.next().await {
            let text = chunk?;
            if chunks == 0 {
                self.view.set_busy(false);
            }
            chunks += 1;

            buffer.push_str(&text);
            let messages = decode_messages(&buffer)?;
            self.renderer.reconcile(&messages, &mut self.view);
        }

        let messages = decode_final(&buffer)?;
        self.renderer.reconcile(&messages, &mut self.view);

        tracing::debug!(
            chunks,
            bytes = buffer.len(),
            nodes = self.renderer.len(),
            "Stream complete"
        );
        Ok(())
    }

    fn begin_cycle(&mut self) {
        self.view.show_error(false);
        self.view.set_input_enabled(false);
        self.view.set_busy(true);
    }

    fn end_cycle(&mut self, result: Result<()>) -> Result<()> {
        self.view.set_busy(false);
        if let Err(e) = &result {
            tracing::error!("Chat request failed: {}", e);
            self.view.show_error(true);
        }
        self.view.set_input_enabled(true);
        result
    }
}

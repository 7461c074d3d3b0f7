//! Chat backend HTTP client with streaming bodies

use std::pin::Pin;

use chatstream_core::{ClientConfig, Error, Result, SessionIdentity, Utf8Decoder};
use futures::{Stream, StreamExt};
use reqwest::{Client, RequestBuilder, Response};

/// Decoded text of a response body, one item per received chunk.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// HTTP client for the chat endpoint
#[derive(Debug, Clone)]
pub struct ChatClient {
    chat_url: String,
    client: Client,
}

impl ChatClient {
    /// Create a new client for the given chat endpoint URL
    pub fn new(chat_url: &str) -> Self {
        Self {
            chat_url: chat_url.to_string(),
            client: Client::new(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.chat_url())
    }

    /// Get the chat endpoint URL
    pub fn chat_url(&self) -> &str {
        &self.chat_url
    }

    // ========================================================================
    // Chat API
    // ========================================================================

    /// Fetch the conversation so far
    pub async fn history(&self, identity: &SessionIdentity) -> Result<TextStream> {
        let request = self.client.get(&self.chat_url).query(&identity.params());
        self.open_stream(request).await
    }

    /// Submit a prompt; the response streams the prompt back followed by the reply
    pub async fn submit(&self, identity: &SessionIdentity, prompt: &str) -> Result<TextStream> {
        let mut form = vec![("prompt", prompt)];
        form.extend(identity.params());

        let request = self.client.post(&self.chat_url).form(&form);
        self.open_stream(request).await
    }

    // ========================================================================
    // Internal HTTP Methods
    // ========================================================================

    /// Send a request whose body is consumed as a stream.
    ///
    /// A non-success status reads the whole body and fails with
    /// [`Error::Transport`] before any of it is processed.
    async fn open_stream(&self, request: RequestBuilder) -> Result<TextStream> {
        let response = request.send().await.map_err(network_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Transport {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!("Streaming response from {}", response.url());
        Ok(Box::pin(decode_body(response)))
    }
}

fn network_error(e: reqwest::Error) -> Error {
    Error::Network(e.to_string())
}

// ============================================================================
// Stream Decoding
// ============================================================================

/// Turn a response body into UTF-8 text chunks.
///
/// One item is yielded per network chunk, even when the chunk only held the
/// start of a multi-byte character and decodes to nothing yet.
fn decode_body(response: Response) -> impl Stream<Item = Result<String>> {
    async_stream::stream! {
        let mut stream = response.bytes_stream();
        let mut decoder = Utf8Decoder::new();

        while let Some(chunk) = stream.next().await {
            match chunk {
                Ok(bytes) => {
                    tracing::trace!(len = bytes.len(), "received chunk");
                    yield Ok(decoder.decode(&bytes));
                }
                Err(e) => {
                    yield Err(Error::Network(format!("Stream error: {}", e)));
                    break;
                }
            }
        }

        let rest = decoder.finish();
        if !rest.is_empty() {
            yield Ok(rest);
        }
    }
}

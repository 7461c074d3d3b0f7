//! Newline-delimited JSON decoding of the accumulated response body.
//!
//! Both functions take the whole buffer received so far, not just the newest
//! chunk, and are pure: the same buffer always yields the same messages.

use crate::types::Message;
use crate::{Error, Result};

/// Decode every complete line of `buffer`.
///
/// A trailing fragment without a terminating `\n` may be a record cut off
/// mid-way by a chunk boundary and is never parsed here.
pub fn decode_messages(buffer: &str) -> Result<Vec<Message>> {
    let complete = match buffer.rfind('\n') {
        Some(pos) => &buffer[..pos],
        None => return Ok(Vec::new()),
    };
    parse_lines(complete)
}

/// Decode the buffer of a stream that has ended.
///
/// Once no more bytes can arrive the trailing fragment is a whole record,
/// so it is parsed along with the rest.
pub fn decode_final(buffer: &str) -> Result<Vec<Message>> {
    parse_lines(buffer)
}

fn parse_lines(text: &str) -> Result<Vec<Message>> {
    let mut messages = Vec::new();

    for line in text.split('\n') {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let message = serde_json::from_str(line).map_err(|source| Error::Decode {
            line: line.to_string(),
            source,
        })?;
        messages.push(message);
    }

    tracing::trace!(count = messages.len(), "decoded messages");
    Ok(messages)
}

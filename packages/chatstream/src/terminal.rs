//! Line-oriented terminal presentation of a conversation.
//!
//! A terminal cannot rewrite earlier output, so in-place updates are
//! approximated: when the most recently printed message grows, only the new
//! suffix is written; any other change reprints the message under its header.

use std::collections::HashMap;
use std::io::Write;

use chatstream_core::{ConversationView, MessageNode, NodeId};
use chrono::{DateTime, Local};

const ERROR_TEXT: &str = "Something went wrong, please try again.";
const CLEAR_LINE: &str = "\r\x1b[2K";

pub struct TerminalView<W: Write> {
    out: W,
    /// Content already written for each node
    shown: HashMap<NodeId, String>,
    /// Node whose content is at the end of the output
    tail: Option<NodeId>,
    busy: bool,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            shown: HashMap::new(),
            tail: None,
            busy: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        if let Err(e) = self.out.write_all(text.as_bytes()) {
            tracing::warn!("Failed to write to terminal: {}", e);
        }
    }

    fn print_node(&mut self, node: &MessageNode, marker: &str) {
        let header = format!("\n── {}{} ──\n{}", header_label(node), marker, node.content);
        self.emit(&header);
        self.shown.insert(node.id, node.content.clone());
        self.tail = Some(node.id);
    }
}

/// `role at <local time>` for RFC 3339 timestamps, the node title otherwise.
fn header_label(node: &MessageNode) -> String {
    match DateTime::parse_from_rfc3339(&node.key) {
        Ok(ts) => format!(
            "{} at {}",
            node.role,
            ts.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
        ),
        Err(_) => node.title.clone(),
    }
}

impl<W: Write> ConversationView for TerminalView<W> {
    fn node_created(&mut self, node: &MessageNode) {
        self.print_node(node, "");
    }

    fn node_updated(&mut self, node: &MessageNode) {
        let suffix = match (self.tail, self.shown.get(&node.id)) {
            (Some(tail), Some(prev)) if tail == node.id => {
                node.content.strip_prefix(prev.as_str()).map(str::to_string)
            }
            _ => None,
        };

        match suffix {
            Some(suffix) => {
                self.emit(&suffix);
                self.shown.insert(node.id, node.content.clone());
            }
            None => self.print_node(node, " (edited)"),
        }
    }

    fn scroll_to_bottom(&mut self) {
        if let Err(e) = self.out.flush() {
            tracing::warn!("Failed to flush terminal: {}", e);
        }
    }

    fn set_busy(&mut self, busy: bool) {
        if busy == self.busy {
            return;
        }
        self.busy = busy;
        if busy {
            self.emit("\n⋯ waiting for response");
        } else {
            self.emit(CLEAR_LINE);
        }
        self.scroll_to_bottom();
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        if enabled {
            self.emit("\n> ");
            self.tail = None;
            self.scroll_to_bottom();
        }
    }

    fn show_error(&mut self, visible: bool) {
        if visible {
            self.emit(&format!("\n! {}\n", ERROR_TEXT));
            self.tail = None;
        }
    }

    fn redirect(&mut self, target: &str) {
        self.emit(&format!(
            "No session identity given. Start a session at {}\n",
            target
        ));
        self.scroll_to_bottom();
    }
}

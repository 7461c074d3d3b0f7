//! Keyed reconciliation of decoded messages into view nodes.
//!
//! The decoder re-emits every message seen so far on each chunk, and the
//! server re-sends a growing model reply under one timestamp. The renderer
//! therefore keys nodes by timestamp: the first sighting appends a node,
//! every later one overwrites that node's content in place.

use std::collections::HashMap;

use crate::markdown;
use crate::types::{Message, Role};
use crate::view::ConversationView;

/// Index into the renderer's node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

/// A rendered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageNode {
    pub id: NodeId,
    /// Identity key (the message timestamp)
    pub key: String,
    pub role: Role,
    /// `"{role} at {timestamp}"`
    pub title: String,
    /// Style class, the role name
    pub class: &'static str,
    /// Markdown source of the current content
    pub content: String,
    /// Safe HTML rendering of `content`
    pub html: String,
}

/// Outcome of one [`Renderer::reconcile`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciled {
    pub created: Vec<NodeId>,
    pub updated: Vec<NodeId>,
}

impl Reconciled {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.updated.is_empty()
    }
}

/// Node arena plus the timestamp → node registry.
#[derive(Debug, Default)]
pub struct Renderer {
    nodes: Vec<MessageNode>,
    by_key: HashMap<String, NodeId>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring the arena in line with `messages`, in the order given.
    pub fn reconcile<V: ConversationView + ?Sized>(
        &mut self,
        messages: &[Message],
        view: &mut V,
    ) -> Reconciled {
        let mut result = Reconciled::default();

        for message in messages {
            match self.by_key.get(&message.timestamp).copied() {
                Some(id) => {
                    let node = &mut self.nodes[id.0];
                    if node.content == message.content {
                        continue;
                    }
                    node.html = markdown::to_html(&message.content);
                    node.content = message.content.clone();
                    view.node_updated(node);
                    result.updated.push(id);
                }
                None => {
                    let id = NodeId(self.nodes.len());
                    let node = MessageNode {
                        id,
                        key: message.timestamp.clone(),
                        role: message.role,
                        title: format!("{} at {}", message.role, message.timestamp),
                        class: message.role.as_str(),
                        content: message.content.clone(),
                        html: markdown::to_html(&message.content),
                    };
                    tracing::debug!(title = %node.title, "creating message node");
                    view.node_created(&node);
                    self.by_key.insert(node.key.clone(), id);
                    self.nodes.push(node);
                    result.created.push(id);
                }
            }
        }

        view.scroll_to_bottom();
        result
    }

    /// Nodes in display order.
    pub fn nodes(&self) -> &[MessageNode] {
        &self.nodes
    }

    pub fn get(&self, key: &str) -> Option<&MessageNode> {
        self.by_key.get(key).map(|id| &self.nodes[id.0])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

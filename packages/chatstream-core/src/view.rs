//! Presentation surface for a conversation.

use crate::render::MessageNode;

/// What the renderer and the request cycle drive.
///
/// Implementations own no conversation state of their own; the node arena
/// lives in [`crate::Renderer`] and is passed in on every change.
pub trait ConversationView {
    /// A node was appended to the end of the conversation.
    fn node_created(&mut self, node: &MessageNode);

    /// An existing node's content changed. Its position does not.
    fn node_updated(&mut self, node: &MessageNode);

    /// A batch was reconciled.
    fn scroll_to_bottom(&mut self);

    fn set_busy(&mut self, busy: bool);

    fn set_input_enabled(&mut self, enabled: bool);

    /// Show or hide the generic error region.
    fn show_error(&mut self, visible: bool);

    /// Leave the conversation for `target`, e.g. when the session identity is missing.
    fn redirect(&mut self, target: &str);
}

impl<V: ConversationView + ?Sized> ConversationView for &mut V {
    fn node_created(&mut self, node: &MessageNode) {
        (**self).node_created(node);
    }

    fn node_updated(&mut self, node: &MessageNode) {
        (**self).node_updated(node);
    }

    fn scroll_to_bottom(&mut self) {
        (**self).scroll_to_bottom();
    }

    fn set_busy(&mut self, busy: bool) {
        (**self).set_busy(busy);
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        (**self).set_input_enabled(enabled);
    }

    fn show_error(&mut self, visible: bool) {
        (**self).show_error(visible);
    }

    fn redirect(&mut self, target: &str) {
        (**self).redirect(target);
    }
}

/// A view with no output that remembers everything it was told.
#[derive(Debug, Clone, Default)]
pub struct HeadlessView {
    pub nodes: Vec<MessageNode>,
    pub busy: bool,
    pub input_enabled: bool,
    pub error_visible: bool,
    pub scrolls: usize,
    pub redirected_to: Option<String>,
}

impl HeadlessView {
    pub fn titles(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.title.as_str()).collect()
    }
}

impl ConversationView for HeadlessView {
    fn node_created(&mut self, node: &MessageNode) {
        self.nodes.push(node.clone());
    }

    fn node_updated(&mut self, node: &MessageNode) {
        if let Some(existing) = self.nodes.iter_mut().find(|n| n.id == node.id) {
            *existing = node.clone();
        }
    }

    fn scroll_to_bottom(&mut self) {
        self.scrolls += 1;
    }

    fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
    }

    fn show_error(&mut self, visible: bool) {
        self.error_visible = visible;
    }

    fn redirect(&mut self, target: &str) {
        self.redirected_to = Some(target.to_string());
    }
}

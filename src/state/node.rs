//! Selected-node detail and the add/edit form.
//!
//! SYSTEM CONTEXT
//! ==============
//! The tree payload may omit large content fields, so selecting a node runs
//! its own fetch cycle (`idle -> loading -> ready | error`) that never blocks
//! the surrounding tree view.

#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;

use super::{FormError, LoadStatus, Sequencer, Ticket};
use crate::net::error::ApiError;
use crate::net::types::{Node, NodeContent};

/// Detail panel state for one selected node.
#[derive(Clone, Debug, Default)]
pub struct NodeDetailState {
    /// Node currently requested or shown.
    pub node_id: Option<String>,
    pub status: LoadStatus,
    /// Full node payload from the last successful fetch.
    pub node: Option<Node>,
    pub error: Option<String>,
    seq: Sequencer,
}

impl NodeDetailState {
    /// Start fetching `node_id`. A different node clears the previous payload.
    pub fn begin(&mut self, node_id: &str) -> Ticket {
        if self.node_id.as_deref() != Some(node_id) {
            self.node = None;
        }
        self.node_id = Some(node_id.to_owned());
        self.status = LoadStatus::Loading;
        self.error = None;
        self.seq.issue()
    }

    /// Apply a fetch result. Returns `false` when the ticket is stale.
    pub fn finish(&mut self, ticket: Ticket, result: Result<Node, &ApiError>) -> bool {
        if !self.seq.is_current(ticket) {
            return false;
        }
        match result {
            Ok(node) => {
                self.node = Some(node);
                self.status = LoadStatus::Ready;
                self.error = None;
            }
            Err(err) => {
                self.status = LoadStatus::Error;
                self.error = Some(err.to_string());
            }
        }
        true
    }

    /// Back to idle, e.g. after the node disappears from the tree.
    pub fn reset(&mut self) {
        self.seq.issue();
        self.node_id = None;
        self.node = None;
        self.status = LoadStatus::Idle;
        self.error = None;
    }

    #[must_use]
    pub fn display_content(&self) -> Option<NodeContent<'_>> {
        self.node.as_ref().and_then(Node::display_content)
    }
}

/// Title and content fields of the add/edit form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeForm {
    pub title: String,
    pub content: String,
}

impl NodeForm {
    #[must_use]
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self { title: title.into(), content: content.into() }
    }

    /// Trimmed title.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::EmptyTitle`] when the title is blank.
    pub fn validated_title(&self) -> Result<&str, FormError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(FormError::EmptyTitle);
        }
        Ok(title)
    }

    /// Content, or `None` when left blank.
    #[must_use]
    pub fn content_or_none(&self) -> Option<&str> {
        if self.content.trim().is_empty() { None } else { Some(self.content.as_str()) }
    }
}

//! Space tree view: one space, its node forest, selection and node modals.
//!
//! SYSTEM CONTEXT
//! ==============
//! The view loads a space with its full tree in one call, renders it through
//! `tree::render_forest`, and fetches a selected node's full content on
//! demand. Add/edit/delete submit the mutation and then reload the whole
//! space; local state always converges to what the server returns.

#[cfg(test)]
#[path = "space_test.rs"]
mod space_test;

use std::collections::BTreeSet;

use tracing::{info, warn};

use super::node::{NodeDetailState, NodeForm};
use super::{FormError, LoadStatus, Sequencer, SubmitError, Ticket};
use crate::net::api::ApiClient;
use crate::net::error::ApiError;
use crate::net::types::{Node, Space, TreeNode};
use crate::tree::{self, ViewContext, ViewNode};

/// Which node dialog is open.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeModal {
    /// Add a child of `parent`, or a root node when `None`.
    Add { parent: Option<String>, form: NodeForm },
    /// `prefilled` is the content the form opened with; unchanged content is not resent.
    Edit { node_id: String, form: NodeForm, prefilled: String },
    Delete { node_id: String, title: String },
}

/// Result of a successful modal submission.
#[derive(Clone, Debug, PartialEq)]
pub enum Mutation {
    Created(Node),
    Updated(Node),
    Deleted(String),
}

#[derive(Clone, Debug)]
pub struct SpaceViewState {
    pub space_id: String,
    pub status: LoadStatus,
    /// Last successfully loaded space; survives failed reloads.
    pub space: Option<Space>,
    /// Banner text for the last failed load.
    pub error: Option<String>,
    pub collapsed: BTreeSet<String>,
    pub selected: Option<String>,
    pub detail: NodeDetailState,
    pub modal: Option<NodeModal>,
    /// Error of the last failed submission; the modal stays open.
    pub modal_error: Option<String>,
    pub submitting: bool,
    load_seq: Sequencer,
}

impl SpaceViewState {
    #[must_use]
    pub fn new(space_id: impl Into<String>) -> Self {
        Self {
            space_id: space_id.into(),
            status: LoadStatus::Loading,
            space: None,
            error: None,
            collapsed: BTreeSet::new(),
            selected: None,
            detail: NodeDetailState::default(),
            modal: None,
            modal_error: None,
            submitting: false,
            load_seq: Sequencer::default(),
        }
    }

    // =========================================================================
    // LOADING
    // =========================================================================

    pub fn begin_load(&mut self) -> Ticket {
        self.status = LoadStatus::Loading;
        self.load_seq.issue()
    }

    /// Install a freshly loaded space. Returns `false` for a stale ticket.
    pub fn apply_space(&mut self, ticket: Ticket, space: Space) -> bool {
        if !self.load_seq.is_current(ticket) {
            return false;
        }
        self.prune_missing(space.roots());
        self.space = Some(space);
        self.status = LoadStatus::Ready;
        self.error = None;
        true
    }

    /// Record a failed load. The previously shown space is left untouched.
    pub fn apply_load_error(&mut self, ticket: Ticket, err: &ApiError) -> bool {
        if !self.load_seq.is_current(ticket) {
            return false;
        }
        warn!(space_id = %self.space_id, error = %err, "loading space failed");
        self.status = LoadStatus::Error;
        self.error = Some(err.to_string());
        true
    }

    /// Fetch the space and its tree. Also the manual retry action.
    ///
    /// # Errors
    ///
    /// Returns the API error after recording it in `self.error`.
    pub async fn load(&mut self, api: &ApiClient) -> Result<(), ApiError> {
        let ticket = self.begin_load();
        match api.get_space(&self.space_id).await {
            Ok(space) => {
                self.apply_space(ticket, space);
                Ok(())
            }
            Err(err) => {
                self.apply_load_error(ticket, &err);
                Err(err)
            }
        }
    }

    /// Drop selection and collapse marks for nodes the server no longer has.
    fn prune_missing(&mut self, roots: &[TreeNode]) {
        self.collapsed.retain(|id| tree::find_node(roots, id).is_some());
        if let Some(selected) = self.selected.as_deref() {
            if tree::find_node(roots, selected).is_none() {
                self.selected = None;
                self.detail.reset();
            }
        }
    }

    // =========================================================================
    // RENDERING
    // =========================================================================

    #[must_use]
    pub fn roots(&self) -> &[TreeNode] {
        match &self.space {
            Some(space) => space.roots(),
            None => &[],
        }
    }

    #[must_use]
    pub fn view(&self) -> Vec<ViewNode> {
        let ctx = ViewContext { selected: self.selected.as_deref(), collapsed: &self.collapsed };
        tree::render_forest(self.roots(), &ctx)
    }

    #[must_use]
    pub fn total_nodes(&self) -> usize {
        tree::count_total_nodes(self.roots())
    }

    /// Flip the collapsed flag of a node. Returns the new flag.
    pub fn toggle_collapsed(&mut self, node_id: &str) -> bool {
        if self.collapsed.remove(node_id) {
            return false;
        }
        self.collapsed.insert(node_id.to_owned());
        true
    }

    // =========================================================================
    // SELECTION
    // =========================================================================

    pub fn begin_select(&mut self, node_id: &str) -> Ticket {
        self.selected = Some(node_id.to_owned());
        self.detail.begin(node_id)
    }

    /// Apply a detail fetch. Stale tickets are ignored.
    pub fn finish_select(&mut self, ticket: Ticket, result: Result<Node, &ApiError>) -> bool {
        self.detail.finish(ticket, result)
    }

    /// Select a node and fetch its full content.
    ///
    /// # Errors
    ///
    /// Returns the API error after recording it in `self.detail.error`.
    pub async fn select_node(&mut self, api: &ApiClient, node_id: &str) -> Result<(), ApiError> {
        let ticket = self.begin_select(node_id);
        match api.get_node(&self.space_id, node_id).await {
            Ok(node) => {
                self.finish_select(ticket, Ok(node));
                Ok(())
            }
            Err(err) => {
                self.finish_select(ticket, Err(&err));
                Err(err)
            }
        }
    }

    // =========================================================================
    // MODALS
    // =========================================================================

    fn tree_node(&self, node_id: &str) -> Result<&TreeNode, FormError> {
        tree::find_node(self.roots(), node_id).ok_or_else(|| FormError::UnknownNode(node_id.to_owned()))
    }

    /// Open the add dialog for a child of `parent`, or a root node.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::UnknownNode`] if `parent` is not in the loaded tree.
    pub fn open_add(&mut self, parent: Option<&str>) -> Result<(), FormError> {
        if let Some(parent) = parent {
            self.tree_node(parent)?;
        }
        self.modal = Some(NodeModal::Add { parent: parent.map(str::to_owned), form: NodeForm::default() });
        self.modal_error = None;
        Ok(())
    }

    /// Open the edit dialog, pre-filled from a fresh fetch of the node.
    ///
    /// The title comes from the tree. The content is the fetched raw
    /// `content`, else the generated HTML, and empty when the fetch fails.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::UnknownNode`] if the node is not in the loaded tree.
    pub async fn open_edit(&mut self, api: &ApiClient, node_id: &str) -> Result<(), FormError> {
        let title = self.tree_node(node_id)?.node.title.clone();
        let content = match api.get_node(&self.space_id, node_id).await {
            Ok(node) => node.content.or(node.content_html).unwrap_or_default(),
            Err(err) => {
                warn!(node_id, error = %err, "edit prefill fetch failed");
                String::new()
            }
        };
        self.modal = Some(NodeModal::Edit {
            node_id: node_id.to_owned(),
            form: NodeForm::new(title, content.clone()),
            prefilled: content,
        });
        self.modal_error = None;
        Ok(())
    }

    /// Open the delete confirmation.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::UnknownNode`] if the node is not in the loaded tree.
    pub fn open_delete(&mut self, node_id: &str) -> Result<(), FormError> {
        let title = self.tree_node(node_id)?.node.title.clone();
        self.modal = Some(NodeModal::Delete { node_id: node_id.to_owned(), title });
        self.modal_error = None;
        Ok(())
    }

    pub fn close_modal(&mut self) {
        self.modal = None;
        self.modal_error = None;
    }

    /// Editable fields of an open add/edit dialog.
    pub fn form_mut(&mut self) -> Option<&mut NodeForm> {
        match self.modal.as_mut()? {
            NodeModal::Add { form, .. } | NodeModal::Edit { form, .. } => Some(form),
            NodeModal::Delete { .. } => None,
        }
    }

    /// Submit the open dialog, then reload the space from the server.
    /// The selection is dropped because its detail payload may be stale.
    ///
    /// # Errors
    ///
    /// - [`SubmitError::Form`] for a missing dialog or blank title; nothing is sent.
    /// - [`SubmitError::Api`] when the mutation fails; the dialog stays open.
    /// - [`SubmitError::Reload`] when the mutation succeeded but the reload did not.
    pub async fn submit_modal(&mut self, api: &ApiClient) -> Result<Mutation, SubmitError> {
        let modal = self.modal.clone().ok_or(FormError::NoModal)?;

        self.submitting = true;
        let result = self.send_mutation(api, &modal).await;
        self.submitting = false;

        let mutation = match result {
            Ok(mutation) => mutation,
            Err(SubmitError::Api(err)) => {
                self.modal_error = Some(err.to_string());
                return Err(SubmitError::Api(err));
            }
            Err(other) => return Err(other),
        };

        info!(space_id = %self.space_id, ?mutation, "node mutation applied");
        self.close_modal();
        self.selected = None;
        self.detail.reset();
        self.load(api).await.map_err(SubmitError::Reload)?;
        Ok(mutation)
    }

    async fn send_mutation(&self, api: &ApiClient, modal: &NodeModal) -> Result<Mutation, SubmitError> {
        let space_id = self.space_id.as_str();
        let mutation = match modal {
            NodeModal::Add { parent, form } => {
                let title = form.validated_title()?;
                let node = api
                    .create_node(space_id, title, parent.as_deref(), form.content_or_none())
                    .await?;
                Mutation::Created(node)
            }
            NodeModal::Edit { node_id, form, prefilled } => {
                let title = form.validated_title()?;
                let content = (form.content != *prefilled).then_some(form.content.as_str());
                let node = api.update_node(space_id, node_id, Some(title), content).await?;
                Mutation::Updated(node)
            }
            NodeModal::Delete { node_id, .. } => {
                api.delete_node(space_id, node_id).await?;
                Mutation::Deleted(node_id.clone())
            }
        };
        Ok(mutation)
    }
}

//! Wire DTOs for the mind-map REST service.
//!
//! DESIGN
//! ======
//! Field names mirror the service JSON (camelCase) so payloads round-trip
//! without a mapping layer. The tree payload returned by `GET /spaces/{id}`
//! only carries a subset of node fields, so everything except `nodeId` and
//! `title` falls back to a default when absent.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};

// =============================================================================
// SPACES
// =============================================================================

/// A named collection of nodes forming one mind map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Space {
    pub space_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    /// Root nodes of the space, present on the "get space" response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<TreeNode>>,
}

impl Space {
    /// Root nodes, or an empty slice when the payload carried no tree.
    #[must_use]
    pub fn roots(&self) -> &[TreeNode] {
        self.nodes.as_deref().unwrap_or_default()
    }
}

// =============================================================================
// NODES
// =============================================================================

/// A single entry in a mind map.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub node_id: String,
    #[serde(default)]
    pub space_id: String,
    #[serde(default)]
    pub title: String,
    /// Raw content as entered by the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Server-rendered HTML, produced asynchronously after creation.
    #[serde(default, rename = "contentHTML", skip_serializing_if = "Option::is_none")]
    pub content_html: Option<String>,
    /// Sibling display order.
    #[serde(default)]
    pub order_index: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_node_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<u32>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    /// Backing storage key for large content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3_key: Option<String>,
}

impl Node {
    /// Generated HTML, if the server has produced any non-blank content yet.
    #[must_use]
    pub fn generated_html(&self) -> Option<&str> {
        self.content_html
            .as_deref()
            .filter(|html| !html.trim().is_empty())
    }

    /// Content to display: non-empty `contentHTML` wins over raw `content`.
    #[must_use]
    pub fn display_content(&self) -> Option<NodeContent<'_>> {
        if let Some(html) = self.generated_html() {
            return Some(NodeContent::Html(html));
        }
        self.content
            .as_deref()
            .filter(|text| !text.is_empty())
            .map(NodeContent::Text)
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent_node_id.is_none()
    }
}

/// Borrowed view of whichever content field a node should display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeContent<'a> {
    Html(&'a str),
    Text(&'a str),
}

/// A node with its materialized children, as built by the server.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    #[serde(flatten)]
    pub node: Node,
    #[serde(default)]
    pub children: Vec<TreeNode>,
}

/// One entry of the reorder request body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeOrder {
    pub node_id: String,
    pub new_order_index: i64,
}

// =============================================================================
// USERS
// =============================================================================

/// A service user. Not used by the views, kept for library completeness.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "Id")]
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default, rename = "createdAt")]
    pub created_at: String,
}

// =============================================================================
// REQUEST BODIES
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateSpaceBody<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct UpdateSpaceBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateNodeBody<'a> {
    pub title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_node_id: Option<&'a str>,
    pub order_index: i64,
    #[serde(rename = "contentHTML", skip_serializing_if = "Option::is_none")]
    pub content_html: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct UpdateNodeBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<&'a str>,
    #[serde(rename = "contentHTML", skip_serializing_if = "Option::is_none")]
    pub content_html: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct UserBody<'a> {
    pub email: &'a str,
    pub name: &'a str,
}

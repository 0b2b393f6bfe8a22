//! Projection of the server-built node tree into renderable view nodes.
//!
//! DESIGN
//! ======
//! The client never assembles a tree from a flat list; it trusts the nested
//! `TreeNode` forest returned by "get space". This module turns that forest
//! into `ViewNode`s (selection and collapse applied, siblings ordered by
//! `orderIndex`) and offers read-only helpers for counting, lookup and
//! well-formedness checks. Everything here is pure.

#[cfg(test)]
#[path = "tree_test.rs"]
mod tree_test;

use std::collections::{BTreeSet, HashSet};

use crate::net::types::{Node, TreeNode};

static NO_COLLAPSED: BTreeSet<String> = BTreeSet::new();

/// Presentation inputs that are owned by the view, not the server.
#[derive(Clone, Copy, Debug)]
pub struct ViewContext<'a> {
    pub selected: Option<&'a str>,
    pub collapsed: &'a BTreeSet<String>,
}

impl Default for ViewContext<'_> {
    fn default() -> Self {
        Self { selected: None, collapsed: &NO_COLLAPSED }
    }
}

/// A node ready for display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewNode {
    pub node_id: String,
    pub title: String,
    /// Renderer depth; roots are 0.
    pub depth: usize,
    pub order_index: i64,
    pub selected: bool,
    pub collapsed: bool,
    /// True when the server sent children, even if they are collapsed away.
    pub has_children: bool,
    /// Visible children. Empty when collapsed.
    pub children: Vec<ViewNode>,
}

/// Render one subtree rooted at `node`, placed at `depth`.
#[must_use]
pub fn render_tree(node: &TreeNode, depth: usize, ctx: &ViewContext<'_>) -> ViewNode {
    let id = &node.node.node_id;
    let collapsed = ctx.collapsed.contains(id);
    let children = if collapsed {
        Vec::new()
    } else {
        ordered(&node.children)
            .into_iter()
            .map(|child| render_tree(child, depth + 1, ctx))
            .collect()
    };

    ViewNode {
        node_id: id.clone(),
        title: node.node.title.clone(),
        depth,
        order_index: node.node.order_index,
        selected: ctx.selected == Some(id.as_str()),
        collapsed,
        has_children: !node.children.is_empty(),
        children,
    }
}

/// Render every root of a space.
#[must_use]
pub fn render_forest(roots: &[TreeNode], ctx: &ViewContext<'_>) -> Vec<ViewNode> {
    ordered(roots)
        .into_iter()
        .map(|root| render_tree(root, 0, ctx))
        .collect()
}

/// Siblings in display order. The sort is stable, so ties keep server order.
fn ordered(nodes: &[TreeNode]) -> Vec<&TreeNode> {
    let mut sorted: Vec<&TreeNode> = nodes.iter().collect();
    sorted.sort_by_key(|n| n.node.order_index);
    sorted
}

/// Total number of nodes in the forest, all depths included.
#[must_use]
pub fn count_total_nodes(nodes: &[TreeNode]) -> usize {
    nodes
        .iter()
        .map(|node| 1 + count_total_nodes(&node.children))
        .sum()
}

/// A node paired with its depth and structural parent.
#[derive(Clone, Copy, Debug)]
pub struct FlatNode<'a> {
    pub node: &'a Node,
    pub depth: usize,
    pub parent: Option<&'a str>,
}

/// Pre-order traversal (server order, not re-sorted) with an explicit stack.
#[must_use]
pub fn flatten(roots: &[TreeNode]) -> Vec<FlatNode<'_>> {
    let mut out = Vec::new();
    let mut stack: Vec<(&TreeNode, usize, Option<&str>)> = roots.iter().rev().map(|r| (r, 0, None)).collect();
    while let Some((tree, depth, parent)) = stack.pop() {
        out.push(FlatNode { node: &tree.node, depth, parent });
        let id = tree.node.node_id.as_str();
        stack.extend(tree.children.iter().rev().map(|c| (c, depth + 1, Some(id))));
    }
    out
}

/// Find a node anywhere in the forest.
#[must_use]
pub fn find_node<'a>(roots: &'a [TreeNode], node_id: &str) -> Option<&'a TreeNode> {
    let mut stack: Vec<&TreeNode> = roots.iter().collect();
    while let Some(tree) = stack.pop() {
        if tree.node.node_id == node_id {
            return Some(tree);
        }
        stack.extend(tree.children.iter());
    }
    None
}

/// Renderer depth of a node, if present.
#[must_use]
pub fn depth_of(roots: &[TreeNode], node_id: &str) -> Option<usize> {
    flatten(roots)
        .into_iter()
        .find(|flat| flat.node.node_id == node_id)
        .map(|flat| flat.depth)
}

/// Ids of every node in the subtree rooted at `node_id`, itself included.
#[must_use]
pub fn subtree_ids(roots: &[TreeNode], node_id: &str) -> HashSet<String> {
    find_node(roots, node_id)
        .map(|tree| flatten(std::slice::from_ref(tree)).into_iter().map(|f| f.node.node_id.clone()).collect())
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeViolation {
    #[error("node {0} appears more than once")]
    DuplicateNode(String),

    #[error("node {node_id} references parent {parent_id} that does not precede it")]
    ParentNotBefore { node_id: String, parent_id: String },

    #[error("node {node_id} declares parent {declared} but is nested under {actual}")]
    MisplacedChild { node_id: String, declared: String, actual: String },
}

/// Check the server contract: ids are unique and every declared parent
/// appears earlier in pre-order, as the node's structural parent.
///
/// # Errors
///
/// Returns the first [`TreeViolation`] found.
pub fn check_well_formed(roots: &[TreeNode]) -> Result<(), TreeViolation> {
    let mut seen: HashSet<&str> = HashSet::new();
    for flat in flatten(roots) {
        let id = flat.node.node_id.as_str();
        if !seen.insert(id) {
            return Err(TreeViolation::DuplicateNode(id.to_owned()));
        }
        let Some(declared) = flat.node.parent_node_id.as_deref() else {
            continue;
        };
        if !seen.contains(declared) {
            return Err(TreeViolation::ParentNotBefore { node_id: id.to_owned(), parent_id: declared.to_owned() });
        }
        let actual = flat.parent.unwrap_or("the root level");
        if actual != declared {
            return Err(TreeViolation::MisplacedChild {
                node_id: id.to_owned(),
                declared: declared.to_owned(),
                actual: actual.to_owned(),
            });
        }
    }
    Ok(())
}

//! Plain-text rendering for terminal output.
//!
//! DESIGN
//! ======
//! Renders the `ViewNode` forest as an indented box-drawing tree and formats
//! space cards and the node detail panel. Generated HTML is flattened to
//! readable text; no markup is interpreted beyond line breaks and entities.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use crate::net::types::{Node, NodeContent, Space};
use crate::tree::{self, ViewNode};

const SELECTED_MARK: &str = "* ";
const COLLAPSED_MARK: &str = " [+]";

/// Render a forest, one line per visible node.
#[must_use]
pub fn tree_text(forest: &[ViewNode]) -> String {
    let mut out = String::new();
    for root in forest {
        out.push_str(&node_line(root));
        out.push('\n');
        children_text(&root.children, "", &mut out);
    }
    out
}

fn children_text(children: &[ViewNode], prefix: &str, out: &mut String) {
    for (i, child) in children.iter().enumerate() {
        let last = i + 1 == children.len();
        let (branch, carry) = if last { ("└── ", "    ") } else { ("├── ", "│   ") };
        out.push_str(prefix);
        out.push_str(branch);
        out.push_str(&node_line(child));
        out.push('\n');
        children_text(&child.children, &format!("{prefix}{carry}"), out);
    }
}

fn node_line(node: &ViewNode) -> String {
    let mark = if node.selected { SELECTED_MARK } else { "" };
    let collapsed = if node.collapsed && node.has_children { COLLAPSED_MARK } else { "" };
    format!("{mark}{} ({}){collapsed}", node.title, node.node_id)
}

/// Summary card used by the space list.
#[must_use]
pub fn space_card(space: &Space) -> String {
    let mut out = format!("{}  [{}]\n", space.name, space.space_id);
    if let Some(description) = space.description.as_deref().filter(|d| !d.is_empty()) {
        out.push_str(&format!("  {description}\n"));
    }
    if !space.created_at.is_empty() {
        out.push_str(&format!("  Created: {}\n", space.created_at));
    }
    if let Some(updated) = space.updated_at.as_deref() {
        out.push_str(&format!("  Updated: {updated}\n"));
    }
    if let Some(nodes) = space.nodes.as_deref() {
        out.push_str(&format!("  Nodes: {}\n", tree::count_total_nodes(nodes)));
    }
    out
}

/// Header shown above a rendered tree.
#[must_use]
pub fn space_header(space: &Space, total_nodes: usize) -> String {
    let mut out = format!("{}  [{}]\n", space.name, space.space_id);
    if let Some(description) = space.description.as_deref().filter(|d| !d.is_empty()) {
        out.push_str(&format!("{description}\n"));
    }
    out.push_str(&format!("{total_nodes} nodes\n"));
    out
}

/// Node metadata followed by its display content.
#[must_use]
pub fn node_detail(node: &Node) -> String {
    let mut out = format!("{}\n", node.title);
    out.push_str(&format!("  id: {}\n", node.node_id));
    if let Some(parent) = node.parent_node_id.as_deref() {
        out.push_str(&format!("  parent: {parent}\n"));
    }
    out.push_str(&format!("  order: {}\n", node.order_index));
    if let Some(depth) = node.depth {
        out.push_str(&format!("  depth: {depth}\n"));
    }
    if !node.created_at.is_empty() {
        out.push_str(&format!("  created: {}\n", node.created_at));
    }
    if !node.updated_at.is_empty() {
        out.push_str(&format!("  updated: {}\n", node.updated_at));
    }
    out.push('\n');
    match node.display_content() {
        Some(NodeContent::Html(html)) => out.push_str(&html_to_text(html)),
        Some(NodeContent::Text(text)) => out.push_str(text),
        None => out.push_str("(no content yet)"),
    }
    out.push('\n');
    out
}

/// Flatten HTML to text: tags dropped, block ends become newlines, common
/// entities decoded, blank lines dropped.
#[must_use]
pub fn html_to_text(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(start) = rest.find('<') {
        text.push_str(&rest[..start]);
        let Some(len) = rest[start..].find('>') else {
            text.push_str(&rest[start..]);
            rest = "";
            break;
        };
        let tag = rest[start + 1..start + len].trim().to_ascii_lowercase();
        if breaks_line(&tag) {
            text.push('\n');
        }
        rest = &rest[start + len + 1..];
    }
    text.push_str(rest);

    decode_entities(&text)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn breaks_line(tag: &str) -> bool {
    let name = tag.trim_start_matches('/').trim_end_matches('/').split_whitespace().next().unwrap_or("");
    matches!(name, "br" | "p" | "div" | "li" | "ul" | "ol" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "tr" | "blockquote" | "pre")
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

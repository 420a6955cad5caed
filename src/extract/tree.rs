//! Tree-sitter tree to `AstNode` conversion

use super::ExtractOptions;
use serde::{Deserialize, Serialize};
use tree_sitter::{Node, Point};

const SNIPPET_LIMIT: usize = 40;

/// 1-based line, 0-based column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl From<Point> for Position {
    fn from(point: Point) -> Self {
        Self {
            line: point.row + 1,
            column: point.column,
        }
    }
}

/// A syntax node as stored in the database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AstNode {
    #[serde(rename = "type")]
    pub kind: String,
    /// Name of the grammar field this node fills in its parent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub start: Position,
    pub end: Position,
    pub start_byte: usize,
    pub end_byte: usize,
    /// Source text, only for nodes without emitted children
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<AstNode>,
}

impl AstNode {
    /// Depth-first iterator over this node and its descendants
    pub fn walk(&self) -> impl Iterator<Item = &AstNode> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }
}

/// Deepest emitted node the converter accepts. Serializing and dropping an
/// `AstNode` recurse once per level, so the tree must stay shallow enough for
/// a default thread stack.
pub const MAX_DEPTH: usize = 512;

/// Returned when a source nests deeper than `MAX_DEPTH`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NestingTooDeep;

impl std::fmt::Display for NestingTooDeep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "nesting depth exceeds {}", MAX_DEPTH)
    }
}

/// Convert the tree without recursion. `open` holds the emitted ancestors
/// of the cursor below the root; a node is attached to its parent once the
/// cursor leaves it.
pub(crate) fn convert(
    root: Node<'_>,
    source: &str,
    options: &ExtractOptions,
) -> Result<AstNode, NestingTooDeep> {
    let mut tree = open_node(root, None);
    let mut open: Vec<AstNode> = Vec::new();
    let mut cursor = root.walk();
    // Whether the node under the cursor was emitted
    let mut emitted = true;

    'walk: loop {
        if !(emitted && cursor.goto_first_child()) {
            if emitted {
                close_node(&mut open, &mut tree, source);
            }
            loop {
                if cursor.goto_next_sibling() {
                    break;
                }
                if !cursor.goto_parent() {
                    break 'walk;
                }
                close_node(&mut open, &mut tree, source);
            }
        }

        let node = cursor.node();
        emitted = node.is_named() || options.anonymous_tokens;
        if emitted {
            // +1 for the root
            if open.len() + 1 >= MAX_DEPTH {
                return Err(NestingTooDeep);
            }
            open.push(open_node(node, cursor.field_name()));
        }
    }

    set_leaf_text(&mut tree, source);
    Ok(tree)
}

fn open_node(node: Node<'_>, field: Option<&str>) -> AstNode {
    AstNode {
        kind: node.kind().to_string(),
        field: field.map(str::to_string),
        start: node.start_position().into(),
        end: node.end_position().into(),
        start_byte: node.start_byte(),
        end_byte: node.end_byte(),
        text: None,
        children: Vec::new(),
    }
}

/// Attach the innermost open node to its parent. A no-op when the cursor
/// is back at the root.
fn close_node(open: &mut Vec<AstNode>, tree: &mut AstNode, source: &str) {
    let Some(mut node) = open.pop() else {
        return;
    };
    set_leaf_text(&mut node, source);
    match open.last_mut() {
        Some(parent) => parent.children.push(node),
        None => tree.children.push(node),
    }
}

fn set_leaf_text(node: &mut AstNode, source: &str) {
    if node.children.is_empty() {
        node.text = source.get(node.start_byte..node.end_byte).map(str::to_string);
    }
}

/// Describe the first ERROR or MISSING node, if the tree has one
pub(crate) fn first_syntax_error(root: Node<'_>, source: &str) -> Option<String> {
    let node = find_error_node(root)?;
    let pos = node.start_position();
    let (line, column) = (pos.row + 1, pos.column + 1);

    if node.is_missing() {
        return Some(format!("Missing `{}` at line {}, column {}", node.kind(), line, column));
    }

    let snippet = node
        .utf8_text(source.as_bytes())
        .unwrap_or("")
        .lines()
        .next()
        .unwrap_or("")
        .trim();

    if snippet.is_empty() {
        Some(format!("Syntax error at line {}, column {}", line, column))
    } else {
        let snippet: String = snippet.chars().take(SNIPPET_LIMIT).collect();
        Some(format!("Unexpected `{}` at line {}, column {}", snippet, line, column))
    }
}

/// Pre-order search that only descends into subtrees containing an error
fn find_error_node(root: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        if node.has_error() && cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return None;
            }
        }
    }
}

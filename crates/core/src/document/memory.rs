//! In-memory document host.

use crate::overlay::DecorationSet;

use super::markup::{Node, parse, serialize};
use super::types::{DocumentHost, DocumentTree, HostError};

/// A document held as a node tree, with a cursor and the decorations last
/// handed to it.
///
/// Positions follow the tree: each character of text is one position, a void
/// element is one position, and every other element adds one position before
/// and one after its children.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    nodes: Vec<Node>,
    cursor: usize,
    decorations: DecorationSet,
    read_only: bool,
    revision: u64,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    All,
    SkipApplied,
}

enum Slot {
    Text,
    Element,
    Before,
    Past,
}

impl MemoryDocument {
    pub fn new(markup: &str) -> Self {
        Self { nodes: parse(markup), ..Self::default() }
    }

    /// Lock or unlock the document; a locked document rejects every edit.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Total number of positions in the document.
    pub fn size(&self) -> usize {
        self.nodes.iter().map(Node::size).sum()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Move the cursor, clamped to the document.
    pub fn set_cursor(&mut self, pos: usize) {
        self.cursor = pos.min(self.size());
    }

    /// Number of edits applied since creation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn decorations(&self) -> &DecorationSet {
        &self.decorations
    }

    /// Concatenated text of every text node, applied values included.
    pub fn text(&self) -> String {
        let mut out = String::new();
        visit_nodes(&self.nodes, 0, Visit::All, &mut |_, t| out.push_str(t));
        out
    }

    /// Text between two positions, counting only text nodes.
    pub fn text_between(&self, from: usize, to: usize) -> String {
        let mut out = String::new();
        visit_nodes(&self.nodes, 0, Visit::All, &mut |start, t| {
            for (offset, c) in t.chars().enumerate() {
                let pos = start + offset;
                if pos >= from && pos < to {
                    out.push(c);
                }
            }
        });
        out
    }

    fn check_writable(&self) -> Result<(), HostError> {
        if self.read_only { Err(HostError::ReadOnly) } else { Ok(()) }
    }
}

impl DocumentTree for MemoryDocument {
    fn visit_text(&self, visit: &mut dyn FnMut(usize, &str)) {
        visit_nodes(&self.nodes, 0, Visit::SkipApplied, visit);
    }
}

impl DocumentHost for MemoryDocument {
    fn markup(&self) -> String {
        serialize(&self.nodes)
    }

    fn replace_content(&mut self, markup: &str) -> Result<(), HostError> {
        self.check_writable()?;
        self.nodes = parse(markup);
        self.cursor = self.cursor.min(self.size());
        self.revision += 1;
        Ok(())
    }

    fn insert_text(&mut self, text: &str) -> Result<(), HostError> {
        self.check_writable()?;
        if !insert_at(&mut self.nodes, 0, self.cursor, text) {
            return Err(HostError::InvalidPosition(self.cursor));
        }
        self.cursor += text.chars().count();
        self.revision += 1;
        Ok(())
    }

    fn set_decorations(&mut self, decorations: &DecorationSet) {
        self.decorations = decorations.clone();
    }
}

fn visit_nodes(nodes: &[Node], start: usize, mode: Visit, visit: &mut dyn FnMut(usize, &str)) {
    let mut pos = start;
    for node in nodes {
        match node {
            Node::Text(t) => visit(pos, t),
            Node::Element(el) if mode == Visit::SkipApplied && el.is_applied_value() => {}
            Node::Element(el) if !el.is_void() => {
                visit_nodes(&el.children, pos + 1, mode, visit);
            }
            Node::Element(_) | Node::Raw(_) => {}
        }
        pos += node.size();
    }
}

fn insert_at(nodes: &mut Vec<Node>, start: usize, target: usize, text: &str) -> bool {
    let mut pos = start;
    for i in 0..nodes.len() {
        let size = nodes[i].size();
        let slot = match &nodes[i] {
            Node::Text(_) if target <= pos + size => Slot::Text,
            Node::Element(el)
                if !el.is_void() && !el.is_raw_text() && target > pos && target < pos + size =>
            {
                Slot::Element
            }
            _ if target == pos => Slot::Before,
            _ => Slot::Past,
        };

        match slot {
            Slot::Text => {
                if let Node::Text(t) = &mut nodes[i] {
                    let byte = t.char_indices().nth(target - pos).map_or(t.len(), |(b, _)| b);
                    t.insert_str(byte, text);
                }
                return true;
            }
            Slot::Element => {
                if let Node::Element(el) = &mut nodes[i] {
                    return insert_at(&mut el.children, pos + 1, target, text);
                }
                return false;
            }
            Slot::Before => {
                nodes.insert(i, Node::Text(text.to_string()));
                return true;
            }
            Slot::Past => pos += size,
        }
    }

    if target == pos {
        nodes.push(Node::Text(text.to_string()));
        true
    } else {
        false
    }
}

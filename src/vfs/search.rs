//! Case-insensitive name filter for the current directory level.

use crate::input::TextInput;
use crate::vfs::path::Node;

/// Nodes whose name contains `term`, ignoring case, in their original order.
///
/// The term is trimmed first; an empty term passes every node through. Only
/// the node's own name is matched, never its full key or folder contents.
pub fn apply<'a>(nodes: &'a [Node], term: &str) -> Vec<&'a Node> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return nodes.iter().collect();
    }
    nodes
        .iter()
        .filter(|node| node.name.to_lowercase().contains(&needle))
        .collect()
}

/// The search term being typed, plus whether the input line has focus.
#[derive(Debug, Default)]
pub struct SearchFilter {
    pub input: TextInput,
    pub focused: bool,
}

impl SearchFilter {
    pub fn term(&self) -> &str {
        &self.input.value
    }

    /// True when the trimmed term would filter anything.
    pub fn is_active(&self) -> bool {
        !self.input.value.trim().is_empty()
    }

    pub fn focus(&mut self) {
        self.focused = true;
        self.input.end();
    }

    /// Leave the input line, keeping the term applied.
    pub fn blur(&mut self) {
        self.focused = false;
    }

    /// Leave the input line and drop the term.
    pub fn reset(&mut self) {
        self.focused = false;
        self.input.clear();
    }

    pub fn filter<'a>(&self, nodes: &'a [Node]) -> Vec<&'a Node> {
        apply(nodes, self.term())
    }
}

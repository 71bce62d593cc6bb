//! Element Query
//!
//! Selector lists of simple selectors (`iframe,frame`, `#id`, `.class`, `*`)
//! and the `querySelectorAll` walk over a light tree.

use crate::{DomTree, Namespace, NodeId};

/// Simple selector for matching
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    Tag(String),
    Class(String),
    Id(String),
    Universal,
}

impl SimpleSelector {
    /// Parse a simple selector string
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }

        if s == "*" {
            Some(Self::Universal)
        } else if let Some(id) = s.strip_prefix('#') {
            (!id.is_empty()).then(|| Self::Id(id.to_string()))
        } else if let Some(class) = s.strip_prefix('.') {
            (!class.is_empty()).then(|| Self::Class(class.to_string()))
        } else if s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            Some(Self::Tag(s.to_ascii_lowercase()))
        } else {
            None
        }
    }

    /// Check whether an element matches
    pub fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        let Some(elem) = tree.get(id).and_then(|n| n.as_element()) else {
            return false;
        };
        match self {
            Self::Universal => true,
            // Type selectors compare case-insensitively only in the HTML namespace
            Self::Tag(tag) => {
                let local = tree.resolve(elem.name.local);
                if elem.name.ns == Namespace::Html {
                    local.eq_ignore_ascii_case(tag)
                } else {
                    local == tag
                }
            }
            Self::Id(wanted) => elem.id.is_some_and(|v| tree.resolve(v) == wanted),
            Self::Class(wanted) => tree
                .get_attribute(id, "class")
                .is_some_and(|v| v.split_ascii_whitespace().any(|c| c == wanted)),
        }
    }
}

/// Comma-separated list of simple selectors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    selectors: Vec<SimpleSelector>,
}

impl SelectorList {
    /// Parse a selector list; `None` if any entry is invalid
    pub fn parse(s: &str) -> Option<Self> {
        let selectors = s
            .split(',')
            .map(SimpleSelector::parse)
            .collect::<Option<Vec<_>>>()?;
        Some(Self { selectors })
    }

    pub fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        self.selectors.iter().any(|s| s.matches(tree, id))
    }

    pub fn selectors(&self) -> &[SimpleSelector] {
        &self.selectors
    }
}

/// Static node list returned by `querySelectorAll`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeList {
    nodes: Vec<NodeId>,
}

impl NodeList {
    pub fn from_vec(nodes: Vec<NodeId>) -> Self {
        Self { nodes }
    }

    pub fn length(&self) -> usize {
        self.nodes.len()
    }

    pub fn item(&self, index: usize) -> Option<NodeId> {
        self.nodes.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.iter()
    }

    pub fn into_vec(self) -> Vec<NodeId> {
        self.nodes
    }
}

impl DomTree {
    /// All matching elements under `root` in tree order, `root` excluded
    pub fn query_selector_all(&self, root: NodeId, selectors: &SelectorList) -> NodeList {
        NodeList::from_vec(
            self.descendants(root)
                .filter(|&id| selectors.matches(self, id))
                .collect(),
        )
    }

    /// First matching element under `root`
    pub fn query_selector(&self, root: NodeId, selectors: &SelectorList) -> Option<NodeId> {
        self.descendants(root).find(|&id| selectors.matches(self, id))
    }
}

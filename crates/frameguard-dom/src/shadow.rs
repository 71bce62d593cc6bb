//! Shadow DOM
//!
//! Shadow roots are stored as `NodeData::ShadowRoot` nodes linked from their
//! host through `Node::shadow_root`. They are never children of the host, so
//! light-tree walks and selector queries stop at the boundary.

use crate::{DomError, DomResult, DomTree, NodeData, NodeId, NodeKind};

/// Shadow root mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadowRootMode {
    #[default]
    Open,
    Closed,
}

impl ShadowRootMode {
    /// Parse a `shadowrootmode` attribute value
    pub fn parse(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("open") {
            Some(Self::Open)
        } else if value.eq_ignore_ascii_case("closed") {
            Some(Self::Closed)
        } else {
            None
        }
    }
}

/// Elements that may host a shadow root
const SHADOW_HOST_NAMES: &[&str] = &[
    "article", "aside", "blockquote", "body", "div", "footer", "h1", "h2", "h3", "h4", "h5",
    "h6", "header", "main", "nav", "p", "section", "span",
];

impl DomTree {
    /// Whether `id` is a shadow root
    pub fn is_shadow_root(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(|n| n.is_shadow_root())
    }

    /// Whether an element may host a shadow root (valid custom element
    /// names included)
    pub fn can_host_shadow(&self, id: NodeId) -> bool {
        let Some(name) = self.local_name(id) else {
            return false;
        };
        SHADOW_HOST_NAMES.contains(&name) || name.contains('-')
    }

    /// Attach a shadow root to `host`
    pub fn attach_shadow(
        &mut self,
        host: NodeId,
        mode: ShadowRootMode,
        declarative: bool,
    ) -> DomResult<NodeId> {
        if self.kind(host) != Some(NodeKind::Element) {
            return Err(DomError::InvalidNodeType);
        }
        if !self.can_host_shadow(host) {
            return Err(DomError::NotSupported);
        }
        if self.shadow_root(host).is_some() {
            return Err(DomError::ShadowRootExists);
        }

        let root = self.create_shadow_node(host, mode, declarative);
        if let Some(node) = self.get_mut(host) {
            node.shadow_root = root;
        }
        tracing::trace!(?host, ?mode, declarative, "attached shadow root");
        Ok(root)
    }

    /// Shadow root attached to `host`
    pub fn shadow_root(&self, host: NodeId) -> Option<NodeId> {
        let root = self.get(host)?.shadow_root;
        root.is_valid().then_some(root)
    }

    /// Host element of a shadow root
    pub fn shadow_host(&self, root: NodeId) -> Option<NodeId> {
        match self.get(root)?.data {
            NodeData::ShadowRoot { host, .. } => Some(host),
            _ => None,
        }
    }

    /// Mode and declarative flag of a shadow root
    pub fn shadow_info(&self, root: NodeId) -> Option<(ShadowRootMode, bool)> {
        match self.get(root)?.data {
            NodeData::ShadowRoot { mode, declarative, .. } => Some((mode, declarative)),
            _ => None,
        }
    }

    /// Every shadow root attached at or beneath `root`, across nested
    /// shadow trees, in composed pre-order.
    pub fn shadow_roots_within(&self, root: NodeId) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack = vec![root];

        while let Some(scope) = stack.pop() {
            let mut in_scope: Vec<NodeId> = Vec::new();
            if let Some(shadow) = self.shadow_root(scope) {
                in_scope.push(shadow);
            }
            for id in self.descendants(scope) {
                if let Some(shadow) = self.shadow_root(id) {
                    in_scope.push(shadow);
                }
            }
            found.extend(in_scope.iter().copied());
            // Reverse so the first shadow root is explored first
            stack.extend(in_scope.into_iter().rev());
        }

        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parse() {
        assert_eq!(ShadowRootMode::parse("OPEN"), Some(ShadowRootMode::Open));
        assert_eq!(ShadowRootMode::parse("closed"), Some(ShadowRootMode::Closed));
        assert_eq!(ShadowRootMode::parse("none"), None);
    }

    #[test]
    fn test_attach_once() {
        let mut tree = DomTree::new();
        let host = tree.create_element("div");
        let root = tree.attach_shadow(host, ShadowRootMode::Open, false).unwrap();

        assert_eq!(tree.shadow_root(host), Some(root));
        assert_eq!(tree.shadow_host(root), Some(host));
        assert_eq!(
            tree.attach_shadow(host, ShadowRootMode::Open, false),
            Err(DomError::ShadowRootExists)
        );
    }

    #[test]
    fn test_attach_rejects_frames() {
        let mut tree = DomTree::new();
        let iframe = tree.create_element("iframe");
        assert_eq!(
            tree.attach_shadow(iframe, ShadowRootMode::Open, false),
            Err(DomError::NotSupported)
        );
        let custom = tree.create_element("x-card");
        assert!(tree.attach_shadow(custom, ShadowRootMode::Closed, false).is_ok());
    }

    #[test]
    fn test_shadow_root_not_a_child() {
        let mut tree = DomTree::new();
        let host = tree.create_element("div");
        tree.append_child(tree.root(), host).unwrap();
        let shadow = tree.attach_shadow(host, ShadowRootMode::Open, false).unwrap();
        let inner = tree.create_element("iframe");
        tree.append_child(shadow, inner).unwrap();

        let light: Vec<_> = tree.descendants(tree.root()).collect();
        assert_eq!(light, vec![host]);
    }

    #[test]
    fn test_nested_shadow_roots_found() {
        let mut tree = DomTree::new();
        let outer = tree.create_element("div");
        tree.append_child(tree.root(), outer).unwrap();
        let outer_root = tree.attach_shadow(outer, ShadowRootMode::Open, false).unwrap();

        let inner = tree.create_element("span");
        tree.append_child(outer_root, inner).unwrap();
        let inner_root = tree.attach_shadow(inner, ShadowRootMode::Closed, true).unwrap();

        let roots = tree.shadow_roots_within(tree.root());
        assert_eq!(roots, vec![outer_root, inner_root]);
        assert_eq!(tree.shadow_info(inner_root), Some((ShadowRootMode::Closed, true)));
    }
}

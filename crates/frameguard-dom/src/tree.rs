//! DOM Tree (arena-based allocation)
//!
//! Every node lives in one `Vec<Node>`; detached nodes (parsed fragments,
//! template contents, shadow roots) share the arena with the document and
//! are simply not reachable from the root.

use crate::{
    DomError, DomResult, ElementData, InternedString, Namespace, Node, NodeData, NodeId, NodeKind,
    QualName, StringInterner,
};

/// Arena-based DOM tree
#[derive(Debug)]
pub struct DomTree {
    nodes: Vec<Node>,
    interner: StringInterner,
}

impl DomTree {
    /// Create a tree holding a single document node at `NodeId::ROOT`
    pub fn new() -> Self {
        let mut tree = Self {
            nodes: Vec::with_capacity(64),
            interner: StringInterner::new(),
        };
        tree.push(NodeData::Document);
        tree
    }

    /// The document node
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        if !id.is_valid() {
            return None;
        }
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if !id.is_valid() {
            return None;
        }
        self.nodes.get_mut(id.index())
    }

    /// Number of nodes in the arena (attached or not)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    /// Resolve an interned name
    #[inline]
    pub fn resolve(&self, id: InternedString) -> &str {
        self.interner.get(id)
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(data));
        id
    }

    // --- Node creation ---

    /// Create a detached HTML element
    pub fn create_element(&mut self, local: &str) -> NodeId {
        self.create_element_ns(Namespace::Html, local)
    }

    /// Create a detached element in a namespace
    pub fn create_element_ns(&mut self, ns: Namespace, local: &str) -> NodeId {
        let local = match ns {
            Namespace::Html => self.interner.intern(&local.to_ascii_lowercase()),
            _ => self.interner.intern(local),
        };
        let id = self.push(NodeData::Element(ElementData::new(QualName::new(ns, local))));
        if ns == Namespace::Html && self.resolve(local) == "template" {
            let contents = self.push(NodeData::DocumentFragment);
            if let Some(elem) = self.nodes[id.index()].as_element_mut() {
                elem.template_contents = contents;
            }
        }
        id
    }

    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.push(NodeData::Text(content.to_string()))
    }

    pub fn create_comment(&mut self, content: &str) -> NodeId {
        self.push(NodeData::Comment(content.to_string()))
    }

    pub fn create_doctype(&mut self, name: &str) -> NodeId {
        self.push(NodeData::Doctype { name: name.to_string() })
    }

    pub fn create_processing_instruction(&mut self, target: &str, data: &str) -> NodeId {
        self.push(NodeData::ProcessingInstruction {
            target: target.to_string(),
            data: data.to_string(),
        })
    }

    /// Create an empty detached document node
    pub fn create_document(&mut self) -> NodeId {
        self.push(NodeData::Document)
    }

    /// Create an empty detached fragment
    pub fn create_fragment(&mut self) -> NodeId {
        self.push(NodeData::DocumentFragment)
    }

    pub(crate) fn create_shadow_node(
        &mut self,
        host: NodeId,
        mode: crate::ShadowRootMode,
        declarative: bool,
    ) -> NodeId {
        self.push(NodeData::ShadowRoot { host, mode, declarative })
    }

    // --- Inspection ---

    /// Node kind, `None` for an unknown id
    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.get(id).map(Node::kind)
    }

    /// Local name of an element
    pub fn local_name(&self, id: NodeId) -> Option<&str> {
        let elem = self.get(id)?.as_element()?;
        Some(self.resolve(elem.name.local))
    }

    /// Namespace of an element
    pub fn namespace(&self, id: NodeId) -> Option<Namespace> {
        Some(self.get(id)?.as_element()?.name.ns)
    }

    /// Inert contents fragment of a `<template>`
    pub fn template_contents(&self, id: NodeId) -> Option<NodeId> {
        let contents = self.get(id)?.as_element()?.template_contents;
        contents.is_valid().then_some(contents)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.get(id)?.parent;
        parent.is_valid().then_some(parent)
    }

    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        let name = self.interner.lookup(name)?;
        self.get(id)?.as_element()?.get_attr(name)
    }

    /// Set an attribute, keeping the cached id in sync
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> DomResult<()> {
        let name_id = self.interner.intern(&name.to_ascii_lowercase());
        let value_id = (self.resolve(name_id) == "id").then(|| self.interner.intern(value));
        let elem = self
            .get_mut(id)
            .and_then(Node::as_element_mut)
            .ok_or(DomError::InvalidNodeType)?;
        elem.set_attr(name_id, value.to_string());
        if value_id.is_some() {
            elem.id = value_id;
        }
        Ok(())
    }

    /// Iterate the direct children of a node
    pub fn children(&self, id: NodeId) -> Children<'_> {
        let next = self.get(id).map(|n| n.first_child).unwrap_or(NodeId::NONE);
        Children { tree: self, next }
    }

    /// Collect child ids (safe to hold across mutation)
    pub fn child_ids(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id).map(|(child, _)| child).collect()
    }

    /// Pre-order light-tree descendants of `root`, excluding `root`.
    ///
    /// Shadow roots and template contents are not children, so the walk
    /// never enters them.
    pub fn descendants(&self, root: NodeId) -> Descendants<'_> {
        let next = self.get(root).map(|n| n.first_child).unwrap_or(NodeId::NONE);
        Descendants { tree: self, root, next }
    }

    /// True if `ancestor` is `node` or one of its light-tree ancestors
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = node;
        while current.is_valid() {
            if current == ancestor {
                return true;
            }
            current = match self.get(current) {
                Some(n) => n.parent,
                None => return false,
            };
        }
        false
    }

    // --- Mutation ---

    /// Append `child` as the last child of `parent`, detaching it first
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        let parent_kind = self.kind(parent).ok_or(DomError::NotFound)?;
        let child_kind = self.kind(child).ok_or(DomError::NotFound)?;

        if !matches!(
            parent_kind,
            NodeKind::Element | NodeKind::Document | NodeKind::DocumentFragment
        ) {
            return Err(DomError::HierarchyRequest);
        }
        if child_kind == NodeKind::Document || self.is_shadow_root(child) {
            return Err(DomError::HierarchyRequest);
        }
        if self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest);
        }

        self.detach(child);

        let last = self.nodes[parent.index()].last_child;
        {
            let node = &mut self.nodes[child.index()];
            node.parent = parent;
            node.prev_sibling = last;
            node.next_sibling = NodeId::NONE;
        }
        if last.is_valid() {
            self.nodes[last.index()].next_sibling = child;
        } else {
            self.nodes[parent.index()].first_child = child;
        }
        self.nodes[parent.index()].last_child = child;
        Ok(child)
    }

    /// Remove `child` from `parent`
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        if self.get(child).ok_or(DomError::NotFound)?.parent != parent {
            return Err(DomError::NotAChild);
        }
        self.detach(child);
        Ok(child)
    }

    /// Unlink a node from its parent, if any
    pub fn detach(&mut self, id: NodeId) {
        let Some(node) = self.get(id) else { return };
        let (parent, prev, next) = (node.parent, node.prev_sibling, node.next_sibling);
        if !parent.is_valid() {
            return;
        }

        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = next;
        } else {
            self.nodes[parent.index()].first_child = next;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = prev;
        } else {
            self.nodes[parent.index()].last_child = prev;
        }

        let node = &mut self.nodes[id.index()];
        node.parent = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;
    }

    /// Remove every child of `id`
    pub fn clear_children(&mut self, id: NodeId) {
        for child in self.child_ids(id) {
            self.detach(child);
        }
    }

    /// Move all children of `from` to the end of `to`, preserving order
    pub fn move_children(&mut self, from: NodeId, to: NodeId) -> DomResult<()> {
        for child in self.child_ids(from) {
            self.append_child(to, child)?;
        }
        Ok(())
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over direct children
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl<'a> Iterator for Children<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next;
        let node = self.tree.get(id)?;
        self.next = node.next_sibling;
        Some((id, node))
    }
}

/// Pre-order iterator bounded by a subtree root
pub struct Descendants<'a> {
    tree: &'a DomTree,
    root: NodeId,
    next: NodeId,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next;
        let node = self.tree.get(current)?;

        self.next = if node.first_child.is_valid() {
            node.first_child
        } else {
            let mut cursor = current;
            loop {
                if cursor == self.root {
                    break NodeId::NONE;
                }
                let Some(n) = self.tree.get(cursor) else {
                    break NodeId::NONE;
                };
                if n.next_sibling.is_valid() {
                    break n.next_sibling;
                }
                cursor = n.parent;
                if !cursor.is_valid() || cursor == self.root {
                    break NodeId::NONE;
                }
            }
        };

        Some(current)
    }
}

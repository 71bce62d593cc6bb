//! Document - High-level document API

use crate::{DomTree, NodeId};

/// HTML Document
#[derive(Debug)]
pub struct Document {
    /// The DOM tree
    pub tree: DomTree,
    /// Document URL
    url: String,
    /// Cached reference to <html> element
    html_element: NodeId,
    /// Cached reference to <head> element
    head_element: NodeId,
    /// Cached reference to <body> element
    body_element: NodeId,
}

impl Document {
    /// Create a new document with html/head/body
    pub fn new(url: &str) -> Self {
        let mut tree = DomTree::new();

        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");

        // Freshly created nodes can always be appended
        let root = tree.root();
        let _ = tree.append_child(root, html);
        let _ = tree.append_child(html, head);
        let _ = tree.append_child(html, body);

        Self {
            tree,
            url: url.to_string(),
            html_element: html,
            head_element: head,
            body_element: body,
        }
    }

    /// Create an empty document (no structure)
    pub fn empty(url: &str) -> Self {
        Self {
            tree: DomTree::new(),
            url: url.to_string(),
            html_element: NodeId::NONE,
            head_element: NodeId::NONE,
            body_element: NodeId::NONE,
        }
    }

    /// Locate html/head/body after the tree was filled by a parser
    pub fn finalize(&mut self) {
        let root = self.tree.root();
        self.html_element = self.find_child(root, "html").unwrap_or(NodeId::NONE);
        self.head_element = self.find_child(self.html_element, "head").unwrap_or(NodeId::NONE);
        self.body_element = self.find_child(self.html_element, "body").unwrap_or(NodeId::NONE);
    }

    fn find_child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.tree
            .children(parent)
            .map(|(id, _)| id)
            .find(|&id| self.tree.local_name(id) == Some(name))
    }

    /// Get document URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get <html> element
    pub fn document_element(&self) -> NodeId {
        self.html_element
    }

    pub fn head(&self) -> NodeId {
        self.head_element
    }

    pub fn body(&self) -> NodeId {
        self.body_element
    }

    /// Get element by ID (light tree only)
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        let wanted = self.tree.interner().lookup(id)?;
        self.tree.descendants(self.tree.root()).find(|&node| {
            self.tree
                .get(node)
                .and_then(|n| n.as_element())
                .is_some_and(|e| e.id == Some(wanted))
        })
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Access the DOM tree mutably
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("about:blank")
    }
}

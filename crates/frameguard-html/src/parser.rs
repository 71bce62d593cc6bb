//! HTML5 Parser implementation
//!
//! Uses html5ever's RcDom and converts the result into a `DomTree`.
//! Declarative shadow roots (`<template shadowrootmode>`) are materialized
//! during conversion, the same point at which a browser attaches them.

use frameguard_dom::{Document, DomTree, Namespace, NodeId, ShadowRootMode};
use html5ever::parse_document;
use html5ever::serialize::{SerializeOpts, serialize};
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom, SerializableHandle};

use crate::ParseError;

/// HTML5 parser
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlParser;

impl HtmlParser {
    /// Create a new HTML parser
    pub fn new() -> Self {
        Self
    }

    /// Parse HTML string into a Document
    pub fn parse(&self, html: &str) -> Document {
        self.parse_with_url(html, "about:blank")
    }

    /// Parse HTML with a base URL
    pub fn parse_with_url(&self, html: &str, url: &str) -> Document {
        tracing::debug!("Parsing HTML document: {}", url);

        let dom = Self::run(html);
        let mut document = Document::empty(url);
        let tree = document.tree_mut();
        let root = tree.root();
        if let Err(err) = self.convert_children(&dom.document, tree, root) {
            tracing::warn!(%err, "document conversion stopped early");
        }
        document.finalize();

        tracing::debug!("Parsed {} nodes", document.tree().len());
        document
    }

    /// Parse a complete document into a detached document node of `tree`.
    ///
    /// This is how lazy-document content (`srcdoc`) is materialized: the
    /// returned node is not reachable from `tree.root()`.
    pub fn parse_detached_document(&self, tree: &mut DomTree, html: &str) -> Result<NodeId, ParseError> {
        let dom = Self::run(html);
        let doc = tree.create_document();
        self.convert_children(&dom.document, tree, doc)?;
        tracing::debug!(?doc, "parsed detached document");
        Ok(doc)
    }

    /// Parse markup into a detached fragment of `tree`.
    ///
    /// The markup is parsed as a document; the children of `<head>` and
    /// `<body>` (and any other child of `<html>`, such as a `<frameset>`)
    /// are gathered into the fragment in order.
    pub fn parse_fragment(&self, tree: &mut DomTree, html: &str) -> Result<NodeId, ParseError> {
        let doc = self.parse_detached_document(tree, html)?;
        let fragment = tree.create_fragment();

        let html_elements: Vec<NodeId> = tree
            .child_ids(doc)
            .into_iter()
            .filter(|&id| tree.local_name(id) == Some("html"))
            .collect();

        for html_element in html_elements {
            for child in tree.child_ids(html_element) {
                match tree.local_name(child) {
                    Some("head") | Some("body") => tree.move_children(child, fragment)?,
                    _ => {
                        tree.append_child(fragment, child)?;
                    }
                }
            }
        }

        Ok(fragment)
    }

    /// Parse `html` as a document and serialize the result back to markup.
    ///
    /// Parsing the output again need not give the same tree: markup that
    /// mutates across the round trip (mXSS) shows its second form here.
    pub fn reserialize(&self, html: &str) -> Result<String, ParseError> {
        let dom = Self::run(html);
        let document: SerializableHandle = dom.document.clone().into();
        let mut out = Vec::new();
        serialize(&mut out, &document, SerializeOpts::default())?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    fn run(html: &str) -> RcDom {
        parse_document(RcDom::default(), Default::default()).one(html)
    }

    fn convert_children(&self, handle: &Handle, tree: &mut DomTree, parent: NodeId) -> Result<(), ParseError> {
        for child in handle.children.borrow().iter() {
            self.convert_node(child, tree, parent)?;
        }
        Ok(())
    }

    /// Convert an RcDom node to our DOM format
    fn convert_node(&self, handle: &Handle, tree: &mut DomTree, parent: NodeId) -> Result<(), ParseError> {
        match &handle.data {
            RcNodeData::Document => {
                self.convert_children(handle, tree, parent)?;
            }
            RcNodeData::Doctype { name, .. } => {
                let id = tree.create_doctype(name);
                tree.append_child(parent, id)?;
            }
            RcNodeData::Text { contents } => {
                let id = tree.create_text(&contents.borrow());
                tree.append_child(parent, id)?;
            }
            RcNodeData::Comment { contents } => {
                let id = tree.create_comment(contents);
                tree.append_child(parent, id)?;
            }
            RcNodeData::ProcessingInstruction { target, contents } => {
                let id = tree.create_processing_instruction(target, contents);
                tree.append_child(parent, id)?;
            }
            RcNodeData::Element { name, attrs, template_contents, .. } => {
                let ns = Namespace::from_url(&name.ns);
                let attrs = attrs.borrow();

                if ns == Namespace::Html && &*name.local == "template" {
                    // `shadowroot` is the pre-standard spelling, still honored
                    let mode = ["shadowrootmode", "shadowroot"].iter().find_map(|attr| {
                        attrs
                            .iter()
                            .find(|a| &*a.name.local == *attr)
                            .and_then(|a| ShadowRootMode::parse(&a.value))
                    });

                    if let Some(mode) = mode {
                        if tree.can_host_shadow(parent) && tree.shadow_root(parent).is_none() {
                            let shadow = tree.attach_shadow(parent, mode, true)?;
                            if let Some(contents) = template_contents.borrow().as_ref() {
                                self.convert_children(contents, tree, shadow)?;
                            }
                            return Ok(());
                        }
                    }
                }

                let id = tree.create_element_ns(ns, &name.local);
                for attr in attrs.iter() {
                    tree.set_attribute(id, &attr.name.local, &attr.value)?;
                }
                tree.append_child(parent, id)?;

                if let (Some(contents), Some(target)) =
                    (template_contents.borrow().as_ref(), tree.template_contents(id))
                {
                    self.convert_children(contents, tree, target)?;
                }
                self.convert_children(handle, tree, id)?;
            }
        }
        Ok(())
    }
}

//! DOM Node - Compact representation
//!
//! Nodes link to each other through `NodeId` indices into the tree arena.
//! The `NodeData` variant is the node's internal slot: it is set when the
//! node is created and is never reachable from guest-writable state.

use crate::{InternedString, NodeId, ShadowRootMode};

/// Element namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Namespace {
    #[default]
    Html,
    Svg,
    MathMl,
    Other,
}

impl Namespace {
    /// Map a namespace URL to a known namespace
    pub fn from_url(url: &str) -> Self {
        match url {
            "http://www.w3.org/1999/xhtml" => Self::Html,
            "http://www.w3.org/2000/svg" => Self::Svg,
            "http://www.w3.org/1998/Math/MathML" => Self::MathMl,
            _ => Self::Other,
        }
    }
}

/// Qualified name (namespace + interned local name)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QualName {
    pub ns: Namespace,
    pub local: InternedString,
}

impl QualName {
    pub fn new(ns: Namespace, local: InternedString) -> Self {
        Self { ns, local }
    }
}

/// DOM node kind, carrying the platform's integer constants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum NodeKind {
    Element = 1,
    Text = 3,
    ProcessingInstruction = 7,
    Comment = 8,
    Document = 9,
    DocumentType = 10,
    DocumentFragment = 11,
}

impl NodeKind {
    /// The `nodeType` integer
    #[inline]
    pub fn as_u16(self) -> u16 {
        self as u16
    }

    pub fn from_u16(value: u16) -> Option<Self> {
        Some(match value {
            1 => Self::Element,
            3 => Self::Text,
            7 => Self::ProcessingInstruction,
            8 => Self::Comment,
            9 => Self::Document,
            10 => Self::DocumentType,
            11 => Self::DocumentFragment,
            _ => return None,
        })
    }
}

/// DOM Node - Core structure
#[derive(Debug)]
pub struct Node {
    /// Parent node (NONE if detached or root)
    pub parent: NodeId,
    /// First child
    pub first_child: NodeId,
    /// Last child (for O(1) append)
    pub last_child: NodeId,
    /// Previous sibling
    pub prev_sibling: NodeId,
    /// Next sibling
    pub next_sibling: NodeId,
    /// Attached shadow root (elements only)
    pub shadow_root: NodeId,
    /// Node-specific data
    pub data: NodeData,
}

impl Node {
    pub(crate) fn new(data: NodeData) -> Self {
        Self {
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
            shadow_root: NodeId::NONE,
            data,
        }
    }

    /// The node kind derived from internal data
    pub fn kind(&self) -> NodeKind {
        match self.data {
            NodeData::Document => NodeKind::Document,
            NodeData::DocumentFragment | NodeData::ShadowRoot { .. } => NodeKind::DocumentFragment,
            NodeData::Doctype { .. } => NodeKind::DocumentType,
            NodeData::Element(_) => NodeKind::Element,
            NodeData::Text(_) => NodeKind::Text,
            NodeData::Comment(_) => NodeKind::Comment,
            NodeData::ProcessingInstruction { .. } => NodeKind::ProcessingInstruction,
        }
    }

    /// Check if this is an element
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    /// Check if this is a shadow root
    #[inline]
    pub fn is_shadow_root(&self) -> bool {
        matches!(self.data, NodeData::ShadowRoot { .. })
    }

    /// Get element data if this is an element
    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get text content if this is a text node
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(t) => Some(t),
            _ => None,
        }
    }
}

/// Node-specific data
#[derive(Debug)]
pub enum NodeData {
    /// Document root
    Document,
    /// Detached container (template contents, parsed fragments)
    DocumentFragment,
    /// Shadow tree root attached to `host`
    ShadowRoot {
        host: NodeId,
        mode: ShadowRootMode,
        /// Attached by the parser from a `<template shadowrootmode>`
        declarative: bool,
    },
    /// DOCTYPE
    Doctype { name: String },
    /// Element
    Element(ElementData),
    /// Text content
    Text(String),
    /// Comment
    Comment(String),
    /// Processing instruction
    ProcessingInstruction { target: String, data: String },
}

/// Element-specific data
#[derive(Debug)]
pub struct ElementData {
    /// Tag name (qualified)
    pub name: QualName,
    /// Attributes in source order
    pub attrs: Vec<Attribute>,
    /// Cached id attribute
    pub id: Option<InternedString>,
    /// Inert contents of a `<template>` element
    pub template_contents: NodeId,
}

impl ElementData {
    pub fn new(name: QualName) -> Self {
        Self {
            name,
            attrs: Vec::new(),
            id: None,
            template_contents: NodeId::NONE,
        }
    }

    /// Get an attribute value
    pub fn get_attr(&self, name: InternedString) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Set an attribute, replacing any previous value
    pub fn set_attr(&mut self, name: InternedString, value: String) {
        if let Some(attr) = self.attrs.iter_mut().find(|a| a.name == name) {
            attr.value = value;
            return;
        }
        self.attrs.push(Attribute { name, value });
    }

    pub fn remove_attr(&mut self, name: InternedString) -> Option<String> {
        let pos = self.attrs.iter().position(|a| a.name == name)?;
        Some(self.attrs.remove(pos).value)
    }
}

/// Attribute
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: InternedString,
    pub value: String,
}

//! frameguard DOM - Document Object Model
//!
//! Arena DOM the isolation layer inspects. Node identity is the `NodeId`
//! index; node type information lives only in `NodeData`, which guest code
//! cannot rewrite.

mod document;
mod interner;
mod node;
mod selector;
mod shadow;
mod tree;

pub use document::Document;
pub use interner::{InternedString, StringInterner};
pub use node::{Attribute, ElementData, Namespace, Node, NodeData, NodeKind, QualName};
pub use selector::{NodeList, SelectorList, SimpleSelector};
pub use shadow::ShadowRootMode;
pub use tree::{Children, Descendants, DomTree};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Document node of every tree
    pub const ROOT: NodeId = NodeId(0);
    /// Absent link
    pub const NONE: NodeId = NodeId(u32::MAX);

    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("Node not found")]
    NotFound,
    #[error("Hierarchy request error")]
    HierarchyRequest,
    #[error("Invalid node type")]
    InvalidNodeType,
    #[error("Node is not a child")]
    NotAChild,
    #[error("Element cannot host a shadow root")]
    NotSupported,
    #[error("Element already hosts a shadow root")]
    ShadowRootExists,
}

//! frameguard HTML Parser
//!
//! HTML5 parsing built on html5ever, producing `frameguard-dom` trees.
//! Besides whole documents it can materialize detached documents and
//! fragments inside an existing tree, which is what the mutation guard
//! inspects before any markup reaches a live document.

mod parser;

pub use frameguard_dom::{Document, DomTree, NodeId};
pub use parser::HtmlParser;

/// Parse an HTML string into a Document
pub fn parse(html: &str) -> Document {
    HtmlParser::new().parse(html)
}

/// Parse error
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Tree construction failed: {0}")]
    Tree(#[from] frameguard_dom::DomError),
    #[error("Serialization failed: {0}")]
    Serialize(#[from] std::io::Error),
}

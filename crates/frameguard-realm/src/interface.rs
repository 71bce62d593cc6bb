//! Interfaces (brands)
//!
//! Every object has exactly one interface, derived from its internal slot:
//! the `NodeData` of a node, or the kind of `ObjectRef`. Nothing guest code
//! writes can change it.

use frameguard_dom::{DomTree, Namespace, NodeData, NodeId};

use crate::ObjectRef;

/// Platform interface of an object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interface {
    Object,
    Function,
    Array,
    TrustedHtml,
    Node,
    Document,
    DocumentFragment,
    ShadowRoot,
    DocumentType,
    Text,
    Comment,
    ProcessingInstruction,
    Element,
    HtmlElement,
    HtmlIFrameElement,
    HtmlFrameElement,
    HtmlObjectElement,
    HtmlEmbedElement,
    HtmlTemplateElement,
    SvgElement,
    MathMlElement,
}

impl Interface {
    /// Every interface, in prototype-installation order
    pub const ALL: &'static [Interface] = &[
        Interface::Object,
        Interface::Function,
        Interface::Array,
        Interface::TrustedHtml,
        Interface::Node,
        Interface::Document,
        Interface::DocumentFragment,
        Interface::ShadowRoot,
        Interface::DocumentType,
        Interface::Text,
        Interface::Comment,
        Interface::ProcessingInstruction,
        Interface::Element,
        Interface::HtmlElement,
        Interface::HtmlIFrameElement,
        Interface::HtmlFrameElement,
        Interface::HtmlObjectElement,
        Interface::HtmlEmbedElement,
        Interface::HtmlTemplateElement,
        Interface::SvgElement,
        Interface::MathMlElement,
    ];

    /// The type tag reported between `[object ` and `]`
    pub fn tag(self) -> &'static str {
        match self {
            Self::Object => "Object",
            Self::Function => "Function",
            Self::Array => "Array",
            Self::TrustedHtml => "TrustedHTML",
            Self::Node => "Node",
            Self::Document => "HTMLDocument",
            Self::DocumentFragment => "DocumentFragment",
            Self::ShadowRoot => "ShadowRoot",
            Self::DocumentType => "DocumentType",
            Self::Text => "Text",
            Self::Comment => "Comment",
            Self::ProcessingInstruction => "ProcessingInstruction",
            Self::Element => "Element",
            Self::HtmlElement => "HTMLElement",
            Self::HtmlIFrameElement => "HTMLIFrameElement",
            Self::HtmlFrameElement => "HTMLFrameElement",
            Self::HtmlObjectElement => "HTMLObjectElement",
            Self::HtmlEmbedElement => "HTMLEmbedElement",
            Self::HtmlTemplateElement => "HTMLTemplateElement",
            Self::SvgElement => "SVGElement",
            Self::MathMlElement => "MathMLElement",
        }
    }

    /// Next interface on the prototype chain
    pub fn parent(self) -> Option<Interface> {
        Some(match self {
            Self::Object => return None,
            Self::Function | Self::Array | Self::TrustedHtml | Self::Node => Self::Object,
            Self::Document
            | Self::DocumentFragment
            | Self::DocumentType
            | Self::Text
            | Self::Comment
            | Self::ProcessingInstruction
            | Self::Element => Self::Node,
            Self::ShadowRoot => Self::DocumentFragment,
            Self::HtmlElement | Self::SvgElement | Self::MathMlElement => Self::Element,
            Self::HtmlIFrameElement
            | Self::HtmlFrameElement
            | Self::HtmlObjectElement
            | Self::HtmlEmbedElement
            | Self::HtmlTemplateElement => Self::HtmlElement,
        })
    }

    /// Interface of a node, read from its internal data
    pub fn of_node(tree: &DomTree, id: NodeId) -> Option<Interface> {
        let node = tree.get(id)?;
        Some(match &node.data {
            NodeData::Document => Self::Document,
            NodeData::DocumentFragment => Self::DocumentFragment,
            NodeData::ShadowRoot { .. } => Self::ShadowRoot,
            NodeData::Doctype { .. } => Self::DocumentType,
            NodeData::Text(_) => Self::Text,
            NodeData::Comment(_) => Self::Comment,
            NodeData::ProcessingInstruction { .. } => Self::ProcessingInstruction,
            NodeData::Element(elem) => match elem.name.ns {
                Namespace::Html => match tree.resolve(elem.name.local) {
                    "iframe" => Self::HtmlIFrameElement,
                    "frame" => Self::HtmlFrameElement,
                    "object" => Self::HtmlObjectElement,
                    "embed" => Self::HtmlEmbedElement,
                    "template" => Self::HtmlTemplateElement,
                    _ => Self::HtmlElement,
                },
                Namespace::Svg => Self::SvgElement,
                Namespace::MathMl => Self::MathMlElement,
                Namespace::Other => Self::Element,
            },
        })
    }

    /// Interface of any object reference
    pub fn of_object(tree: &DomTree, obj: ObjectRef) -> Option<Interface> {
        match obj {
            ObjectRef::Node(id) => Self::of_node(tree, id),
            ObjectRef::Trusted(_) => Some(Self::TrustedHtml),
            ObjectRef::Array(_) => Some(Self::Array),
            ObjectRef::Plain(_) => Some(Self::Object),
            ObjectRef::Function(_) => Some(Self::Function),
        }
    }

    /// Whether `self` is `ancestor` or inherits from it
    pub fn inherits(self, ancestor: Interface) -> bool {
        let mut current = Some(self);
        while let Some(iface) = current {
            if iface == ancestor {
                return true;
            }
            current = iface.parent();
        }
        false
    }
}

//! Trust & type classifier
//!
//! Predicates over arbitrary guest values. Every answer comes from a vaulted
//! operation; a value's own methods and its `Symbol.toStringTag` are never
//! consulted. Without a captured vault every predicate answers negatively.

use frameguard_dom::NodeKind;
use frameguard_realm::{Realm, Value};

use crate::vault::{self, Vault, VaultOp};

/// Tag of trusted HTML wrappers
const TRUSTED_HTML_TAG: &str = "TrustedHTML";

/// Tags of frame-bearing elements
const FRAME_TAGS: &[&str] = &["HTMLIFrameElement", "HTMLFrameElement", "HTMLObjectElement", "HTMLEmbedElement"];

/// Ordered tag table for container selection; first match wins
const CONTAINER_TAGS: &[(&str, Container)] = &[
    ("HTMLDocument", Container::Document),
    ("Document", Container::Document),
    ("DocumentFragment", Container::Fragment),
    ("ShadowRoot", Container::Fragment),
];

/// Which subtree query applies to a container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Document,
    Fragment,
    Element,
}

impl Container {
    pub(crate) fn query_op(self) -> VaultOp {
        match self {
            Container::Document => VaultOp::DocumentQuery,
            Container::Fragment => VaultOp::FragmentQuery,
            Container::Element => VaultOp::ElementQuery,
        }
    }
}

/// Vault-backed classifier
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'v> {
    vault: Option<&'v Vault>,
}

impl<'v> Classifier<'v> {
    /// A classifier over `vault`; `None` makes every predicate fail closed
    pub fn new(vault: Option<&'v Vault>) -> Self {
        Self { vault }
    }

    /// A classifier over the process-wide vault
    pub fn global() -> Classifier<'static> {
        Classifier::new(vault::global().get())
    }

    pub(crate) fn vault(&self) -> Option<&'v Vault> {
        self.vault
    }

    /// Pristine type tag, e.g. `HTMLIFrameElement`
    pub fn tag(&self, realm: &mut Realm, value: &Value) -> Option<String> {
        let vault = self.vault?;
        let rendered = vault.invoke(VaultOp::ObjectToString, realm, value, &[]).ok()?;
        rendered
            .as_str()?
            .strip_prefix("[object ")?
            .strip_suffix(']')
            .map(str::to_string)
    }

    pub fn is_trusted_wrapper(&self, realm: &mut Realm, value: &Value) -> bool {
        value.is_object() && self.tag(realm, value).as_deref() == Some(TRUSTED_HTML_TAG)
    }

    /// Container class of `value`; unrecognized tags are generic elements
    pub fn classify_container(&self, realm: &mut Realm, value: &Value) -> Container {
        let Some(tag) = self.tag(realm, value) else {
            return Container::Element;
        };
        CONTAINER_TAGS
            .iter()
            .find(|(known, _)| *known == tag)
            .map_or(Container::Element, |(_, container)| *container)
    }

    /// Node kind is element, document or document fragment
    pub fn can_traverse(&self, realm: &mut Realm, value: &Value) -> bool {
        let Some(vault) = self.vault else {
            return false;
        };
        if !value.is_object() {
            return false;
        }
        match vault.invoke(VaultOp::NodeType, realm, value, &[]) {
            Ok(Value::Number(n)) => matches!(
                NodeKind::from_u16(n as u16),
                Some(NodeKind::Element | NodeKind::Document | NodeKind::DocumentFragment)
            ),
            _ => false,
        }
    }

    pub fn is_frame_bearing(&self, realm: &mut Realm, value: &Value) -> bool {
        if !value.is_object() {
            return false;
        }
        self.tag(realm, value).is_some_and(|tag| FRAME_TAGS.contains(&tag.as_str()))
    }
}

/// Whether `value` is a frame-bearing element, judged by the process-wide vault
pub fn is_frame_element(realm: &mut Realm, value: &Value) -> bool {
    Classifier::global().is_frame_bearing(realm, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use frameguard_dom::Document;
    use frameguard_realm::{PropertyKey, Slot};

    fn setup() -> (Realm, Vault) {
        let realm = Realm::top(Document::default());
        let vault = Vault::capture(&realm).unwrap();
        (realm, vault)
    }

    #[test]
    fn test_classify_containers() {
        let (mut realm, vault) = setup();
        let classifier = Classifier::new(Some(&vault));
        let doc = realm.document_value();
        let frag = Value::from(realm.tree_mut().create_fragment());
        let div = Value::from(realm.tree_mut().create_element("div"));

        assert_eq!(classifier.classify_container(&mut realm, &doc), Container::Document);
        assert_eq!(classifier.classify_container(&mut realm, &frag), Container::Fragment);
        assert_eq!(classifier.classify_container(&mut realm, &div), Container::Element);
        assert_eq!(classifier.classify_container(&mut realm, &Value::Null), Container::Element);
    }

    #[test]
    fn test_shadow_root_is_fragment() {
        let (mut realm, vault) = setup();
        let classifier = Classifier::new(Some(&vault));
        let tree = realm.tree_mut();
        let host = tree.create_element("div");
        let shadow = tree.attach_shadow(host, Default::default(), false).unwrap();

        let shadow = Value::from(shadow);
        assert_eq!(classifier.classify_container(&mut realm, &shadow), Container::Fragment);
        assert!(classifier.can_traverse(&mut realm, &shadow));
    }

    #[test]
    fn test_can_traverse() {
        let (mut realm, vault) = setup();
        let classifier = Classifier::new(Some(&vault));
        let text = Value::from(realm.tree_mut().create_text("x"));
        let comment = Value::from(realm.tree_mut().create_comment("x"));
        let trusted = realm.create_trusted_html("<p>");
        let doc = realm.document_value();

        assert!(classifier.can_traverse(&mut realm, &doc));
        assert!(!classifier.can_traverse(&mut realm, &text));
        assert!(!classifier.can_traverse(&mut realm, &comment));
        assert!(!classifier.can_traverse(&mut realm, &trusted));
        assert!(!classifier.can_traverse(&mut realm, &Value::from("iframe")));
    }

    #[test]
    fn test_tag_spoof_ignored() {
        let (mut realm, vault) = setup();
        let classifier = Classifier::new(Some(&vault));
        let iframe = Value::from(realm.tree_mut().create_element("iframe"));
        let div = Value::from(realm.tree_mut().create_element("div"));
        realm.define_own(&iframe, PropertyKey::ToStringTag, Slot::Data(Value::from("bypassResetOnload")));
        realm.define_own(&div, PropertyKey::ToStringTag, Slot::Data(Value::from("HTMLIFrameElement")));

        assert!(classifier.is_frame_bearing(&mut realm, &iframe));
        assert!(!classifier.is_frame_bearing(&mut realm, &div));
    }

    #[test]
    fn test_trusted_wrapper() {
        let (mut realm, vault) = setup();
        let classifier = Classifier::new(Some(&vault));
        let trusted = realm.create_trusted_html("<iframe></iframe>");
        let plain = realm.create_object();
        realm.define_own(&plain, PropertyKey::ToStringTag, Slot::Data(Value::from(TRUSTED_HTML_TAG)));

        assert!(classifier.is_trusted_wrapper(&mut realm, &trusted));
        assert!(!classifier.is_trusted_wrapper(&mut realm, &plain));
        assert!(!classifier.is_trusted_wrapper(&mut realm, &Value::from("TrustedHTML")));
    }

    #[test]
    fn test_without_vault_everything_fails_closed() {
        let (mut realm, _) = setup();
        let classifier = Classifier::new(None);
        let iframe = Value::from(realm.tree_mut().create_element("iframe"));
        let trusted = realm.create_trusted_html("");

        assert!(!classifier.is_frame_bearing(&mut realm, &iframe));
        assert!(!classifier.can_traverse(&mut realm, &iframe));
        assert!(!classifier.is_trusted_wrapper(&mut realm, &trusted));
        assert_eq!(classifier.classify_container(&mut realm, &iframe), Container::Element);
    }

    #[test]
    fn test_frame_kinds() {
        let (mut realm, vault) = setup();
        let classifier = Classifier::new(Some(&vault));
        for name in ["iframe", "frame", "object", "embed"] {
            let el = Value::from(realm.tree_mut().create_element(name));
            assert!(classifier.is_frame_bearing(&mut realm, &el), "{name}");
        }
        let svg = Value::from(
            realm
                .tree_mut()
                .create_element_ns(frameguard_dom::Namespace::Svg, "iframe"),
        );
        assert!(!classifier.is_frame_bearing(&mut realm, &svg));
    }
}

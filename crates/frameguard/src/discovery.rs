//! Frame discovery
//!
//! Finds the frame-bearing elements under a subtree root. The walk is a
//! single vaulted subtree query, so it stops at shadow roots and template
//! contents; `discover_in_shadows` covers the shadow trees separately.

use frameguard_dom::NodeId;
use frameguard_realm::{ObjectRef, Realm, TypeError, Value};

use crate::classify::Classifier;
use crate::vault::{Vault, VaultOp};

/// Selector matching every frame-bearing element
pub const FRAME_SELECTOR: &str = "iframe,frame,object,embed";

/// Frame-bearing elements of one discovery, in traversal order, each once
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameRegistry {
    frames: Vec<NodeId>,
}

impl FrameRegistry {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.frames.contains(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.frames.iter().copied()
    }

    pub fn as_slice(&self) -> &[NodeId] {
        &self.frames
    }

    pub fn into_vec(self) -> Vec<NodeId> {
        self.frames
    }
}

impl<'a> IntoIterator for &'a FrameRegistry {
    type Item = &'a NodeId;
    type IntoIter = std::slice::Iter<'a, NodeId>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

/// Frame-bearing elements under `root`, plus `root` itself when
/// `include_root` is set and it is frame-bearing. Never fails: anything that
/// cannot be traversed yields an empty registry.
pub fn discover(classifier: &Classifier<'_>, realm: &mut Realm, root: &Value, include_root: bool) -> FrameRegistry {
    let Some(vault) = classifier.vault() else {
        return FrameRegistry::default();
    };
    if !root.is_object() || classifier.is_trusted_wrapper(realm, root) || !classifier.can_traverse(realm, root) {
        return FrameRegistry::default();
    }

    let container = classifier.classify_container(realm, root);
    let include_root = include_root && classifier.is_frame_bearing(realm, root);
    match collect(vault, realm, root, container.query_op(), include_root) {
        Ok(registry) => {
            tracing::debug!(?container, frames = registry.len(), "discovery complete");
            registry
        }
        Err(err) => {
            tracing::debug!(?container, %err, "discovery failed closed");
            FrameRegistry::default()
        }
    }
}

fn collect(
    vault: &Vault,
    realm: &mut Realm,
    root: &Value,
    query: VaultOp,
    include_root: bool,
) -> Result<FrameRegistry, TypeError> {
    let found = vault.invoke(query, realm, root, &[Value::from(FRAME_SELECTOR)])?;
    let copy = vault.invoke(VaultOp::ArraySlice, realm, &found, &[])?;
    let iterated = vault.invoke(VaultOp::ArrayIterate, realm, &copy, &[])?;
    let candidates = array_contents(realm, &iterated)?;

    let frames = realm.new_array(Vec::new());
    let roots = include_root.then(|| root.clone());
    for candidate in candidates.into_iter().chain(roots) {
        insert_unique(vault, realm, &frames, candidate)?;
    }

    let frames = array_contents(realm, &frames)?
        .iter()
        .filter_map(Value::as_node)
        .collect();
    Ok(FrameRegistry { frames })
}

fn insert_unique(vault: &Vault, realm: &mut Realm, list: &Value, item: Value) -> Result<(), TypeError> {
    let present = vault.invoke(VaultOp::ArrayIncludes, realm, list, std::slice::from_ref(&item))?;
    if present != Value::Bool(true) {
        vault.invoke(VaultOp::ArrayPush, realm, list, &[item])?;
    }
    Ok(())
}

fn array_contents(realm: &Realm, array: &Value) -> Result<Vec<Value>, TypeError> {
    match array.as_object() {
        Some(ObjectRef::Array(id)) => realm
            .array_items(id)
            .map(<[Value]>::to_vec)
            .ok_or_else(|| TypeError("dangling array".to_string())),
        _ => Err(TypeError("query did not return an array".to_string())),
    }
}

/// Discovery inside every shadow root attached under `root`, nested shadows
/// included. Roots with no frames are omitted.
pub fn discover_in_shadows(classifier: &Classifier<'_>, realm: &mut Realm, root: NodeId) -> Vec<(NodeId, FrameRegistry)> {
    let shadows = realm.tree().shadow_roots_within(root);
    shadows
        .into_iter()
        .filter_map(|shadow| {
            let frames = discover(classifier, realm, &Value::from(shadow), false);
            (!frames.is_empty()).then_some((shadow, frames))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use frameguard_dom::Document;
    use frameguard_realm::{Interface, PropertyKey, Slot};

    fn setup() -> (Realm, Vault) {
        let realm = Realm::top(Document::default());
        let vault = Vault::capture(&realm).unwrap();
        (realm, vault)
    }

    fn append(realm: &mut Realm, parent: NodeId, name: &str) -> NodeId {
        let tree = realm.tree_mut();
        let id = tree.create_element(name);
        tree.append_child(parent, id).unwrap();
        id
    }

    #[test]
    fn test_discover_in_order() {
        let (mut realm, vault) = setup();
        let classifier = Classifier::new(Some(&vault));
        let body = realm.document().body();
        let div = append(&mut realm, body, "div");
        let a = append(&mut realm, div, "iframe");
        let b = append(&mut realm, body, "object");
        let c = append(&mut realm, body, "embed");

        let doc = realm.document_value();
        let frames = discover(&classifier, &mut realm, &doc, false);
        assert_eq!(frames.as_slice(), &[a, b, c]);
    }

    #[test]
    fn test_include_root() {
        let (mut realm, vault) = setup();
        let classifier = Classifier::new(Some(&vault));
        let body = realm.document().body();
        let outer = append(&mut realm, body, "object");
        let inner = append(&mut realm, outer, "embed");

        let root = Value::from(outer);
        assert_eq!(discover(&classifier, &mut realm, &root, false).as_slice(), &[inner]);
        assert_eq!(discover(&classifier, &mut realm, &root, true).as_slice(), &[inner, outer]);

        let body = Value::from(body);
        assert_eq!(
            discover(&classifier, &mut realm, &body, true),
            discover(&classifier, &mut realm, &body, false)
        );
    }

    #[test]
    fn test_shadow_boundary() {
        let (mut realm, vault) = setup();
        let classifier = Classifier::new(Some(&vault));
        let body = realm.document().body();
        let host = append(&mut realm, body, "div");
        let shadow = realm.tree_mut().attach_shadow(host, Default::default(), false).unwrap();
        let hidden = append(&mut realm, shadow, "iframe");

        let doc = realm.document_value();
        assert!(discover(&classifier, &mut realm, &doc, false).is_empty());

        let root = realm.tree().root();
        let found = discover_in_shadows(&classifier, &mut realm, root);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, shadow);
        assert_eq!(found[0].1.as_slice(), &[hidden]);
    }

    #[test]
    fn test_overridden_query_ignored() {
        let (mut realm, vault) = setup();
        let classifier = Classifier::new(Some(&vault));
        let body = realm.document().body();
        let iframe = append(&mut realm, body, "iframe");

        let empty = realm.create_function(|realm, _, _| Ok(realm.new_array(Vec::new())));
        for iface in [Interface::Document, Interface::DocumentFragment, Interface::Element] {
            realm.set_prototype_property(iface, "querySelectorAll", Slot::Data(empty.clone()));
        }
        realm.set_prototype_property(Interface::Array, "includes", Slot::Data(Value::Null));
        realm.set_prototype_property(Interface::Array, PropertyKey::Iterator, Slot::Data(Value::Null));

        let doc = realm.document_value();
        assert_eq!(discover(&classifier, &mut realm, &doc, false).as_slice(), &[iframe]);
    }

    #[test]
    fn test_untraversable_roots() {
        let (mut realm, vault) = setup();
        let classifier = Classifier::new(Some(&vault));
        let text = Value::from(realm.tree_mut().create_text("<iframe>"));
        let trusted = realm.create_trusted_html("<iframe></iframe>");

        for root in [Value::Null, Value::Undefined, Value::from(1.0), Value::from("iframe"), text, trusted] {
            assert!(discover(&classifier, &mut realm, &root, true).is_empty());
        }
    }

    #[test]
    fn test_insert_unique_keeps_first_occurrence() {
        let (mut realm, vault) = setup();
        let body = realm.document().body();
        let a = append(&mut realm, body, "iframe");
        let b = append(&mut realm, body, "embed");
        let c = append(&mut realm, body, "object");

        let list = realm.new_array(Vec::new());
        insert_unique(&vault, &mut realm, &list, Value::from(a)).unwrap();
        insert_unique(&vault, &mut realm, &list, Value::from(a)).unwrap();
        assert_eq!(array_contents(&realm, &list).unwrap(), vec![Value::from(a)]);

        let list = realm.new_array(Vec::new());
        for id in [a, b, a, c, b] {
            insert_unique(&vault, &mut realm, &list, Value::from(id)).unwrap();
        }
        let ids: Vec<NodeId> = array_contents(&realm, &list)
            .unwrap()
            .iter()
            .filter_map(Value::as_node)
            .collect();
        assert_eq!(ids, vec![a, b, c]);
    }
}

//! Realm
//!
//! One guest global: a document plus the objects and prototype tables guest
//! code can see. Everything here is reachable from guest code and therefore
//! writable by it; only the internal slots (`NodeData`, array storage,
//! trusted contents) are out of reach.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use frameguard_dom::{Document, DomTree, NodeId};

use crate::{
    ArrayId, FunctionId, Interface, NativeOp, ObjectRef, PlainId, PropertyKey, PropertyMap, RealmId, Slot,
    TrustedId, TypeError, Value,
};

/// Guest function body
pub type GuestFn = Rc<dyn Fn(&mut Realm, &Value, &[Value]) -> Result<Value, TypeError>>;

/// What a function object runs
#[derive(Clone)]
pub enum Callable {
    Native(NativeOp),
    Guest(GuestFn),
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Native(op) => write!(f, "Native({})", op.name()),
            Callable::Guest(_) => f.write_str("Guest"),
        }
    }
}

/// Elements exposed as named properties of their document
const NAMED_ON_DOCUMENT: &[&str] = &["embed", "form", "iframe", "img", "object"];

/// A guest realm
#[derive(Debug)]
pub struct Realm {
    id: RealmId,
    parent: Option<RealmId>,
    document: Document,
    prototypes: HashMap<Interface, PropertyMap>,
    own: HashMap<ObjectRef, PropertyMap>,
    functions: Vec<Callable>,
    arrays: Vec<Vec<Value>>,
    trusted: Vec<String>,
    plain: u32,
}

impl Realm {
    /// A top-level realm around `document`
    pub fn top(document: Document) -> Self {
        Self::new(RealmId::TOP, None, document)
    }

    pub(crate) fn new(id: RealmId, parent: Option<RealmId>, document: Document) -> Self {
        let mut realm = Self {
            id,
            parent,
            document,
            prototypes: HashMap::new(),
            own: HashMap::new(),
            functions: Vec::new(),
            arrays: Vec::new(),
            trusted: Vec::new(),
            plain: 0,
        };
        realm.install_intrinsics();
        realm
    }

    fn install_intrinsics(&mut self) {
        for iface in Interface::ALL {
            self.prototypes.insert(*iface, PropertyMap::new());
        }

        let methods: &[(Interface, PropertyKey, NativeOp)] = &[
            (Interface::Object, "toString".into(), NativeOp::ObjectToString),
            (Interface::Document, "querySelectorAll".into(), NativeOp::DocumentQuerySelectorAll),
            (Interface::DocumentFragment, "querySelectorAll".into(), NativeOp::FragmentQuerySelectorAll),
            (Interface::Element, "querySelectorAll".into(), NativeOp::ElementQuerySelectorAll),
            (Interface::Array, "slice".into(), NativeOp::ArraySlice),
            (Interface::Array, "includes".into(), NativeOp::ArrayIncludes),
            (Interface::Array, "push".into(), NativeOp::ArrayPush),
            (Interface::Array, "values".into(), NativeOp::ArrayValues),
            (Interface::Array, PropertyKey::Iterator, NativeOp::ArrayValues),
            (Interface::TrustedHtml, "toString".into(), NativeOp::TrustedHtmlToString),
        ];
        for (iface, key, op) in methods {
            let func = self.native_function(*op);
            self.set_prototype_property(*iface, key.clone(), Slot::Data(Value::Object(ObjectRef::Function(func))));
        }

        let node_type = self.native_function(NativeOp::NodeType);
        self.set_prototype_property(Interface::Node, "nodeType", Slot::Getter(node_type));
    }

    fn native_function(&mut self, op: NativeOp) -> FunctionId {
        let id = FunctionId(self.functions.len() as u32);
        self.functions.push(Callable::Native(op));
        id
    }

    #[inline]
    pub fn id(&self) -> RealmId {
        self.id
    }

    /// Realm that embeds this one
    #[inline]
    pub fn parent(&self) -> Option<RealmId> {
        self.parent
    }

    #[inline]
    pub fn is_top(&self) -> bool {
        self.parent.is_none()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn tree(&self) -> &DomTree {
        &self.document.tree
    }

    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.document.tree
    }

    /// The document node as a value
    pub fn document_value(&self) -> Value {
        Value::from(self.tree().root())
    }

    // === Object creation ===

    /// Create a `TrustedHTML` wrapper around `html`
    pub fn create_trusted_html(&mut self, html: &str) -> Value {
        let id = TrustedId(self.trusted.len() as u32);
        self.trusted.push(html.to_string());
        Value::Object(ObjectRef::Trusted(id))
    }

    pub fn new_array(&mut self, items: Vec<Value>) -> Value {
        let id = ArrayId(self.arrays.len() as u32);
        self.arrays.push(items);
        Value::Object(ObjectRef::Array(id))
    }

    /// Plain object with no internal slots
    pub fn create_object(&mut self) -> Value {
        let id = PlainId(self.plain);
        self.plain += 1;
        Value::Object(ObjectRef::Plain(id))
    }

    /// Wrap guest code in a function object
    pub fn create_function<F>(&mut self, body: F) -> Value
    where
        F: Fn(&mut Realm, &Value, &[Value]) -> Result<Value, TypeError> + 'static,
    {
        let id = FunctionId(self.functions.len() as u32);
        self.functions.push(Callable::Guest(Rc::new(body)));
        Value::Object(ObjectRef::Function(id))
    }

    // === Internal slots ===

    pub fn array_items(&self, id: ArrayId) -> Option<&[Value]> {
        self.arrays.get(id.index()).map(Vec::as_slice)
    }

    pub fn array_items_mut(&mut self, id: ArrayId) -> Option<&mut Vec<Value>> {
        self.arrays.get_mut(id.index())
    }

    pub fn trusted_contents(&self, id: TrustedId) -> Option<&str> {
        self.trusted.get(id.index()).map(String::as_str)
    }

    /// Brand of a live object; `None` for a dangling reference
    pub fn interface_of(&self, obj: ObjectRef) -> Option<Interface> {
        let live = match obj {
            ObjectRef::Node(id) => self.tree().get(id).is_some(),
            ObjectRef::Trusted(id) => id.index() < self.trusted.len(),
            ObjectRef::Array(id) => id.index() < self.arrays.len(),
            ObjectRef::Plain(id) => id.index() < self.plain as usize,
            ObjectRef::Function(id) => id.index() < self.functions.len(),
        };
        if live { Interface::of_object(self.tree(), obj) } else { None }
    }

    /// The native operation a function value runs, if any
    pub fn native_op_of(&self, func: &Value) -> Option<NativeOp> {
        match func.as_object()? {
            ObjectRef::Function(id) => match self.functions.get(id.index())? {
                Callable::Native(op) => Some(*op),
                Callable::Guest(_) => None,
            },
            _ => None,
        }
    }

    /// The native operation behind a slot: a method's function or a getter
    pub fn native_op_of_slot(&self, slot: &Slot) -> Option<NativeOp> {
        match slot {
            Slot::Data(value) => self.native_op_of(value),
            Slot::Getter(id) => self.native_op_of(&Value::Object(ObjectRef::Function(*id))),
        }
    }

    // === Properties ===

    /// Current slot of a prototype property
    pub fn prototype_slot(&self, iface: Interface, key: &PropertyKey) -> Option<&Slot> {
        self.prototypes.get(&iface)?.get(key)
    }

    /// Define or replace a prototype property
    pub fn set_prototype_property(&mut self, iface: Interface, key: impl Into<PropertyKey>, slot: Slot) {
        let key = key.into();
        tracing::trace!(?iface, ?key, "prototype property defined");
        self.prototypes.entry(iface).or_default().insert(key, slot);
    }

    /// Define an own property; primitives cannot carry one
    pub fn define_own(&mut self, target: &Value, key: impl Into<PropertyKey>, slot: Slot) -> bool {
        match target.as_object() {
            Some(obj) => {
                self.own.entry(obj).or_default().insert(key.into(), slot);
                true
            }
            None => false,
        }
    }

    /// Property lookup as guest code performs it: own properties first, then
    /// the prototype chain. Getters run.
    pub fn get(&mut self, target: &Value, key: &PropertyKey) -> Result<Value, TypeError> {
        if target.is_nullish() {
            return Err(TypeError(format!("Cannot read properties of {}", describe(target))));
        }
        let Some(obj) = target.as_object() else {
            return Ok(Value::Undefined);
        };

        let slot = self.lookup(obj, key).cloned();
        match slot {
            None => Ok(Value::Undefined),
            Some(Slot::Data(value)) => Ok(value),
            Some(Slot::Getter(id)) => self.call(&Value::Object(ObjectRef::Function(id)), target, &[]),
        }
    }

    fn lookup(&self, obj: ObjectRef, key: &PropertyKey) -> Option<&Slot> {
        if let Some(slot) = self.own.get(&obj).and_then(|props| props.get(key)) {
            return Some(slot);
        }
        let mut iface = self.interface_of(obj);
        while let Some(current) = iface {
            if let Some(slot) = self.prototype_slot(current, key) {
                return Some(slot);
            }
            iface = current.parent();
        }
        None
    }

    /// Call a function value
    pub fn call(&mut self, func: &Value, this: &Value, args: &[Value]) -> Result<Value, TypeError> {
        let callable = match func.as_object() {
            Some(ObjectRef::Function(id)) => self.functions.get(id.index()).cloned(),
            _ => None,
        };
        match callable {
            Some(Callable::Native(op)) => op.call(self, this, args),
            Some(Callable::Guest(body)) => body(self, this, args),
            None => Err(TypeError(format!("{} is not a function", describe(func)))),
        }
    }

    /// `this[name](...args)`
    pub fn call_method(&mut self, this: &Value, name: &str, args: &[Value]) -> Result<Value, TypeError> {
        let func = self.get(this, &PropertyKey::from(name))?;
        self.call(&func, this, args)
    }

    /// String conversion as guest code performs it. Objects go through their
    /// visible `toString`, so the result is whatever that method returns.
    pub fn to_display_string(&mut self, value: &Value) -> Result<String, TypeError> {
        if let Some(s) = value.primitive_to_string() {
            return Ok(s);
        }
        self.call_method(value, "toString", &[])?
            .primitive_to_string()
            .ok_or_else(|| TypeError("Cannot convert object to primitive value".to_string()))
    }

    /// Expose named elements as own properties of the document node, the way
    /// `<iframe name=x>` or `<form id=x>` become `document.x`. Returns how
    /// many properties were defined.
    pub fn expose_named_elements(&mut self) -> usize {
        let tree = self.tree();
        let named: Vec<(String, NodeId)> = tree
            .descendants(tree.root())
            .filter(|&id| tree.local_name(id).is_some_and(|name| NAMED_ON_DOCUMENT.contains(&name)))
            .flat_map(|id| {
                ["name", "id"]
                    .into_iter()
                    .filter_map(move |attr| tree.get_attribute(id, attr).map(|v| (v.to_string(), id)))
            })
            .filter(|(key, _)| !key.is_empty())
            .collect();

        let document = self.document_value();
        for (key, id) in &named {
            self.define_own(&document, key.as_str(), Slot::Data(Value::from(*id)));
        }
        tracing::debug!(count = named.len(), "named elements exposed");
        named.len()
    }
}

fn describe(value: &Value) -> String {
    value.primitive_to_string().unwrap_or_else(|| "object".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn realm() -> Realm {
        Realm::top(Document::default())
    }

    #[test]
    fn test_intrinsics_are_native() {
        let realm = realm();
        let slot = realm
            .prototype_slot(Interface::Element, &PropertyKey::from("querySelectorAll"))
            .unwrap();
        assert_eq!(realm.native_op_of_slot(slot), Some(NativeOp::ElementQuerySelectorAll));

        let getter = realm.prototype_slot(Interface::Node, &PropertyKey::from("nodeType")).unwrap();
        assert_eq!(realm.native_op_of_slot(getter), Some(NativeOp::NodeType));
    }

    #[test]
    fn test_get_runs_getter() {
        let mut realm = realm();
        let body = realm.document().body();
        let node_type = realm.get(&Value::from(body), &PropertyKey::from("nodeType")).unwrap();
        assert_eq!(node_type, Value::Number(1.0));

        let doc = realm.document_value();
        let node_type = realm.get(&doc, &PropertyKey::from("nodeType")).unwrap();
        assert_eq!(node_type, Value::Number(9.0));
    }

    #[test]
    fn test_get_on_nullish_fails() {
        let mut realm = realm();
        assert!(realm.get(&Value::Null, &PropertyKey::from("x")).is_err());
        assert_eq!(realm.get(&Value::from(1.0), &PropertyKey::from("x")).unwrap(), Value::Undefined);
    }

    #[test]
    fn test_overridden_to_string_is_visible() {
        let mut realm = realm();
        let trusted = realm.create_trusted_html("<iframe>");
        assert_eq!(realm.to_display_string(&trusted).unwrap(), "<iframe>");

        let fake = realm.create_function(|_, _, _| Ok(Value::from("<p>harmless</p>")));
        realm.define_own(&trusted, "toString", Slot::Data(fake));
        assert_eq!(realm.to_display_string(&trusted).unwrap(), "<p>harmless</p>");
    }

    #[test]
    fn test_call_non_function() {
        let mut realm = realm();
        let obj = realm.create_object();
        let err = realm.call(&obj, &Value::Undefined, &[]).unwrap_err();
        assert!(err.0.contains("not a function"));
    }

    #[test]
    fn test_guest_method_replaces_native() {
        let mut realm = realm();
        let empty = realm.create_function(|realm, _, _| Ok(realm.new_array(Vec::new())));
        realm.set_prototype_property(Interface::Element, "querySelectorAll", Slot::Data(empty.clone()));

        let slot = realm
            .prototype_slot(Interface::Element, &PropertyKey::from("querySelectorAll"))
            .cloned()
            .unwrap();
        assert_eq!(realm.native_op_of_slot(&slot), None);
    }

    #[test]
    fn test_expose_named_elements() {
        let mut realm = realm();
        let body = realm.document().body();
        let tree = realm.tree_mut();
        let form = tree.create_element("form");
        tree.set_attribute(form, "id", "querySelectorAll").unwrap();
        tree.append_child(body, form).unwrap();
        let div = tree.create_element("div");
        tree.set_attribute(div, "id", "ignored").unwrap();
        tree.append_child(body, div).unwrap();

        assert_eq!(realm.expose_named_elements(), 1);
        let doc = realm.document_value();
        let clobbered = realm.get(&doc, &PropertyKey::from("querySelectorAll")).unwrap();
        assert_eq!(clobbered, Value::from(form));
    }

    #[test]
    fn test_dangling_reference_has_no_interface() {
        let mut realm = realm();
        assert_eq!(realm.interface_of(ObjectRef::Array(ArrayId(7))), None);
        assert_eq!(realm.interface_of(ObjectRef::Node(NodeId::NONE)), None);
        assert_eq!(realm.interface_of(ObjectRef::Plain(PlainId(0))), None);

        let plain = realm.create_object();
        let Some(ObjectRef::Plain(id)) = plain.as_object() else {
            panic!("plain object expected");
        };
        assert_eq!(realm.interface_of(ObjectRef::Plain(id)), Some(Interface::Object));
        assert_eq!(realm.interface_of(ObjectRef::Plain(PlainId(1))), None);
    }
}

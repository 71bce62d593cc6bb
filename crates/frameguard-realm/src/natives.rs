//! Native operations
//!
//! The platform implementations behind the built-in prototype methods.
//! Each one checks the brand of its receiver and reads internal slots
//! directly; a foreign receiver is a `TypeError`, never a guess.

use frameguard_dom::SelectorList;

use crate::{Interface, ObjectRef, PropertyKey, Realm, TypeError, Value};

/// A built-in operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeOp {
    ObjectToString,
    NodeType,
    DocumentQuerySelectorAll,
    FragmentQuerySelectorAll,
    ElementQuerySelectorAll,
    ArraySlice,
    ArrayIncludes,
    ArrayPush,
    ArrayValues,
    TrustedHtmlToString,
}

impl NativeOp {
    /// Where the operation is installed, for diagnostics
    pub fn name(self) -> &'static str {
        match self {
            Self::ObjectToString => "Object.prototype.toString",
            Self::NodeType => "Node.prototype.nodeType",
            Self::DocumentQuerySelectorAll => "Document.prototype.querySelectorAll",
            Self::FragmentQuerySelectorAll => "DocumentFragment.prototype.querySelectorAll",
            Self::ElementQuerySelectorAll => "Element.prototype.querySelectorAll",
            Self::ArraySlice => "Array.prototype.slice",
            Self::ArrayIncludes => "Array.prototype.includes",
            Self::ArrayPush => "Array.prototype.push",
            Self::ArrayValues => "Array.prototype.values",
            Self::TrustedHtmlToString => "TrustedHTML.prototype.toString",
        }
    }

    /// Run with platform semantics: `Object.prototype.toString` honors a
    /// `Symbol.toStringTag` reachable from the receiver.
    pub fn call(self, realm: &mut Realm, this: &Value, args: &[Value]) -> Result<Value, TypeError> {
        if self == Self::ObjectToString {
            if let Value::Object(_) = this {
                if let Value::String(tag) = realm.get(this, &PropertyKey::ToStringTag)? {
                    return Ok(Value::String(format!("[object {tag}]")));
                }
            }
        }
        self.call_hardened(realm, this, args)
    }

    /// Run reading internal slots only. Never calls back into guest code.
    pub fn call_hardened(self, realm: &mut Realm, this: &Value, args: &[Value]) -> Result<Value, TypeError> {
        match self {
            Self::ObjectToString => Ok(Value::String(format!("[object {}]", brand_tag(realm, this)))),
            Self::NodeType => {
                let id = this.as_node().ok_or_else(|| illegal(self))?;
                let kind = realm.tree().kind(id).ok_or_else(|| illegal(self))?;
                Ok(Value::Number(f64::from(kind.as_u16())))
            }
            Self::DocumentQuerySelectorAll => query(realm, self, this, args, Interface::Document),
            Self::FragmentQuerySelectorAll => query(realm, self, this, args, Interface::DocumentFragment),
            Self::ElementQuerySelectorAll => query(realm, self, this, args, Interface::Element),
            Self::ArraySlice => {
                let items = array_of(realm, self, this)?;
                let len = items.len();
                let start = relative_index(args.first(), 0, len);
                let end = relative_index(args.get(1), len, len);
                let copy = if start < end { items[start..end].to_vec() } else { Vec::new() };
                Ok(realm.new_array(copy))
            }
            Self::ArrayIncludes => {
                let needle = args.first().cloned().unwrap_or_default();
                let items = array_of(realm, self, this)?;
                Ok(Value::Bool(items.iter().any(|v| v.same_value_zero(&needle))))
            }
            Self::ArrayPush => {
                let Some(ObjectRef::Array(id)) = this.as_object() else {
                    return Err(illegal(self));
                };
                let items = realm.array_items_mut(id).ok_or_else(|| illegal(self))?;
                items.extend_from_slice(args);
                Ok(Value::Number(items.len() as f64))
            }
            Self::ArrayValues => {
                let snapshot = array_of(realm, self, this)?.to_vec();
                Ok(realm.new_array(snapshot))
            }
            Self::TrustedHtmlToString => {
                let Some(ObjectRef::Trusted(id)) = this.as_object() else {
                    return Err(illegal(self));
                };
                let contents = realm.trusted_contents(id).ok_or_else(|| illegal(self))?;
                Ok(Value::String(contents.to_string()))
            }
        }
    }
}

/// Brand tag of any value, from internal slots
fn brand_tag(realm: &Realm, value: &Value) -> &'static str {
    match value {
        Value::Undefined => "Undefined",
        Value::Null => "Null",
        Value::Bool(_) => "Boolean",
        Value::Number(_) => "Number",
        Value::String(_) => "String",
        // A dangling reference has no brand; report the least specific one
        Value::Object(obj) => realm.interface_of(*obj).unwrap_or(Interface::Object).tag(),
    }
}

fn illegal(op: NativeOp) -> TypeError {
    TypeError(format!("Illegal invocation of {}", op.name()))
}

fn array_of<'a>(realm: &'a Realm, op: NativeOp, this: &Value) -> Result<&'a [Value], TypeError> {
    match this.as_object() {
        Some(ObjectRef::Array(id)) => realm.array_items(id).ok_or_else(|| illegal(op)),
        _ => Err(illegal(op)),
    }
}

fn relative_index(arg: Option<&Value>, default: usize, len: usize) -> usize {
    let n = match arg {
        Some(Value::Number(n)) if !n.is_nan() => n.trunc(),
        _ => return default,
    };
    if n < 0.0 {
        len.saturating_sub((-n) as usize)
    } else {
        (n as usize).min(len)
    }
}

fn query(
    realm: &mut Realm,
    op: NativeOp,
    this: &Value,
    args: &[Value],
    required: Interface,
) -> Result<Value, TypeError> {
    let id = this.as_node().ok_or_else(|| illegal(op))?;
    let iface = Interface::of_node(realm.tree(), id).ok_or_else(|| illegal(op))?;
    // Document.prototype's query accepts documents only, not every Node
    let branded = match required {
        Interface::Document => iface == Interface::Document,
        other => iface.inherits(other),
    };
    if !branded {
        return Err(illegal(op));
    }

    let source = args
        .first()
        .and_then(Value::primitive_to_string)
        .ok_or_else(|| TypeError("selector must be a primitive".to_string()))?;
    let selectors = SelectorList::parse(&source)
        .ok_or_else(|| TypeError(format!("SyntaxError: '{source}' is not a valid selector")))?;

    let found = realm
        .tree()
        .query_selector_all(id, &selectors)
        .into_vec()
        .into_iter()
        .map(Value::from)
        .collect();
    Ok(realm.new_array(found))
}

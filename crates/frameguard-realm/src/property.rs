//! Properties and slots

use std::collections::HashMap;

use crate::{FunctionId, Value};

/// Property key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    Named(String),
    /// `Symbol.toStringTag`
    ToStringTag,
    /// `Symbol.iterator`
    Iterator,
}

impl From<&str> for PropertyKey {
    fn from(name: &str) -> Self {
        PropertyKey::Named(name.to_string())
    }
}

impl From<String> for PropertyKey {
    fn from(name: String) -> Self {
        PropertyKey::Named(name)
    }
}

/// A property slot: a plain value or an accessor
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    Data(Value),
    Getter(FunctionId),
}

/// Own or prototype properties of one object
pub type PropertyMap = HashMap<PropertyKey, Slot>;

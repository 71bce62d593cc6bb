//! Hardened primitive vault
//!
//! Pristine references to the built-in operations the classifier relies on,
//! taken from a realm's prototype tables before guest code runs. After
//! capture nothing a guest does to those tables is observed here: `invoke`
//! runs the captured operation directly against the receiver, reading its
//! internal slots and ignoring its visible prototype chain.

use std::sync::OnceLock;

use frameguard_realm::{Interface, NativeOp, PropertyKey, Realm, TypeError, Value};

/// A vaulted operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VaultOp {
    ObjectToString,
    NodeType,
    DocumentQuery,
    FragmentQuery,
    ElementQuery,
    ArraySlice,
    ArrayIncludes,
    ArrayPush,
    ArrayIterate,
    TrustedHtmlToString,
}

impl VaultOp {
    pub const ALL: [VaultOp; 10] = [
        VaultOp::ObjectToString,
        VaultOp::NodeType,
        VaultOp::DocumentQuery,
        VaultOp::FragmentQuery,
        VaultOp::ElementQuery,
        VaultOp::ArraySlice,
        VaultOp::ArrayIncludes,
        VaultOp::ArrayPush,
        VaultOp::ArrayIterate,
        VaultOp::TrustedHtmlToString,
    ];

    /// Where the pristine operation is read from
    fn location(self) -> (Interface, PropertyKey) {
        let (iface, name) = match self {
            Self::ObjectToString => (Interface::Object, "toString"),
            Self::NodeType => (Interface::Node, "nodeType"),
            Self::DocumentQuery => (Interface::Document, "querySelectorAll"),
            Self::FragmentQuery => (Interface::DocumentFragment, "querySelectorAll"),
            Self::ElementQuery => (Interface::Element, "querySelectorAll"),
            Self::ArraySlice => (Interface::Array, "slice"),
            Self::ArrayIncludes => (Interface::Array, "includes"),
            Self::ArrayPush => (Interface::Array, "push"),
            Self::ArrayIterate => return (Interface::Array, PropertyKey::Iterator),
            Self::TrustedHtmlToString => (Interface::TrustedHtml, "toString"),
        };
        (iface, PropertyKey::from(name))
    }

    /// The native operation the slot must hold at capture time
    fn expected(self) -> NativeOp {
        match self {
            Self::ObjectToString => NativeOp::ObjectToString,
            Self::NodeType => NativeOp::NodeType,
            Self::DocumentQuery => NativeOp::DocumentQuerySelectorAll,
            Self::FragmentQuery => NativeOp::FragmentQuerySelectorAll,
            Self::ElementQuery => NativeOp::ElementQuerySelectorAll,
            Self::ArraySlice => NativeOp::ArraySlice,
            Self::ArrayIncludes => NativeOp::ArrayIncludes,
            Self::ArrayPush => NativeOp::ArrayPush,
            Self::ArrayIterate => NativeOp::ArrayValues,
            Self::TrustedHtmlToString => NativeOp::TrustedHtmlToString,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Vault capture errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaptureError {
    #[error("{0} was replaced before capture")]
    Tampered(&'static str),
    #[error("vault already captured")]
    AlreadyCaptured,
}

/// Captured operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vault {
    ops: [NativeOp; VaultOp::ALL.len()],
}

impl Vault {
    /// Read every vaulted operation from `realm`. Fails if any slot no
    /// longer holds its native operation.
    pub fn capture(realm: &Realm) -> Result<Self, CaptureError> {
        let mut ops = [NativeOp::ObjectToString; VaultOp::ALL.len()];
        for op in VaultOp::ALL {
            let (iface, key) = op.location();
            let expected = op.expected();
            match realm.prototype_slot(iface, &key).and_then(|slot| realm.native_op_of_slot(slot)) {
                Some(found) if found == expected => ops[op.index()] = found,
                _ => {
                    tracing::warn!(op = expected.name(), "vault capture found a replaced primitive");
                    return Err(CaptureError::Tampered(expected.name()));
                }
            }
        }
        Ok(Self { ops })
    }

    /// Apply a vaulted operation to an arbitrary receiver
    pub fn invoke(&self, op: VaultOp, realm: &mut Realm, receiver: &Value, args: &[Value]) -> Result<Value, TypeError> {
        self.ops[op.index()].call_hardened(realm, receiver, args)
    }
}

/// Write-once holder for the process-wide vault
#[derive(Debug, Default)]
pub struct VaultCell {
    inner: OnceLock<Vault>,
}

impl VaultCell {
    pub const fn new() -> Self {
        Self { inner: OnceLock::new() }
    }

    /// Capture from `realm` and store the result. Only the first successful
    /// capture is kept.
    pub fn capture(&self, realm: &Realm) -> Result<&Vault, CaptureError> {
        if self.inner.get().is_some() {
            return Err(CaptureError::AlreadyCaptured);
        }
        let vault = Vault::capture(realm)?;
        if self.inner.set(vault).is_err() {
            return Err(CaptureError::AlreadyCaptured);
        }
        tracing::info!(realm = realm.id().index(), ops = VaultOp::ALL.len(), "vault captured");
        self.inner.get().ok_or(CaptureError::AlreadyCaptured)
    }

    /// The vault, once captured
    pub fn get(&self) -> Option<&Vault> {
        self.inner.get()
    }

    pub fn is_captured(&self) -> bool {
        self.inner.get().is_some()
    }
}

static GLOBAL: VaultCell = VaultCell::new();

/// The process-wide vault
pub fn global() -> &'static VaultCell {
    &GLOBAL
}

//! frameguard realm - Guest object model
//!
//! Values, prototype tables and native operations as guest code sees them.
//! Guest code can replace any prototype slot or own property; brands and
//! other internal slots stay out of its reach.

mod interface;
mod natives;
mod property;
mod realm;
mod table;
mod value;

pub use interface::Interface;
pub use natives::NativeOp;
pub use property::{PropertyKey, PropertyMap, Slot};
pub use realm::{Callable, GuestFn, Realm};
pub use table::{RealmId, RealmTable};
pub use value::{ArrayId, FunctionId, ObjectRef, PlainId, TrustedId, Value};

/// Error thrown by a native operation or property access
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("TypeError: {0}")]
pub struct TypeError(pub String);

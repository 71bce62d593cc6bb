//! frameguard - In-page isolation layer
//!
//! Keeps code confined to a realm from reaching another realm through the
//! frames it can create. The pieces, leaf first:
//!
//! - [`vault`]: pristine built-in operations, captured before guest code runs
//! - [`classify`]: trust and type predicates over guest values
//! - [`discovery`]: the frame-bearing elements of a subtree
//! - [`guard`]: the markup sinks, checked before they mutate anything
//! - [`open`]: the realm opener hook, disabled

pub mod classify;
pub mod config;
pub mod discovery;
pub mod error;
pub mod guard;
pub mod messages;
pub mod open;
pub mod vault;

pub use classify::{Classifier, Container, is_frame_element};
pub use config::{ConfigError, EnforcementMode, GuardConfig};
pub use discovery::{FRAME_SELECTOR, FrameRegistry, discover, discover_in_shadows};
pub use error::{GuardError, MutationError};
pub use guard::{FrameGuard, MutationRequest, Sink, Verdict};
pub use messages::{ErrorKind, format_message};
pub use open::{OpenHook, OpenHookError, OpenPolicy, Opener, hook_open};
pub use vault::{CaptureError, Vault, VaultCell, VaultOp};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Open interception
//!
//! Replaces a realm's opener. While the policy is `Disabled` the hook
//! answers every call with no realm and neither the real opener nor the
//! callback ever runs.

use serde::{Deserialize, Serialize};

use frameguard_realm::{RealmId, Value};

/// Whether intercepted opens go through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpenPolicy {
    #[default]
    Disabled,
    /// Reserved; no behavior is defined for it
    Enabled,
}

/// The platform operation that opens a new top-level realm
pub trait Opener {
    fn open(&mut self, args: &[Value]) -> Option<RealmId>;
}

impl<F> Opener for F
where
    F: FnMut(&[Value]) -> Option<RealmId>,
{
    fn open(&mut self, args: &[Value]) -> Option<RealmId> {
        self(args)
    }
}

/// Open hook errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OpenHookError {
    #[error("open policy {0:?} is not supported")]
    Unsupported(OpenPolicy),
}

/// An installed open hook
pub struct OpenHook<O, F> {
    opener: O,
    on_opened: F,
    calls: usize,
}

impl<O, F> std::fmt::Debug for OpenHook<O, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenHook").field("calls", &self.calls).finish()
    }
}

impl<O, F> OpenHook<O, F>
where
    O: Opener,
    F: FnMut(RealmId),
{
    /// Hook `opener` under the default (disabled) policy
    pub fn new(opener: O, on_opened: F) -> Self {
        Self {
            opener,
            on_opened,
            calls: 0,
        }
    }

    /// Hook `opener` under an explicit policy; only `Disabled` is accepted
    pub fn with_policy(opener: O, on_opened: F, policy: OpenPolicy) -> Result<Self, OpenHookError> {
        match policy {
            OpenPolicy::Disabled => Ok(Self::new(opener, on_opened)),
            OpenPolicy::Enabled => Err(OpenHookError::Unsupported(policy)),
        }
    }

    /// The hooked opener
    pub fn open(&mut self, args: &[Value]) -> Option<RealmId> {
        self.calls += 1;
        tracing::debug!(args = args.len(), calls = self.calls, "open() intercepted and suppressed");
        None
    }

    /// How many opens were intercepted
    pub fn calls(&self) -> usize {
        self.calls
    }

    /// Remove the hook, giving back the real opener and the callback
    pub fn into_inner(self) -> (O, F) {
        (self.opener, self.on_opened)
    }
}

/// Install an open hook on `opener`
pub fn hook_open<O, F>(opener: O, on_opened: F) -> OpenHook<O, F>
where
    O: Opener,
    F: FnMut(RealmId),
{
    OpenHook::new(opener, on_opened)
}

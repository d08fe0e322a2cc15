use tracing::{debug, info};

/// Hook name the runtime registers with the page-transition library.
pub const CONTENT_REPLACE_HOOK: &str = "content:replace";
/// Event fired by older versions of the library after a transition.
pub const LEGACY_CONTENT_REPLACED_EVENT: &str = "swup:contentReplaced";
/// Event fired when the library attaches after the runtime started.
pub const HOOKS_ENABLED_EVENT: &str = "swup:enable";

/// `document.readyState` at start-up.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

/// External notifications the runtime reacts to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Signal {
    DomContentLoaded,
    ContentReplace,
    LegacyContentReplaced,
    HooksEnabled,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    WaitingForReady,
    Ready,
}

/// A page-transition library that may or may not expose a hook API.
pub trait HookSystem {
    fn has_hooks(&self) -> bool;
    /// Subscribes the runtime to the [`CONTENT_REPLACE_HOOK`].
    fn register_content_replace(&mut self);
}

/// What the caller should do after feeding the lifecycle an input.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    RunInit,
    Idle,
}

/// Decides when the init sequence runs: once at the first ready state and
/// again on every page transition.
#[derive(Debug)]
pub struct Lifecycle {
    state: LifecycleState,
    hooks_registered: bool,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            state: LifecycleState::Uninitialized,
            hooks_registered: false,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn hooks_registered(&self) -> bool {
        self.hooks_registered
    }

    /// `hooks` is `None` when the library is not on the page yet.
    pub fn start(&mut self, ready: ReadyState, hooks: Option<&mut dyn HookSystem>) -> Transition {
        if self.state != LifecycleState::Uninitialized {
            return Transition::Idle;
        }

        if let Some(hooks) = hooks {
            self.try_register(hooks);
        }

        if ready == ReadyState::Loading {
            self.state = LifecycleState::WaitingForReady;
            Transition::Idle
        } else {
            self.state = LifecycleState::Ready;
            Transition::RunInit
        }
    }

    pub fn signal(&mut self, signal: Signal, hooks: Option<&mut dyn HookSystem>) -> Transition {
        if self.state == LifecycleState::Uninitialized {
            debug!("Ignoring {signal:?} before start");
            return Transition::Idle;
        }

        match signal {
            Signal::DomContentLoaded => {
                if self.state == LifecycleState::WaitingForReady {
                    self.state = LifecycleState::Ready;
                    Transition::RunInit
                } else {
                    Transition::Idle
                }
            }
            Signal::ContentReplace if !self.hooks_registered => {
                debug!("Ignoring {CONTENT_REPLACE_HOOK} without a registered hook");
                Transition::Idle
            }
            // A transition re-runs init but leaves a pending first load in
            // place; DOMContentLoaded still fires afterwards.
            Signal::ContentReplace | Signal::LegacyContentReplaced => Transition::RunInit,
            Signal::HooksEnabled => {
                if let Some(hooks) = hooks {
                    self.try_register(hooks);
                }
                Transition::Idle
            }
        }
    }

    fn try_register(&mut self, hooks: &mut dyn HookSystem) {
        if self.hooks_registered || !hooks.has_hooks() {
            return;
        }
        hooks.register_content_replace();
        self.hooks_registered = true;
        info!("Registered {CONTENT_REPLACE_HOOK} hook.");
    }
}

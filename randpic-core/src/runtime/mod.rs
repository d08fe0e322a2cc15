//! Host-agnostic model of the random-picture runtime.
//!
//! The generated `random.js` runs this state machine in the browser. Here it
//! is owned by one [`RandomPicRuntime`] value: the page goes through
//! [`Document`], persisted preferences through [`PreferenceStore`], and image
//! probes are queued as [`ProbeRequest`]s that the host completes later.

use rand::Rng;
use tracing::{debug, error, info};

pub mod device;
pub mod dom;
pub mod lifecycle;
pub mod picker;
pub mod store;

pub use device::DeviceClass;
pub use dom::{BackgroundTarget, Document, Element, ElementId, ImageTag, StaticDocument};
pub use lifecycle::{HookSystem, Lifecycle, LifecycleState, ReadyState, Signal, Transition};
pub use picker::Picker;
pub use store::{MemoryStore, PreferenceStore, DISABLED_KEY};

use crate::category::Category;
use crate::manifest::RuntimeConfig;

pub const CONTAINER_ID: &str = "bg-box";
pub const THEME_CLASS: &str = "wp-theme-zibll";
pub const MARKER_ATTRIBUTE: &str = "data-random-bg";
pub const LOADED_CLASS: &str = "loaded";

/// Root custom properties switched to their transparent variants once the
/// container background is showing.
pub const TRANSPARENT_PROPERTIES: [(&str, &str); 2] = [
    ("--card-bg", "var(--card-bg-transparent)"),
    ("--float-panel-bg", "var(--float-panel-bg-transparent)"),
];

/// Which strategy queued a probe; decides the styles applied on load.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ProbeKind {
    Container,
    ThemedBody,
    Marked,
}

/// An image the host should load before the background is styled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProbeRequest {
    pub generation: u64,
    pub target: BackgroundTarget,
    pub kind: ProbeKind,
    pub url: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ProbeOutcome {
    Loaded,
    Failed,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BackgroundOutcome {
    /// Backgrounds are disabled; known targets were cleared.
    Cleared,
    /// This many probes were queued.
    Probing(usize),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied(BackgroundOutcome),
    /// Selections were dropped but nothing was drawn.
    Disabled,
}

pub struct RandomPicRuntime<S, R> {
    picker: Picker<R>,
    store: S,
    user_agent: String,
    disabled: bool,
    background_url: Option<String>,
    generation: u64,
    pending: Vec<ProbeRequest>,
    lifecycle: Lifecycle,
}

impl<S: PreferenceStore, R: Rng> RandomPicRuntime<S, R> {
    /// Reads the disabled preference from `store` once, as the script does on
    /// load.
    pub fn new(config: RuntimeConfig, store: S, rng: R, user_agent: &str) -> Self {
        let disabled = store::read_disabled(&store);
        Self {
            picker: Picker::new(config, rng),
            store,
            user_agent: user_agent.to_string(),
            disabled,
            background_url: None,
            generation: 0,
            pending: Vec::new(),
            lifecycle: Lifecycle::new(),
        }
    }

    pub fn pick(&mut self, category: Category) -> String {
        self.picker.pick(category)
    }

    pub fn pick_horizontal(&mut self) -> String {
        self.picker.pick(Category::Horizontal)
    }

    pub fn pick_vertical(&mut self) -> String {
        self.picker.pick(Category::Vertical)
    }

    pub fn pick_by_device(&mut self) -> String {
        self.picker.pick_by_device(&self.user_agent)
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn cached_selection(&self, category: Category) -> Option<&str> {
        self.picker.cached(category)
    }

    pub fn background_url(&self) -> Option<&str> {
        self.background_url.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    /// Probes of the current generation not yet handed to the host.
    pub fn take_probes(&mut self) -> Vec<ProbeRequest> {
        std::mem::take(&mut self.pending)
    }

    fn background(&mut self) -> String {
        if let Some(url) = &self.background_url {
            return url.clone();
        }
        let url = self.pick_by_device();
        if !url.is_empty() {
            self.background_url = Some(url.clone());
        }
        url
    }

    /// Starts a new generation. Queued probes from older generations could
    /// only ever be dropped, so they go now.
    fn next_generation(&mut self) {
        self.generation += 1;
        self.pending.clear();
    }

    fn queue(&mut self, target: BackgroundTarget, kind: ProbeKind, url: String) {
        self.pending.push(ProbeRequest {
            generation: self.generation,
            target,
            kind,
            url,
        });
    }

    /// Applies the page background using the first strategy that fits: the
    /// `#bg-box` container, then the themed body, then every element marked
    /// with `data-random-bg`. While disabled, clears instead and draws
    /// nothing.
    pub fn apply_background<D: Document + ?Sized>(&mut self, doc: &mut D) -> BackgroundOutcome {
        self.next_generation();
        let container = doc.element_by_id(CONTAINER_ID);
        let themed = doc.body_has_class(THEME_CLASS);

        if self.disabled {
            if let Some(id) = container {
                clear_background(doc, BackgroundTarget::Element(id));
            }
            if themed {
                clear_background(doc, BackgroundTarget::Body);
            }
            info!("[RandomPic] background disabled");
            return BackgroundOutcome::Cleared;
        }

        if let Some(id) = container {
            let url = self.background();
            if !url.is_empty() {
                self.queue(BackgroundTarget::Element(id), ProbeKind::Container, url);
            }
        } else if themed {
            let url = self.background();
            if !url.is_empty() {
                self.queue(BackgroundTarget::Body, ProbeKind::ThemedBody, url);
            }
        } else {
            for (id, value) in doc.elements_with_attribute(MARKER_ATTRIBUTE) {
                if Some(id) == container {
                    continue;
                }
                let Some(category) = Category::from_tag(&value) else {
                    continue;
                };
                let url = self.picker.pick(category);
                if !url.is_empty() {
                    self.queue(BackgroundTarget::Element(id), ProbeKind::Marked, url);
                }
            }
        }

        BackgroundOutcome::Probing(self.pending.len())
    }

    /// Finishes a probe. Returns whether styles were applied; results from
    /// an older generation are dropped.
    pub fn complete_probe<D: Document + ?Sized>(
        &mut self,
        doc: &mut D,
        probe: &ProbeRequest,
        outcome: ProbeOutcome,
    ) -> bool {
        if probe.generation != self.generation {
            debug!(
                "Dropping stale probe for {} (generation {} < {})",
                probe.url, probe.generation, self.generation
            );
            return false;
        }

        if outcome == ProbeOutcome::Failed {
            error!("Background image failed to load: {}", probe.url);
            return false;
        }

        let target = probe.target;
        match probe.kind {
            ProbeKind::Container => {
                doc.set_style(target, "background-image", &format!("url('{}')", probe.url));
                doc.add_class(target, LOADED_CLASS);
                for (name, value) in TRANSPARENT_PROPERTIES {
                    doc.set_root_property(name, value);
                }
            }
            ProbeKind::ThemedBody => {
                doc.set_style(target, "background-image", &format!("url('{}')", probe.url));
                doc.set_style(target, "background-position", "center top");
                doc.set_style(target, "background-repeat", "no-repeat");
                doc.set_style(target, "background-attachment", "fixed");
                doc.set_style(target, "background-size", "cover");
                doc.add_class(target, LOADED_CLASS);
            }
            ProbeKind::Marked => {
                doc.set_style(target, "background-image", &format!("url(\"{}\")", probe.url));
                doc.add_class(target, LOADED_CLASS);
            }
        }
        info!("Random background loaded: {}", probe.url);
        true
    }

    /// Points every `<img>` that asks for a random picture at the session
    /// selection. Returns how many were rewritten.
    pub fn apply_image_tags<D: Document + ?Sized>(&mut self, doc: &mut D) -> usize {
        let mut rewritten = 0;
        for img in doc.images() {
            let wants = |category: Category| {
                img.alt.as_deref() == Some(category.alt_sentinel())
                    || img
                        .src
                        .as_deref()
                        .is_some_and(|src| src.contains(category.src_marker()))
            };
            let category = if wants(Category::Horizontal) {
                Category::Horizontal
            } else if wants(Category::Vertical) {
                Category::Vertical
            } else {
                continue;
            };
            let url = self.picker.pick(category);
            doc.set_image_src(img.id, &url);
            rewritten += 1;
        }
        rewritten
    }

    /// Drops every session selection and redraws the background unless
    /// backgrounds are disabled.
    pub fn refresh<D: Document + ?Sized>(&mut self, doc: &mut D) -> RefreshOutcome {
        self.picker.clear();
        self.background_url = None;
        self.next_generation();

        if self.disabled {
            info!("[RandomPic] selection cleared, background is disabled");
            return RefreshOutcome::Disabled;
        }
        let outcome = self.apply_background(doc);
        info!("[RandomPic] background refreshed");
        RefreshOutcome::Applied(outcome)
    }

    /// Persists the preference, then re-applies (or clears) the background.
    pub fn set_disabled<D: Document + ?Sized>(
        &mut self,
        doc: &mut D,
        disabled: bool,
    ) -> BackgroundOutcome {
        self.disabled = disabled;
        store::write_disabled(&mut self.store, disabled);
        self.apply_background(doc)
    }

    /// Full init pass; safe to repeat after the DOM was swapped.
    pub fn init<D: Document + ?Sized>(&mut self, doc: &mut D) {
        self.apply_background(doc);
        self.apply_image_tags(doc);
    }

    pub fn start<D: Document + ?Sized>(
        &mut self,
        doc: &mut D,
        ready: ReadyState,
        hooks: Option<&mut dyn HookSystem>,
    ) {
        if self.lifecycle.start(ready, hooks) == Transition::RunInit {
            self.init(doc);
        }
    }

    pub fn handle_signal<D: Document + ?Sized>(
        &mut self,
        doc: &mut D,
        signal: Signal,
        hooks: Option<&mut dyn HookSystem>,
    ) {
        if self.lifecycle.signal(signal, hooks) == Transition::RunInit {
            self.init(doc);
        }
    }
}

fn clear_background<D: Document + ?Sized>(doc: &mut D, target: BackgroundTarget) {
    doc.set_style(target, "background-image", "none");
    doc.remove_class(target, LOADED_CLASS);
}

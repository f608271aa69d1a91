//! A drafting session: one document, one registry, and the timers that keep
//! them in step.
//!
//! The session is the only entry point for editor and panel events. It runs
//! inside the host's event loop: the host calls [`DraftingSession::on_transaction`]
//! after every document change and [`DraftingSession::tick`] from its timer.

use std::time::Instant;

use tracing::{debug, warn};

use crate::apply::{self, ApplyError, ApplySummary};
use crate::config::EngineConfig;
use crate::document::DocumentHost;
use crate::overlay::{self, DecorationSet, PointerTarget};
use crate::variables::{
    Debouncer, RegistryError, RegistrySnapshot, VariableDefinition, VariableRegistry,
};

/// Side effects the session asks of the variable panel.
pub trait UiBridge {
    fn scroll_into_view(&mut self, id: &str);
    fn focus_input(&mut self, id: &str);
}

/// Bridge for headless sessions.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopBridge;

impl UiBridge for NoopBridge {
    fn scroll_into_view(&mut self, _id: &str) {}
    fn focus_input(&mut self, _id: &str) {}
}

pub struct DraftingSession<H, U = NoopBridge> {
    host: H,
    ui: U,
    registry: VariableRegistry,
    rescan: Debouncer,
    decorations: DecorationSet,
}

impl<H: DocumentHost> DraftingSession<H, NoopBridge> {
    pub fn headless(host: H, config: &EngineConfig) -> Self {
        Self::new(host, NoopBridge, config)
    }
}

impl<H: DocumentHost, U: UiBridge> DraftingSession<H, U> {
    /// Start a session. The document is reconciled and decorated right away.
    pub fn new(host: H, ui: U, config: &EngineConfig) -> Self {
        let mut session = Self {
            host,
            ui,
            registry: VariableRegistry::new(config.highlight_pulse),
            rescan: Debouncer::new(config.rescan_debounce),
            decorations: DecorationSet::default(),
        };
        session.reconcile();
        session
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn registry(&self) -> &VariableRegistry {
        &self.registry
    }

    pub fn decorations(&self) -> &DecorationSet {
        &self.decorations
    }

    pub fn view(&self) -> RegistrySnapshot {
        self.registry.snapshot()
    }

    pub fn rescan_pending(&self) -> bool {
        self.rescan.is_pending()
    }

    /// The document changed: redecorate now, rescan once edits settle.
    pub fn on_transaction(&mut self, now: Instant) {
        self.redecorate();
        self.rescan.schedule(now);
    }

    /// Timer callback: runs a due rescan and expires the highlight pulse.
    pub fn tick(&mut self, now: Instant) {
        if self.rescan.fire(now) {
            self.reconcile();
        }
        self.registry.expire_pulse(now);
    }

    /// Run a pending rescan immediately.
    pub fn flush(&mut self) {
        if self.rescan.is_pending() {
            self.rescan.cancel();
            self.reconcile();
        }
    }

    pub fn register(&mut self, definition: VariableDefinition) -> Result<bool, RegistryError> {
        let added = self.registry.register(definition)?;
        if added {
            self.redecorate();
        }
        Ok(added)
    }

    pub fn set_value(&mut self, id: &str, value: impl Into<String>) -> Result<(), RegistryError> {
        self.registry.set_value(id, value)
    }

    pub fn open_editor(&mut self, id: &str) -> Result<(), RegistryError> {
        self.registry.open_editor(id)
    }

    pub fn close_editor(&mut self) {
        self.registry.close_editor();
    }

    pub fn clear_all(&mut self) {
        self.registry.clear_all();
    }

    /// Pointer event on the document. Only decorated targets are handled:
    /// the variable opens for editing, pulses, and the panel scrolls to and
    /// focuses its input. Returns whether the event was consumed.
    pub fn click(&mut self, target: &PointerTarget, now: Instant) -> bool {
        let Some(id) = overlay::routed_id(target).map(ToOwned::to_owned) else {
            return false;
        };

        // The decoration may predate the rescan that registers its id.
        if !self.registry.contains(&id) {
            self.flush();
        }

        if let Err(e) = self.registry.open_editor(&id) {
            debug!(error = %e, "click on a placeholder with no variable");
            return false;
        }
        if let Err(e) = self.registry.pulse(&id, now) {
            debug!(error = %e, "cannot pulse variable");
        }
        self.ui.scroll_into_view(&id);
        self.ui.focus_input(&id);
        true
    }

    /// Apply every value to the document.
    ///
    /// On failure the document, values and definitions are left as they
    /// were, so the user can retry.
    pub fn apply_all(&mut self) -> Result<ApplySummary, ApplyError> {
        match apply::apply_to_host(&mut self.host, &self.registry) {
            Ok(summary) => {
                self.reconcile();
                Ok(summary)
            }
            Err(e) => {
                warn!(error = %e, "apply all failed");
                Err(e)
            }
        }
    }

    /// Put a bare `{{id}}` back at the cursor.
    pub fn insert_placeholder(&mut self, id: &str, now: Instant) -> Result<(), ApplyError> {
        apply::insert_placeholder(&mut self.host, id)?;
        self.on_transaction(now);
        Ok(())
    }

    /// Reconcile the registry with the document and push migrated markup
    /// back. A rejected push leaves the document as it was; the next pass
    /// tries again.
    fn reconcile(&mut self) {
        let markup = self.host.markup();
        let rec = self.registry.record_content_change(&markup);

        if let Some(ref normalized) = rec.normalized
            && let Err(e) = self.host.replace_content(normalized)
        {
            warn!(error = %e, "could not write migrated placeholders back");
        }

        self.redecorate();
    }

    fn redecorate(&mut self) {
        self.decorations = overlay::decorate(&self.host, &self.registry);
        self.host.set_decorations(&self.decorations);
    }
}

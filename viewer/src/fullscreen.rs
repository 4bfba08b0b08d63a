//! Presentation mode and keyboard dismissal.
//!
//! ARCHITECTURE
//! ============
//! [`KeyBus`] stands in for the window-level key event target shared by every
//! viewer on a page. A [`KeyListener`] is a RAII registration on that bus:
//! the fullscreen controller holds one only while fullscreen is active, and
//! dropping it (on exit or teardown) detaches it, so no viewer keeps
//! receiving keys after it has left fullscreen.

#[cfg(test)]
#[path = "fullscreen_test.rs"]
mod fullscreen_test;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;

use crate::config::SurfaceBounds;
use crate::input::Key;
use crate::sink::GraphicId;
use crate::viewport::ViewportController;

/// Which surface is showing the diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PresentationMode {
    #[default]
    Inline,
    Fullscreen,
}

// =============================================================================
// KEY BUS
// =============================================================================

#[derive(Debug, Default)]
struct Listeners {
    next_id: u64,
    senders: HashMap<u64, mpsc::UnboundedSender<Key>>,
}

/// Global key event target. Cheap to clone; clones share listeners.
#[derive(Debug, Clone, Default)]
pub struct KeyBus {
    inner: Arc<Mutex<Listeners>>,
}

impl KeyBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. It receives every key dispatched until dropped.
    #[must_use]
    pub fn attach(&self) -> KeyListener {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut listeners = self.lock();
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.senders.insert(id, tx);
        tracing::debug!(listener = id, "key listener attached");
        KeyListener { id, rx, bus: self.clone() }
    }

    /// Deliver `key` to every attached listener. Returns how many received it.
    pub fn dispatch(&self, key: &Key) -> usize {
        let listeners = self.lock();
        listeners.senders.values().filter(|tx| tx.send(key.clone()).is_ok()).count()
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.lock().senders.len()
    }

    fn detach(&self, id: u64) {
        if self.lock().senders.remove(&id).is_some() {
            tracing::debug!(listener = id, "key listener detached");
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Listeners> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A live registration on a [`KeyBus`]; detaches on drop.
#[derive(Debug)]
pub struct KeyListener {
    id: u64,
    rx: mpsc::UnboundedReceiver<Key>,
    bus: KeyBus,
}

impl KeyListener {
    /// Take every key received since the last drain.
    pub fn drain(&mut self) -> Vec<Key> {
        let mut keys = Vec::new();
        while let Ok(key) = self.rx.try_recv() {
            keys.push(key);
        }
        keys
    }
}

impl Drop for KeyListener {
    fn drop(&mut self) {
        self.bus.detach(self.id);
    }
}

// =============================================================================
// CONTROLLER
// =============================================================================

/// Callback told about every presentation change, so the host can coordinate
/// overlay stacking and scroll locking.
pub type ModeCallback = Box<dyn FnMut(PresentationMode) + Send>;

/// Owns the presentation mode and the fullscreen surface's viewport.
pub struct FullscreenController {
    mode: PresentationMode,
    bounds: SurfaceBounds,
    dismiss_key: Key,
    bus: KeyBus,
    overlay: Option<ViewportController>,
    listener: Option<KeyListener>,
    on_change: Option<ModeCallback>,
}

impl FullscreenController {
    #[must_use]
    pub fn new(bus: KeyBus, bounds: SurfaceBounds, dismiss_key: Key) -> Self {
        Self { mode: PresentationMode::Inline, bounds, dismiss_key, bus, overlay: None, listener: None, on_change: None }
    }

    /// Install the host callback fired on enter and exit.
    pub fn set_on_change(&mut self, callback: ModeCallback) {
        self.on_change = Some(callback);
    }

    #[must_use]
    pub fn mode(&self) -> PresentationMode {
        self.mode
    }

    #[must_use]
    pub fn is_fullscreen(&self) -> bool {
        self.mode == PresentationMode::Fullscreen
    }

    /// The fullscreen surface's viewport, present only while fullscreen.
    #[must_use]
    pub fn overlay(&self) -> Option<&ViewportController> {
        self.overlay.as_ref()
    }

    pub fn overlay_mut(&mut self) -> Option<&mut ViewportController> {
        self.overlay.as_mut()
    }

    /// Whether this controller currently listens for the dismissal key.
    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.listener.is_some()
    }

    /// Enter fullscreen with a fresh viewport bound to `graphic`.
    ///
    /// Returns `false` when already fullscreen.
    pub fn enter(&mut self, graphic: Option<GraphicId>) -> bool {
        if self.is_fullscreen() {
            return false;
        }
        let mut overlay = ViewportController::new(self.bounds);
        if let Some(graphic) = graphic {
            overlay.bind(graphic);
        }
        self.overlay = Some(overlay);
        self.listener = Some(self.bus.attach());
        self.set_mode(PresentationMode::Fullscreen);
        true
    }

    /// Leave fullscreen, discarding the overlay viewport.
    ///
    /// Returns `false` when already inline.
    pub fn exit(&mut self) -> bool {
        if !self.is_fullscreen() {
            return false;
        }
        self.overlay = None;
        self.listener = None;
        self.set_mode(PresentationMode::Inline);
        true
    }

    pub fn toggle(&mut self, graphic: Option<GraphicId>) -> bool {
        if self.is_fullscreen() {
            self.exit()
        } else {
            self.enter(graphic)
        }
    }

    /// Handle one key from the listener. Returns whether it dismissed fullscreen.
    pub fn handle_key(&mut self, key: &Key) -> bool {
        if *key != self.dismiss_key {
            return false;
        }
        self.exit()
    }

    /// Process keys queued on the listener since the last call.
    ///
    /// Returns whether any of them dismissed fullscreen.
    pub fn pump_keys(&mut self) -> bool {
        let keys = match self.listener.as_mut() {
            Some(listener) => listener.drain(),
            None => return false,
        };
        let mut dismissed = false;
        for key in &keys {
            dismissed |= self.handle_key(key);
        }
        dismissed
    }

    /// Forward a new graphic to the overlay viewport, if one is mounted.
    pub fn bind(&mut self, graphic: GraphicId) -> bool {
        self.overlay.as_mut().is_some_and(|overlay| overlay.bind(graphic))
    }

    fn set_mode(&mut self, mode: PresentationMode) {
        self.mode = mode;
        tracing::info!(?mode, "presentation mode changed");
        if let Some(callback) = self.on_change.as_mut() {
            callback(mode);
        }
    }
}

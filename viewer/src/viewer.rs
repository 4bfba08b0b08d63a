use std::sync::Arc;

use rand::Rng;
use tokio::sync::watch;

use crate::config::ViewerConfig;
use crate::consts::{VIEWER_ID_PREFIX, VIEWER_ID_SUFFIX_LEN};
use crate::engine::DiagramEngine;
use crate::fullscreen::{FullscreenController, KeyBus, ModeCallback, PresentationMode};
use crate::input::{Modifiers, WheelDelta};
use crate::pipeline::{RenderPipeline, RenderResult, RenderState, RenderTicket};
use crate::sink::{GraphicId, RenderSink};
use crate::toolbar::{ToolbarCommand, ToolbarView};
use crate::transform::{Point, ViewTransform};
use crate::viewport::{SurfaceStyle, ViewportController};

#[cfg(test)]
#[path = "viewer_test.rs"]
mod viewer_test;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Title of the panel shown in place of a failed diagram.
pub const ERROR_PANEL_TITLE: &str = "Diagram Rendering Error";

/// Placeholder text while the first render is pending.
pub const LOADING_TEXT: &str = "Rendering Diagram...";

/// Generate a per-viewer engine id, e.g. `mermaid-k3x9q0a7b`.
#[must_use]
pub fn generate_viewer_id() -> String {
    let mut rng = rand::rng();
    let suffix: String =
        (0..VIEWER_ID_SUFFIX_LEN).map(|_| char::from(BASE36[rng.random_range(0..BASE36.len())])).collect();
    format!("{VIEWER_ID_PREFIX}{suffix}")
}

/// Side effects returned from viewer handlers for the host to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Suppress the browser default (text selection, page zoom).
    PreventDefault,
    /// Transform, style, or surface changed; repaint.
    RenderNeeded,
    /// Presentation mode flipped.
    ModeChanged(PresentationMode),
}

/// Failure panel contents. The source is shown verbatim for debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorPanel {
    pub title: &'static str,
    pub message: String,
    pub code: &'static str,
    pub source: String,
}

/// What the host should display for this viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerSurface {
    /// Nothing rendered yet.
    Loading,
    Error(ErrorPanel),
    /// The mounted graphic with its transform and toolbar.
    Interactive { mode: PresentationMode, style: SurfaceStyle, toolbar: ToolbarView },
}

/// One embeddable diagram viewer: pipeline, inline viewport, fullscreen
/// controller, and the sink the markup is mounted into.
///
/// All handlers are synchronous. Async render results are picked up by
/// [`DiagramViewer::sync`] (call once per frame) or [`DiagramViewer::settle`].
pub struct DiagramViewer<S: RenderSink> {
    pipeline: RenderPipeline,
    updates: watch::Receiver<RenderState>,
    current: RenderState,
    inline: ViewportController,
    fullscreen: FullscreenController,
    sink: S,
    mounted: Option<GraphicId>,
    fullscreen_enabled: bool,
}

impl<S: RenderSink> DiagramViewer<S> {
    #[must_use]
    pub fn new(engine: Option<Arc<dyn DiagramEngine>>, sink: S, bus: KeyBus, config: &ViewerConfig) -> Self {
        Self::with_id(generate_viewer_id(), engine, sink, bus, config)
    }

    #[must_use]
    pub fn with_id(
        id: impl Into<Arc<str>>,
        engine: Option<Arc<dyn DiagramEngine>>,
        sink: S,
        bus: KeyBus,
        config: &ViewerConfig,
    ) -> Self {
        let pipeline = RenderPipeline::from_config(id, engine, config);
        let mut updates = pipeline.subscribe();
        let current = updates.borrow_and_update().clone();
        Self {
            pipeline,
            updates,
            current,
            inline: ViewportController::new(config.inline),
            fullscreen: FullscreenController::new(bus, config.fullscreen, config.dismiss_key.clone()),
            sink,
            mounted: None,
            fullscreen_enabled: config.fullscreen_enabled,
        }
    }

    /// Install the host callback told about fullscreen enter/exit.
    pub fn set_on_fullscreen_change(&mut self, callback: ModeCallback) {
        self.fullscreen.set_on_change(callback);
    }

    // --- Data inputs ---

    /// Replace the diagram text and start rendering it.
    pub fn set_source(&mut self, text: impl Into<String>) -> RenderTicket {
        let ticket = self.pipeline.submit(text);
        self.sync();
        ticket
    }

    /// Apply queued key events and any newly published render state.
    pub fn sync(&mut self) -> Vec<Action> {
        let mut actions = self.pump_keys();
        if self.updates.has_changed().unwrap_or(false) {
            let state = self.updates.borrow_and_update().clone();
            self.apply_state(state, &mut actions);
        }
        actions
    }

    /// Wait for the current source to finish rendering, then apply it.
    pub async fn settle(&mut self) -> Vec<Action> {
        if self.pipeline.revision() == 0 {
            return Vec::new();
        }
        let settled = self.updates.wait_for(|state| !state.result.is_pending()).await.map(|state| state.clone());
        let mut actions = Vec::new();
        match settled {
            Ok(state) => self.apply_state(state, &mut actions),
            Err(error) => tracing::warn!(id = self.pipeline.id(), %error, "render state channel closed"),
        }
        actions
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, pointer: Point) -> Vec<Action> {
        let mut actions = self.pump_keys();
        if let Some(viewport) = self.active_mut() {
            viewport.begin_drag(pointer);
            actions.extend([Action::PreventDefault, Action::RenderNeeded]);
        }
        actions
    }

    pub fn on_pointer_move(&mut self, pointer: Point) -> Vec<Action> {
        let mut actions = self.pump_keys();
        if self.active_mut().is_some_and(|viewport| viewport.continue_drag(pointer)) {
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    pub fn on_pointer_up(&mut self) -> Vec<Action> {
        self.end_drag()
    }

    /// Pointer left the surface; ends the drag so it cannot stick.
    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        self.end_drag()
    }

    pub fn on_wheel(&mut self, delta: WheelDelta, modifiers: Modifiers) -> Vec<Action> {
        let mut actions = self.pump_keys();
        if self.active_mut().is_some_and(|viewport| viewport.wheel_zoom(delta, modifiers)) {
            actions.extend([Action::PreventDefault, Action::RenderNeeded]);
        }
        actions
    }

    /// Apply a toolbar click.
    pub fn command(&mut self, command: ToolbarCommand) -> Vec<Action> {
        let mut actions = self.pump_keys();
        match command {
            ToolbarCommand::EnterFullscreen => actions.extend(self.enter_fullscreen()),
            ToolbarCommand::ExitFullscreen => actions.extend(self.exit_fullscreen()),
            ToolbarCommand::ZoomIn | ToolbarCommand::ZoomOut | ToolbarCommand::Reset => {
                if let Some(viewport) = self.active_mut() {
                    match command {
                        ToolbarCommand::ZoomIn => viewport.zoom_in(),
                        ToolbarCommand::ZoomOut => viewport.zoom_out(),
                        _ => viewport.reset(),
                    }
                    actions.push(Action::RenderNeeded);
                }
            }
        }
        actions
    }

    pub fn enter_fullscreen(&mut self) -> Vec<Action> {
        let mut actions = self.pump_keys();
        if !self.fullscreen_enabled || self.mounted.is_none() {
            return actions;
        }
        if self.fullscreen.enter(self.mounted) {
            self.after_mode_change(PresentationMode::Fullscreen, &mut actions);
        }
        actions
    }

    pub fn exit_fullscreen(&mut self) -> Vec<Action> {
        let mut actions = self.pump_keys();
        if self.fullscreen.exit() {
            self.after_mode_change(PresentationMode::Inline, &mut actions);
        }
        actions
    }

    // --- Queries ---

    #[must_use]
    pub fn id(&self) -> &str {
        self.pipeline.id()
    }

    #[must_use]
    pub fn mode(&self) -> PresentationMode {
        self.fullscreen.mode()
    }

    /// Last render state applied by `sync`/`settle`.
    #[must_use]
    pub fn render_state(&self) -> &RenderState {
        &self.current
    }

    /// Transform of the surface currently receiving input.
    #[must_use]
    pub fn transform(&self) -> ViewTransform {
        self.active().transform()
    }

    #[must_use]
    pub fn inline(&self) -> &ViewportController {
        &self.inline
    }

    #[must_use]
    pub fn fullscreen(&self) -> &FullscreenController {
        &self.fullscreen
    }

    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    #[must_use]
    pub fn toolbar(&self) -> ToolbarView {
        ToolbarView::present(&self.transform(), self.mode(), self.fullscreen_enabled)
    }

    #[must_use]
    pub fn surface(&self) -> ViewerSurface {
        if let RenderResult::Failed(error) = &self.current.result {
            return ViewerSurface::Error(ErrorPanel {
                title: ERROR_PANEL_TITLE,
                message: error.to_string(),
                code: error.error_code(),
                source: self.current.source.text.to_string(),
            });
        }
        if self.mounted.is_none() {
            return ViewerSurface::Loading;
        }
        ViewerSurface::Interactive { mode: self.mode(), style: self.active().surface_style(), toolbar: self.toolbar() }
    }

    // --- Internals ---

    fn active(&self) -> &ViewportController {
        self.fullscreen.overlay().unwrap_or(&self.inline)
    }

    fn active_mut(&mut self) -> Option<&mut ViewportController> {
        if self.mounted.is_none() {
            return None;
        }
        match self.fullscreen.overlay_mut() {
            Some(overlay) => Some(overlay),
            None => Some(&mut self.inline),
        }
    }

    /// Apply dismissal keys queued since the last event, ahead of the event
    /// being handled.
    fn pump_keys(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.fullscreen.pump_keys() {
            self.after_mode_change(PresentationMode::Inline, &mut actions);
        }
        actions
    }

    fn end_drag(&mut self) -> Vec<Action> {
        let mut actions = self.pump_keys();
        if let Some(viewport) = self.active_mut().filter(|viewport| viewport.is_dragging()) {
            viewport.end_drag();
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    fn after_mode_change(&mut self, mode: PresentationMode, actions: &mut Vec<Action>) {
        self.inline.reset();
        actions.push(Action::ModeChanged(mode));
        actions.push(Action::RenderNeeded);
    }

    /// Pending keeps the previous graphic on screen; Failed replaces it with
    /// the error panel and leaves fullscreen.
    fn apply_state(&mut self, state: RenderState, actions: &mut Vec<Action>) {
        match &state.result {
            RenderResult::Ready(markup) => {
                let graphic = markup.graphic_id();
                if self.mounted != Some(graphic) {
                    self.sink.mount(markup);
                    self.mounted = Some(graphic);
                }
                self.inline.bind(graphic);
                self.fullscreen.bind(graphic);
            }
            RenderResult::Failed(error) => {
                tracing::debug!(id = self.pipeline.id(), code = error.error_code(), "showing render error");
                if self.mounted.take().is_some() {
                    self.sink.unmount();
                }
                self.inline.unbind();
                if self.fullscreen.exit() {
                    self.after_mode_change(PresentationMode::Inline, actions);
                }
            }
            RenderResult::Pending => {}
        }
        self.current = state;
        actions.push(Action::RenderNeeded);
    }
}

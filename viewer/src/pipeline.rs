//! Render pipeline: diagram text in, published render state out.
//!
//! DESIGN
//! ======
//! State is published on a `tokio::sync::watch` channel so any number of
//! dependents can observe transitions. Every submit bumps a revision and
//! replaces the published source wholesale; each spawned render carries the
//! revision it was issued for and only writes its result back while that
//! revision is still current.
//!
//! TRADE-OFFS
//! ==========
//! Superseded renders are not aborted. Their results are dropped on arrival,
//! which keeps engines free of cancellation concerns at the cost of letting
//! abandoned work run to completion.

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod pipeline_test;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::ViewerConfig;
use crate::engine::{DiagramEngine, EngineConfig, EngineError};
use crate::error::RenderError;
use crate::sink::TrustedMarkup;

/// Diagram text plus the identity it is rendered under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramSource {
    /// Viewer instance id; namespaces the engine's caches.
    pub id: Arc<str>,
    pub text: Arc<str>,
    /// Monotonic per pipeline; `0` means nothing has been submitted.
    pub revision: u64,
}

/// Outcome of the render attempt for the current source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderResult {
    Pending,
    Ready(TrustedMarkup),
    Failed(RenderError),
}

impl RenderResult {
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    #[must_use]
    pub fn markup(&self) -> Option<&TrustedMarkup> {
        match self {
            Self::Ready(markup) => Some(markup),
            Self::Pending | Self::Failed(_) => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&RenderError> {
        match self {
            Self::Failed(err) => Some(err),
            Self::Pending | Self::Ready(_) => None,
        }
    }
}

/// What the pipeline publishes: the current source and its result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderState {
    pub source: DiagramSource,
    pub result: RenderResult,
}

/// Handle to one submitted render.
#[derive(Debug)]
pub struct RenderTicket {
    revision: u64,
    task: Option<JoinHandle<()>>,
}

impl RenderTicket {
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Wait until this render has resolved, whether or not its result was kept.
    pub async fn settled(self) {
        if let Some(task) = self.task {
            if let Err(error) = task.await {
                tracing::warn!(revision = self.revision, %error, "render task did not complete");
            }
        }
    }
}

/// Drives one viewer's render lifecycle against an injected engine.
pub struct RenderPipeline {
    id: Arc<str>,
    engine: Option<Arc<dyn DiagramEngine>>,
    engine_config: EngineConfig,
    timeout: Option<Duration>,
    initialized: bool,
    revision: u64,
    state: Arc<watch::Sender<RenderState>>,
}

impl RenderPipeline {
    #[must_use]
    pub fn new(
        id: impl Into<Arc<str>>,
        engine: Option<Arc<dyn DiagramEngine>>,
        engine_config: EngineConfig,
        timeout: Option<Duration>,
    ) -> Self {
        let id = id.into();
        let initial = RenderState {
            source: DiagramSource { id: Arc::clone(&id), text: Arc::from(""), revision: 0 },
            result: RenderResult::Pending,
        };
        let (state, _) = watch::channel(initial);
        Self { id, engine, engine_config, timeout, initialized: false, revision: 0, state: Arc::new(state) }
    }

    #[must_use]
    pub fn from_config(id: impl Into<Arc<str>>, engine: Option<Arc<dyn DiagramEngine>>, config: &ViewerConfig) -> Self {
        Self::new(id, engine, config.engine.clone(), config.render_timeout)
    }

    /// Begin rendering `text`, superseding any render in flight.
    ///
    /// An unavailable engine fails the source immediately and spawns nothing.
    /// Otherwise the render runs on a spawned task, so this must be called
    /// from within a Tokio runtime.
    pub fn submit(&mut self, text: impl Into<String>) -> RenderTicket {
        self.revision += 1;
        let revision = self.revision;
        let source = DiagramSource { id: Arc::clone(&self.id), text: Arc::from(text.into()), revision };

        let Some(engine) = self.engine.as_ref().filter(|e| e.is_available()).map(Arc::clone) else {
            tracing::warn!(id = %self.id, revision, "diagram engine not available");
            self.replace(source, RenderResult::Failed(RenderError::EngineUnavailable));
            return RenderTicket { revision, task: None };
        };

        self.ensure_initialized(engine.as_ref());
        self.replace(source.clone(), RenderResult::Pending);
        tracing::debug!(id = %self.id, revision, "diagram render submitted");

        let task = tokio::spawn(render_and_publish(engine, source, self.timeout, Arc::clone(&self.state)));
        RenderTicket { revision, task: Some(task) }
    }

    /// Snapshot of the published state.
    #[must_use]
    pub fn state(&self) -> RenderState {
        self.state.borrow().clone()
    }

    /// Observe state transitions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<RenderState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Revision of the most recently submitted source.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn replace(&self, source: DiagramSource, result: RenderResult) {
        self.state.send_modify(|state| *state = RenderState { source, result });
    }

    fn ensure_initialized(&mut self, engine: &dyn DiagramEngine) {
        if self.initialized {
            return;
        }
        self.initialized = true;
        if let Err(error) = engine.initialize(&self.engine_config) {
            tracing::debug!(id = %self.id, %error, "engine initialization rejected; continuing");
        }
    }
}

async fn render_and_publish(
    engine: Arc<dyn DiagramEngine>,
    source: DiagramSource,
    timeout: Option<Duration>,
    state: Arc<watch::Sender<RenderState>>,
) {
    let render = engine.render(&source.id, &source.text);
    let result = match timeout {
        Some(limit) => match tokio::time::timeout(limit, render).await {
            Ok(outcome) => settle(outcome, &source),
            Err(_elapsed) => {
                tracing::warn!(id = %source.id, revision = source.revision, secs = limit.as_secs(), "diagram render timed out");
                RenderResult::Failed(RenderError::Timeout { secs: limit.as_secs() })
            }
        },
        None => settle(render.await, &source),
    };
    publish(&state, source.revision, result);
}

fn settle(outcome: Result<TrustedMarkup, EngineError>, source: &DiagramSource) -> RenderResult {
    match outcome {
        Ok(markup) => {
            tracing::debug!(id = %source.id, revision = source.revision, bytes = markup.as_str().len(), "diagram rendered");
            RenderResult::Ready(markup)
        }
        Err(error) => {
            tracing::error!(id = %source.id, revision = source.revision, %error, "diagram render error");
            RenderResult::Failed(error.into())
        }
    }
}

/// Write `result` back only if `revision` is still the current, pending source.
fn publish(state: &watch::Sender<RenderState>, revision: u64, result: RenderResult) -> bool {
    state.send_if_modified(|current| {
        if current.source.revision != revision || !current.result.is_pending() {
            tracing::debug!(revision, current = current.source.revision, "discarding stale render result");
            return false;
        }
        current.result = result;
        true
    })
}

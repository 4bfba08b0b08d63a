use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::oneshot;

use super::*;

type Outcome = Result<TrustedMarkup, EngineError>;

/// Engine whose renders resolve only when the test releases them.
///
/// Texts without a gate render immediately to `<svg>{text}</svg>`.
#[derive(Default)]
struct GatedEngine {
    gates: Mutex<HashMap<String, oneshot::Receiver<Outcome>>>,
    inits: AtomicUsize,
    renders: Mutex<Vec<(String, String)>>,
}

impl GatedEngine {
    fn gate(&self, text: &str) -> oneshot::Sender<Outcome> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(text.to_owned(), rx);
        tx
    }

    fn render_calls(&self) -> Vec<(String, String)> {
        self.renders.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl DiagramEngine for GatedEngine {
    fn initialize(&self, _config: &EngineConfig) -> Result<(), EngineError> {
        if self.inits.fetch_add(1, Ordering::SeqCst) > 0 {
            return Err(EngineError::Init("already initialized".into()));
        }
        Ok(())
    }

    async fn render(&self, id: &str, text: &str) -> Result<TrustedMarkup, EngineError> {
        self.renders.lock().unwrap().push((id.to_owned(), text.to_owned()));
        let gate = self.gates.lock().unwrap().remove(text);
        match gate {
            Some(rx) => rx.await.unwrap_or_else(|_| Err(EngineError::Other("gate dropped".into()))),
            None => Ok(TrustedMarkup::new(format!("<svg>{text}</svg>"))),
        }
    }
}

struct UnloadedEngine;

#[async_trait::async_trait]
impl DiagramEngine for UnloadedEngine {
    fn is_available(&self) -> bool {
        false
    }

    fn initialize(&self, _config: &EngineConfig) -> Result<(), EngineError> {
        panic!("unloaded engine must not be initialized");
    }

    async fn render(&self, _id: &str, _text: &str) -> Result<TrustedMarkup, EngineError> {
        panic!("unloaded engine must not render");
    }
}

fn pipeline_with(engine: &Arc<GatedEngine>) -> RenderPipeline {
    let engine: Arc<dyn DiagramEngine> = engine.clone();
    RenderPipeline::new("mermaid-test", Some(engine), EngineConfig::default(), Some(Duration::from_secs(10)))
}

fn svg(text: &str) -> TrustedMarkup {
    TrustedMarkup::new(format!("<svg>{text}</svg>"))
}

// =============================================================
// Initial state
// =============================================================

#[test]
fn initial_state_is_pending_with_empty_source() {
    let pipeline = RenderPipeline::new("mermaid-a", None, EngineConfig::default(), None);
    let state = pipeline.state();
    assert_eq!(state.result, RenderResult::Pending);
    assert_eq!(state.source.revision, 0);
    assert_eq!(&*state.source.text, "");
    assert_eq!(pipeline.id(), "mermaid-a");
}

// =============================================================
// Engine availability
// =============================================================

#[tokio::test]
async fn missing_engine_fails_immediately() {
    let mut pipeline = RenderPipeline::new("mermaid-a", None, EngineConfig::default(), None);
    let ticket = pipeline.submit("graph TD; A-->B");

    // No await needed: the failure is published synchronously.
    let state = pipeline.state();
    assert_eq!(state.result, RenderResult::Failed(RenderError::EngineUnavailable));
    assert_eq!(&*state.source.text, "graph TD; A-->B");
    ticket.settled().await;
}

#[tokio::test]
async fn unloaded_engine_is_never_invoked() {
    let engine: Arc<dyn DiagramEngine> = Arc::new(UnloadedEngine);
    let mut pipeline = RenderPipeline::new("mermaid-a", Some(engine), EngineConfig::default(), None);
    pipeline.submit("graph TD; A-->B").settled().await;
    assert_eq!(pipeline.state().result.error(), Some(&RenderError::EngineUnavailable));
}

// =============================================================
// Success and failure
// =============================================================

#[tokio::test]
async fn successful_render_publishes_ready() {
    let engine = Arc::new(GatedEngine::default());
    let mut pipeline = pipeline_with(&engine);

    let ticket = pipeline.submit("graph TD; A-->B");
    assert!(pipeline.state().result.is_pending());
    ticket.settled().await;

    assert_eq!(pipeline.state().result.markup(), Some(&svg("graph TD; A-->B")));
    assert_eq!(engine.render_calls(), vec![("mermaid-test".to_owned(), "graph TD; A-->B".to_owned())]);
}

#[tokio::test]
async fn rejected_render_publishes_diagnostic() {
    let engine = Arc::new(GatedEngine::default());
    let mut pipeline = pipeline_with(&engine);
    let gate = engine.gate("graph TD; A-->");

    let ticket = pipeline.submit("graph TD; A-->");
    gate.send(Err(EngineError::Rejected { diagnostic: "Parse error on line 1".into() })).unwrap();
    ticket.settled().await;

    assert_eq!(
        pipeline.state().result,
        RenderResult::Failed(RenderError::Syntax { message: "Parse error on line 1".into() })
    );
}

#[tokio::test]
async fn opaque_failure_publishes_generic_message() {
    let engine = Arc::new(GatedEngine::default());
    let mut pipeline = pipeline_with(&engine);
    let gate = engine.gate("x");

    let ticket = pipeline.submit("x");
    gate.send(Err(EngineError::Other("boom".into()))).unwrap();
    ticket.settled().await;

    let state = pipeline.state();
    assert_eq!(state.result, RenderResult::Failed(RenderError::Unknown));
    assert_eq!(state.result.error().unwrap().to_string(), "Syntax error in diagram definition");
}

// =============================================================
// Race rule
// =============================================================

#[tokio::test]
async fn late_result_for_superseded_source_is_discarded() {
    let engine = Arc::new(GatedEngine::default());
    let mut pipeline = pipeline_with(&engine);
    let gate_a = engine.gate("A");
    let gate_b = engine.gate("B");

    let ticket_a = pipeline.submit("A");
    let ticket_b = pipeline.submit("B");

    gate_b.send(Ok(svg("B"))).unwrap();
    ticket_b.settled().await;
    gate_a.send(Ok(svg("A"))).unwrap();
    ticket_a.settled().await;

    let state = pipeline.state();
    assert_eq!(&*state.source.text, "B");
    assert_eq!(state.result.markup(), Some(&svg("B")));
}

#[tokio::test]
async fn early_result_for_superseded_source_is_discarded() {
    let engine = Arc::new(GatedEngine::default());
    let mut pipeline = pipeline_with(&engine);
    let gate_a = engine.gate("A");
    let gate_b = engine.gate("B");

    let ticket_a = pipeline.submit("A");
    let ticket_b = pipeline.submit("B");

    gate_a.send(Err(EngineError::Rejected { diagnostic: "bad A".into() })).unwrap();
    ticket_a.settled().await;
    assert!(pipeline.state().result.is_pending());

    gate_b.send(Ok(svg("B"))).unwrap();
    ticket_b.settled().await;
    assert_eq!(pipeline.state().result.markup(), Some(&svg("B")));
}

#[tokio::test]
async fn resubmitting_same_text_starts_a_new_revision() {
    let engine = Arc::new(GatedEngine::default());
    let mut pipeline = pipeline_with(&engine);

    let first = pipeline.submit("A");
    let second = pipeline.submit("A");
    assert_eq!(first.revision() + 1, second.revision());
    first.settled().await;
    second.settled().await;

    assert_eq!(pipeline.state().source.revision, 2);
    assert_eq!(pipeline.revision(), 2);
}

#[test]
fn publish_rejects_non_current_revision() {
    let pipeline = RenderPipeline::new("mermaid-a", None, EngineConfig::default(), None);
    assert!(!publish(&pipeline.state, 7, RenderResult::Ready(svg("stale"))));
    assert!(publish(&pipeline.state, 0, RenderResult::Ready(svg("current"))));
    // A second result for the same revision never overwrites the first.
    assert!(!publish(&pipeline.state, 0, RenderResult::Failed(RenderError::Unknown)));
    assert_eq!(pipeline.state().result.markup(), Some(&svg("current")));
}

// =============================================================
// Initialization
// =============================================================

#[tokio::test]
async fn engine_initialized_once_per_pipeline() {
    let engine = Arc::new(GatedEngine::default());
    let mut pipeline = pipeline_with(&engine);

    pipeline.submit("A").settled().await;
    pipeline.submit("B").settled().await;

    assert_eq!(engine.inits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn rejected_reinitialization_is_swallowed() {
    let engine = Arc::new(GatedEngine::default());
    let mut first = pipeline_with(&engine);
    let mut second = pipeline_with(&engine);

    first.submit("A").settled().await;
    second.submit("B").settled().await;

    assert_eq!(engine.inits.load(Ordering::SeqCst), 2);
    assert_eq!(second.state().result.markup(), Some(&svg("B")));
}

// =============================================================
// Timeout
// =============================================================

#[tokio::test(start_paused = true)]
async fn stuck_render_times_out() {
    let engine = Arc::new(GatedEngine::default());
    let mut pipeline = pipeline_with(&engine);
    let _held_open = engine.gate("slow");

    pipeline.submit("slow").settled().await;

    assert_eq!(pipeline.state().result, RenderResult::Failed(RenderError::Timeout { secs: 10 }));
}

#[tokio::test]
async fn no_timeout_waits_for_engine() {
    let engine = Arc::new(GatedEngine::default());
    let dyn_engine: Arc<dyn DiagramEngine> = engine.clone();
    let mut pipeline = RenderPipeline::new("mermaid-a", Some(dyn_engine), EngineConfig::default(), None);
    let gate = engine.gate("slow");

    let ticket = pipeline.submit("slow");
    tokio::task::yield_now().await;
    assert!(pipeline.state().result.is_pending());

    gate.send(Ok(svg("slow"))).unwrap();
    ticket.settled().await;
    assert!(pipeline.state().result.markup().is_some());
}

// =============================================================
// Subscription
// =============================================================

#[tokio::test]
async fn subscribers_observe_transitions() {
    let engine = Arc::new(GatedEngine::default());
    let mut pipeline = pipeline_with(&engine);
    let mut rx = pipeline.subscribe();

    let ticket = pipeline.submit("A");
    assert!(rx.has_changed().unwrap());
    assert!(rx.borrow_and_update().result.is_pending());

    ticket.settled().await;
    assert!(rx.has_changed().unwrap());
    assert!(rx.borrow_and_update().result.markup().is_some());
}

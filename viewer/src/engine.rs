//! Injected rendering capability.
//!
//! DESIGN
//! ======
//! The engine is passed into the pipeline as `Arc<dyn DiagramEngine>` rather
//! than reached through a global, so independent pipelines can run against
//! stubs. An absent engine is modelled as `None` at construction or as
//! `is_available() == false`; both fail every submit permanently.

use serde::Serialize;

use crate::sink::TrustedMarkup;

/// Errors reported by a rendering engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The engine is not loaded.
    #[error("engine not available")]
    Unavailable,

    /// The engine rejected the diagram text. `diagnostic` may be empty.
    #[error("diagram rejected: {diagnostic}")]
    Rejected { diagnostic: String },

    /// The engine refused (re-)initialization.
    #[error("engine initialization failed: {0}")]
    Init(String),

    /// Any other failure; the detail is logged, never shown.
    #[error("engine failure: {0}")]
    Other(String),
}

/// Fixed theme and security configuration passed to the engine once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    pub start_on_load: bool,
    pub theme: String,
    pub security_level: String,
    pub font_family: String,
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            start_on_load: false,
            theme: "neutral".to_owned(),
            security_level: "loose".to_owned(),
            font_family: "Inter, sans-serif".to_owned(),
            log_level: "error".to_owned(),
        }
    }
}

/// A diagram rendering engine.
#[async_trait::async_trait]
pub trait DiagramEngine: Send + Sync {
    /// Whether the engine can be invoked at all.
    fn is_available(&self) -> bool {
        true
    }

    /// Apply global configuration. May fail when already initialized.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Init`] when the engine rejects the call.
    fn initialize(&self, config: &EngineConfig) -> Result<(), EngineError>;

    /// Render `text` to vector markup. `id` namespaces the engine's caches.
    async fn render(&self, id: &str, text: &str) -> Result<TrustedMarkup, EngineError>;
}

//! Trusted markup and the sink that mounts it.
//!
//! Engine output is mounted verbatim. The trust boundary is the
//! [`TrustedMarkup`] constructor: only engine adapters create one, and a
//! [`RenderSink`] never receives anything else. Hardened hosts can wrap their
//! sink to sanitize before mounting.

use std::hash::{DefaultHasher, Hash, Hasher};

/// Identity of a mounted graphic, derived from its markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GraphicId(u64);

/// Vector markup produced by a rendering engine and vouched for by its adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustedMarkup(String);

impl TrustedMarkup {
    /// Wrap engine output. The caller asserts the markup is safe to mount.
    #[must_use]
    pub fn new(markup: impl Into<String>) -> Self {
        Self(markup.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Content identity; equal markup yields equal ids.
    #[must_use]
    pub fn graphic_id(&self) -> GraphicId {
        let mut hasher = DefaultHasher::new();
        self.0.hash(&mut hasher);
        GraphicId(hasher.finish())
    }
}

/// Mounts trusted markup onto a display surface.
pub trait RenderSink {
    /// Replace whatever is mounted with `markup`.
    fn mount(&mut self, markup: &TrustedMarkup);

    /// Remove the mounted graphic, if any.
    fn unmount(&mut self);
}

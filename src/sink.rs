//! Render sink that mounts markup by writing it to a file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use viewer::sink::{RenderSink, TrustedMarkup};

/// Writes the mounted SVG to `path`; unmounting removes the file.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    mounted: bool,
}

impl FileSink {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path, mounted: false }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }
}

impl RenderSink for FileSink {
    fn mount(&mut self, markup: &TrustedMarkup) {
        match std::fs::write(&self.path, markup.as_str()) {
            Ok(()) => {
                self.mounted = true;
                tracing::info!(path = %self.path.display(), bytes = markup.as_str().len(), "diagram mounted");
            }
            Err(error) => {
                self.mounted = false;
                tracing::error!(path = %self.path.display(), %error, "failed to write diagram");
            }
        }
    }

    fn unmount(&mut self) {
        self.mounted = false;
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::info!(path = %self.path.display(), "diagram unmounted"),
            Err(error) if error.kind() == ErrorKind::NotFound => {}
            Err(error) => tracing::warn!(path = %self.path.display(), %error, "failed to remove diagram"),
        }
    }
}

#[cfg(test)]
#[path = "sink_test.rs"]
mod tests;

//! Rendering engine backed by the Mermaid CLI (`mmdc`).
//!
//! Each render writes the diagram to a scratch file, runs `mmdc` against it,
//! and reads the SVG back. Scratch names carry the viewer id, a hash of the
//! text, and a per-call nonce, so overlapping renders never share files.

use std::hash::{DefaultHasher, Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tokio::process::Command;
use viewer::engine::{DiagramEngine, EngineConfig, EngineError};
use viewer::sink::TrustedMarkup;

const CONFIG_FILE_NAME: &str = "mermaid-config.json";

/// `mmdc` subprocess engine.
#[derive(Debug)]
pub struct MermaidCli {
    program: PathBuf,
    work_dir: PathBuf,
    available: bool,
    config_file: OnceLock<PathBuf>,
}

impl MermaidCli {
    /// Probe `program --version` to decide availability.
    pub async fn probe(program: PathBuf, work_dir: PathBuf) -> Self {
        let available = match Command::new(&program).arg("--version").output().await {
            Ok(output) if output.status.success() => {
                let version = String::from_utf8_lossy(&output.stdout);
                tracing::info!(program = %program.display(), version = version.trim(), "mermaid cli found");
                true
            }
            Ok(output) => {
                tracing::warn!(program = %program.display(), status = %output.status, "mermaid cli probe failed");
                false
            }
            Err(error) => {
                tracing::warn!(program = %program.display(), %error, "mermaid cli not found");
                false
            }
        };
        Self { program, work_dir, available, config_file: OnceLock::new() }
    }

    /// Extension-less scratch path unique to one render call.
    fn scratch_stem(&self, id: &str, text: &str) -> PathBuf {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let nonce: u32 = rand::random();
        self.work_dir.join(format!("{id}-{:016x}-{nonce:08x}", hasher.finish()))
    }
}

#[async_trait::async_trait]
impl DiagramEngine for MermaidCli {
    fn is_available(&self) -> bool {
        self.available
    }

    fn initialize(&self, config: &EngineConfig) -> Result<(), EngineError> {
        if self.config_file.get().is_some() {
            return Err(EngineError::Init("already initialized".into()));
        }
        let json = serde_json::to_vec_pretty(config).map_err(|e| EngineError::Init(e.to_string()))?;
        std::fs::create_dir_all(&self.work_dir).map_err(|e| EngineError::Init(e.to_string()))?;
        let path = self.work_dir.join(CONFIG_FILE_NAME);
        std::fs::write(&path, json).map_err(|e| EngineError::Init(e.to_string()))?;
        self.config_file.set(path).map_err(|_| EngineError::Init("already initialized".into()))
    }

    async fn render(&self, id: &str, text: &str) -> Result<TrustedMarkup, EngineError> {
        tokio::fs::create_dir_all(&self.work_dir).await.map_err(io_error)?;
        let stem = self.scratch_stem(id, text);
        let input = stem.with_extension("mmd");
        let output = stem.with_extension("svg");
        tokio::fs::write(&input, text).await.map_err(io_error)?;

        let mut command = Command::new(&self.program);
        command.arg("--quiet").arg("--input").arg(&input).arg("--output").arg(&output);
        if let Some(config) = self.config_file.get() {
            command.arg("--configFile").arg(config);
        }
        let result = command.output().await;
        remove_scratch(&input).await;
        let result = result.map_err(io_error)?;

        if !result.status.success() {
            remove_scratch(&output).await;
            return Err(EngineError::Rejected { diagnostic: diagnostic_from(&result.stderr) });
        }

        let svg = tokio::fs::read_to_string(&output).await.map_err(io_error)?;
        remove_scratch(&output).await;
        Ok(TrustedMarkup::new(svg))
    }
}

fn io_error(error: std::io::Error) -> EngineError {
    EngineError::Other(error.to_string())
}

async fn remove_scratch(path: &Path) {
    if let Err(error) = tokio::fs::remove_file(path).await {
        tracing::debug!(path = %path.display(), %error, "scratch file not removed");
    }
}

/// Reduce `mmdc` stderr to the user-facing message, dropping the JS stack.
pub(crate) fn diagnostic_from(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    text.lines()
        .take_while(|line| !line.trim_start().starts_with("at "))
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
#[path = "mmdc_test.rs"]
mod tests;

use super::*;

#[test]
fn diagnostic_drops_stack_frames() {
    let stderr = b"\nError: Parse error on line 2:\n...A-->\n-----^\nExpecting 'NODE_STRING', got 'EOF'\n    at Parser.parseError (mermaid.js:1:2)\n    at render (mermaid.js:3:4)\n";
    assert_eq!(
        diagnostic_from(stderr),
        "Error: Parse error on line 2:\n...A-->\n-----^\nExpecting 'NODE_STRING', got 'EOF'"
    );
}

#[test]
fn diagnostic_empty_for_silent_failure() {
    assert_eq!(diagnostic_from(b""), "");
    assert_eq!(diagnostic_from(b"   at somewhere\n"), "");
}

#[tokio::test]
async fn missing_program_is_unavailable() {
    let dir = std::env::temp_dir().join("docview-test-missing");
    let engine = MermaidCli::probe(PathBuf::from("/nonexistent/docview-mmdc"), dir).await;
    assert!(!engine.is_available());
}

#[tokio::test]
async fn initialize_writes_config_once() {
    let dir = std::env::temp_dir().join(format!("docview-test-init-{}", std::process::id()));
    let engine = MermaidCli::probe(PathBuf::from("/nonexistent/docview-mmdc"), dir.clone()).await;

    engine.initialize(&EngineConfig::default()).unwrap();
    let written: serde_json::Value =
        serde_json::from_slice(&std::fs::read(dir.join(CONFIG_FILE_NAME)).unwrap()).unwrap();
    assert_eq!(written["theme"], "neutral");
    assert_eq!(written["securityLevel"], "loose");
    assert_eq!(written["fontFamily"], "Inter, sans-serif");
    assert_eq!(written["logLevel"], "error");
    assert_eq!(written["startOnLoad"], false);

    assert!(matches!(engine.initialize(&EngineConfig::default()), Err(EngineError::Init(_))));
    std::fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test]
async fn scratch_stems_are_unique_per_call() {
    let engine = MermaidCli::probe(PathBuf::from("/nonexistent/docview-mmdc"), PathBuf::from("/tmp/x")).await;
    let a = engine.scratch_stem("mermaid-abc", "graph TD; A");
    let b = engine.scratch_stem("mermaid-abc", "graph TD; A");
    assert_ne!(a, b);
    assert!(a.to_string_lossy().starts_with("/tmp/x/mermaid-abc-"));
    assert_eq!(a.with_extension("svg").extension().unwrap(), "svg");
}

#[tokio::test]
async fn failed_spawn_removes_input_scratch() {
    let dir = std::env::temp_dir().join(format!("docview-test-spawn-{}", std::process::id()));
    let engine = MermaidCli::probe(PathBuf::from("/nonexistent/docview-mmdc"), dir.clone()).await;

    let err = engine.render("mermaid-abc", "graph TD; A").await.unwrap_err();
    assert!(matches!(err, EngineError::Other(_)));

    let leftovers: Vec<_> = std::fs::read_dir(&dir).unwrap().flatten().map(|entry| entry.path()).collect();
    assert!(leftovers.is_empty(), "scratch files left behind: {leftovers:?}");
    std::fs::remove_dir_all(&dir).unwrap();
}

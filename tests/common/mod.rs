use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Path of a state file inside a fresh temporary directory (not created)
#[allow(dead_code)]
pub fn temp_state_file() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let path = temp_dir.path().join("state.json");
    (temp_dir, path)
}

/// Write a state record with the given settings and `pairs` q/a pairs
#[allow(dead_code)]
pub fn write_state(path: &Path, model: &str, retain: i64, border: bool, pairs: usize) {
    let messages: Vec<Value> = (0..pairs)
        .flat_map(|i| {
            [
                json!({"role": "user", "content": format!("q{}", i)}),
                json!({"role": "assistant", "content": format!("a{}", i)}),
            ]
        })
        .collect();
    let record = json!({
        "model": model,
        "temperature": 1.0,
        "instructions": "Be brief.",
        "retain": retain,
        "border": border,
        "messages": messages,
    });
    fs::write(path, record.to_string()).expect("failed to write state file");
}

/// Read the state file back as JSON
#[allow(dead_code)]
pub fn read_state(path: &Path) -> Value {
    let bytes = fs::read(path).expect("failed to read state file");
    serde_json::from_slice(&bytes).expect("state file is not valid JSON")
}

/// A successful /chat/completions response body carrying `reply`
#[allow(dead_code)]
pub fn completion_body(reply: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": reply },
            "finish_reason": "stop"
        }]
    })
}

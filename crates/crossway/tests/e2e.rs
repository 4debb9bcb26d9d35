// SPDX-FileCopyrightText: 2026 Crossway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests: the compiled binary, and the full turn pipeline over
//! configuration-driven routing and SQLite persistence.
//!
//! Each test works in its own temp directory; no test depends on another.

use std::path::Path;
use std::process::{Command, Output};

use crossway_agent::format_record;
use crossway_core::BackendId;
use crossway_test_utils::TestHarness;

/// Run the binary with `dir` as working directory and config home, so no
/// config file from the host is picked up.
fn crossway(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_crossway"))
        .args(args)
        .current_dir(dir)
        .env("XDG_CONFIG_HOME", dir)
        .env("HOME", dir)
        .env("NO_COLOR", "1")
        .env("CROSSWAY_STORAGE_DATABASE_PATH", dir.join("crossway.db"))
        .env_remove("RUST_LOG")
        .env_remove("OPENAI_API_KEY")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

// ---- Binary: routing and configuration ----

#[test]
fn route_command_reports_rule() {
    let dir = tempfile::tempdir().unwrap();
    let out = crossway(dir.path(), &["route", "please", "retrieve", "the", "design", "paper"]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert!(stdout(&out).starts_with("retrieval (RAG) via rule 2"), "{}", stdout(&out));
}

#[test]
fn route_command_uses_config_keywords() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("crossway.toml"),
        "[routing]\nhosted_keywords = [\"describe\"]\nword_threshold = 2\n",
    )
    .unwrap();

    let out = crossway(dir.path(), &["route", "describe", "the", "moon"]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert!(stdout(&out).starts_with("hosted (OpenAI)"), "{}", stdout(&out));
}

#[test]
fn unknown_config_key_exits_with_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("bad.toml");
    std::fs::write(&config, "[routing]\nword_treshold = 4\n").unwrap();

    let out = crossway(dir.path(), &["--config", config.to_str().unwrap(), "route", "hi"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("word_threshold"), "{}", stderr(&out));
}

#[test]
fn missing_explicit_config_exits_with_error() {
    let dir = tempfile::tempdir().unwrap();
    let out = crossway(dir.path(), &["--config", "nope.toml", "memory"]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn memory_command_on_fresh_store() {
    let dir = tempfile::tempdir().unwrap();
    let out = crossway(dir.path(), &["memory"]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert!(stdout(&out).is_empty());
    assert!(stderr(&out).contains("no conversation yet"));
}

#[test]
fn ask_fails_at_startup_without_pipelines() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("crossway.toml"), "[hosted]\napi_key = \"sk-test\"\n").unwrap();

    let out = crossway(dir.path(), &["ask", "hi"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("retrieval"), "{}", stderr(&out));
}

// ---- Binary: full turns with child-process pipelines ----

#[cfg(unix)]
const PIPELINE_CONFIG: &str = r#"
[hosted]
api_key = "sk-test"

[retrieval]
command = ["sh", "-c", "while IFS= read -r line; do id=$(printf '%s' \"$line\" | sed -E 's/^\\{\"id\":([0-9]+),.*/\\1/'); printf '{\"id\":%s,\"output\":\"Found 2 papers.\"}\\n' \"$id\"; done"]

[multi_agent]
command = ["sh", "-c", "cat > /dev/null"]
"#;

#[cfg(unix)]
#[test]
fn ask_runs_turns_and_memory_persists_across_processes() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("crossway.toml"), PIPELINE_CONFIG).unwrap();

    let out = crossway(dir.path(), &["ask", "hi"]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert_eq!(stdout(&out), "[Internal] Hello! How can I help you today?\n");

    let out = crossway(dir.path(), &["ask", "please retrieve the design paper"]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert_eq!(stdout(&out), "[RAG] Found 2 papers.\n");

    let out = crossway(dir.path(), &["memory"]);
    assert_eq!(
        stdout(&out),
        "User: hi\nInternal: Hello! How can I help you today?\n\
         User: please retrieve the design paper\nRAG: Found 2 papers.\n"
    );
}

// ---- Pipeline: config-driven routing over SQLite ----

#[tokio::test]
async fn configured_routing_drives_the_pipeline() {
    let config = crossway_config::load_and_validate_str(
        "[routing]\nword_threshold = 3\nhosted_keywords = [\"explain\", \"why\"]\n",
    )
    .unwrap();
    let harness = TestHarness::builder()
        .with_routing(config.routing)
        .with_sqlite()
        .with_responses(BackendId::Hosted, ["Because of Rayleigh scattering."])
        .build()
        .await
        .unwrap();

    let (summary, io) = harness.run_script(["why is the sky blue", "exit"]).await.unwrap();

    assert_eq!(summary.turns_completed, 1);
    assert_eq!(io.responses(), vec!["Because of Rayleigh scattering."]);
    assert_eq!(
        harness.persisted().await.unwrap(),
        format_record("why is the sky blue", BackendId::Hosted, "Because of Rayleigh scattering.")
    );
}

#[tokio::test]
async fn restarted_session_continues_the_transcript() {
    let harness = TestHarness::builder()
        .with_sqlite()
        .with_initial_memory("User: hi\nInternal: Hello!\n")
        .with_responses(BackendId::Local, ["The northern lights are auroras."])
        .build()
        .await
        .unwrap();

    harness
        .run_script(["tell me about the northern lights"])
        .await
        .unwrap();

    let calls = harness.mock(BackendId::Local).calls().await;
    assert_eq!(calls[0].1, "User: hi\nInternal: Hello!\n");
    assert_eq!(
        harness.persisted().await.unwrap(),
        "User: hi\nInternal: Hello!\nUser: tell me about the northern lights\nLLaMA: The northern lights are auroras.\n"
    );
}

// SPDX-FileCopyrightText: 2026 Crossway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Child-process backend adapter.

use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crossway_config::model::ProcessBackendConfig;
use crossway_core::{BackendAdapter, BackendId, CrosswayError, HealthStatus, PluginAdapter};

use crate::protocol::{StdioRequest, decode_reply, encode_request};

/// How long a child gets to exit after its stdin is closed before it is killed.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

struct ChildIo {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
    /// Set while a request line is being written. Still set on the next call
    /// means the previous write was abandoned and stdin holds a partial line.
    write_pending: bool,
}

impl ChildIo {
    fn launch(backend: BackendId, config: &ProcessBackendConfig) -> Result<Self, CrosswayError> {
        let (program, args) = config.command.split_first().ok_or_else(|| {
            CrosswayError::Config(format!(
                "{backend} backend has no command configured (set {backend}.command)"
            ))
        })?;

        let mut child = Command::new(program)
            .args(args)
            .envs(&config.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| CrosswayError::BackendUnavailable {
                backend,
                message: format!("failed to spawn `{program}`: {e}"),
            })?;

        let (stdin, stdout) = match (child.stdin.take(), child.stdout.take()) {
            (Some(stdin), Some(stdout)) => (stdin, stdout),
            _ => {
                return Err(CrosswayError::BackendUnavailable {
                    backend,
                    message: "child process stdio was not captured".to_string(),
                });
            }
        };

        info!(backend = %backend, program = %program, pid = ?child.id(), "pipeline process started");
        Ok(Self {
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
            write_pending: false,
        })
    }
}

/// A backend whose responses come from a child process.
///
/// Requests are serialized by an internal lock; a reply is matched to its
/// request by id, so replies to requests abandoned on timeout are skipped.
/// A request abandoned mid-write leaves a torn line on the child's stdin, so
/// the child is replaced before the next request.
pub struct StdioBackend {
    backend: BackendId,
    program: String,
    config: ProcessBackendConfig,
    io: Mutex<Option<ChildIo>>,
    next_id: AtomicU64,
}

impl StdioBackend {
    /// Spawn the configured command for `backend`.
    pub fn spawn(backend: BackendId, config: &ProcessBackendConfig) -> Result<Self, CrosswayError> {
        let io = ChildIo::launch(backend, config)?;
        Ok(Self {
            backend,
            program: config.command.first().cloned().unwrap_or_default(),
            config: config.clone(),
            io: Mutex::new(Some(io)),
            next_id: AtomicU64::new(1),
        })
    }

    fn unavailable(&self, message: impl Into<String>) -> CrosswayError {
        CrosswayError::BackendUnavailable {
            backend: self.backend,
            message: message.into(),
        }
    }
}

#[async_trait]
impl PluginAdapter for StdioBackend {
    fn name(&self) -> &str {
        &self.program
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, CrosswayError> {
        let mut guard = self.io.lock().await;
        let Some(io) = guard.as_mut() else {
            return Ok(HealthStatus::Unhealthy("shut down".to_string()));
        };
        match io.child.try_wait()? {
            None => Ok(HealthStatus::Healthy),
            Some(status) => Ok(HealthStatus::Unhealthy(format!("process exited: {status}"))),
        }
    }

    /// Close stdin, give the child a grace period, then kill it.
    async fn shutdown(&self) -> Result<(), CrosswayError> {
        let Some(io) = self.io.lock().await.take() else {
            return Ok(());
        };
        let ChildIo {
            mut child, stdin, ..
        } = io;
        drop(stdin);

        match tokio::time::timeout(SHUTDOWN_GRACE, child.wait()).await {
            Ok(Ok(status)) => {
                debug!(backend = %self.backend, %status, "pipeline process exited");
            }
            Ok(Err(e)) => return Err(CrosswayError::Io(e)),
            Err(_) => {
                warn!(backend = %self.backend, "pipeline process ignored stdin close, killing");
                child.kill().await?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl BackendAdapter for StdioBackend {
    async fn generate(&self, prompt: &str, memory: &str) -> Result<String, CrosswayError> {
        let mut guard = self.io.lock().await;
        let io = guard
            .as_mut()
            .ok_or_else(|| self.unavailable("backend has been shut down"))?;

        if io.write_pending {
            warn!(backend = %self.backend, "previous request was interrupted mid-write, restarting pipeline process");
            if let Err(e) = io.child.start_kill() {
                debug!(backend = %self.backend, error = %e, "kill of torn pipeline process failed");
            }
            *io = ChildIo::launch(self.backend, &self.config)?;
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let line = encode_request(&StdioRequest { id, prompt, memory })
            .map_err(|e| self.unavailable(format!("failed to encode request: {e}")))?;

        io.write_pending = true;
        io.stdin
            .write_all(line.as_bytes())
            .await
            .map_err(|e| self.unavailable(format!("write to `{}` failed: {e}", self.program)))?;
        io.stdin
            .flush()
            .await
            .map_err(|e| self.unavailable(format!("flush to `{}` failed: {e}", self.program)))?;
        io.write_pending = false;

        loop {
            let line = io
                .stdout
                .next_line()
                .await
                .map_err(|e| self.unavailable(format!("read from `{}` failed: {e}", self.program)))?
                .ok_or_else(|| self.unavailable(format!("`{}` closed its output", self.program)))?;

            let Some(reply) = decode_reply(&line) else {
                debug!(backend = %self.backend, line = %line, "ignoring non-reply line");
                continue;
            };
            if reply.id != id {
                debug!(backend = %self.backend, expected = id, got = reply.id, "skipping stale reply");
                continue;
            }
            return match (reply.output, reply.error) {
                (_, Some(error)) => Err(self.unavailable(error)),
                (Some(output), None) => Ok(output),
                (None, None) => Err(self.unavailable("reply carried neither output nor error")),
            };
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    /// Extracts the request id from the line in `$line` into `$id`.
    const READ_ID: &str = r#"id=$(printf '%s' "$line" | sed -E 's/^\{"id":([0-9]+),.*/\1/')"#;

    fn sh(script: &str) -> ProcessBackendConfig {
        ProcessBackendConfig {
            command: vec!["sh".into(), "-c".into(), script.into()],
            env: BTreeMap::new(),
        }
    }

    fn responder(body: &str) -> ProcessBackendConfig {
        sh(&format!(
            "while IFS= read -r line; do {READ_ID}; {body}; done"
        ))
    }

    #[tokio::test]
    async fn round_trips_a_prompt() {
        let backend = StdioBackend::spawn(
            BackendId::Retrieval,
            &responder(r#"printf '{"id":%s,"output":"pong"}\n' "$id""#),
        )
        .unwrap();

        assert_eq!(backend.generate("ping", "").await.unwrap(), "pong");
        assert_eq!(backend.generate("ping again", "User: ping\n").await.unwrap(), "pong");
        backend.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn skips_noise_and_stale_replies() {
        let backend = StdioBackend::spawn(
            BackendId::MultiAgent,
            &responder(
                r#"echo 'crew assembling'; printf '{"id":0,"output":"stale"}\n'; printf '{"id":%s,"output":"fresh"}\n' "$id""#,
            ),
        )
        .unwrap();

        assert_eq!(backend.generate("research tides", "").await.unwrap(), "fresh");
        backend.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn error_reply_maps_to_unavailable() {
        let backend = StdioBackend::spawn(
            BackendId::Retrieval,
            &responder(r#"printf '{"id":%s,"error":"index offline"}\n' "$id""#),
        )
        .unwrap();

        let err = backend.generate("retrieve it", "").await.unwrap_err();
        assert_eq!(err.backend(), Some(BackendId::Retrieval));
        assert!(err.to_string().contains("index offline"));
        backend.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn exited_child_maps_to_unavailable() {
        let backend = StdioBackend::spawn(BackendId::Retrieval, &sh("read line; exit 0")).unwrap();
        let err = backend.generate("anyone there", "").await.unwrap_err();
        assert!(err.to_string().contains("closed its output"), "got {err}");
        backend.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn env_is_passed_to_child() {
        let mut config = responder(r#"printf '{"id":%s,"output":"%s"}\n' "$id" "$CROSSWAY_TEST_MODE""#);
        config.env.insert("CROSSWAY_TEST_MODE".into(), "sequential".into());
        let backend = StdioBackend::spawn(BackendId::MultiAgent, &config).unwrap();
        assert_eq!(backend.generate("analyze", "").await.unwrap(), "sequential");
        backend.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn missing_program_fails_to_spawn() {
        let config = ProcessBackendConfig {
            command: vec!["/nonexistent/crossway-pipeline".into()],
            env: BTreeMap::new(),
        };
        let err = StdioBackend::spawn(BackendId::Retrieval, &config).err().unwrap();
        assert!(matches!(err, CrosswayError::BackendUnavailable { .. }));
    }

    #[tokio::test]
    async fn empty_command_is_config_error() {
        let err = StdioBackend::spawn(BackendId::MultiAgent, &ProcessBackendConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, CrosswayError::Config(_)));
        assert!(err.to_string().contains("multi_agent.command"));
    }

    #[tokio::test]
    async fn request_abandoned_mid_write_does_not_tear_the_next_one() {
        // Reads nothing for a second, then echoes each line's length back.
        let backend = StdioBackend::spawn(
            BackendId::Retrieval,
            &sh(&format!(
                r#"sleep 1; while IFS= read -r line; do {READ_ID}; printf '{{"id":%s,"output":"%s"}}\n' "$id" "${{#line}}"; done"#
            )),
        )
        .unwrap();

        let memory = "x".repeat(512 * 1024);
        let first = tokio::time::timeout(
            Duration::from_millis(200),
            backend.generate("first", &memory),
        )
        .await;
        assert!(first.is_err(), "write should still be blocked on the pipe");

        let output = backend.generate("second", "").await.unwrap();
        let expected = encode_request(&StdioRequest {
            id: 2,
            prompt: "second",
            memory: "",
        })
        .unwrap();
        assert_eq!(output, (expected.len() - 1).to_string());
        backend.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn shutdown_is_idempotent_and_blocks_generate() {
        let backend = StdioBackend::spawn(BackendId::Retrieval, &sh("cat > /dev/null")).unwrap();
        assert_eq!(backend.health_check().await.unwrap(), HealthStatus::Healthy);

        backend.shutdown().await.unwrap();
        backend.shutdown().await.unwrap();

        let err = backend.generate("hello", "").await.unwrap_err();
        assert!(err.to_string().contains("shut down"));
        assert!(matches!(
            backend.health_check().await.unwrap(),
            HealthStatus::Unhealthy(_)
        ));
    }
}

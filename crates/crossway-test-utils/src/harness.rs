// SPDX-FileCopyrightText: 2026 Crossway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end turn and session testing.
//!
//! `TestHarness` registers a [`MockBackend`] for every route and a transcript
//! store (in-memory by default, or SQLite in a temp directory), and builds
//! executors and sessions over them.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crossway_agent::{BackendRegistry, Session, SessionSettings, SessionSummary, TurnExecutor};
use crossway_config::model::{RoutingConfig, StorageConfig};
use crossway_core::{BackendId, CrosswayError, MemoryAdapter};
use crossway_router::RouteClassifier;
use crossway_storage::SqliteMemoryStore;

use crate::mock_backend::MockBackend;
use crate::mock_store::InMemoryStore;
use crate::scripted_io::ScriptedIo;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    responses: BTreeMap<BackendId, Vec<String>>,
    initial_memory: String,
    routing: RoutingConfig,
    timeout: Duration,
    sqlite: bool,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            responses: BTreeMap::new(),
            initial_memory: String::new(),
            routing: RoutingConfig::default(),
            timeout: Duration::from_secs(5),
            sqlite: false,
        }
    }

    /// Queue responses for one backend.
    pub fn with_responses<I, S>(mut self, id: BackendId, responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.responses
            .entry(id)
            .or_default()
            .extend(responses.into_iter().map(Into::into));
        self
    }

    /// Transcript the store holds before the session starts.
    pub fn with_initial_memory(mut self, memory: impl Into<String>) -> Self {
        self.initial_memory = memory.into();
        self
    }

    pub fn with_routing(mut self, routing: RoutingConfig) -> Self {
        self.routing = routing;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Persist to a SQLite file in a temp directory instead of memory.
    pub fn with_sqlite(mut self) -> Self {
        self.sqlite = true;
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, CrosswayError> {
        let mut mocks = BTreeMap::new();
        let mut registry = BackendRegistry::new();
        for id in BackendId::ALL {
            let queued = self.responses.get(&id).cloned().unwrap_or_default();
            let mock = Arc::new(MockBackend::with_responses(id, queued));
            registry.insert(id, mock.clone());
            mocks.insert(id, mock);
        }

        let mut temp_dir = None;
        let mut database_path = None;
        let mut memory_store = None;
        let store: Arc<dyn MemoryAdapter> = if self.sqlite {
            let dir = tempfile::TempDir::new()?;
            let path = dir.path().join("crossway-test.db");
            let store = SqliteMemoryStore::open(sqlite_config(&path)).await?;
            if !self.initial_memory.is_empty() {
                store.save(&self.initial_memory).await?;
            }
            temp_dir = Some(dir);
            database_path = Some(path);
            Arc::new(store)
        } else {
            let store = Arc::new(InMemoryStore::with_content(self.initial_memory));
            memory_store = Some(store.clone());
            store
        };

        Ok(TestHarness {
            mocks,
            registry: Arc::new(registry),
            store,
            memory_store,
            classifier: RouteClassifier::new(&self.routing),
            timeout: self.timeout,
            database_path,
            _temp_dir: temp_dir,
        })
    }
}

fn sqlite_config(path: &Path) -> StorageConfig {
    StorageConfig {
        database_path: path.to_string_lossy().to_string(),
        wal_mode: true,
    }
}

/// A complete test environment with mock backends and a transcript store.
pub struct TestHarness {
    mocks: BTreeMap<BackendId, Arc<MockBackend>>,
    registry: Arc<BackendRegistry>,
    store: Arc<dyn MemoryAdapter>,
    memory_store: Option<Arc<InMemoryStore>>,
    classifier: RouteClassifier,
    timeout: Duration,
    database_path: Option<PathBuf>,
    _temp_dir: Option<tempfile::TempDir>,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// The mock registered for `id`.
    pub fn mock(&self, id: BackendId) -> &Arc<MockBackend> {
        &self.mocks[&id]
    }

    pub fn registry(&self) -> &Arc<BackendRegistry> {
        &self.registry
    }

    pub fn store(&self) -> &Arc<dyn MemoryAdapter> {
        &self.store
    }

    /// The in-memory store, when the harness was not built with SQLite.
    pub fn memory_store(&self) -> Option<&Arc<InMemoryStore>> {
        self.memory_store.as_ref()
    }

    pub fn database_path(&self) -> Option<&Path> {
        self.database_path.as_deref()
    }

    /// A fresh executor over the shared backends and store.
    pub fn executor(&self) -> TurnExecutor {
        TurnExecutor::new(
            self.classifier.clone(),
            self.registry.clone(),
            self.store.clone(),
            self.timeout,
        )
    }

    /// Start a session with default exit tokens.
    pub async fn session(&self) -> Result<Session, CrosswayError> {
        Session::start(self.executor(), SessionSettings::default()).await
    }

    /// Run a whole session over `prompts`, returning its summary and captured I/O.
    pub async fn run_script<I, S>(&self, prompts: I) -> Result<(SessionSummary, ScriptedIo), CrosswayError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut io = ScriptedIo::new(prompts);
        let summary = self.session().await?.run(&mut io).await;
        Ok((summary, io))
    }

    /// What a restarted process would load.
    pub async fn persisted(&self) -> Result<String, CrosswayError> {
        match &self.database_path {
            Some(path) => SqliteMemoryStore::open(sqlite_config(path)).await?.load().await,
            None => self.store.load().await,
        }
    }
}

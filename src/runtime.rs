//! Runtime wiring
//!
//! [`TaskDesk`] owns the store, the change notifier and the services, and
//! is what callers hold instead of reaching for global state. Each handle
//! plays the part of one browser tab: handles made with
//! [`TaskDesk::new_tab`] share storage and notifications but keep their own
//! signed-in user.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::application::{ChatService, IdentityService, SessionGate, TaskService, UnreadBadge};
use crate::config::{AppConfig, LoggingConfig, StorageBackendKind};
use crate::domain::{DomainResult, RepositoryProvider};
use crate::infrastructure::{
    FileBackend, InMemoryBackend, LocalRepositoryProvider, PersistentStore, StorageBackend,
    StoreWatcher,
};
use crate::notifications::{create_change_notifier, ChangeSubscriber, SharedChangeNotifier};
use crate::shared::time::system_clock;
use crate::shared::{SharedClock, ShutdownSignal, SimulatedLatency};

/// Install the global tracing subscriber. `RUST_LOG` wins over the
/// configured level; `format = "json"` selects JSON lines.
pub fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let result = if logging.format.eq_ignore_ascii_case("json") {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
    };
    if result.is_err() {
        debug!("Tracing subscriber already installed");
    }
}

pub struct TaskDeskOptions {
    pub config: AppConfig,
    pub clock: SharedClock,
}

impl TaskDeskOptions {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            clock: system_clock(),
        }
    }

    pub fn with_clock(mut self, clock: SharedClock) -> Self {
        self.clock = clock;
        self
    }
}

pub struct TaskDesk {
    config: Arc<AppConfig>,
    store: Arc<PersistentStore>,
    notifier: SharedChangeNotifier,
    identity: Arc<IdentityService>,
    tasks: Arc<TaskService>,
    chat: Arc<ChatService>,
    session: SessionGate,
    shutdown: ShutdownSignal,
    watcher: Option<JoinHandle<()>>,
}

impl TaskDesk {
    /// Open storage, seed the admin account, restore a persisted session
    /// and, for file storage, start watching for other processes' writes.
    pub async fn start(options: TaskDeskOptions) -> DomainResult<Self> {
        let TaskDeskOptions { config, clock } = options;

        let file_backend = match config.storage.backend {
            StorageBackendKind::Memory => None,
            StorageBackendKind::File => Some(Arc::new(FileBackend::open(&config.storage.data_dir)?)),
        };
        let backend: Arc<dyn StorageBackend> = match &file_backend {
            Some(file) => file.clone(),
            None => Arc::new(InMemoryBackend::new()),
        };
        info!(backend = backend.name(), "Starting task desk");

        let store = Arc::new(PersistentStore::new(backend));
        let repos: Arc<dyn RepositoryProvider> = Arc::new(LocalRepositoryProvider::new(store.clone()));
        let notifier = create_change_notifier();
        let latency = SimulatedLatency::new(config.latency.clone());

        let identity = Arc::new(IdentityService::new(
            repos.clone(),
            notifier.clone(),
            latency.clone(),
            clock.clone(),
            config.security.bcrypt_cost,
            config.seed.clone(),
        ));
        let tasks = Arc::new(TaskService::new(
            repos.clone(),
            notifier.clone(),
            latency.clone(),
            clock.clone(),
        ));
        let chat = Arc::new(ChatService::new(repos, notifier.clone(), latency, clock));

        identity.seed_admin().await?;

        let session = SessionGate::new(identity.clone(), store.clone(), notifier.clone());
        session.restore().await?;

        let shutdown = ShutdownSignal::new();
        let watcher = match file_backend {
            Some(file) if config.storage.watch_interval_ms > 0 => {
                let interval = Duration::from_millis(config.storage.watch_interval_ms);
                Some(StoreWatcher::new(file, notifier.clone(), interval).spawn(shutdown.clone()))
            }
            _ => None,
        };

        Ok(Self {
            config: Arc::new(config),
            store,
            notifier,
            identity,
            tasks,
            chat,
            session,
            shutdown,
            watcher,
        })
    }

    /// In-memory desk with no latency, for tests and throwaway sessions.
    pub async fn in_memory() -> DomainResult<Self> {
        Self::start(TaskDeskOptions::new(AppConfig::ephemeral())).await
    }

    /// Another view on the same data: shared store, services and
    /// notifications, separate session (restored from storage).
    pub async fn new_tab(&self) -> DomainResult<Self> {
        let session = SessionGate::new(self.identity.clone(), self.store.clone(), self.notifier.clone());
        session.restore().await?;

        Ok(Self {
            config: self.config.clone(),
            store: self.store.clone(),
            notifier: self.notifier.clone(),
            identity: self.identity.clone(),
            tasks: self.tasks.clone(),
            chat: self.chat.clone(),
            session,
            shutdown: self.shutdown.clone(),
            watcher: None,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn subscribe(&self) -> ChangeSubscriber {
        self.notifier.subscribe()
    }

    pub fn identity(&self) -> &Arc<IdentityService> {
        &self.identity
    }

    pub fn tasks(&self) -> &Arc<TaskService> {
        &self.tasks
    }

    pub fn chat(&self) -> &Arc<ChatService> {
        &self.chat
    }

    pub fn session(&self) -> &SessionGate {
        &self.session
    }

    /// Live unread count for `user_id`.
    pub async fn unread_badge(&self, user_id: &str) -> DomainResult<UnreadBadge> {
        UnreadBadge::spawn(self.chat.clone(), user_id).await
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Stop background work and wait for the store watcher, if any.
    pub async fn shutdown(mut self) {
        self.shutdown.trigger();
        if let Some(watcher) = self.watcher.take() {
            let _ = watcher.await;
        }
        info!("Task desk stopped");
    }
}

//! Hot reload of the configuration file
//!
//! The parent directory is watched so editors that save by replacing the file
//! are still seen. Bursts of events are coalesced into one reload, and a
//! reload is only forwarded when it parses, validates and differs from the
//! last config handed out.

use anyhow::{Context, Result};
use notify::event::{CreateKind, ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::AppConfig;

/// Delay between the first change event and the reload
const SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Whether a watcher event means the config file's contents may have changed
pub fn touches_config(event: &Event, file_name: &OsString) -> bool {
    let content_change = matches!(
        event.kind,
        EventKind::Modify(ModifyKind::Data(_))
            | EventKind::Modify(ModifyKind::Any)
            | EventKind::Modify(ModifyKind::Name(RenameMode::To | RenameMode::Both))
            | EventKind::Create(CreateKind::File | CreateKind::Any)
    );

    content_change
        && event
            .paths
            .iter()
            .any(|path| path.file_name() == Some(file_name.as_os_str()))
}

/// Loads the file and remembers the last good config
#[derive(Debug)]
pub struct Reloader {
    path: String,
    current: Mutex<AppConfig>,
}

impl Reloader {
    pub fn new(path: String, current: AppConfig) -> Self {
        Self {
            path,
            current: Mutex::new(current),
        }
    }

    /// Re-read the file; `None` when it is invalid or unchanged
    pub async fn reload(&self) -> Option<AppConfig> {
        let config = match AppConfig::load(&self.path).await {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring config change (keeping previous config): {:#}", e);
                return None;
            },
        };

        let mut current = self.current.lock();
        if *current == config {
            debug!("Config file saved without changes");
            return None;
        }
        *current = config.clone();
        Some(config)
    }

    pub fn current(&self) -> AppConfig {
        self.current.lock().clone()
    }
}

/// Watches the config file and yields each new valid config
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    updates: mpsc::Receiver<AppConfig>,
}

impl ConfigWatcher {
    /// Load `config_path` and start watching it
    ///
    /// Fails if the initial load fails; later bad edits are logged and skipped.
    pub async fn new(config_path: String) -> Result<(Self, AppConfig)> {
        let initial = AppConfig::load(&config_path)
            .await
            .context("Failed to load initial config")?;

        let path = PathBuf::from(&config_path);
        let file_name = path
            .file_name()
            .map(OsString::from)
            .with_context(|| format!("Config path has no file name: {}", config_path))?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let (tx, updates) = mpsc::channel(4);
        let reloader = Arc::new(Reloader::new(config_path.clone(), initial.clone()));
        let pending = Arc::new(AtomicBool::new(false));

        // notify calls back on its own thread
        let runtime = tokio::runtime::Handle::current();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => event,
                Err(e) => {
                    error!("Config watch error: {}", e);
                    return;
                },
            };
            if !touches_config(&event, &file_name) {
                return;
            }
            if pending.swap(true, Ordering::AcqRel) {
                return;
            }
            debug!("Config change detected: {:?}", event.kind);

            let reloader = reloader.clone();
            let pending = pending.clone();
            let tx = tx.clone();
            runtime.spawn(async move {
                tokio::time::sleep(SETTLE_DELAY).await;
                pending.store(false, Ordering::Release);

                if let Some(config) = reloader.reload().await {
                    info!("Configuration reloaded");
                    if tx.send(config).await.is_err() {
                        debug!("Config receiver dropped");
                    }
                }
            });
        })?;

        watcher
            .watch(Path::new(&dir), RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch config directory: {}", dir.display()))?;

        info!("Watching {} for changes", config_path);

        Ok((
            Self {
                _watcher: watcher,
                updates,
            },
            initial,
        ))
    }

    /// Next changed config; `None` once the watcher is gone
    pub async fn next_config(&mut self) -> Option<AppConfig> {
        self.updates.recv().await
    }
}

//! Hot reload of the basket and forwarding settings.
//!
//! The parent directory is watched rather than the file itself, so editors
//! that save by writing a temp file and renaming it over the original still
//! trigger a reload. A single save usually produces several events; a reload
//! is only published when the hot-reloadable settings actually changed.

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::{ServiceConfig, ServiceSettings};

/// Publishes reloaded configs whenever the settings in the file change.
pub struct ConfigWatcher {
    path: PathBuf,
    current: ServiceSettings,
    update_tx: mpsc::UnboundedSender<ServiceConfig>,
}

impl ConfigWatcher {
    /// `current` is the settings the service started with; reloads that
    /// leave them unchanged are not published.
    pub fn new(
        path: &Path,
        current: ServiceSettings,
    ) -> (Self, mpsc::UnboundedReceiver<ServiceConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            current,
            update_tx,
        };
        (watcher, update_rx)
    }

    /// Start watching. The returned watcher must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self {
            path,
            mut current,
            update_tx,
        } = self;
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let file_name = path.file_name().map(ToOwned::to_owned);
        let watched = path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let event = match res {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::error!(error = ?e, "Config watch error");
                        return;
                    }
                };
                if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                    return;
                }
                if !event.paths.iter().any(|p| p.file_name() == file_name.as_deref()) {
                    return;
                }
                if let Some(config) = reload(&watched, &mut current) {
                    let _ = update_tx.send(config);
                }
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?path, "Config watcher started");
        Ok(watcher)
    }
}

/// Load `path` and return it if its settings differ from `current`.
fn reload(path: &Path, current: &mut ServiceSettings) -> Option<ServiceConfig> {
    match load_config(path) {
        Ok(config) => {
            let settings = config.settings();
            if settings == *current {
                tracing::debug!("Config file touched, settings unchanged");
                return None;
            }
            tracing::info!("Config file change detected, reloading");
            *current = settings;
            Some(config)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to reload config, keeping current settings");
            None
        }
    }
}

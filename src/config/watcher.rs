//! Hot reload of the config file.
//!
//! Editors often save by writing a sibling temp file and renaming it over the
//! original, so events are matched by file name rather than by exact path, and
//! a reload that parses to the configuration already sent is dropped.

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::AppConfig;

/// Watches one config file and emits validated configurations.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<AppConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and the receiving end of its updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<AppConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            update_tx,
        };
        (watcher, update_rx)
    }

    /// Start watching on notify's background thread.
    ///
    /// The parent directory is watched so rename-over saves are seen. The
    /// returned handle must be kept alive for updates to keep flowing.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let file_name = self.path.file_name().map(OsString::from);
        let path = self.path.clone();
        let tx = self.update_tx;
        let last_sent: Mutex<Option<AppConfig>> = Mutex::new(None);

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let event = match res {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::error!(error = %e, "Config watch error");
                        return;
                    }
                };
                if !touches_file(&event, file_name.as_deref()) {
                    return;
                }

                match load_config(Some(&path)) {
                    Ok(new_config) => {
                        let mut last = last_sent
                            .lock()
                            .unwrap_or_else(std::sync::PoisonError::into_inner);
                        if last.as_ref() == Some(&new_config) {
                            return;
                        }
                        tracing::info!(path = %path.display(), "Config file changed, reloading");
                        *last = Some(new_config.clone());
                        let _ = tx.send(new_config);
                    }
                    Err(e) => tracing::error!(
                        path = %path.display(),
                        error = %e,
                        "Failed to reload config, keeping current configuration"
                    ),
                }
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = %self.path.display(), "Config watcher started");
        Ok(watcher)
    }
}

/// Whether `event` creates or modifies a file called `file_name`.
fn touches_file(event: &Event, file_name: Option<&std::ffi::OsStr>) -> bool {
    if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
        return false;
    }
    let Some(file_name) = file_name else {
        return false;
    };
    event
        .paths
        .iter()
        .any(|p| p.file_name() == Some(file_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind, RemoveKind};

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn test_touches_file() {
        let name = Some(std::ffi::OsStr::new("waitlist.toml"));

        assert!(touches_file(
            &event(EventKind::Modify(ModifyKind::Any), "/etc/app/waitlist.toml"),
            name
        ));
        assert!(touches_file(
            &event(EventKind::Create(CreateKind::File), "/etc/app/waitlist.toml"),
            name
        ));
        assert!(!touches_file(
            &event(EventKind::Modify(ModifyKind::Any), "/etc/app/.waitlist.toml.swp"),
            name
        ));
        assert!(!touches_file(
            &event(EventKind::Remove(RemoveKind::File), "/etc/app/waitlist.toml"),
            name
        ));
        assert!(!touches_file(
            &event(EventKind::Modify(ModifyKind::Any), "/etc/app/waitlist.toml"),
            None
        ));
    }

    #[tokio::test]
    async fn test_reload_on_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("waitlist.toml");
        std::fs::write(&path, "[rate_limit]\nmax_requests = 5\n").unwrap();

        let (watcher, mut updates) = ConfigWatcher::new(&path);
        let _handle = watcher.run().unwrap();

        std::fs::write(&path, "[rate_limit]\nmax_requests = 9\n").unwrap();

        // A write can surface as several events, the first seeing a truncated file.
        let reloaded = tokio::time::timeout(Duration::from_secs(10), async {
            while let Some(update) = updates.recv().await {
                if update.rate_limit.max_requests == 9 {
                    return true;
                }
            }
            false
        })
        .await
        .expect("no reload within timeout");
        assert!(reloaded);
    }
}

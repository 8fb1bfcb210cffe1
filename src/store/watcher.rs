// ABOUTME: Watches the bindings file and rebuilds the shortcut registry when it changes on disk
// ABOUTME: Edits made by the CLI while the service runs take effect without a restart

use super::BindingStore;
use crate::registry::ShortcutRegistry;
use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Keeps the OS watch alive; dropping it stops reloading.
pub struct StoreWatcher {
    _watcher: RecommendedWatcher,
    path: PathBuf,
}

impl StoreWatcher {
    pub fn spawn(path: &Path, registry: Arc<ShortcutRegistry>) -> Result<Self> {
        // Editors replace files by rename, so watch the directory rather than the file
        let directory = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();
        std::fs::create_dir_all(&directory)
            .with_context(|| format!("Failed to create bindings directory: {}", directory.display()))?;

        let target = path.to_path_buf();
        let callback_target = target.clone();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) if is_store_event(&event, &callback_target) => {
                if let Err(e) = reload(&callback_target, &registry) {
                    tracing::warn!("Keeping previous bindings: {:#}", e);
                }
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("Bindings watcher error: {}", e),
        })
        .context("Failed to create bindings watcher")?;

        watcher
            .watch(&directory, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch {}", directory.display()))?;

        tracing::debug!("Watching {} for binding changes", target.display());
        Ok(Self {
            _watcher: watcher,
            path: target,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn is_store_event(event: &Event, target: &Path) -> bool {
    matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
        && event
            .paths
            .iter()
            .any(|p| p.file_name().is_some() && p.file_name() == target.file_name())
}

/// Re-reads the store and replaces the registry contents. Returns the indexed count.
pub(crate) fn reload(path: &Path, registry: &ShortcutRegistry) -> Result<usize> {
    let store = BindingStore::open(path)?;
    let count = registry.load_all(store.bindings().iter().cloned());
    tracing::info!("Reloaded {} shortcuts from {}", count, path.display());
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind, RemoveKind};
    use std::fs;
    use tempfile::TempDir;

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn test_is_store_event_matches_file_name() {
        let target = Path::new("/cfg/hotswitch/bindings.toml");

        assert!(is_store_event(
            &event(EventKind::Modify(ModifyKind::Any), "/cfg/hotswitch/bindings.toml"),
            target
        ));
        assert!(is_store_event(
            &event(EventKind::Create(CreateKind::File), "/cfg/hotswitch/bindings.toml"),
            target
        ));
        assert!(!is_store_event(
            &event(EventKind::Modify(ModifyKind::Any), "/cfg/hotswitch/config.toml"),
            target
        ));
        assert!(!is_store_event(
            &event(EventKind::Remove(RemoveKind::File), "/cfg/hotswitch/bindings.toml"),
            target
        ));
    }

    #[test]
    fn test_reload_replaces_registry() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bindings.toml");
        fs::write(
            &path,
            "[[binding]]\napplication_id = \"A\"\nshortcut = \"Cmd+1\"\n\n[[binding]]\napplication_id = \"B\"\nshortcut = \"Cmd+2\"\n",
        )
        .unwrap();

        let registry = ShortcutRegistry::new();
        registry.load_all([crate::registry::Binding::new("old")
            .with_shortcut(crate::keys::Shortcut::parse("Cmd+9").unwrap())]);

        assert_eq!(reload(&path, &registry).unwrap(), 2);
        assert!(registry.lookup("Cmd+9").is_none());
        assert_eq!(registry.lookup("Cmd+2").unwrap().application_id, "B");
    }

    #[test]
    fn test_reload_keeps_registry_on_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bindings.toml");
        fs::write(&path, "[[binding]]\nshortcut = 3\n").unwrap();

        let registry = ShortcutRegistry::new();
        registry.load_all([crate::registry::Binding::new("A")
            .with_shortcut(crate::keys::Shortcut::parse("Cmd+1").unwrap())]);

        assert!(reload(&path, &registry).is_err());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_spawn_watches_directory() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bindings.toml");
        let watcher = StoreWatcher::spawn(&path, Arc::new(ShortcutRegistry::new())).unwrap();
        assert_eq!(watcher.path(), path.as_path());
    }
}

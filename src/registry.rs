// ABOUTME: Conflict-free index from canonical shortcut to bound application
// ABOUTME: A rebuildable cache of the binding store, guarded for single-writer/many-reader access

use crate::error::{Error, Result};
use crate::keys::Shortcut;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

fn default_launch_on_invoke() -> bool {
    true
}

/// One configured shortcut entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub application_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Shortcut::is_unset")]
    pub shortcut: Shortcut,
    #[serde(default = "default_launch_on_invoke")]
    pub launch_on_invoke: bool,
    #[serde(default)]
    pub toggle_on_invoke: bool,
}

impl Binding {
    /// A freshly selected application: no key yet, launches when invoked, never hides.
    pub fn new(application_id: impl Into<String>) -> Self {
        Self {
            application_id: application_id.into(),
            name: None,
            shortcut: Shortcut::unset(),
            launch_on_invoke: true,
            toggle_on_invoke: false,
        }
    }

    pub fn with_shortcut(mut self, shortcut: Shortcut) -> Self {
        self.shortcut = shortcut;
        self
    }

    pub fn with_launch_on_invoke(mut self, enabled: bool) -> Self {
        self.launch_on_invoke = enabled;
        self
    }

    pub fn with_toggle_on_invoke(mut self, enabled: bool) -> Self {
        self.toggle_on_invoke = enabled;
        self
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.application_id)
    }
}

#[derive(Debug, Default)]
pub struct ShortcutRegistry {
    index: RwLock<HashMap<Shortcut, Binding>>,
}

impl ShortcutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole index. Returns the number of indexed bindings.
    pub fn load_all<I>(&self, bindings: I) -> usize
    where
        I: IntoIterator<Item = Binding>,
    {
        let mut index = HashMap::new();
        for binding in bindings {
            if binding.shortcut.is_unset() {
                continue;
            }
            if let Some(previous) = index.insert(binding.shortcut.clone(), binding) {
                tracing::warn!(
                    shortcut = %previous.shortcut,
                    replaced = %previous.application_id,
                    "duplicate shortcut in stored bindings; keeping the later entry"
                );
            }
        }

        let count = index.len();
        *self.index.write() = index;
        tracing::debug!("Shortcut index rebuilt with {} bindings", count);
        count
    }

    /// Conflict pre-check. Does not mutate the index.
    pub fn try_assign(&self, application_id: &str, proposed: &Shortcut) -> bool {
        self.check_assign(application_id, proposed).is_ok()
    }

    pub fn check_assign(&self, application_id: &str, proposed: &Shortcut) -> Result<()> {
        if proposed.is_unset() {
            return Ok(());
        }
        match self.index.read().get(proposed) {
            Some(existing) if existing.application_id != application_id => Err(Error::Conflict {
                shortcut: proposed.clone(),
                owner: existing.application_id.clone(),
            }),
            _ => Ok(()),
        }
    }

    pub fn upsert(&self, binding: Binding) {
        if binding.shortcut.is_unset() {
            tracing::debug!("Not indexing {}: no shortcut assigned", binding.application_id);
            return;
        }

        let mut index = self.index.write();
        if let Some(existing) = index.get(&binding.shortcut) {
            if existing.application_id != binding.application_id {
                tracing::warn!(
                    shortcut = %binding.shortcut,
                    previous = %existing.application_id,
                    next = %binding.application_id,
                    "upsert replaced a binding owned by another application"
                );
            }
        }
        index.insert(binding.shortcut.clone(), binding);
    }

    /// Removes the entry for `binding.shortcut` only while it still belongs to the same application.
    pub fn remove(&self, binding: &Binding) -> bool {
        if binding.shortcut.is_unset() {
            return false;
        }

        let mut index = self.index.write();
        match index.get(&binding.shortcut) {
            Some(existing) if existing.application_id == binding.application_id => {
                index.remove(&binding.shortcut);
                true
            }
            Some(existing) => {
                tracing::debug!(
                    "Ignoring stale removal of {} for {}: now owned by {}",
                    binding.shortcut,
                    binding.application_id,
                    existing.application_id
                );
                false
            }
            None => false,
        }
    }

    pub fn lookup(&self, shortcut: &str) -> Option<Binding> {
        self.index.read().get(shortcut).cloned()
    }

    pub fn len(&self) -> usize {
        self.index.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.read().is_empty()
    }

    /// Copy of every indexed binding, ordered by shortcut.
    pub fn snapshot(&self) -> Vec<Binding> {
        let mut bindings: Vec<Binding> = self.index.read().values().cloned().collect();
        bindings.sort_by(|a, b| a.shortcut.cmp(&b.shortcut));
        bindings
    }
}

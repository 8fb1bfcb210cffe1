// ABOUTME: Durable list of configured bindings kept in a TOML file of [[binding]] tables
// ABOUTME: Every edit that touches a shortcut keeps the in-memory registry consistent

mod watcher;

pub use watcher::StoreWatcher;

use crate::error::Error;
use crate::keys::Shortcut;
use crate::registry::{Binding, ShortcutRegistry};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize, Serialize)]
struct BindingFile {
    #[serde(default, rename = "binding")]
    bindings: Vec<Binding>,
}

#[derive(Debug)]
pub struct BindingStore {
    path: PathBuf,
    bindings: Vec<Binding>,
}

impl BindingStore {
    /// Reads the store at `path`. A missing file is an empty store.
    pub fn open(path: &Path) -> Result<Self> {
        let bindings = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read bindings file: {}", path.display()))?;
            parse_bindings(&content)
                .with_context(|| format!("Failed to parse bindings file: {}", path.display()))?
        } else {
            tracing::debug!("No bindings file at {}; starting empty", path.display());
            Vec::new()
        };

        Ok(Self {
            path: path.to_path_buf(),
            bindings,
        })
    }

    pub fn load_from_str(path: &Path, content: &str) -> Result<Self> {
        Ok(Self {
            path: path.to_path_buf(),
            bindings: parse_bindings(content)?,
        })
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create bindings directory: {}", parent.display()))?;
        }

        let file = BindingFile {
            bindings: self.bindings.clone(),
        };
        let content = toml::to_string_pretty(&file).context("Failed to serialize bindings")?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write bindings file: {}", self.path.display()))?;

        tracing::debug!("Saved {} bindings to {}", self.bindings.len(), self.path.display());
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn get(&self, application_id: &str) -> Option<&Binding> {
        self.bindings.iter().find(|b| b.application_id == application_id)
    }

    /// Adds an application without a shortcut. Returns false if it is already present.
    pub fn add_application(&mut self, application_id: &str, name: Option<String>) -> bool {
        if self.get(application_id).is_some() {
            return false;
        }
        let mut binding = Binding::new(application_id);
        binding.name = name;
        self.bindings.push(binding);
        true
    }

    /// Binds `shortcut` to the application, rejecting shortcuts owned by another application.
    pub fn assign_shortcut(
        &mut self,
        registry: &ShortcutRegistry,
        application_id: &str,
        shortcut: Shortcut,
    ) -> crate::Result<()> {
        registry.check_assign(application_id, &shortcut)?;

        let binding = self.get_mut(application_id)?;
        let previous = binding.clone();
        binding.shortcut = shortcut;
        let updated = binding.clone();

        registry.remove(&previous);
        registry.upsert(updated);
        Ok(())
    }

    pub fn clear_shortcut(
        &mut self,
        registry: &ShortcutRegistry,
        application_id: &str,
    ) -> crate::Result<()> {
        let binding = self.get_mut(application_id)?;
        registry.remove(binding);
        binding.shortcut = Shortcut::unset();
        Ok(())
    }

    pub fn set_launch_on_invoke(
        &mut self,
        registry: &ShortcutRegistry,
        application_id: &str,
        enabled: bool,
    ) -> crate::Result<()> {
        let binding = self.get_mut(application_id)?;
        binding.launch_on_invoke = enabled;
        refresh_owned(registry, binding);
        Ok(())
    }

    pub fn set_toggle_on_invoke(
        &mut self,
        registry: &ShortcutRegistry,
        application_id: &str,
        enabled: bool,
    ) -> crate::Result<()> {
        let binding = self.get_mut(application_id)?;
        binding.toggle_on_invoke = enabled;
        refresh_owned(registry, binding);
        Ok(())
    }

    pub fn remove_application(
        &mut self,
        registry: &ShortcutRegistry,
        application_id: &str,
    ) -> crate::Result<Binding> {
        let position = self
            .bindings
            .iter()
            .position(|b| b.application_id == application_id)
            .ok_or_else(|| Error::UnknownApplication(application_id.to_string()))?;
        let binding = self.bindings.remove(position);
        registry.remove(&binding);
        Ok(binding)
    }

    fn get_mut(&mut self, application_id: &str) -> crate::Result<&mut Binding> {
        self.bindings
            .iter_mut()
            .find(|b| b.application_id == application_id)
            .ok_or_else(|| Error::UnknownApplication(application_id.to_string()))
    }
}

/// Re-indexes a binding after a flag change, unless another application owns its shortcut.
fn refresh_owned(registry: &ShortcutRegistry, binding: &Binding) {
    if registry.try_assign(&binding.application_id, &binding.shortcut) {
        registry.upsert(binding.clone());
    } else {
        tracing::debug!(
            "{} is bound to {}, which is indexed for another application",
            binding.application_id,
            binding.shortcut
        );
    }
}

pub(crate) fn parse_bindings(content: &str) -> Result<Vec<Binding>> {
    let file: BindingFile = toml::from_str(content).context("Failed to parse bindings")?;
    Ok(file.bindings)
}

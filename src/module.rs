//! Module identity and project-scoped registry lookup

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::lifecycle::LifecycleBus;
use crate::registry::BuildConfigRegistry;

/// Unique identifier of a module within a project.
///
/// Identity, not ownership: dependency entries and registries hold module
/// ids, never the module records themselves.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(String);

impl ModuleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModuleId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// What a module is for. Only buildable modules carry a configuration
/// registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleKind {
    /// Produces build outputs; owns a [`BuildConfigRegistry`]
    Buildable,
    /// Grouping or data-only module with no build step
    Plain,
}

struct ModuleEntry {
    kind: ModuleKind,
    build_configs: Option<BuildConfigRegistry>,
}

/// Project context: the module table and the lifecycle bus.
///
/// Registries are looked up through the project a caller already holds;
/// there is no process-wide locator.
pub struct Project {
    bus: LifecycleBus,
    modules: Arc<RwLock<BTreeMap<ModuleId, ModuleEntry>>>,
}

impl Project {
    pub fn new() -> Self {
        Self {
            bus: LifecycleBus::new(),
            modules: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// The project-wide lifecycle bus
    pub fn bus(&self) -> &LifecycleBus {
        &self.bus
    }

    /// Register a module. A buildable module gets a registry seeded with one
    /// default configuration and subscribed to the bus; re-registering an id
    /// replaces the previous record.
    pub fn add_module(&self, id: ModuleId, kind: ModuleKind) {
        let build_configs = match kind {
            ModuleKind::Buildable => Some(BuildConfigRegistry::new(id.clone(), &self.bus)),
            ModuleKind::Plain => None,
        };
        self.modules
            .write()
            .insert(id, ModuleEntry { kind, build_configs });
    }

    pub fn contains_module(&self, id: &ModuleId) -> bool {
        self.modules.read().contains_key(id)
    }

    pub fn module_kind(&self, id: &ModuleId) -> Option<ModuleKind> {
        self.modules.read().get(id).map(|entry| entry.kind)
    }

    /// Module ids currently registered, in order
    pub fn module_ids(&self) -> Vec<ModuleId> {
        self.modules.read().keys().cloned().collect()
    }

    /// Look up the registry bound to a module.
    ///
    /// # Errors
    /// [`ConfigError::UnknownModule`] if the id is not registered,
    /// [`ConfigError::NotBuildable`] if the module has no build step.
    pub fn build_configs(&self, id: &ModuleId) -> Result<BuildConfigRegistry> {
        let modules = self.modules.read();
        let entry = modules
            .get(id)
            .ok_or_else(|| ConfigError::UnknownModule { module: id.clone() })?;
        entry
            .build_configs
            .clone()
            .ok_or_else(|| ConfigError::NotBuildable { module: id.clone() })
    }

    /// Remove a module. Subscribers observe the before-removed event while
    /// the module is still registered; afterwards the record and its
    /// registry are dropped.
    pub fn remove_module(&self, id: &ModuleId) {
        self.bus.notify_before_module_removed(id);
        self.modules.write().remove(id);
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Project")
            .field("modules", &self.modules.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_rejects_unknown_module() {
        let project = Project::new();
        let result = project.build_configs(&ModuleId::new("ghost"));
        assert!(matches!(result, Err(ConfigError::UnknownModule { .. })));
    }

    #[test]
    fn test_lookup_rejects_plain_module() {
        let project = Project::new();
        project.add_module(ModuleId::new("docs"), ModuleKind::Plain);
        let result = project.build_configs(&ModuleId::new("docs"));
        assert!(matches!(result, Err(ConfigError::NotBuildable { .. })));
    }

    #[test]
    fn test_buildable_module_gets_a_registry() {
        let project = Project::new();
        project.add_module(ModuleId::new("core"), ModuleKind::Buildable);

        let registry = project.build_configs(&ModuleId::new("core")).unwrap();
        assert_eq!(registry.owner(), &ModuleId::new("core"));
        assert_eq!(registry.configurations().len(), 1);
    }

    #[test]
    fn test_remove_module_forgets_the_record() {
        let project = Project::new();
        project.add_module(ModuleId::new("core"), ModuleKind::Buildable);
        assert!(project.contains_module(&ModuleId::new("core")));

        project.remove_module(&ModuleId::new("core"));
        assert!(!project.contains_module(&ModuleId::new("core")));
    }
}

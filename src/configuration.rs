//! Build configuration records

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::dependency::DependencyEntry;
use crate::module::{ModuleId, Project};
use crate::options::CompilerOptions;

/// Name of a configuration created from nothing: a brand-new module, or a
/// persisted state with no configurations yet.
pub const DEFAULT_CONFIGURATION_NAME: &str = "Unnamed";

/// Platform a configuration builds for. Pass-through: the registry stores
/// it but never interprets it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetPlatform {
    #[default]
    Desktop,
    Web,
    Embedded,
}

/// A named bundle of dependencies and build settings producing one output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfiguration {
    /// Non-empty and unique among the sibling configurations of one module.
    /// Enforced when a whole set is installed, not at construction.
    pub name: String,
    /// Resolution order matters and is preserved by every operation.
    #[serde(default)]
    pub dependencies: Vec<DependencyEntry>,
    #[serde(default)]
    pub target_platform: TargetPlatform,
    /// Artifact file name; empty means "derive from the module name".
    #[serde(default)]
    pub output_name: String,
    #[serde(default)]
    pub skip_build: bool,
    #[serde(default)]
    pub compiler_options: CompilerOptions,
}

impl Default for BuildConfiguration {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIGURATION_NAME)
    }
}

impl BuildConfiguration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dependencies: Vec::new(),
            target_platform: TargetPlatform::default(),
            output_name: String::new(),
            skip_build: false,
            compiler_options: CompilerOptions::new(),
        }
    }

    /// Append a dependency entry
    pub fn with_dependency(mut self, entry: DependencyEntry) -> Self {
        self.dependencies.push(entry);
        self
    }

    /// Drop every cross-module reference pointing at `module`, keeping
    /// survivor order.
    pub(crate) fn remove_dependencies_on(&mut self, module: &ModuleId) {
        self.dependencies
            .retain(|entry| !entry.references_module(module));
    }

    /// Post-load wiring: check cross-module references against the
    /// project's module table. Dangling references are reported, never
    /// removed; pruning belongs to the lifecycle cleanup path.
    pub fn initialize(&self, project: &Project) {
        for entry in &self.dependencies {
            if let Some(target) = entry.target_module() {
                if !project.contains_module(target) {
                    warn!(
                        configuration = %self.name,
                        module = %target,
                        "Dependency references an unknown module"
                    );
                }
            }
        }
    }
}

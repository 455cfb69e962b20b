//! Build Configuration Registry
//!
//! Owns the ordered configuration set of one module: validates bulk
//! replacements, prunes dangling cross-module references when another
//! module is removed, and round-trips the whole set through plain-data
//! snapshots.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use tracing::{debug, error};

use crate::configuration::BuildConfiguration;
use crate::error::{ConfigError, Result};
use crate::lifecycle::{LifecycleBus, Subscription};
use crate::module::{ModuleId, Project};
use crate::options::CompilerOptions;
use crate::snapshot::RegistrySnapshot;

struct RegistryState {
    configurations: Vec<BuildConfiguration>,
    module_options: CompilerOptions,
}

/// The build configuration registry of a single module.
///
/// The set is never empty after a successful operation: a fresh registry
/// starts with one default configuration, and an empty persisted state is
/// padded the same way on restore.
///
/// Handles are cheap clones over shared state, so the project table,
/// lifecycle subscribers and callers can hold one simultaneously. Mutation
/// still follows the project's single-writer discipline; the internal lock
/// makes event delivery sound, it does not arbitrate concurrent writers.
#[derive(Clone)]
pub struct BuildConfigRegistry {
    owner: ModuleId,
    state: Arc<RwLock<RegistryState>>,
    _subscription: Arc<Subscription>,
}

impl BuildConfigRegistry {
    /// Create the registry for `owner`, seeded with one default
    /// configuration, and subscribe it to `bus`.
    ///
    /// The handler holds only a weak reference to registry state and the
    /// subscription handle is dropped with the last registry clone, so
    /// delivery stops when the registry goes away.
    pub fn new(owner: ModuleId, bus: &LifecycleBus) -> Self {
        let state = Arc::new(RwLock::new(RegistryState {
            configurations: vec![BuildConfiguration::default()],
            module_options: CompilerOptions::new(),
        }));

        let weak = Arc::downgrade(&state);
        let handler_owner = owner.clone();
        let subscription = bus.on_before_module_removed(move |removed| {
            // Removal of the owner itself is signalled by dropping the
            // registry, not handled here.
            if *removed == handler_owner {
                return;
            }
            if let Some(state) = weak.upgrade() {
                remove_dependencies_on(&mut state.write(), removed);
            }
        });

        Self {
            owner,
            state,
            _subscription: Arc::new(subscription),
        }
    }

    /// The module this registry belongs to
    pub fn owner(&self) -> &ModuleId {
        &self.owner
    }

    /// Current configurations, as an independent copy.
    ///
    /// Callers may iterate or mutate the result freely; registry state only
    /// changes through [`Self::set_configurations`],
    /// [`Self::remove_dependencies_on`] and [`Self::restore`].
    pub fn configurations(&self) -> Vec<BuildConfiguration> {
        self.state.read().configurations.clone()
    }

    /// Module-wide default compiler options, as an independent copy
    pub fn module_options(&self) -> CompilerOptions {
        self.state.read().module_options.clone()
    }

    /// Replace the module-wide default compiler options
    pub fn set_module_options(&self, options: CompilerOptions) {
        self.state.write().module_options = options;
    }

    /// Atomically replace the whole configuration set.
    ///
    /// The input passes through validation: empty names are reported,
    /// duplicate names are reported and collapsed (the later entry wins, in
    /// the earlier entry's position). Nothing is installed on error.
    ///
    /// # Errors
    /// [`ConfigError::EmptyConfigurationSet`] if `configurations` is empty.
    pub fn set_configurations(&self, configurations: Vec<BuildConfiguration>) -> Result<()> {
        if configurations.is_empty() {
            return Err(ConfigError::EmptyConfigurationSet);
        }
        let validated = validated_configurations(configurations);
        self.state.write().configurations = validated;
        Ok(())
    }

    /// Drop every cross-module reference to `removed` from every
    /// configuration, in place.
    ///
    /// Survivor order is preserved; calling this twice, or for a module
    /// nothing references, is a no-op.
    pub fn remove_dependencies_on(&self, removed: &ModuleId) {
        remove_dependencies_on(&mut self.state.write(), removed);
    }

    /// Capture the current state as a plain-data snapshot.
    pub fn to_snapshot(&self) -> RegistrySnapshot {
        let state = self.state.read();
        RegistrySnapshot {
            configurations: state.configurations.clone(),
            module_options: state.module_options.clone(),
            taken_at: Some(Utc::now()),
        }
    }

    /// Install state from a snapshot.
    ///
    /// An empty configuration collection is a normal first-run state and
    /// resets the set to one fresh default configuration. A non-empty
    /// collection passes through the same validation as
    /// [`Self::set_configurations`]; each surviving configuration is
    /// initialized against `project` before install. Module options are
    /// always replaced by a copy of the snapshot's options.
    pub fn restore(&self, snapshot: &RegistrySnapshot, project: &Project) {
        let configurations = if snapshot.configurations.is_empty() {
            debug!(module = %self.owner, "No persisted configurations, seeding default");
            vec![BuildConfiguration::default()]
        } else {
            let validated = validated_configurations(snapshot.configurations.iter().cloned());
            for configuration in &validated {
                configuration.initialize(project);
            }
            validated
        };

        let mut state = self.state.write();
        state.configurations = configurations;
        state.module_options = snapshot.module_options.clone();
    }
}

impl fmt::Debug for BuildConfigRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildConfigRegistry")
            .field("owner", &self.owner)
            .field("configurations", &self.state.read().configurations.len())
            .finish()
    }
}

fn remove_dependencies_on(state: &mut RegistryState, removed: &ModuleId) {
    // TODO: also prune "optimize for" links once they are modeled
    for configuration in &mut state.configurations {
        configuration.remove_dependencies_on(removed);
    }
}

/// Single choke point for every path that installs a configuration set.
///
/// Input order is kept. An empty name is reported and the entry kept; a
/// duplicate name is reported and overwrites the earlier entry in the
/// earlier entry's position, so the later payload wins without reordering.
fn validated_configurations(
    configurations: impl IntoIterator<Item = BuildConfiguration>,
) -> Vec<BuildConfiguration> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut validated: Vec<BuildConfiguration> = Vec::new();

    for configuration in configurations {
        if configuration.name.is_empty() {
            error!("Empty build configuration name");
        }
        match positions.entry(configuration.name.clone()) {
            Entry::Occupied(slot) => {
                error!(name = %configuration.name, "Duplicate build configuration name");
                validated[*slot.get()] = configuration;
            }
            Entry::Vacant(slot) => {
                slot.insert(validated.len());
                validated.push(configuration);
            }
        }
    }

    validated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::DEFAULT_CONFIGURATION_NAME;

    fn registry() -> (LifecycleBus, BuildConfigRegistry) {
        let bus = LifecycleBus::new();
        let registry = BuildConfigRegistry::new(ModuleId::new("app"), &bus);
        (bus, registry)
    }

    #[test]
    fn test_new_registry_seeds_one_default_configuration() {
        let (_bus, registry) = registry();
        let configurations = registry.configurations();
        assert_eq!(configurations.len(), 1);
        assert_eq!(configurations[0].name, DEFAULT_CONFIGURATION_NAME);
        assert!(registry.module_options().is_empty());
    }

    #[test]
    fn test_bulk_replace_rejects_empty_set() {
        let (_bus, registry) = registry();
        registry
            .set_configurations(vec![BuildConfiguration::new("Debug")])
            .unwrap();

        let result = registry.set_configurations(Vec::new());
        assert!(matches!(result, Err(ConfigError::EmptyConfigurationSet)));

        // Nothing was installed.
        let configurations = registry.configurations();
        assert_eq!(configurations.len(), 1);
        assert_eq!(configurations[0].name, "Debug");
    }

    #[test]
    fn test_duplicate_name_later_entry_wins_in_first_position() {
        let mut first = BuildConfiguration::new("x");
        first.output_name = "first.out".into();
        let mut second = BuildConfiguration::new("x");
        second.output_name = "second.out".into();

        let validated =
            validated_configurations(vec![first, BuildConfiguration::new("y"), second]);

        assert_eq!(validated.len(), 2);
        assert_eq!(validated[0].name, "x");
        assert_eq!(validated[0].output_name, "second.out");
        assert_eq!(validated[1].name, "y");
    }

    #[test]
    fn test_validated_names_are_distinct() {
        let validated = validated_configurations(vec![
            BuildConfiguration::new("a"),
            BuildConfiguration::new("b"),
            BuildConfiguration::new("a"),
            BuildConfiguration::new("c"),
            BuildConfiguration::new("b"),
        ]);

        let names: Vec<&str> = validated.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_name_is_kept_after_validation() {
        let validated = validated_configurations(vec![
            BuildConfiguration::new(""),
            BuildConfiguration::new("Debug"),
        ]);
        assert_eq!(validated.len(), 2);
        assert_eq!(validated[0].name, "");
    }

    #[test]
    fn test_registry_drop_releases_subscription() {
        let (bus, registry) = registry();
        assert_eq!(bus.subscriber_count(), 1);

        let clone = registry.clone();
        drop(registry);
        assert_eq!(bus.subscriber_count(), 1);

        drop(clone);
        assert_eq!(bus.subscriber_count(), 0);
    }
}

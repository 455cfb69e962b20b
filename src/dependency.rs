//! Dependency entries

use serde::{Deserialize, Serialize};

use crate::module::ModuleId;

/// How a dependency is linked into the build output. Pass-through: the
/// registry stores it but never interprets it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Linkage {
    #[default]
    Required,
    Optional,
}

/// A single entry in a configuration's dependency list.
///
/// The set of kinds is closed. Cleanup after a module removal only inspects
/// [`DependencyEntry::ModuleReference`]; the other kinds are opaque build
/// inputs passed through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DependencyEntry {
    /// Reference to another module, optionally to one of its named
    /// configurations. Must not point back at the owning module.
    ModuleReference {
        module: ModuleId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        configuration: Option<String>,
        #[serde(default)]
        linkage: Linkage,
    },
    /// A library artifact on disk
    Library {
        path: String,
        #[serde(default)]
        linkage: Linkage,
    },
    /// A toolchain SDK referenced by name
    Sdk {
        name: String,
        #[serde(default)]
        linkage: Linkage,
    },
}

impl DependencyEntry {
    /// A required reference to another module's active configuration
    pub fn module_reference(module: ModuleId) -> Self {
        Self::ModuleReference {
            module,
            configuration: None,
            linkage: Linkage::default(),
        }
    }

    /// A required reference to one named configuration of another module
    pub fn module_configuration(module: ModuleId, configuration: impl Into<String>) -> Self {
        Self::ModuleReference {
            module,
            configuration: Some(configuration.into()),
            linkage: Linkage::default(),
        }
    }

    /// Whether this entry is a cross-module reference to `module`
    pub fn references_module(&self, module: &ModuleId) -> bool {
        matches!(self, Self::ModuleReference { module: target, .. } if target == module)
    }

    /// The referenced module, for cross-module entries
    pub fn target_module(&self) -> Option<&ModuleId> {
        match self {
            Self::ModuleReference { module, .. } => Some(module),
            _ => None,
        }
    }

    pub fn linkage(&self) -> Linkage {
        match self {
            Self::ModuleReference { linkage, .. }
            | Self::Library { linkage, .. }
            | Self::Sdk { linkage, .. } => *linkage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_references_module_matches_target_only() {
        let entry = DependencyEntry::module_reference(ModuleId::new("core"));
        assert!(entry.references_module(&ModuleId::new("core")));
        assert!(!entry.references_module(&ModuleId::new("ui")));

        let library = DependencyEntry::Library {
            path: "libs/core.a".into(),
            linkage: Linkage::Required,
        };
        assert!(!library.references_module(&ModuleId::new("core")));
    }

    #[test]
    fn test_serialized_form_is_kind_tagged() {
        let entry = DependencyEntry::module_configuration(ModuleId::new("core"), "Release");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["kind"], "module_reference");
        assert_eq!(json["module"], "core");
        assert_eq!(json["configuration"], "Release");
    }

    #[test]
    fn test_linkage_defaults_to_required() {
        let entry: DependencyEntry =
            serde_json::from_str(r#"{"kind": "sdk", "name": "wasm-1.0"}"#).unwrap();
        assert_eq!(entry.linkage(), Linkage::Required);
    }
}

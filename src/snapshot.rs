//! Persisted registry state

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::configuration::BuildConfiguration;
use crate::error::Result;
use crate::options::CompilerOptions;

/// Plain-data form of a registry's state.
///
/// Shape stability matters for previously persisted data: every field
/// defaults, so an absent or empty `configurations` collection deserializes
/// to "no configurations yet" rather than an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    #[serde(default)]
    pub configurations: Vec<BuildConfiguration>,
    #[serde(default)]
    pub module_options: CompilerOptions,
    /// When the snapshot was taken. Metadata only: excluded from the digest
    /// and not part of observable registry state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taken_at: Option<DateTime<Utc>>,
}

/// Digest input: the observable payload without metadata.
#[derive(Serialize)]
struct DigestView<'a> {
    configurations: &'a [BuildConfiguration],
    module_options: &'a CompilerOptions,
}

impl RegistrySnapshot {
    pub fn is_empty(&self) -> bool {
        self.configurations.is_empty()
    }

    /// SHA-256 hex fingerprint of the canonical JSON payload.
    ///
    /// Stable across `taken_at` changes; differs after any change to the
    /// configurations or options. Hosts may store it next to the snapshot
    /// and compare on load; a mismatch is theirs to report, restore never
    /// checks it.
    pub fn digest(&self) -> String {
        let view = DigestView {
            configurations: &self.configurations,
            module_options: &self.module_options,
        };
        let canonical = serde_json::to_string(&view).unwrap_or_default();
        format!("{:x}", Sha256::digest(canonical.as_bytes()))
    }

    /// Whether `expected` matches the current digest
    pub fn verify_digest(&self, expected: &str) -> bool {
        self.digest() == expected
    }

    /// Read a snapshot from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Write the snapshot to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

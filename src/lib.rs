//! Build Configuration Registry
//!
//! Manages the build configurations owned by each module of a multi-module
//! project: a named, ordered set of configuration records carrying their own
//! dependency lists and compiler options, plus one module-wide default
//! options record.
//!
//! ## Features
//!
//! - **Validated Replacement**: every path that installs a configuration set
//!   funnels through one validation pass (non-empty names, last-wins
//!   de-duplication, stable order)
//! - **Lifecycle Cleanup**: each registry subscribes to module-removal
//!   events and prunes dangling cross-module references in place
//! - **Snapshot Persistence**: plain-data snapshots round-trip the whole set
//!   under the same validation, with SHA-256 digests for integrity checks
//! - **Scoped Subscriptions**: bus handlers live exactly as long as the
//!   registry that registered them
//!
//! ## Architecture
//!
//! ```text
//! Project
//! ├── LifecycleBus ─── "module about to be removed" ──┐
//! └── module table                                    │
//!     ├── core  (buildable) ── BuildConfigRegistry ◄──┤
//!     │                          ├── [Debug, Release] │
//!     │                          └── module options   │
//!     ├── ui    (buildable) ── BuildConfigRegistry ◄──┘
//!     └── docs  (plain)
//! ```

pub mod configuration;
pub mod dependency;
pub mod error;
pub mod lifecycle;
pub mod module;
pub mod options;
pub mod registry;
pub mod snapshot;

pub use configuration::{BuildConfiguration, TargetPlatform, DEFAULT_CONFIGURATION_NAME};
pub use dependency::{DependencyEntry, Linkage};
pub use error::{ConfigError, Result};
pub use lifecycle::{LifecycleBus, Subscription};
pub use module::{ModuleId, ModuleKind, Project};
pub use options::CompilerOptions;
pub use registry::BuildConfigRegistry;
pub use snapshot::RegistrySnapshot;

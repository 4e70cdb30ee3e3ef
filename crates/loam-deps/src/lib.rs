//! Loam Runtime Host Dependency Resolution
//!
//! This crate resolves, for a running Loam application, the concrete set of
//! platform-specific files its deps manifest (`<app>.deps.json`) declares,
//! including:
//! - Per-target asset extraction (runtime, resources, native)
//! - RID fallback graph construction and compatibility search
//! - Host platform identity probing
//! - Reconciliation of library metadata into ordered dependency entries

pub mod asset;
pub mod extract;
pub mod manifest;
pub mod platform;
pub mod resolver;
pub mod rid;
pub mod version;

pub use asset::{Asset, AssetCategory, ResolvedEntry};
pub use extract::{RidTargetAssets, TargetAssets};
pub use manifest::{DepsError, DepsManifest};
pub use resolver::{perform_rid_fallback, RidResolutionOptions};
pub use rid::RidFallbackGraph;
pub use version::{Version, VersionError};

//! Deps manifest loading and reconciliation
//!
//! A [`DepsManifest`] is loaded once per manifest path. A missing file is a
//! valid, empty manifest; a file that exists but cannot be parsed refuses to
//! load, so an unusable manifest can never be queried. Loading extracts the
//! per-target assets, collapses RID buckets to the host's best match, and
//! reconciles the `libraries` metadata into the final ordered entry list.

use crate::asset::{strip_native_image_suffix, Asset, AssetCategory, ResolvedEntry};
use crate::extract::{
    extract_rid_target_assets, extract_target_assets, RidTargetAssets, TargetAssets,
};
use crate::resolver::{perform_rid_fallback, RidResolutionOptions};
use crate::rid::RidFallbackGraph;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that make a deps manifest unusable
#[derive(Debug, Error)]
pub enum DepsError {
    /// Manifest exists but could not be read
    #[error("Failed to read deps manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Manifest is not valid JSON
    #[error("Failed to parse deps manifest {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Manifest root is not a JSON object
    #[error("Deps manifest {path} does not have an object at the root")]
    InvalidRoot { path: PathBuf },
}

/// A loaded deps manifest with its resolved dependency entries
#[derive(Debug, Clone)]
pub struct DepsManifest {
    path: PathBuf,
    file_name: String,
    exists: bool,
    assets: TargetAssets,
    rid_assets: RidTargetAssets,
    entries: [Vec<ResolvedEntry>; AssetCategory::COUNT],
    rid_fallback_graph: Option<RidFallbackGraph>,
}

impl DepsManifest {
    /// Load a framework-dependent application manifest
    ///
    /// Consults both the generic per-target assets and the RID-specific
    /// `runtimeTargets` declarations, resolving the latter against the host
    /// platform per `options`.
    pub fn load_framework_dependent(
        path: impl AsRef<Path>,
        options: &RidResolutionOptions,
    ) -> Result<Self, DepsError> {
        Self::load(path.as_ref(), true, options)
    }

    /// Load a self-contained application manifest
    ///
    /// Only the generic per-target assets are consulted. The manifest's own
    /// `runtimes` section is harvested into a fallback graph, available from
    /// [`DepsManifest::rid_fallback_graph`] for later loads to share.
    pub fn load_self_contained(path: impl AsRef<Path>) -> Result<Self, DepsError> {
        Self::load(path.as_ref(), false, &RidResolutionOptions::new())
    }

    fn load(
        path: &Path,
        framework_dependent: bool,
        options: &RidResolutionOptions,
    ) -> Result<Self, DepsError> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut manifest = DepsManifest {
            path: path.to_path_buf(),
            file_name,
            exists: false,
            assets: TargetAssets::default(),
            rid_assets: RidTargetAssets::default(),
            entries: Default::default(),
            rid_fallback_graph: None,
        };

        if !path.exists() {
            // A missing manifest is valid and empty
            info!("deps manifest does not exist at [{}]", path.display());
            return Ok(manifest);
        }
        manifest.exists = true;

        let text = fs::read_to_string(path).map_err(|source| DepsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let doc: Value = serde_json::from_str(&text).map_err(|source| DepsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if !doc.is_object() {
            return Err(DepsError::InvalidRoot {
                path: path.to_path_buf(),
            });
        }

        let target_name = runtime_target_name(&doc);
        debug!(
            "loading deps manifest [{}]: framework_dependent={}, target={}",
            path.display(),
            framework_dependent,
            target_name
        );

        if framework_dependent {
            manifest.rid_assets = extract_rid_target_assets(&doc, &target_name);
            perform_rid_fallback(&mut manifest.rid_assets, options);
            manifest.assets = extract_target_assets(&doc, &target_name);
        } else {
            manifest.assets = extract_target_assets(&doc, &target_name);
            manifest.rid_fallback_graph = Some(RidFallbackGraph::from_document(&doc));
        }

        manifest.reconcile(&doc, framework_dependent);
        Ok(manifest)
    }

    /// Whether the manifest file existed on disk
    pub fn exists(&self) -> bool {
        self.exists
    }

    /// Path the manifest was loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolved entries for one asset category, in manifest order
    pub fn entries(&self, category: AssetCategory) -> &[ResolvedEntry] {
        &self.entries[category.index()]
    }

    /// Iterate resolved entries grouped by asset category
    pub fn entries_by_category(
        &self,
    ) -> impl Iterator<Item = (AssetCategory, &[ResolvedEntry])> {
        AssetCategory::ALL
            .iter()
            .map(move |&category| (category, self.entries(category)))
    }

    /// Fallback graph harvested from a self-contained manifest's `runtimes`
    /// section, `None` for framework-dependent loads
    pub fn rid_fallback_graph(&self) -> Option<&RidFallbackGraph> {
        self.rid_fallback_graph.as_ref()
    }

    /// Whether the library `name/version` declares at least one non-empty
    /// asset category in either the RID-specific or generic buckets
    pub fn has_package(&self, name: &str, version: &str) -> bool {
        let key = format!("{}/{}", name, version);

        if let Some(categories) = self.rid_assets.libs.get(&key) {
            if categories.iter().any(|buckets| !buckets.is_empty()) {
                return true;
            }
        }

        self.assets
            .libs
            .get(&key)
            .map(|categories| categories.iter().any(|assets| !assets.is_empty()))
            .unwrap_or(false)
    }

    /// Merge per-library metadata with the resolved asset buckets into the
    /// final entry list, preserving manifest iteration order
    fn reconcile(&mut self, doc: &Value, framework_dependent: bool) {
        let libraries = match doc.get("libraries").and_then(Value::as_object) {
            Some(libraries) => libraries,
            None => return,
        };

        let mut entries: [Vec<ResolvedEntry>; AssetCategory::COUNT] = Default::default();

        for (library, metadata) in libraries {
            debug!("reconciling library {}", library);

            if !self.library_has_assets(library, framework_dependent) {
                debug!("  no assets for library {}", library);
                continue;
            }

            let library_hash = optional_string(metadata, "sha512");
            let is_serviceable = metadata
                .get("serviceable")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            let library_path = optional_path(metadata, "path");
            let library_hash_path = optional_path(metadata, "hashPath");
            let runtime_store_manifest = optional_path(metadata, "runtimeStoreManifestName");
            let library_type = metadata
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_lowercase();

            let (library_name, library_version) = split_library_key(library);
            debug!(
                "  {}: {}, version {}",
                library_type, library_name, library_version
            );

            for category in AssetCategory::ALL {
                let (assets, is_rid_specific) =
                    self.assets_for(library, category, framework_dependent);
                if assets.is_empty() {
                    continue;
                }

                debug!("  adding {} assets", category.name());

                let bucket = &mut entries[category.index()];
                bucket.reserve(assets.len());

                for asset in assets {
                    let name = strip_native_image_suffix(&asset.name).to_string();
                    let entry = ResolvedEntry {
                        library_name: library_name.to_string(),
                        library_version: library_version.to_string(),
                        library_type: library_type.clone(),
                        library_hash: library_hash.clone(),
                        library_path: library_path.clone(),
                        library_hash_path: library_hash_path.clone(),
                        runtime_store_manifest: runtime_store_manifest.clone(),
                        category,
                        is_serviceable,
                        is_rid_specific,
                        deps_file: self.file_name.clone(),
                        asset: Asset::new(
                            name,
                            asset.relative_path.clone(),
                            asset.assembly_version,
                            asset.file_version,
                        ),
                    };

                    debug!(
                        "    entry {} for asset {}: relpath {}, assemblyVersion {}, fileVersion {}",
                        bucket.len(),
                        entry.asset.name,
                        entry.asset.relative_path,
                        entry.asset.assembly_version,
                        entry.asset.file_version
                    );

                    bucket.push(entry);
                }
            }
        }

        self.entries = entries;
    }

    fn library_has_assets(&self, library: &str, framework_dependent: bool) -> bool {
        if framework_dependent {
            self.rid_assets.has_library(library) || self.assets.has_library(library)
        } else {
            self.assets.has_library(library)
        }
    }

    /// Resolved assets for `(library, category)` and whether they came from a
    /// RID-specific bucket
    ///
    /// In framework-dependent mode the surviving RID bucket takes precedence
    /// when non-empty; the generic bucket is the fallback.
    fn assets_for(
        &self,
        library: &str,
        category: AssetCategory,
        framework_dependent: bool,
    ) -> (&[Asset], bool) {
        if framework_dependent {
            if let Some(categories) = self.rid_assets.libs.get(library) {
                let rid_assets = &categories[category.index()];
                if !rid_assets.is_empty() {
                    if let Some(assets) = rid_assets.values().next() {
                        if !assets.is_empty() {
                            return (assets, true);
                        }
                    }
                    debug!(
                        "no RID-specific {} assets for {}",
                        category.name(),
                        library
                    );
                }
            }
        }

        (self.assets.assets(library, category), false)
    }
}

/// Name of the target to resolve, from the `runtimeTarget` property
///
/// Either a string or an object carrying a `name` string; anything else
/// degrades to the empty name, making extraction a no-op.
fn runtime_target_name(doc: &Value) -> String {
    match doc.get("runtimeTarget") {
        Some(Value::String(name)) => name.clone(),
        Some(value) => value
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        None => String::new(),
    }
}

/// Split a composite `name/version` library key on the first `/`
fn split_library_key(key: &str) -> (&str, &str) {
    key.split_once('/').unwrap_or((key, ""))
}

fn optional_string(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Read an optional path property, normalized to the platform separator
fn optional_path(value: &Value, key: &str) -> String {
    let path = optional_string(value, key);
    if !path.is_empty() && std::path::MAIN_SEPARATOR != '/' {
        path.replace('/', std::path::MAIN_SEPARATOR_STR)
    } else {
        path
    }
}

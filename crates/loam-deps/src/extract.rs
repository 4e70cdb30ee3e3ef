//! Per-target asset extraction
//!
//! Walks a manifest's `targets[target_name]` section into per-library,
//! category-bucketed asset lists. Two bucket shapes exist: flat lists from
//! the generic per-target declarations, and RID-keyed lists from each
//! library's `runtimeTargets` declarations (framework-dependent mode only).
//! Structural problems are absorbed locally; a malformed entry is skipped,
//! never fatal.

use crate::asset::{file_name_without_ext, strip_native_image_suffix, Asset, AssetCategory};
use crate::version::Version;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// Flat asset buckets per library and category
#[derive(Debug, Clone, Default)]
pub struct TargetAssets {
    /// Library composite key (`name/version`) to per-category asset lists
    pub libs: HashMap<String, [Vec<Asset>; AssetCategory::COUNT]>,
}

impl TargetAssets {
    /// Whether any bucket exists for `library`
    pub fn has_library(&self, library: &str) -> bool {
        self.libs.contains_key(library)
    }

    /// Assets declared for `(library, category)`, empty when none
    pub fn assets(&self, library: &str, category: AssetCategory) -> &[Asset] {
        self.libs
            .get(library)
            .map(|categories| categories[category.index()].as_slice())
            .unwrap_or(&[])
    }
}

/// RID-keyed asset buckets per library and category
///
/// After RID resolution at most one RID survives per `(library, category)`.
#[derive(Debug, Clone, Default)]
pub struct RidTargetAssets {
    /// Library composite key to per-category RID bucket maps
    pub libs: HashMap<String, [HashMap<String, Vec<Asset>>; AssetCategory::COUNT]>,
}

impl RidTargetAssets {
    /// Whether any bucket exists for `library`
    pub fn has_library(&self, library: &str) -> bool {
        self.libs.contains_key(library)
    }
}

/// Extract the generic per-target assets for `target_name`
///
/// A missing or non-object target yields an empty result. Unrecognized
/// category names are ignored.
pub fn extract_target_assets(doc: &Value, target_name: &str) -> TargetAssets {
    let mut assets = TargetAssets::default();

    let packages = match doc
        .get("targets")
        .and_then(|targets| targets.get(target_name))
        .and_then(Value::as_object)
    {
        Some(packages) => packages,
        None => return assets,
    };

    for (library, sections) in packages {
        debug!("processing library {}", library);

        let sections = match sections.as_object() {
            Some(sections) => sections,
            None => continue,
        };

        for category in AssetCategory::ALL {
            let files = match sections.get(category.name()).and_then(Value::as_object) {
                Some(files) => files,
                None => continue,
            };

            debug!("  adding {} assets", category.name());

            let bucket = &mut assets.libs.entry(library.clone()).or_default()[category.index()];
            bucket.reserve(files.len());

            for (file_name, properties) in files {
                let assembly_version = optional_version(properties, "assemblyVersion");
                let file_version = optional_version(properties, "fileVersion");
                let asset = Asset::from_relative_path(file_name, assembly_version, file_version);

                debug!(
                    "    {} assemblyVersion={} fileVersion={}",
                    asset.relative_path, asset.assembly_version, asset.file_version
                );

                bucket.push(asset);
            }
        }
    }

    assets
}

/// Extract the RID-specific `runtimeTargets` assets for `target_name`
///
/// Entries without both a recognized `assetType` and a string `rid` are
/// skipped. A trailing `.ni` native-image marker is stripped from the
/// logical name.
pub fn extract_rid_target_assets(doc: &Value, target_name: &str) -> RidTargetAssets {
    let mut assets = RidTargetAssets::default();

    let packages = match doc
        .get("targets")
        .and_then(|targets| targets.get(target_name))
        .and_then(Value::as_object)
    {
        Some(packages) => packages,
        None => return assets,
    };

    for (library, sections) in packages {
        let runtime_targets = match sections
            .get("runtimeTargets")
            .and_then(Value::as_object)
        {
            Some(runtime_targets) => runtime_targets,
            None => continue,
        };

        debug!("processing runtimeTargets for library {}", library);

        for (file_name, properties) in runtime_targets {
            let category = match properties
                .get("assetType")
                .and_then(Value::as_str)
                .and_then(AssetCategory::from_asset_type)
            {
                Some(category) => category,
                None => continue,
            };

            let rid = match properties.get("rid").and_then(Value::as_str) {
                Some(rid) => rid,
                None => continue,
            };

            let assembly_version = optional_version(properties, "assemblyVersion");
            let file_version = optional_version(properties, "fileVersion");
            let name = strip_native_image_suffix(&file_name_without_ext(file_name)).to_string();
            let asset = Asset::new(name, file_name.clone(), assembly_version, file_version);

            debug!(
                "  {} asset: {} rid={} assemblyVersion={} fileVersion={}",
                category.name(),
                asset.relative_path,
                rid,
                asset.assembly_version,
                asset.file_version
            );

            assets.libs.entry(library.clone()).or_default()[category.index()]
                .entry(rid.to_string())
                .or_default()
                .push(asset);
        }
    }

    assets
}

fn optional_version(properties: &Value, key: &str) -> Version {
    match properties.get(key).and_then(Value::as_str) {
        Some(text) if !text.is_empty() => Version::parse(text).unwrap_or_default(),
        _ => Version::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_doc() -> Value {
        json!({
            "runtimeTarget": "loam1.0",
            "targets": {
                "loam1.0": {
                    "App.Core/1.2.0": {
                        "runtime": {
                            "lib/loam1.0/App.Core.dll": {
                                "assemblyVersion": "1.2.0.0",
                                "fileVersion": "1.2.0.7"
                            }
                        },
                        "native": {
                            "runtimes/libcore.so": {}
                        },
                        "compile": {
                            "ref/App.Core.dll": {}
                        },
                        "Native": {
                            "runtimes/wrong-case.so": {}
                        }
                    },
                    "Satellite.Lib/2.0.1": {
                        "resources": {
                            "lib/loam1.0/de/Satellite.Lib.resources.dll": {
                                "assemblyVersion": "bogus"
                            }
                        },
                        "runtimeTargets": {
                            "runtimes/win-x64/native/lib.dll": {
                                "rid": "win-x64",
                                "assetType": "native"
                            },
                            "runtimes/win/lib/loam1.0/Managed.ni.dll": {
                                "rid": "win",
                                "assetType": "Runtime",
                                "assemblyVersion": "2.0"
                            },
                            "runtimes/skip/no-rid.dll": {
                                "assetType": "native"
                            },
                            "runtimes/skip/no-type.dll": {
                                "rid": "win"
                            }
                        }
                    }
                }
            }
        })
    }

    #[test]
    fn test_generic_extraction_buckets_by_category() {
        let assets = extract_target_assets(&sample_doc(), "loam1.0");

        let runtime = assets.assets("App.Core/1.2.0", AssetCategory::Runtime);
        assert_eq!(runtime.len(), 1);
        assert_eq!(runtime[0].name, "App.Core");
        assert_eq!(runtime[0].assembly_version, Version::new(1, 2, 0, 0));
        assert_eq!(runtime[0].file_version, Version::new(1, 2, 0, 7));

        let native = assets.assets("App.Core/1.2.0", AssetCategory::Native);
        assert_eq!(native.len(), 1);
        assert_eq!(native[0].name, "libcore");
        assert!(native[0].assembly_version.is_zero());
    }

    #[test]
    fn test_generic_extraction_ignores_unknown_sections() {
        let assets = extract_target_assets(&sample_doc(), "loam1.0");
        // "compile" is unrecognized and section names are case-sensitive, so
        // "Native" does not count either; only runtime + native land
        let categories = &assets.libs["App.Core/1.2.0"];
        let total: usize = categories.iter().map(Vec::len).sum();
        assert_eq!(total, 2);
    }

    #[test]
    fn test_generic_extraction_malformed_version_is_zero() {
        let assets = extract_target_assets(&sample_doc(), "loam1.0");
        let resources = assets.assets("Satellite.Lib/2.0.1", AssetCategory::Resources);
        assert_eq!(resources.len(), 1);
        assert!(resources[0].assembly_version.is_zero());
    }

    #[test]
    fn test_generic_extraction_missing_target_is_empty() {
        let assets = extract_target_assets(&sample_doc(), "other-target");
        assert!(assets.libs.is_empty());

        let assets = extract_target_assets(&json!({"targets": "bad"}), "loam1.0");
        assert!(assets.libs.is_empty());
    }

    #[test]
    fn test_rid_extraction_requires_rid_and_asset_type() {
        let assets = extract_rid_target_assets(&sample_doc(), "loam1.0");
        let lib = &assets.libs["Satellite.Lib/2.0.1"];

        let native = &lib[AssetCategory::Native.index()];
        assert_eq!(native.len(), 1);
        assert_eq!(native["win-x64"].len(), 1);

        // Entries missing either property are dropped
        let total: usize = lib
            .iter()
            .flat_map(|buckets| buckets.values())
            .map(Vec::len)
            .sum();
        assert_eq!(total, 2);
    }

    #[test]
    fn test_rid_extraction_asset_type_case_insensitive() {
        let assets = extract_rid_target_assets(&sample_doc(), "loam1.0");
        let runtime = &assets.libs["Satellite.Lib/2.0.1"][AssetCategory::Runtime.index()];
        assert_eq!(runtime["win"].len(), 1);
    }

    #[test]
    fn test_rid_extraction_strips_native_image_marker() {
        let assets = extract_rid_target_assets(&sample_doc(), "loam1.0");
        let runtime = &assets.libs["Satellite.Lib/2.0.1"][AssetCategory::Runtime.index()];
        let asset = &runtime["win"][0];
        assert_eq!(asset.name, "Managed");
        assert_eq!(asset.relative_path, "runtimes/win/lib/loam1.0/Managed.ni.dll");
        assert_eq!(asset.assembly_version, Version::new(2, 0, 0, 0));
    }

    #[test]
    fn test_rid_extraction_without_runtime_targets() {
        let assets = extract_rid_target_assets(&sample_doc(), "loam1.0");
        assert!(!assets.has_library("App.Core/1.2.0"));
    }
}

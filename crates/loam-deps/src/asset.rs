//! Asset model for dependency resolution
//!
//! A deps manifest associates each library with the files it contributes,
//! grouped into three categories. Resolution produces one [`ResolvedEntry`]
//! per selected file.

use crate::version::Version;
use serde::Serialize;

/// The kind of file a library contributes
///
/// Category ordinals are fixed; all per-library asset storage is indexed by
/// [`AssetCategory::index`] after initial classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetCategory {
    /// Managed assemblies loaded by the runtime
    Runtime,
    /// Satellite resource assemblies
    Resources,
    /// Native libraries
    Native,
}

impl AssetCategory {
    /// Number of recognized categories
    pub const COUNT: usize = 3;

    /// All categories in ordinal order
    pub const ALL: [AssetCategory; AssetCategory::COUNT] = [
        AssetCategory::Runtime,
        AssetCategory::Resources,
        AssetCategory::Native,
    ];

    /// Ordinal used for per-category storage
    pub fn index(self) -> usize {
        self as usize
    }

    /// Section name as it appears in a manifest
    pub fn name(self) -> &'static str {
        match self {
            AssetCategory::Runtime => "runtime",
            AssetCategory::Resources => "resources",
            AssetCategory::Native => "native",
        }
    }

    /// Match a `runtimeTargets` `assetType` value (case-insensitive)
    pub fn from_asset_type(name: &str) -> Option<Self> {
        AssetCategory::ALL
            .iter()
            .find(|category| category.name().eq_ignore_ascii_case(name))
            .copied()
    }
}

/// A single file association declared by a manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Asset {
    /// Logical name: the filename without extension
    pub name: String,
    /// Relative path exactly as declared
    pub relative_path: String,
    /// Assembly version, zero when absent or malformed
    pub assembly_version: Version,
    /// File version, zero when absent or malformed
    pub file_version: Version,
}

impl Asset {
    /// Create an asset with an explicit logical name
    pub fn new(
        name: impl Into<String>,
        relative_path: impl Into<String>,
        assembly_version: Version,
        file_version: Version,
    ) -> Self {
        Self {
            name: name.into(),
            relative_path: relative_path.into(),
            assembly_version,
            file_version,
        }
    }

    /// Create an asset whose logical name is derived from the filename
    pub fn from_relative_path(
        relative_path: impl Into<String>,
        assembly_version: Version,
        file_version: Version,
    ) -> Self {
        let relative_path = relative_path.into();
        let name = file_name_without_ext(&relative_path);
        Self {
            name,
            relative_path,
            assembly_version,
            file_version,
        }
    }
}

/// One resolved dependency entry: a library's metadata joined with one of its
/// selected assets. Entries are built once during reconciliation and never
/// mutated afterward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedEntry {
    /// Library name (composite key before the first `/`)
    pub library_name: String,
    /// Library version (composite key after the first `/`)
    pub library_version: String,
    /// Library type, lower-cased (`package`, `project`, ...)
    pub library_type: String,
    /// Declared content hash
    pub library_hash: String,
    /// Declared install path
    pub library_path: String,
    /// Declared hash file path
    pub library_hash_path: String,
    /// Optional runtime-store manifest name
    pub runtime_store_manifest: String,
    /// Category this asset was classified under
    pub category: AssetCategory,
    /// Whether the library is serviceable
    pub is_serviceable: bool,
    /// Whether the asset came from a RID-specific bucket
    pub is_rid_specific: bool,
    /// File name of the manifest this entry came from
    pub deps_file: String,
    /// The selected asset
    pub asset: Asset,
}

/// Filename portion of `path` without its final extension
pub(crate) fn file_name_without_ext(path: &str) -> String {
    let file_name = match path.rfind('/') {
        Some(pos) => &path[pos + 1..],
        None => path,
    };
    match file_name.rfind('.') {
        Some(pos) if pos > 0 => file_name[..pos].to_string(),
        _ => file_name.to_string(),
    }
}

/// Strip a trailing `.ni` native-image marker (any case) from a logical name
pub(crate) fn strip_native_image_suffix(name: &str) -> &str {
    match name.len().checked_sub(3).and_then(|pos| name.get(pos..)) {
        Some(suffix) if suffix.eq_ignore_ascii_case(".ni") => &name[..name.len() - 3],
        _ => name,
    }
}

//! RID fallback resolution
//!
//! Collapses each library's RID-keyed asset buckets to at most one bucket
//! matching the host platform. With a fallback graph, the host RID is probed
//! and walked through its declared fallbacks; without one, a fixed
//! platform-compiled priority list is scanned instead. A category with no
//! compatible RID degrades to no assets; resolution never fails as a whole.

use crate::asset::{Asset, AssetCategory};
use crate::extract::RidTargetAssets;
use crate::platform;
use crate::rid::RidFallbackGraph;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Options controlling how RID buckets are matched to the host
///
/// A fallback graph switches resolution into graph mode; without one the
/// static priority list is used. The RID override takes precedence over
/// probing in both modes.
#[derive(Debug, Clone, Default)]
pub struct RidResolutionOptions {
    fallback_graph: Option<Arc<RidFallbackGraph>>,
    rid_override: Option<String>,
}

impl RidResolutionOptions {
    /// Static-list resolution with no override
    pub fn new() -> Self {
        Self::default()
    }

    /// Static-list resolution with the RID override read from the environment
    pub fn from_env() -> Self {
        Self {
            fallback_graph: None,
            rid_override: platform::runtime_id_from_env(),
        }
    }

    /// Resolve against a shared fallback graph
    pub fn with_fallback_graph(mut self, graph: Arc<RidFallbackGraph>) -> Self {
        self.fallback_graph = Some(graph);
        self
    }

    /// Override the host RID
    pub fn with_rid_override(mut self, rid: impl Into<String>) -> Self {
        self.rid_override = Some(rid.into());
        self
    }

    /// The fallback graph, if resolution runs in graph mode
    pub fn fallback_graph(&self) -> Option<&RidFallbackGraph> {
        self.fallback_graph.as_deref()
    }

    /// The host RID override, if any
    pub fn rid_override(&self) -> Option<&str> {
        self.rid_override.as_deref()
    }
}

/// Collapse every `(library, category)` RID bucket map to the single best
/// match for the host platform, discarding all other buckets. Bucket maps
/// with no compatible RID are cleared.
pub fn perform_rid_fallback(assets: &mut RidTargetAssets, options: &RidResolutionOptions) {
    let host_rid = options
        .fallback_graph()
        .map(|graph| current_machine_rid(options.rid_override(), graph));

    if host_rid.is_none() {
        debug!("host RID list = {:?}", platform::host_rid_list());
    }

    for (library, categories) in assets.libs.iter_mut() {
        debug!("filtering RID assets for {}", library);

        for category in AssetCategory::ALL {
            let rid_assets = &mut categories[category.index()];
            if rid_assets.is_empty() {
                continue;
            }

            let matched = match (&host_rid, options.fallback_graph()) {
                (Some(host_rid), Some(graph)) => {
                    matching_rid_with_graph(rid_assets, host_rid, graph)
                }
                _ => matching_rid_static(rid_assets, options.rid_override()),
            };

            match matched {
                Some(matched_rid) => {
                    debug!("  matched RID {} for {} assets", matched_rid, category.name());
                    rid_assets.retain(|rid, _| *rid == matched_rid);
                }
                None => {
                    debug!(
                        "  no matching {} assets for {}",
                        category.name(),
                        library
                    );
                    rid_assets.clear();
                }
            }
        }
    }
}

/// Determine the RID of the machine the host is running on
///
/// The override wins outright; otherwise the probed OS platform name is
/// combined with the architecture. When the result is empty or unknown to
/// the fallback graph, the base OS name is substituted: older manifests
/// rarely declare a distro- or version-specific RID but usually declare the
/// family baseline.
fn current_machine_rid(rid_override: Option<&str>, graph: &RidFallbackGraph) -> String {
    let mut rid = match rid_override {
        Some(rid) => rid.to_string(),
        None => {
            let os = platform::current_os_rid_platform();
            if os.is_empty() {
                String::new()
            } else {
                format!("{}-{}", os, platform::current_arch_name())
            }
        }
    };

    if rid.is_empty() {
        info!("host RID is not available");
    } else {
        info!("host RID is {}", rid);
    }

    if rid.is_empty() || !graph.contains(&rid) {
        rid = format!(
            "{}-{}",
            platform::fallback_os_name(),
            platform::current_arch_name()
        );
        info!("falling back to base host RID {}", rid);
    }

    rid
}

fn matching_rid_with_graph(
    rid_assets: &HashMap<String, Vec<Asset>>,
    host_rid: &str,
    graph: &RidFallbackGraph,
) -> Option<String> {
    // Exact match with the host RID wins
    if rid_assets.contains_key(host_rid) {
        return Some(host_rid.to_string());
    }

    let fallbacks = match graph.fallbacks(host_rid) {
        Some(fallbacks) => fallbacks,
        None => {
            warn!(
                "the target framework does not support the runtime '{}'; some libraries may fail to load on this platform",
                host_rid
            );
            return None;
        }
    };

    fallbacks
        .iter()
        .find(|rid| rid_assets.contains_key(*rid))
        .cloned()
}

fn matching_rid_static(
    rid_assets: &HashMap<String, Vec<Asset>>,
    rid_override: Option<&str>,
) -> Option<String> {
    if let Some(rid) = rid_override {
        if rid_assets.contains_key(rid) {
            return Some(rid.to_string());
        }
    }

    platform::host_rid_list()
        .iter()
        .find(|rid| rid_assets.contains_key(*rid))
        .cloned()
}

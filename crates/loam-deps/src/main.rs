//! Loam deps manifest inspector (loam-deps)

use clap::{Parser, Subcommand};
use loam_deps::{DepsManifest, RidFallbackGraph, RidResolutionOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "loam-deps")]
#[command(about = "Inspect resolved entries of a Loam deps manifest", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve and print dependency entries
    Entries {
        /// Path to the deps manifest
        deps_file: PathBuf,

        /// Treat the application as self-contained
        #[arg(long)]
        self_contained: bool,

        /// Resolve against the manifest's own runtimes section
        #[arg(long)]
        rid_graph: bool,

        /// Print entries as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the RID fallback graph declared by a manifest
    Graph {
        /// Path to the deps manifest
        deps_file: PathBuf,
    },
    /// Check whether a package declares any assets
    Check {
        /// Path to the deps manifest
        deps_file: PathBuf,
        /// Package name
        package: String,
        /// Package version
        version: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Entries {
            deps_file,
            self_contained,
            rid_graph,
            json,
        } => {
            let manifest = load(&deps_file, self_contained, rid_graph)?;
            if json {
                let entries: serde_json::Map<String, serde_json::Value> = manifest
                    .entries_by_category()
                    .map(|(category, entries)| {
                        (category.name().to_string(), serde_json::json!(entries))
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                for (category, entries) in manifest.entries_by_category() {
                    println!("{} assets:", category.name());
                    for entry in entries {
                        println!(
                            "  {} {} ({}){}",
                            entry.library_name,
                            entry.library_version,
                            entry.asset.relative_path,
                            if entry.is_rid_specific { " [rid]" } else { "" }
                        );
                    }
                }
            }
        }
        Commands::Graph { deps_file } => {
            let graph = RidFallbackGraph::from_file(&deps_file);
            let mut rids: Vec<_> = graph.iter().collect();
            rids.sort_by_key(|(rid, _)| rid.to_string());
            for (rid, fallbacks) in rids {
                println!("{} => {:?}", rid, fallbacks);
            }
        }
        Commands::Check {
            deps_file,
            package,
            version,
        } => {
            let manifest = load(&deps_file, false, false)?;
            println!("{}", manifest.has_package(&package, &version));
        }
    }

    Ok(())
}

fn load(
    deps_file: &Path,
    self_contained: bool,
    rid_graph: bool,
) -> anyhow::Result<DepsManifest> {
    let manifest = if self_contained {
        DepsManifest::load_self_contained(deps_file)?
    } else {
        let mut options = RidResolutionOptions::from_env();
        if rid_graph {
            options = options.with_fallback_graph(Arc::new(RidFallbackGraph::from_file(deps_file)));
        }
        DepsManifest::load_framework_dependent(deps_file, &options)?
    };
    Ok(manifest)
}

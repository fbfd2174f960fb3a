//! Command: resolve targets and print the graph plus its layer map.

use std::collections::HashSet;
use std::path::Path;

use grava_core::config::GlobalConfig;
use grava_core::snapshot::{MetadataCache, SyncDbSnapshot};
use grava_resolver::graph::DependencyGraph;
use grava_resolver::resolver::{ResolveOptions, Resolver};
use grava_util::errors::GravaError;
use tokio_util::sync::CancellationToken;

pub struct GraphArgs {
    pub targets: Vec<String>,
    pub no_deps: bool,
    pub no_optional: bool,
    pub skip_installed: bool,
    pub no_confirm: bool,
    pub fail_fast: bool,
    pub installed: Vec<String>,
}

pub async fn exec(config_path: Option<&Path>, args: GraphArgs) -> miette::Result<()> {
    let config = GlobalConfig::load_or_default(config_path);

    let local = SyncDbSnapshot::from_path(&config.database.path).map_err(|e| {
        GravaError::Config {
            message: format!("failed to load sync database: {e}"),
        }
    })?;
    let cache = MetadataCache::from_path(&config.metadata.cache_path).map_err(|e| {
        GravaError::Config {
            message: format!("failed to load metadata cache: {e}"),
        }
    })?;

    let opts = ResolveOptions {
        no_deps: args.no_deps,
        include_optional: config.resolver.include_optional && !args.no_optional,
        skip_installed: args.skip_installed,
        no_confirm: args.no_confirm,
        fail_fast: args.fail_fast || config.resolver.fail_fast,
        max_concurrent_lookups: config.resolver.max_concurrent_lookups,
    };
    let resolver = Resolver::new(&local, &cache, opts);

    let token = CancellationToken::new();
    {
        let token = token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                token.cancel();
            }
        });
    }

    let mut graph = DependencyGraph::new();
    let mut report = resolver.resolve(&token, &mut graph, &args.targets).await?;

    print!("{graph}");

    let start_set: Option<HashSet<String>> = if args.installed.is_empty() {
        None
    } else {
        Some(args.installed.iter().cloned().collect())
    };
    let layers = graph.topo_sorted_layer_map(start_set.as_ref())?;
    println!();
    println!("layers map");
    print!("{}", graph.render_layers(&layers));

    if let Some(name) = report.unresolved.first() {
        return Err(GravaError::TargetNotFound { name: name.clone() }.into());
    }
    if !report.provider_errors.is_empty() {
        return Err(report.provider_errors.remove(0).into());
    }

    Ok(())
}

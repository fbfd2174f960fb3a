//! Provider-backed dependency closure expansion.
//!
//! Targets resolve against the local sync database first, then the
//! source-metadata cache; discovered dependencies expand breadth-first
//! with source lookups batched per expansion step. A visited set keyed
//! by canonical name guarantees termination when the metadata is
//! cyclic; cycles are kept in the graph and only rejected by layering.

use std::collections::{HashMap, HashSet, VecDeque};

use grava_core::dependency::{DepKind, DepRequest};
use grava_core::package::{LocalPackage, SourcePackage};
use grava_core::provider::{PackageDb, SourceMetadata};
use grava_util::errors::GravaError;
use petgraph::graph::NodeIndex;
use tokio_util::sync::CancellationToken;

use crate::graph::{DependencyGraph, Origin, PkgNode};

/// Policy flags controlling a resolution.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Only add the requested targets; no dependency expansion, no
    /// edges.
    pub no_deps: bool,
    /// Follow Optional-kind dependencies. When false they are neither
    /// followed nor added as edges.
    pub include_optional: bool,
    /// Treat a dependency already satisfied by the sync database as
    /// terminal: add the node but assume its own closure is already
    /// resolved on the target system.
    pub skip_installed: bool,
    /// Pass-through for callers that prompt before acting on the
    /// result. The resolver itself never prompts.
    pub no_confirm: bool,
    /// Abort on the first unresolved target or provider failure
    /// instead of collecting them.
    pub fail_fast: bool,
    /// Upper bound for concurrent source-metadata lookups inside a
    /// batch.
    pub max_concurrent_lookups: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            no_deps: false,
            include_optional: true,
            skip_installed: false,
            no_confirm: false,
            fail_fast: false,
            max_concurrent_lookups: 8,
        }
    }
}

/// Non-fatal failures collected during a best-effort resolution.
#[derive(Debug, Default)]
pub struct ResolutionReport {
    /// Requested targets found in neither provider. The graph carries
    /// a Missing node for each.
    pub unresolved: Vec<String>,
    /// Provider lookups that failed; the affected names are recorded
    /// as Missing nodes so sibling branches keep resolving.
    pub provider_errors: Vec<GravaError>,
}

impl ResolutionReport {
    pub fn is_clean(&self) -> bool {
        self.unresolved.is_empty() && self.provider_errors.is_empty()
    }
}

/// A node waiting for expansion, carrying the dependency list its
/// provider returned at discovery time.
struct Pending {
    idx: NodeIndex,
    depends: Vec<DepRequest>,
}

/// Mutable bookkeeping threaded through one `resolve` call.
struct Session {
    /// Canonical names already added to the graph (including nodes
    /// present before this call); nothing in here is looked up or
    /// enqueued again.
    visited: HashSet<String>,
    queue: VecDeque<Pending>,
    report: ResolutionReport,
}

/// Drives graph construction against the two providers.
pub struct Resolver<'a, L, S> {
    local: &'a L,
    source: &'a S,
    opts: ResolveOptions,
}

impl<'a, L: PackageDb, S: SourceMetadata> Resolver<'a, L, S> {
    pub fn new(local: &'a L, source: &'a S, opts: ResolveOptions) -> Self {
        Self {
            local,
            source,
            opts,
        }
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.opts
    }

    /// Resolve `targets` into `graph`, extending whatever it already
    /// contains; pre-existing nodes count as already expanded.
    ///
    /// On any error, including cancellation, the graph is left valid
    /// (no dangling edges) for the caller to inspect or discard.
    pub async fn resolve(
        &self,
        token: &CancellationToken,
        graph: &mut DependencyGraph,
        targets: &[String],
    ) -> Result<ResolutionReport, GravaError> {
        if token.is_cancelled() {
            return Err(GravaError::Cancelled);
        }

        let mut session = Session {
            visited: graph
                .nodes()
                .map(|idx| graph.node(idx).name.clone())
                .collect(),
            queue: VecDeque::new(),
            report: ResolutionReport::default(),
        };

        self.seed_targets(token, graph, targets, &mut session)
            .await?;

        while let Some(pending) = session.queue.pop_front() {
            if token.is_cancelled() {
                return Err(GravaError::Cancelled);
            }
            self.expand(token, graph, pending, &mut session).await?;
        }

        Ok(session.report)
    }

    /// Step 1: resolve each requested target, local provider first,
    /// with one batched source lookup for the remainder.
    async fn seed_targets(
        &self,
        token: &CancellationToken,
        graph: &mut DependencyGraph,
        targets: &[String],
        session: &mut Session,
    ) -> Result<(), GravaError> {
        let mut from_source: Vec<String> = Vec::new();
        for name in targets {
            if let Some(idx) = graph.lookup(name) {
                // Known from a previous call; just promote to target.
                let merged = PkgNode {
                    target: true,
                    ..graph.node(idx).clone()
                };
                graph.add_node(merged, &[]);
                continue;
            }
            match self.local.lookup(name) {
                Ok(Some(pkg)) => {
                    self.add_local(graph, session, &pkg, true);
                }
                Ok(None) => {
                    if !from_source.contains(name) {
                        from_source.push(name.clone());
                    }
                }
                Err(failure) => {
                    let err = GravaError::Provider {
                        name: name.clone(),
                        source: failure,
                    };
                    if self.opts.fail_fast {
                        return Err(err);
                    }
                    tracing::warn!("{err}");
                    session.report.provider_errors.push(err);
                    self.add_missing(graph, session, name, true);
                }
            }
        }

        if from_source.is_empty() {
            return Ok(());
        }

        let found = match self.batch_source(token, &from_source).await {
            Ok(found) => found,
            Err(err @ GravaError::Cancelled) => return Err(err),
            Err(err) => {
                if self.opts.fail_fast {
                    return Err(err);
                }
                tracing::warn!("{err}");
                session.report.provider_errors.push(err);
                HashMap::new()
            }
        };

        for name in &from_source {
            match found.get(name) {
                Some(pkg) => {
                    self.add_source(graph, session, pkg, true);
                }
                None => {
                    if self.opts.fail_fast {
                        return Err(GravaError::TargetNotFound { name: name.clone() });
                    }
                    tracing::warn!("target {name} not found in any provider");
                    session.report.unresolved.push(name.clone());
                    self.add_missing(graph, session, name, true);
                }
            }
        }

        Ok(())
    }

    /// Step 2: expand one node's declared dependencies into the graph.
    async fn expand(
        &self,
        token: &CancellationToken,
        graph: &mut DependencyGraph,
        pending: Pending,
        session: &mut Session,
    ) -> Result<(), GravaError> {
        let dependent = pending.idx;

        // Satisfy from the graph and the sync database first; collect
        // the rest for one batched source lookup.
        let mut from_source: Vec<DepRequest> = Vec::new();
        for dep in pending.depends {
            if dep.kind == DepKind::Optional && !self.opts.include_optional {
                tracing::warn!(
                    "skipping optional dependency {} of {}",
                    dep.name,
                    graph.node(dependent).name
                );
                continue;
            }

            if let Some(existing) = graph.lookup(&dep.name) {
                self.link(graph, dependent, existing, dep.kind)?;
                continue;
            }

            match self.local.lookup(&dep.name) {
                Ok(Some(pkg)) => {
                    let idx = self.add_local(graph, session, &pkg, false);
                    self.link(graph, dependent, idx, dep.kind)?;
                }
                Ok(None) => from_source.push(dep),
                Err(failure) => {
                    let err = GravaError::Provider {
                        name: dep.name.clone(),
                        source: failure,
                    };
                    if self.opts.fail_fast {
                        return Err(err);
                    }
                    tracing::warn!("{err}");
                    session.report.provider_errors.push(err);
                    let idx = self.add_missing(graph, session, &dep.name, false);
                    self.link(graph, dependent, idx, dep.kind)?;
                }
            }
        }

        if from_source.is_empty() {
            return Ok(());
        }

        let mut names: Vec<String> = Vec::new();
        for dep in &from_source {
            if !names.contains(&dep.name) {
                names.push(dep.name.clone());
            }
        }

        let found = match self.batch_source(token, &names).await {
            Ok(found) => found,
            Err(err @ GravaError::Cancelled) => return Err(err),
            Err(err) => {
                if self.opts.fail_fast {
                    return Err(err);
                }
                tracing::warn!("{err}");
                session.report.provider_errors.push(err);
                HashMap::new()
            }
        };

        for dep in from_source {
            let idx = match found.get(&dep.name) {
                Some(pkg) => self.add_source(graph, session, pkg, false),
                None => {
                    tracing::warn!(
                        "dependency {} of {} not found in any provider",
                        dep.name,
                        graph.node(dependent).name
                    );
                    self.add_missing(graph, session, &dep.name, false)
                }
            };
            self.link(graph, dependent, idx, dep.kind)?;
        }

        Ok(())
    }

    /// Batched source-metadata lookups, raced against cancellation.
    ///
    /// Names are chunked by `max_concurrent_lookups` so no more than
    /// that many lookups are outstanding at once, whatever the
    /// provider's batch implementation does internally.
    async fn batch_source(
        &self,
        token: &CancellationToken,
        names: &[String],
    ) -> Result<HashMap<String, SourcePackage>, GravaError> {
        let width = self.opts.max_concurrent_lookups.max(1);
        let mut found = HashMap::new();
        for chunk in names.chunks(width) {
            let result = tokio::select! {
                _ = token.cancelled() => Err(GravaError::Cancelled),
                result = self.source.batch_lookup(chunk) => {
                    result.map_err(|failure| GravaError::Provider {
                        name: chunk.join(", "),
                        source: failure,
                    })
                }
            };
            found.extend(result?);
        }
        Ok(found)
    }

    fn add_local(
        &self,
        graph: &mut DependencyGraph,
        session: &mut Session,
        pkg: &LocalPackage,
        target: bool,
    ) -> NodeIndex {
        let idx = graph.add_node(
            PkgNode {
                name: pkg.name.clone(),
                version: pkg.version.clone(),
                origin: Origin::Local,
                target,
            },
            &pkg.provides,
        );
        if session.visited.insert(pkg.name.clone())
            && !self.opts.no_deps
            && !self.opts.skip_installed
        {
            tracing::info!("discovered local package {}", pkg.name);
            session.queue.push_back(Pending {
                idx,
                depends: pkg.requests(),
            });
        }
        idx
    }

    fn add_source(
        &self,
        graph: &mut DependencyGraph,
        session: &mut Session,
        pkg: &SourcePackage,
        target: bool,
    ) -> NodeIndex {
        let idx = graph.add_node(
            PkgNode {
                name: pkg.name.clone(),
                version: pkg.version.clone(),
                origin: Origin::Source,
                target,
            },
            &pkg.provides,
        );
        if session.visited.insert(pkg.name.clone()) && !self.opts.no_deps {
            tracing::info!("discovered source package {}", pkg.name);
            session.queue.push_back(Pending {
                idx,
                depends: pkg.requests(),
            });
        }
        idx
    }

    fn add_missing(
        &self,
        graph: &mut DependencyGraph,
        session: &mut Session,
        name: &str,
        target: bool,
    ) -> NodeIndex {
        session.visited.insert(name.to_string());
        graph.add_node(
            PkgNode {
                name: name.to_string(),
                version: None,
                origin: Origin::Missing,
                target,
            },
            &[],
        )
    }

    /// Add the dependent -> dependency edge. A request satisfied by
    /// the dependent itself (a package may provide its own name) is
    /// dropped rather than recorded as a self-edge.
    fn link(
        &self,
        graph: &mut DependencyGraph,
        from: NodeIndex,
        to: NodeIndex,
        kind: DepKind,
    ) -> Result<(), GravaError> {
        if from == to {
            tracing::debug!(
                "ignoring self-referential dependency of {}",
                graph.node(from).name
            );
            return Ok(());
        }
        graph.add_edge(from, to, kind)
    }
}

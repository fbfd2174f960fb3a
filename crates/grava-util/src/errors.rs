use miette::Diagnostic;
use thiserror::Error;

/// Failure raised by a package provider during a lookup.
///
/// Providers report these directly; the resolver wraps them in
/// [`GravaError::Provider`] together with the package name that was
/// being looked up. Retry policy, if any, belongs to the provider.
#[derive(Debug, Error)]
pub enum ProviderFailure {
    /// Reading the backing store failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing store contained metadata that could not be decoded.
    #[error("malformed metadata: {message}")]
    Malformed { message: String },

    /// The provider backend failed or rejected the query.
    #[error("backend error: {message}")]
    Backend { message: String },
}

/// Unified error type for all grava operations.
#[derive(Debug, Error, Diagnostic)]
pub enum GravaError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or unreadable configuration file.
    #[error("Config error: {message}")]
    #[diagnostic(help("Check your grava config.toml for syntax errors"))]
    Config { message: String },

    /// A requested target was found in neither provider.
    #[error("target not found: {name}")]
    TargetNotFound { name: String },

    /// A provider lookup failed while resolving a package.
    #[error("provider lookup failed for '{name}': {source}")]
    Provider {
        name: String,
        source: ProviderFailure,
    },

    /// A dependency edge with a missing endpoint, or from a node to
    /// itself. Correct provider data never produces this.
    #[error("invalid dependency edge: {from} -> {to}")]
    InvalidEdge { from: String, to: String },

    /// The graph contains a dependency cycle and has no valid build
    /// order.
    #[error("dependency cycle detected: {cycle}")]
    #[diagnostic(help("Break the cycle manually or layer with the offending package in the start set"))]
    CyclicDependency { cycle: String },

    /// Resolution was cancelled before completing.
    #[error("resolution cancelled")]
    Cancelled,
}

/// Convenience alias for `miette::Result<T>`.
pub type GravaResult<T> = miette::Result<T>;

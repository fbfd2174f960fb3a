//! Provider traits consumed by the resolver.
//!
//! Two disjoint sources back a resolution: the local sync database
//! (fast, authoritative for installed/repo packages) and the
//! source-metadata cache (packages that must be built from source
//! definitions). Both are library boundaries, not wire protocols.

use std::collections::HashMap;

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use grava_util::errors::ProviderFailure;

use crate::package::{LocalPackage, SourcePackage};

/// Fan-out width used by the default [`SourceMetadata::batch_lookup`].
const DEFAULT_BATCH_WIDTH: usize = 8;

/// Read access to the local sync database.
///
/// Lookups are assumed fast and locally cached; implementations must
/// be safe for concurrent queries.
pub trait PackageDb: Send + Sync {
    /// Look up a package by name or by a name it provides.
    fn lookup(&self, name: &str) -> Result<Option<LocalPackage>, ProviderFailure>;
}

/// Read access to source-definition metadata.
///
/// Lookups may be slow (the cache can be backed by the network), so
/// the resolver batches them per expansion step.
#[async_trait]
pub trait SourceMetadata: Send + Sync {
    /// Look up a package by name or by a name it provides.
    async fn lookup(&self, name: &str) -> Result<Option<SourcePackage>, ProviderFailure>;

    /// Look up several names at once. The result map is keyed by the
    /// requested name; absent keys were found nowhere.
    ///
    /// The default fans out [`Self::lookup`] with bounded concurrency.
    /// Backends with a cheaper bulk path should override it.
    async fn batch_lookup(
        &self,
        names: &[String],
    ) -> Result<HashMap<String, SourcePackage>, ProviderFailure> {
        let results: Vec<(String, Result<Option<SourcePackage>, ProviderFailure>)> =
            stream::iter(names.to_vec())
                .map(|name| async move {
                    let result = self.lookup(&name).await;
                    (name, result)
                })
                .buffer_unordered(DEFAULT_BATCH_WIDTH)
                .collect()
                .await;

        let mut found = HashMap::new();
        for (name, result) in results {
            if let Some(pkg) = result? {
                found.insert(name, pkg);
            }
        }
        Ok(found)
    }
}

//! JSON snapshot providers.
//!
//! The CLI consumes the sync database and the source-metadata cache as
//! JSON snapshots on disk, one array of package records each. Both
//! implementations keep everything in memory with a provides index,
//! which also makes them convenient fixtures for resolver tests.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use grava_util::errors::ProviderFailure;

use crate::package::{LocalPackage, SourcePackage};
use crate::provider::{PackageDb, SourceMetadata};

fn malformed(path: &Path, err: serde_json::Error) -> ProviderFailure {
    ProviderFailure::Malformed {
        message: format!("{}: {err}", path.display()),
    }
}

/// In-memory view of the local sync database.
#[derive(Debug, Default)]
pub struct SyncDbSnapshot {
    packages: HashMap<String, LocalPackage>,
    /// provides name -> canonical package name
    provides: HashMap<String, String>,
}

impl SyncDbSnapshot {
    pub fn from_packages(packages: Vec<LocalPackage>) -> Self {
        let mut db = Self::default();
        for pkg in packages {
            for alias in &pkg.provides {
                db.provides
                    .entry(alias.clone())
                    .or_insert_with(|| pkg.name.clone());
            }
            db.packages.insert(pkg.name.clone(), pkg);
        }
        db
    }

    /// Load a snapshot from a JSON array of package records.
    pub fn from_path(path: &Path) -> Result<Self, ProviderFailure> {
        let content = std::fs::read_to_string(path)?;
        let packages: Vec<LocalPackage> =
            serde_json::from_str(&content).map_err(|e| malformed(path, e))?;
        tracing::debug!("loaded {} packages from {}", packages.len(), path.display());
        Ok(Self::from_packages(packages))
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    fn get(&self, name: &str) -> Option<&LocalPackage> {
        self.packages.get(name).or_else(|| {
            self.provides
                .get(name)
                .and_then(|canonical| self.packages.get(canonical))
        })
    }
}

impl PackageDb for SyncDbSnapshot {
    fn lookup(&self, name: &str) -> Result<Option<LocalPackage>, ProviderFailure> {
        Ok(self.get(name).cloned())
    }
}

/// In-memory view of the source-metadata cache.
#[derive(Debug, Default)]
pub struct MetadataCache {
    packages: HashMap<String, SourcePackage>,
    /// provides name -> canonical package name
    provides: HashMap<String, String>,
}

impl MetadataCache {
    pub fn from_packages(packages: Vec<SourcePackage>) -> Self {
        let mut cache = Self::default();
        for pkg in packages {
            for alias in &pkg.provides {
                cache
                    .provides
                    .entry(alias.clone())
                    .or_insert_with(|| pkg.name.clone());
            }
            cache.packages.insert(pkg.name.clone(), pkg);
        }
        cache
    }

    /// Load a cache snapshot from a JSON array of package records.
    pub fn from_path(path: &Path) -> Result<Self, ProviderFailure> {
        let content = std::fs::read_to_string(path)?;
        let packages: Vec<SourcePackage> =
            serde_json::from_str(&content).map_err(|e| malformed(path, e))?;
        tracing::debug!(
            "loaded {} source records from {}",
            packages.len(),
            path.display()
        );
        Ok(Self::from_packages(packages))
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    fn get(&self, name: &str) -> Option<&SourcePackage> {
        self.packages.get(name).or_else(|| {
            self.provides
                .get(name)
                .and_then(|canonical| self.packages.get(canonical))
        })
    }
}

#[async_trait]
impl SourceMetadata for MetadataCache {
    async fn lookup(&self, name: &str) -> Result<Option<SourcePackage>, ProviderFailure> {
        Ok(self.get(name).cloned())
    }

    async fn batch_lookup(
        &self,
        names: &[String],
    ) -> Result<HashMap<String, SourcePackage>, ProviderFailure> {
        // Everything is already in memory; no fan-out needed.
        let mut found = HashMap::new();
        for name in names {
            if let Some(pkg) = self.get(name) {
                found.insert(name.clone(), pkg.clone());
            }
        }
        Ok(found)
    }
}

use serde::{Deserialize, Serialize};

use crate::dependency::{DepKind, DepRequest, DepSpec};

/// A package record from the local sync database.
///
/// Local records carry no dependency kinds; an installed package only
/// needs its runtime closure, so every declared name normalizes to a
/// [`DepKind::Runtime`] request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalPackage {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub depends: Vec<String>,
    /// Additional names this package satisfies.
    #[serde(default)]
    pub provides: Vec<String>,
}

impl LocalPackage {
    /// Declared dependencies as concrete requests.
    pub fn requests(&self) -> Vec<DepRequest> {
        self.depends
            .iter()
            .map(|name| DepRequest::new(name.clone(), DepKind::Runtime))
            .collect()
    }
}

/// A package record from the source-metadata cache: a package that must
/// be built from its source definition, with kind-annotated
/// dependencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePackage {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub depends: Vec<DepSpec>,
    /// Additional names this package satisfies.
    #[serde(default)]
    pub provides: Vec<String>,
}

impl SourcePackage {
    /// Declared dependencies as concrete requests.
    ///
    /// Entries with an unrecognized kind are dropped with a warning;
    /// one bad entry must not sink the whole record.
    pub fn requests(&self) -> Vec<DepRequest> {
        self.depends
            .iter()
            .filter_map(|spec| {
                let req = spec.request();
                if req.is_none() {
                    tracing::warn!("ignoring malformed dependency entry {spec:?} of {}", self.name);
                }
                req
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_deps_are_runtime() {
        let pkg = LocalPackage {
            name: "curl".to_string(),
            version: Some("8.9.1".to_string()),
            depends: vec!["openssl".to_string(), "zlib".to_string()],
            provides: vec!["libcurl.so".to_string()],
        };
        let reqs = pkg.requests();
        assert_eq!(reqs.len(), 2);
        assert!(reqs.iter().all(|r| r.kind == DepKind::Runtime));
    }

    #[test]
    fn source_deps_keep_kinds_and_drop_malformed() {
        let pkg: SourcePackage = serde_json::from_str(
            r#"{
                "name": "paclight",
                "version": "2.1.0",
                "depends": ["glibc", "meson:build", "pytest:check", "zlib:banana"],
                "provides": ["paclight-git"]
            }"#,
        )
        .unwrap();
        let reqs = pkg.requests();
        assert_eq!(reqs.len(), 3);
        assert_eq!(reqs[0], DepRequest::new("glibc", DepKind::Runtime));
        assert_eq!(reqs[1], DepRequest::new("meson", DepKind::Build));
        assert_eq!(reqs[2], DepRequest::new("pytest", DepKind::Check));
    }

    #[test]
    fn missing_fields_default_empty() {
        let pkg: SourcePackage = serde_json::from_str(r#"{"name": "tiny"}"#).unwrap();
        assert_eq!(pkg.version, None);
        assert!(pkg.depends.is_empty());
        assert!(pkg.provides.is_empty());
    }
}

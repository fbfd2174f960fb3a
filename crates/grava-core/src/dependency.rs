use std::fmt;

use serde::{Deserialize, Serialize};

/// Classification of why one package requires another.
///
/// The ordering is used when sorting a node's outgoing edges for
/// rendering: runtime first, then build, check, optional.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum DepKind {
    #[default]
    Runtime,
    Build,
    Check,
    Optional,
}

impl DepKind {
    /// Parse a kind name as it appears in `"name:kind"` shorthand.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "runtime" => Some(Self::Runtime),
            "build" => Some(Self::Build),
            "check" => Some(Self::Check),
            "optional" => Some(Self::Optional),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Runtime => "runtime",
            Self::Build => "build",
            Self::Check => "check",
            Self::Optional => "optional",
        }
    }
}

impl fmt::Display for DepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single declared dependency: a package name plus the edge kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DepRequest {
    pub name: String,
    #[serde(default)]
    pub kind: DepKind,
}

impl DepRequest {
    pub fn new(name: impl Into<String>, kind: DepKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Parse `"name"` (runtime) or `"name:kind"` shorthand.
    pub fn parse(s: &str) -> Option<Self> {
        match s.split_once(':') {
            None => {
                if s.is_empty() {
                    None
                } else {
                    Some(Self::new(s, DepKind::Runtime))
                }
            }
            Some((name, kind)) => {
                if name.is_empty() {
                    return None;
                }
                DepKind::parse(kind).map(|kind| Self::new(name, kind))
            }
        }
    }
}

impl fmt::Display for DepRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.kind)
    }
}

/// A dependency specification in serialized package metadata.
///
/// Supports both shorthand (`"zlib"` / `"zlib:build"`) and detailed
/// forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DepSpec {
    Short(String),
    Detailed(DepRequest),
}

impl DepSpec {
    /// Resolve the specification to a concrete request.
    ///
    /// Returns `None` for shorthand with an unrecognized kind.
    pub fn request(&self) -> Option<DepRequest> {
        match self {
            Self::Short(s) => DepRequest::parse(s),
            Self::Detailed(d) => Some(d.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_ordering_for_edge_sorting() {
        assert!(DepKind::Runtime < DepKind::Build);
        assert!(DepKind::Build < DepKind::Check);
        assert!(DepKind::Check < DepKind::Optional);
    }

    #[test]
    fn kind_parse_roundtrip() {
        for kind in [
            DepKind::Runtime,
            DepKind::Build,
            DepKind::Check,
            DepKind::Optional,
        ] {
            assert_eq!(DepKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(DepKind::parse("makedepends"), None);
    }

    #[test]
    fn request_parse_shorthand() {
        let req = DepRequest::parse("zlib").unwrap();
        assert_eq!(req.name, "zlib");
        assert_eq!(req.kind, DepKind::Runtime);

        let req = DepRequest::parse("cmake:build").unwrap();
        assert_eq!(req.name, "cmake");
        assert_eq!(req.kind, DepKind::Build);
    }

    #[test]
    fn request_parse_rejects_malformed() {
        assert_eq!(DepRequest::parse(""), None);
        assert_eq!(DepRequest::parse(":build"), None);
        assert_eq!(DepRequest::parse("zlib:banana"), None);
    }

    #[test]
    fn spec_short_and_detailed_agree() {
        let short = DepSpec::Short("pytest:check".to_string());
        let detailed = DepSpec::Detailed(DepRequest::new("pytest", DepKind::Check));
        assert_eq!(short.request(), detailed.request());
    }

    #[test]
    fn spec_deserializes_both_forms() {
        let specs: Vec<DepSpec> =
            serde_json::from_str(r#"["zlib", {"name": "cmake", "kind": "build"}]"#).unwrap();
        assert_eq!(
            specs[0].request(),
            Some(DepRequest::new("zlib", DepKind::Runtime))
        );
        assert_eq!(
            specs[1].request(),
            Some(DepRequest::new("cmake", DepKind::Build))
        );
    }
}

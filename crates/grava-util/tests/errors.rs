use grava_util::errors::{GravaError, ProviderFailure};

#[test]
fn test_io_error_display() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
    let err = GravaError::from(io_err);
    assert!(err.to_string().contains("I/O error"), "got: {err}");
}

#[test]
fn test_config_error_display() {
    let err = GravaError::Config {
        message: "bad syntax".to_string(),
    };
    assert_eq!(err.to_string(), "Config error: bad syntax");
}

#[test]
fn test_target_not_found_display() {
    let err = GravaError::TargetNotFound {
        name: "ripgrep".to_string(),
    };
    assert_eq!(err.to_string(), "target not found: ripgrep");
}

#[test]
fn test_provider_error_carries_package_name() {
    let err = GravaError::Provider {
        name: "zlib".to_string(),
        source: ProviderFailure::Backend {
            message: "timeout".to_string(),
        },
    };
    let s = err.to_string();
    assert!(s.contains("zlib"), "got: {s}");
    assert!(s.contains("backend error: timeout"), "got: {s}");
}

#[test]
fn test_invalid_edge_display() {
    let err = GravaError::InvalidEdge {
        from: "foo".to_string(),
        to: "foo".to_string(),
    };
    assert_eq!(err.to_string(), "invalid dependency edge: foo -> foo");
}

#[test]
fn test_cyclic_dependency_display() {
    let err = GravaError::CyclicDependency {
        cycle: "x -> y -> x".to_string(),
    };
    assert_eq!(err.to_string(), "dependency cycle detected: x -> y -> x");
}

#[test]
fn test_cancelled_display() {
    assert_eq!(GravaError::Cancelled.to_string(), "resolution cancelled");
}

#[test]
fn test_provider_failure_io_from_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let failure = ProviderFailure::from(io_err);
    assert!(failure.to_string().contains("denied"), "got: {failure}");
}

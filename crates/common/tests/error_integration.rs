//! Integration tests for `matcache_common::error`.
//!
//! Validates classification and module error delegation so downstream
//! crates receive consistent failure semantics.

use std::time::Duration;

use matcache_common::error::{CommonError, ErrorClassification, ErrorSeverity};
use thiserror::Error;

/// Module-style error composing `CommonError`.
#[derive(Debug, Error)]
enum StoreError {
    #[error("identifier {0} already cached")]
    Duplicate(i64),

    #[error(transparent)]
    Common(#[from] CommonError),
}

impl ErrorClassification for StoreError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Duplicate(_) => false,
            Self::Common(e) => e.is_retryable(),
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Duplicate(_) => ErrorSeverity::Error,
            Self::Common(e) => e.severity(),
        }
    }

    fn is_critical(&self) -> bool {
        match self {
            Self::Duplicate(_) => false,
            Self::Common(e) => e.is_critical(),
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Duplicate(_) => None,
            Self::Common(e) => e.retry_after(),
        }
    }
}

/// Validates that every `CommonError` variant reports the expected
/// retryable, severity and criticality combination.
#[test]
fn classification_matrix_matches_expected_contract() {
    let cases = vec![
        (CommonError::config("bad"), false, ErrorSeverity::Error, false),
        (CommonError::validation("rows", "zero"), false, ErrorSeverity::Error, false),
        (CommonError::not_found_with_id("entry", "7"), false, ErrorSeverity::Info, false),
        (CommonError::backpressure_with_retry("memory", "low", Duration::from_secs(1)), true, ErrorSeverity::Warning, false),
        (CommonError::resource_exhausted("heap", "oom"), false, ErrorSeverity::Critical, true),
        (CommonError::timeout("join", Duration::from_secs(1)), true, ErrorSeverity::Warning, false),
        (CommonError::task_cancelled_with_reason("monitor", "shutdown"), false, ErrorSeverity::Info, false),
        (CommonError::io("read failed"), false, ErrorSeverity::Error, false),
        (CommonError::internal_with_context("broken", "reclaim"), false, ErrorSeverity::Critical, true),
    ];

    for (err, retryable, severity, critical) in cases {
        assert_eq!(err.is_retryable(), retryable, "retryable mismatch for {err}");
        assert_eq!(err.severity(), severity, "severity mismatch for {err}");
        assert_eq!(err.is_critical(), critical, "critical mismatch for {err}");
    }
}

/// Validates that module errors delegate classification through `Common`.
#[test]
fn module_error_delegates_to_common() {
    fn admit(free: u64) -> Result<(), StoreError> {
        if free == 0 {
            return Err(CommonError::backpressure_with_retry(
                "host memory",
                "no headroom",
                Duration::from_secs(1),
            )
            .into());
        }
        Err(StoreError::Duplicate(7))
    }

    let pressure = admit(0).unwrap_err();
    assert!(pressure.is_retryable());
    assert_eq!(pressure.retry_after(), Some(Duration::from_secs(1)));

    let duplicate = admit(1).unwrap_err();
    assert!(!duplicate.is_retryable());
    assert_eq!(duplicate.to_string(), "identifier 7 already cached");
}

/// Validates `?` propagation through a module error wrapping `CommonError`.
#[test]
fn module_error_propagates_common() {
    fn parse_rows(raw: &str) -> Result<usize, CommonError> {
        raw.parse::<usize>()
            .map_err(|e| CommonError::validation_with_value("rows", e.to_string(), raw))
    }

    fn total(a: &str, b: &str) -> Result<usize, StoreError> {
        Ok(parse_rows(a)? * parse_rows(b)?)
    }

    assert_eq!(total("3", "4").ok(), Some(12));
    let err = total("3", "x").unwrap_err();
    assert!(matches!(&err, StoreError::Common(CommonError::Validation { field, .. }) if field == "rows"));
    assert!(!err.is_retryable());
}

//! Input validation, run before any process is launched.

use super::registry::{ExecutorRegistry, ExecutorSpec};
use crate::core::error::SupervisorError;
use crate::worker::protocol::{TaskDescriptor, MAX_TASK_SIZE};

/// Look up an executor kind, listing the supported kinds on failure.
pub fn validate_kind<'a>(
    registry: &'a ExecutorRegistry,
    kind: &str,
) -> Result<&'a ExecutorSpec, SupervisorError> {
    registry.get(kind).ok_or_else(|| {
        SupervisorError::InvalidArgument(format!(
            "Invalid script type: {}. Supported types: {}",
            kind,
            registry.kinds().join(", ")
        ))
    })
}

/// Turn a numeric parameter into a task descriptor.
///
/// The parameter must be finite, integral, positive and at most
/// `MAX_TASK_SIZE`.
pub fn validate_parameter(parameter: f64) -> Result<TaskDescriptor, SupervisorError> {
    if !parameter.is_finite() || parameter <= 0.0 || parameter.fract() != 0.0 {
        return Err(SupervisorError::InvalidArgument(format!(
            "Invalid parameter: {}. Must be a positive integer",
            parameter
        )));
    }
    if parameter > MAX_TASK_SIZE as f64 {
        return Err(SupervisorError::InvalidArgument(format!(
            "Invalid parameter: {}. Must not exceed {}",
            parameter, MAX_TASK_SIZE
        )));
    }
    TaskDescriptor::new(parameter as u64).ok_or_else(|| {
        SupervisorError::InvalidArgument(format!("Invalid parameter: {}", parameter))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::FailureKind;

    #[test]
    fn test_valid_parameters() {
        assert_eq!(validate_parameter(1.0).unwrap().size(), 1);
        assert_eq!(validate_parameter(100.0).unwrap().size(), 100);
        assert_eq!(
            validate_parameter(MAX_TASK_SIZE as f64).unwrap().size(),
            MAX_TASK_SIZE
        );
    }

    #[test]
    fn test_invalid_parameters() {
        for bad in [
            0.0,
            -1.0,
            -0.0,
            2.5,
            f64::NAN,
            f64::INFINITY,
            f64::NEG_INFINITY,
            MAX_TASK_SIZE as f64 + 1.0,
        ] {
            let err = validate_parameter(bad).unwrap_err();
            assert_eq!(err.kind(), FailureKind::InvalidArgument, "{bad}");
        }
    }

    #[test]
    fn test_unknown_kind_lists_supported() {
        let registry = ExecutorRegistry::new()
            .with("native", ExecutorSpec::new("childproc-worker"))
            .with("python", ExecutorSpec::new("python3"));
        assert!(validate_kind(&registry, "native").is_ok());

        let err = validate_kind(&registry, "ruby").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid argument: Invalid script type: ruby. Supported types: native, python"
        );
    }
}

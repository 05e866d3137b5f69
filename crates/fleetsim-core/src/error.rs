//! Error types for fleetsim

use thiserror::Error;

/// Main error type for fleetsim
#[derive(Error, Debug)]
pub enum FleetsimError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A workload could not be admitted on any host
    #[error("Unable to allocate resources for workload {0}")]
    Unschedulable(String),

    /// Workload not found on any host
    #[error("Workload not found: {0}")]
    WorkloadNotFound(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for fleetsim operations
pub type FleetsimResult<T> = Result<T, FleetsimError>;

impl FleetsimError {
    /// Id of the workload a placement failure refers to, if any
    pub fn workload_id(&self) -> Option<&str> {
        match self {
            FleetsimError::Unschedulable(id) | FleetsimError::WorkloadNotFound(id) => Some(id),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for FleetsimError {
    fn from(err: serde_json::Error) -> Self {
        FleetsimError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for FleetsimError {
    fn from(err: toml::de::Error) -> Self {
        FleetsimError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for FleetsimError {
    fn from(err: toml::ser::Error) -> Self {
        FleetsimError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FleetsimError::Unschedulable("container-7".to_string());
        assert_eq!(
            err.to_string(),
            "Unable to allocate resources for workload container-7"
        );
        assert_eq!(err.workload_id(), Some("container-7"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: FleetsimError = io_err.into();
        assert!(matches!(err, FleetsimError::Io(_)));
        assert!(err.workload_id().is_none());
    }

    #[test]
    fn test_error_from_toml() {
        let err: FleetsimError = toml::from_str::<toml::Value>("not = = toml")
            .unwrap_err()
            .into();
        assert!(matches!(err, FleetsimError::Config(_)));
    }
}

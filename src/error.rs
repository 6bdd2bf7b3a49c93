use thiserror::Error;

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, KMeansError>;

/// The two families of failure a session can report.
///
/// `Precondition` means the operation is not legal in the current session
/// state; `Validation` means the arguments themselves were rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Precondition,
    Validation,
}

/// Error types for the k-means session engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KMeansError {
    /// No dataset has been generated or loaded yet
    #[error("No dataset found. Call generate_dataset() first.")]
    NoDataset,

    /// Clustering has not been initialized for the current dataset
    #[error("Clustering is not initialized. Call initialize() first.")]
    NotInitialized,

    /// The session already converged; it must be re-initialized before stepping again
    #[error("Clustering has already converged. Call initialize() to start a new run.")]
    AlreadyConverged,

    /// The number of clusters k is invalid
    #[error("Invalid k value: {0}")]
    InvalidK(String),

    /// Not enough data points for the requested number of clusters
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Requested dataset size is out of range
    #[error("Invalid number of points: {0}")]
    InvalidNumPoints(String),

    /// Caller-supplied centroids are malformed
    #[error("Invalid centroids: {0}")]
    InvalidCentroids(String),

    /// Session configuration is inconsistent
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Initialization method name could not be parsed
    #[error("Invalid initialization method: {0}")]
    UnknownInitMethod(String),
}

impl KMeansError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            KMeansError::NoDataset | KMeansError::NotInitialized | KMeansError::AlreadyConverged => {
                ErrorKind::Precondition
            }
            KMeansError::InvalidK(_)
            | KMeansError::InsufficientData(_)
            | KMeansError::InvalidNumPoints(_)
            | KMeansError::InvalidCentroids(_)
            | KMeansError::InvalidConfig(_)
            | KMeansError::UnknownInitMethod(_) => ErrorKind::Validation,
        }
    }

    pub fn is_precondition(&self) -> bool {
        self.kind() == ErrorKind::Precondition
    }

    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_errors_are_preconditions() {
        assert!(KMeansError::NoDataset.is_precondition());
        assert!(KMeansError::NotInitialized.is_precondition());
        assert!(KMeansError::AlreadyConverged.is_precondition());
    }

    #[test]
    fn test_input_errors_are_validations() {
        assert!(KMeansError::InvalidK("0".into()).is_validation());
        assert!(KMeansError::InsufficientData("k > n".into()).is_validation());
        assert_eq!(
            KMeansError::InvalidCentroids("expected 3, got 2".into()).kind(),
            ErrorKind::Validation
        );
    }

    #[test]
    fn test_display_includes_detail() {
        let err = KMeansError::InvalidK("k must be at least 1".to_string());
        assert_eq!(err.to_string(), "Invalid k value: k must be at least 1");
    }
}

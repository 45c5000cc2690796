/*!
Error types for the chronicle core engine.
*/

use thiserror::Error;

/// Result type used throughout the chronicle core.
pub type Result<T> = std::result::Result<T, ChronicleError>;

/// Errors that can occur during history operations.
#[derive(Error, Debug)]
pub enum ChronicleError {
    /// I/O errors during file operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Milestone validation: empty or whitespace-only description
    #[error("milestone description cannot be empty")]
    EmptyMilestone,

    /// Milestone validation: description longer than the configured maximum
    #[error("milestone description exceeds maximum length of {max} characters (got {actual})")]
    MilestoneTooLong { max: usize, actual: usize },

    /// Milestone validation: description does not match the configured pattern
    #[error("milestone must match pattern {pattern} (e.g. 'feature-implementation', 'bug-fix-123')")]
    MilestonePattern { pattern: String },

    /// A referenced snapshot does not exist
    #[error("snapshot not found: {0}")]
    SnapshotNotFound(String),

    /// Invalid configuration (bad validation regex, malformed template, zero threshold)
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ChronicleError {
    /// Create a new configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }

    /// True for the three milestone validation failures, which are
    /// raised before any filesystem state is touched.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyMilestone | Self::MilestoneTooLong { .. } | Self::MilestonePattern { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_display() {
        let error = ChronicleError::EmptyMilestone;
        assert_eq!(error.to_string(), "milestone description cannot be empty");

        let error = ChronicleError::MilestoneTooLong { max: 50, actual: 51 };
        assert_eq!(
            error.to_string(),
            "milestone description exceeds maximum length of 50 characters (got 51)"
        );

        let error = ChronicleError::SnapshotNotFound("SNAPSHOT_X.md".to_string());
        assert_eq!(error.to_string(), "snapshot not found: SNAPSHOT_X.md");

        let error = ChronicleError::configuration("threshold must be at least 1");
        assert_eq!(
            error.to_string(),
            "configuration error: threshold must be at least 1"
        );
    }

    #[test]
    fn test_validation_kinds_are_distinguishable() {
        let empty = ChronicleError::EmptyMilestone;
        let long = ChronicleError::MilestoneTooLong { max: 50, actual: 51 };
        let pattern = ChronicleError::MilestonePattern {
            pattern: "^[a-z-]+$".to_string(),
        };

        assert!(empty.is_validation());
        assert!(long.is_validation());
        assert!(pattern.is_validation());

        assert!(matches!(empty, ChronicleError::EmptyMilestone));
        assert!(matches!(long, ChronicleError::MilestoneTooLong { .. }));
        assert!(matches!(pattern, ChronicleError::MilestonePattern { .. }));
    }

    #[test]
    fn test_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error = ChronicleError::from(io_error);

        match error {
            ChronicleError::Io(_) => {}
            _ => panic!("Expected Io error variant"),
        }
        assert!(!ChronicleError::Io(io::Error::other("x")).is_validation());
    }
}

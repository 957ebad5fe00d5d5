//! Error types for rank mapping operations

use crate::collective::CollectiveError;
use crate::direction::LogicalAxis;
use crate::topology::TopologyQueryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RankMapError {
    #[error("error from topology query {call}: {source}")]
    TopologyQuery {
        call: &'static str,
        #[source]
        source: TopologyQueryError,
    },

    #[error("bad dimension from topology query: dim={got} (must be {expected})")]
    BadDimension { got: usize, expected: usize },

    #[error("too large T extent: {size} (max {max})")]
    TAxisTooLarge { size: usize, max: usize },

    #[error("collective error: {0}")]
    Collective(#[from] CollectiveError),

    #[error("structural invariant violated: {0}")]
    Structural(String),

    #[error("physical coordinate inconsistent with the open-Y layout (status {status})")]
    InconsistentCoordinate { status: i32 },

    #[error("logical coordinate {coord} out of range for axis {axis} of length {len}")]
    CoordinateOutOfRange {
        axis: LogicalAxis,
        coord: usize,
        len: usize,
    },

    #[error("T position {t} has {count} contributors (expected at most 1)")]
    DuplicateContribution { t: usize, count: i32 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RankMapError {
    /// Whether the error must take the whole process group down.
    ///
    /// Only resolution failures are left to the caller.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            RankMapError::InconsistentCoordinate { .. } | RankMapError::CoordinateOutOfRange { .. }
        )
    }

    /// Negative status code in the C-style convention of the mapping call.
    pub fn status_code(&self) -> i32 {
        match self {
            RankMapError::InconsistentCoordinate { status } => *status,
            RankMapError::CoordinateOutOfRange { .. } => -3,
            _ => -1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_errors_are_not_fatal() {
        let err = RankMapError::InconsistentCoordinate { status: -2 };
        assert!(!err.is_fatal());
        assert_eq!(err.status_code(), -2);

        let err = RankMapError::CoordinateOutOfRange {
            axis: LogicalAxis::T,
            coord: 9,
            len: 4,
        };
        assert!(!err.is_fatal());
        assert!(err.status_code() < 0);
    }

    #[test]
    fn test_configuration_errors_are_fatal() {
        assert!(RankMapError::BadDimension { got: 2, expected: 3 }.is_fatal());
        assert!(RankMapError::TAxisTooLarge { size: 65, max: 64 }.is_fatal());
        assert!(RankMapError::Structural("qy".into()).is_fatal());
    }

    #[test]
    fn test_error_messages() {
        let err = RankMapError::BadDimension { got: 2, expected: 3 };
        assert_eq!(
            err.to_string(),
            "bad dimension from topology query: dim=2 (must be 3)"
        );
    }
}

use super::domain::AssignmentId;

/// Caller mistakes the engine cannot resolve. Degenerate data (nothing graded)
/// is never an error; it surfaces as absent percentages instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GradingError {
    #[error("assignment {0} was not found among the course's graded assignments")]
    AssignmentNotFound(AssignmentId),
    #[error("assignment {id} ({name}) is worth zero points, so no score can move the grade")]
    ZeroPointsPossible { id: AssignmentId, name: String },
    #[error("target grade {0} must be a percentage between 0 and 100")]
    InvalidTargetGrade(f64),
    #[error("hypothetical score {score} for assignment {id} is not a finite number")]
    InvalidHypotheticalScore { id: AssignmentId, score: f64 },
    #[error("assumed percentage {0} must be a finite, non-negative number")]
    InvalidAssumedPercentage(f64),
}

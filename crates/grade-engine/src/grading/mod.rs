//! Grade analysis engine.
//!
//! Every operation is a pure function of the course data handed in: nothing is
//! cached between calls and caller-owned data is never mutated.

mod aggregate;
mod breakdown;
mod calculator;
pub mod domain;
mod drops;
mod error;
mod normalizer;
mod rounding;
pub mod router;
mod solver;
mod what_if;

#[cfg(test)]
mod tests;

pub use aggregate::{aggregate_group, GroupBreakdown};
pub use breakdown::{
    analyze_course, BreakdownAnalysis, CourseBreakdown, GroupStanding, PRESET_SCENARIOS,
};
pub use calculator::{exact_overall_grade, overall_grade};
pub use domain::{
    AssignmentGroupInput, AssignmentId, AssignmentInput, AssignmentRecord, CourseGrades,
    DropRule, GradePolicy, GradeStatus, GroupRecord, ScoreStatistics, SubmissionInput,
};
pub use drops::{apply_drop_rules, DropOutcome};
pub use error::GradingError;
pub use normalizer::{normalize_assignment, normalize_course, normalize_group};
pub use router::{grading_router, TargetRequest, WhatIfRequest};
pub use solver::{solve_target_score, TargetSolution, SEARCH_CEILING_RATIO, SOLVER_ITERATIONS};
pub use what_if::{
    project, project_records, what_if, AppliedScore, GroupImpact, HypotheticalOverlay,
    ObservationLevel, Projection, ScoreObservation, ScoreSource, WhatIfOutcome, WhatIfScenario,
    IMPLAUSIBLE_SCORE_RATIO,
};

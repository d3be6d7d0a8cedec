use super::domain::{AssignmentId, CourseGrades};
use super::error::GradingError;
use super::normalizer::{normalize_assignment, normalize_course};
use super::rounding::{percentage_of, round_to_cents};
use super::what_if::{project_records, WhatIfScenario};
use serde::Serialize;
use tracing::debug;

/// Fixed bisection depth; the interval shrinks by 2^50, far past f64 resolution.
pub const SOLVER_ITERATIONS: usize = 50;

/// The search ceiling as a multiple of points possible, leaving room for extra credit.
pub const SEARCH_CEILING_RATIO: f64 = 1.5;

/// A converged score this close to the ceiling means even the ceiling falls short.
const CEILING_MARGIN: f64 = 0.01;

/// Score needed on one assignment to reach a target overall grade.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetSolution {
    pub assignment_id: AssignmentId,
    pub assignment_name: String,
    pub points_possible: f64,
    pub target_grade: f64,
    /// Absent when no score up to the search ceiling reaches the target.
    pub needed_score: Option<f64>,
    pub needed_percentage: Option<f64>,
    pub achievable: bool,
    pub requires_extra_credit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Bisect the score on `assignment_id` that brings the course to `target_grade`.
///
/// Bisection assumes the overall grade is non-decreasing in the substituted
/// score. That holds for drop-lowest and non-negative weights, but not under
/// drop-highest: once the score becomes the group maximum it is dropped itself
/// and the grade stops rising, so the result may then be a lower bound only.
/// The loop always runs [`SOLVER_ITERATIONS`] times.
pub fn solve_target_score(
    course: &CourseGrades,
    target_grade: f64,
    assignment_id: AssignmentId,
) -> Result<TargetSolution, GradingError> {
    if !target_grade.is_finite() || !(0.0..=100.0).contains(&target_grade) {
        return Err(GradingError::InvalidTargetGrade(target_grade));
    }

    let (_, input) = course
        .find_assignment(assignment_id)
        .ok_or(GradingError::AssignmentNotFound(assignment_id))?;
    let assignment = normalize_assignment(input);
    if assignment.points_possible <= 0.0 {
        return Err(GradingError::ZeroPointsPossible {
            id: assignment_id,
            name: assignment.name,
        });
    }

    let records = normalize_course(course);
    let policy = course.policy();
    let points_possible = assignment.points_possible;
    let ceiling = points_possible * SEARCH_CEILING_RATIO;

    let reaches_target = |score: f64| {
        let scenario = WhatIfScenario::default().with_score(assignment_id, score);
        project_records(&records, policy, &scenario)
            .exact_overall
            .is_some_and(|grade| grade >= target_grade)
    };

    let (mut low, mut high) = (0.0_f64, ceiling);
    for _ in 0..SOLVER_ITERATIONS {
        let mid = (low + high) / 2.0;
        if reaches_target(mid) {
            high = mid;
        } else {
            low = mid;
        }
    }

    debug!(
        %assignment_id,
        target_grade,
        converged = high,
        ceiling,
        "target score bisection finished"
    );

    let name = assignment.name;
    let mut solution = TargetSolution {
        assignment_id,
        assignment_name: name.clone(),
        points_possible,
        target_grade,
        needed_score: None,
        needed_percentage: None,
        achievable: false,
        requires_extra_credit: false,
        note: None,
    };

    if high >= ceiling - CEILING_MARGIN {
        solution.note = Some(format!(
            "Even {} / {points_possible} on {name} would not bring the course to {target_grade}%",
            round_to_cents(ceiling)
        ));
        return Ok(solution);
    }

    let needed = round_to_cents(high);
    solution.needed_score = Some(needed);
    solution.needed_percentage = percentage_of(needed, points_possible);

    if needed > points_possible {
        solution.requires_extra_credit = true;
        solution.note = Some(format!(
            "{name} would need {needed} / {points_possible}, more than the points possible; \
             {target_grade}% is only reachable with extra credit"
        ));
    } else {
        solution.achievable = true;
        if needed <= 0.0 {
            solution.note = Some(format!(
                "{target_grade}% is already secured regardless of the score on {name}"
            ));
        }
    }

    Ok(solution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::domain::{AssignmentGroupInput, DropRule, GradePolicy};
    use crate::grading::tests::common::{
        graded_input, single_group_course, two_assignment_course, ungraded_input,
    };

    #[test]
    fn finds_the_exact_score_for_a_reachable_target() {
        let solution =
            solve_target_score(&two_assignment_course(), 90.0, AssignmentId(2)).expect("solves");
        assert_eq!(solution.needed_score, Some(100.0));
        assert_eq!(solution.needed_percentage, Some(100.0));
        assert!(solution.achievable);
        assert!(!solution.requires_extra_credit);
        assert!(solution.note.is_none());
    }

    #[test]
    fn target_beyond_full_marks_needs_extra_credit() {
        let solution =
            solve_target_score(&two_assignment_course(), 99.0, AssignmentId(2)).expect("solves");
        assert!(!solution.achievable);
        assert!(solution.requires_extra_credit);
        assert_eq!(solution.needed_score, Some(118.0));
        assert!(solution.note.expect("note").contains("extra credit"));
    }

    #[test]
    fn target_past_the_ceiling_is_infeasible() {
        let course = single_group_course(
            GradePolicy::unweighted(),
            DropRule::NONE,
            vec![graded_input(1, 100.0, 0.0), ungraded_input(2, 10.0)],
        );
        let solution = solve_target_score(&course, 50.0, AssignmentId(2)).expect("solves");
        assert!(!solution.achievable);
        assert_eq!(solution.needed_score, None);
        assert!(solution.note.expect("note").contains("would not"));
    }

    #[test]
    fn already_met_target_needs_nothing() {
        let solution =
            solve_target_score(&two_assignment_course(), 40.0, AssignmentId(2)).expect("solves");
        assert!(solution.achievable);
        assert_eq!(solution.needed_score, Some(0.0));
        assert!(solution.note.is_some());
    }

    #[test]
    fn dropped_assignment_still_solves_monotonically() {
        let course = single_group_course(
            GradePolicy::unweighted(),
            DropRule::new(1, 0),
            vec![
                graded_input(1, 10.0, 6.0),
                graded_input(2, 10.0, 8.0),
                ungraded_input(3, 10.0),
            ],
        );
        // Below 6 the new score is dropped and the grade stays at 70%.
        let solution = solve_target_score(&course, 75.0, AssignmentId(3)).expect("solves");
        assert_eq!(solution.needed_score, Some(7.0));
        assert!(solution.achievable);
    }

    #[test]
    fn drop_highest_caps_the_grade_once_the_score_leads_the_group() {
        let course = single_group_course(
            GradePolicy::unweighted(),
            DropRule::new(0, 1),
            vec![
                graded_input(1, 10.0, 8.0),
                graded_input(2, 10.0, 6.0),
                ungraded_input(3, 10.0),
            ],
        );

        // Up to 8 the 8/10 is dropped; past it the new score is, so 70% is the ceiling.
        let reachable = solve_target_score(&course, 65.0, AssignmentId(3)).expect("solves");
        assert_eq!(reachable.needed_score, Some(7.0));
        assert!(reachable.achievable);

        let plateau = solve_target_score(&course, 75.0, AssignmentId(3)).expect("solves");
        assert_eq!(plateau.needed_score, None);
        assert!(!plateau.achievable);
    }

    #[test]
    fn reports_input_errors() {
        let course = two_assignment_course();
        assert_eq!(
            solve_target_score(&course, 90.0, AssignmentId(404)),
            Err(GradingError::AssignmentNotFound(AssignmentId(404)))
        );
        assert!(matches!(
            solve_target_score(&course, 120.0, AssignmentId(2)),
            Err(GradingError::InvalidTargetGrade(_))
        ));
        assert!(matches!(
            solve_target_score(&course, f64::NAN, AssignmentId(2)),
            Err(GradingError::InvalidTargetGrade(_))
        ));

        let zero_points = CourseGrades::new(
            GradePolicy::unweighted(),
            vec![AssignmentGroupInput {
                name: "Participation".to_string(),
                assignments: vec![ungraded_input(5, 0.0)],
                ..AssignmentGroupInput::default()
            }],
        );
        assert!(matches!(
            solve_target_score(&zero_points, 90.0, AssignmentId(5)),
            Err(GradingError::ZeroPointsPossible { .. })
        ));
    }

    #[test]
    fn omitted_assignments_cannot_be_solved_for() {
        let mut course = two_assignment_course();
        course.groups[0].assignments[1].omit_from_final_grade = true;
        assert_eq!(
            solve_target_score(&course, 90.0, AssignmentId(2)),
            Err(GradingError::AssignmentNotFound(AssignmentId(2)))
        );
    }
}

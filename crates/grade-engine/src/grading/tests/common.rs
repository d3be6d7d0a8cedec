use crate::grading::domain::{
    AssignmentGroupInput, AssignmentId, AssignmentInput, AssignmentRecord, CourseGrades,
    DropRule, GradePolicy, GradeStatus, GroupRecord, SubmissionInput,
};
use crate::grading::normalizer::graded_status;

pub(crate) fn graded(id: u64, points_possible: f64, score: f64) -> AssignmentRecord {
    AssignmentRecord {
        status: graded_status(score, points_possible),
        ..ungraded(id, points_possible)
    }
}

pub(crate) fn ungraded(id: u64, points_possible: f64) -> AssignmentRecord {
    AssignmentRecord {
        id: AssignmentId(id),
        name: format!("Assignment {id}"),
        points_possible,
        due_at: None,
        status: GradeStatus::Ungraded,
        late: false,
        missing: false,
        score_statistics: None,
    }
}

pub(crate) fn ids(records: &[AssignmentRecord]) -> Vec<u64> {
    records.iter().map(|record| record.id.0).collect()
}

pub(crate) fn group(
    name: &str,
    weight: f64,
    drop_rule: DropRule,
    assignments: Vec<AssignmentRecord>,
) -> GroupRecord {
    GroupRecord {
        name: name.to_string(),
        weight,
        drop_rule,
        assignments,
    }
}

pub(crate) fn ungraded_input(id: u64, points_possible: f64) -> AssignmentInput {
    AssignmentInput {
        id: AssignmentId(id),
        name: format!("Assignment {id}"),
        points_possible,
        due_at: None,
        published: true,
        omit_from_final_grade: false,
        submission: None,
        score_statistics: None,
    }
}

pub(crate) fn graded_input(id: u64, points_possible: f64, score: f64) -> AssignmentInput {
    AssignmentInput {
        submission: Some(SubmissionInput {
            workflow_state: SubmissionInput::GRADED_STATE.to_string(),
            score: Some(score),
            ..SubmissionInput::default()
        }),
        ..ungraded_input(id, points_possible)
    }
}

pub(crate) fn input_group(
    name: &str,
    weight: f64,
    drop_rule: DropRule,
    assignments: Vec<AssignmentInput>,
) -> AssignmentGroupInput {
    AssignmentGroupInput {
        name: name.to_string(),
        weight,
        drop_lowest: drop_rule.drop_lowest,
        drop_highest: drop_rule.drop_highest,
        assignments,
    }
}

pub(crate) fn single_group_course(
    policy: GradePolicy,
    drop_rule: DropRule,
    assignments: Vec<AssignmentInput>,
) -> CourseGrades {
    CourseGrades::new(
        policy,
        vec![input_group("Assignments", 100.0, drop_rule, assignments)],
    )
}

/// A graded 80/100 and an ungraded 100-point assignment, unweighted.
pub(crate) fn two_assignment_course() -> CourseGrades {
    single_group_course(
        GradePolicy::unweighted(),
        DropRule::NONE,
        vec![graded_input(1, 100.0, 80.0), ungraded_input(2, 100.0)],
    )
}

/// Weighted course: Homework 90% after dropping its lowest, Exams 72%, Final ungraded.
pub(crate) fn sample_course() -> CourseGrades {
    let mut unpublished = graded_input(14, 10.0, 0.0);
    unpublished.published = false;
    let mut omitted = graded_input(15, 10.0, 0.0);
    omitted.omit_from_final_grade = true;

    CourseGrades::new(
        GradePolicy::weighted(),
        vec![
            input_group(
                "Homework",
                30.0,
                DropRule::new(1, 0),
                vec![
                    graded_input(11, 10.0, 8.0),
                    graded_input(12, 10.0, 10.0),
                    graded_input(13, 10.0, 4.0),
                    unpublished,
                    omitted,
                ],
            ),
            input_group(
                "Exams",
                40.0,
                DropRule::NONE,
                vec![graded_input(21, 100.0, 72.0)],
            ),
            input_group(
                "Final Exam",
                30.0,
                DropRule::NONE,
                vec![ungraded_input(31, 100.0)],
            ),
        ],
    )
}

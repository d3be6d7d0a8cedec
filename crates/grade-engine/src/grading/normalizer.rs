use super::domain::{
    AssignmentGroupInput, AssignmentInput, AssignmentRecord, CourseGrades, GradeStatus,
    GroupRecord,
};
use super::rounding::percentage_of;

/// Convert one assignment and its submission into the engine's canonical record.
///
/// A record is graded only when a submission exists, its workflow state is
/// `graded`, and it carries a score. Ungraded records have neither a score nor a
/// percentage; a zero score is still a graded score.
pub fn normalize_assignment(input: &AssignmentInput) -> AssignmentRecord {
    let points_possible = input.points_possible.max(0.0);
    let status = input
        .submission
        .as_ref()
        .and_then(|submission| submission.graded_score())
        .map(|score| graded_status(score, points_possible))
        .unwrap_or(GradeStatus::Ungraded);

    let (late, missing) = input
        .submission
        .as_ref()
        .map(|submission| (submission.late, submission.missing))
        .unwrap_or((false, false));

    AssignmentRecord {
        id: input.id,
        name: input.name.clone(),
        points_possible,
        due_at: input.due_at,
        status,
        late,
        missing,
        score_statistics: input.score_statistics,
    }
}

/// Normalize a group, leaving out unpublished and omitted assignments.
pub fn normalize_group(group: &AssignmentGroupInput) -> GroupRecord {
    GroupRecord {
        name: group.name.clone(),
        weight: group.weight,
        drop_rule: group.drop_rule(),
        assignments: group
            .assignments
            .iter()
            .filter(|assignment| assignment.counts_toward_grade())
            .map(normalize_assignment)
            .collect(),
    }
}

pub fn normalize_course(course: &CourseGrades) -> Vec<GroupRecord> {
    course.groups.iter().map(normalize_group).collect()
}

pub(crate) fn graded_status(score: f64, points_possible: f64) -> GradeStatus {
    GradeStatus::Graded {
        score,
        percentage: percentage_of(score, points_possible),
    }
}

impl AssignmentRecord {
    /// Copy of this record graded at `score`, as if the score had been entered.
    pub fn with_score(&self, score: f64) -> Self {
        Self {
            status: graded_status(score, self.points_possible),
            ..self.clone()
        }
    }
}

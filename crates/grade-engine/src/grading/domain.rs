use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier wrapper for LMS assignments.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AssignmentId(pub u64);

impl fmt::Display for AssignmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Selects between category-weighted and flat points-based overall grades.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradePolicy {
    pub uses_weights: bool,
}

impl GradePolicy {
    pub const fn weighted() -> Self {
        Self { uses_weights: true }
    }

    pub const fn unweighted() -> Self {
        Self {
            uses_weights: false,
        }
    }

    pub const fn label(self) -> &'static str {
        if self.uses_weights {
            "Weighted by category"
        } else {
            "Total points"
        }
    }
}

/// Course grading data as delivered by the LMS client, already fetched and deserialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseGrades {
    #[serde(default)]
    pub uses_weights: bool,
    #[serde(default)]
    pub groups: Vec<AssignmentGroupInput>,
}

impl CourseGrades {
    pub fn new(policy: GradePolicy, groups: Vec<AssignmentGroupInput>) -> Self {
        Self {
            uses_weights: policy.uses_weights,
            groups,
        }
    }

    pub fn policy(&self) -> GradePolicy {
        GradePolicy {
            uses_weights: self.uses_weights,
        }
    }

    /// Locate an assignment that counts toward the final grade, with its group.
    pub fn find_assignment(
        &self,
        id: AssignmentId,
    ) -> Option<(&AssignmentGroupInput, &AssignmentInput)> {
        self.groups.iter().find_map(|group| {
            group
                .assignments
                .iter()
                .find(|assignment| assignment.id == id && assignment.counts_toward_grade())
                .map(|assignment| (group, assignment))
        })
    }
}

/// Weighted category of assignments ("Homework", "Exams").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssignmentGroupInput {
    pub name: String,
    #[serde(default, alias = "group_weight")]
    pub weight: f64,
    #[serde(default)]
    pub drop_lowest: u32,
    #[serde(default)]
    pub drop_highest: u32,
    #[serde(default)]
    pub assignments: Vec<AssignmentInput>,
}

impl AssignmentGroupInput {
    pub fn drop_rule(&self) -> DropRule {
        DropRule {
            drop_lowest: self.drop_lowest,
            drop_highest: self.drop_highest,
        }
    }
}

/// Raw assignment together with the student's submission, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentInput {
    pub id: AssignmentId,
    pub name: String,
    #[serde(default)]
    pub points_possible: f64,
    #[serde(default)]
    pub due_at: Option<DateTime<Utc>>,
    #[serde(default = "default_published")]
    pub published: bool,
    #[serde(default)]
    pub omit_from_final_grade: bool,
    #[serde(default)]
    pub submission: Option<SubmissionInput>,
    #[serde(default)]
    pub score_statistics: Option<ScoreStatistics>,
}

fn default_published() -> bool {
    true
}

impl AssignmentInput {
    /// Unpublished and omitted assignments never take part in grade computation.
    pub fn counts_toward_grade(&self) -> bool {
        self.published && !self.omit_from_final_grade
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionInput {
    #[serde(default)]
    pub workflow_state: String,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub late: bool,
    #[serde(default)]
    pub missing: bool,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl SubmissionInput {
    pub const GRADED_STATE: &'static str = "graded";

    pub fn graded_score(&self) -> Option<f64> {
        if self.workflow_state == Self::GRADED_STATE {
            self.score
        } else {
            None
        }
    }
}

/// Class-wide score distribution, passed through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreStatistics {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

/// Drop-lowest / drop-highest counts configured on a group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropRule {
    pub drop_lowest: u32,
    pub drop_highest: u32,
}

impl DropRule {
    pub const NONE: Self = Self {
        drop_lowest: 0,
        drop_highest: 0,
    };

    pub const fn new(drop_lowest: u32, drop_highest: u32) -> Self {
        Self {
            drop_lowest,
            drop_highest,
        }
    }

    pub const fn is_noop(self) -> bool {
        self.drop_lowest == 0 && self.drop_highest == 0
    }
}

/// Grading state of a normalized assignment. A percentage can only exist on a graded record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GradeStatus {
    Ungraded,
    Graded {
        score: f64,
        /// Absent when the assignment is worth zero points.
        percentage: Option<f64>,
    },
}

/// Canonical per-assignment record the rest of the engine works from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "AssignmentRecordView")]
pub struct AssignmentRecord {
    pub id: AssignmentId,
    pub name: String,
    pub points_possible: f64,
    pub due_at: Option<DateTime<Utc>>,
    pub status: GradeStatus,
    pub late: bool,
    pub missing: bool,
    pub score_statistics: Option<ScoreStatistics>,
}

impl AssignmentRecord {
    pub fn is_graded(&self) -> bool {
        matches!(self.status, GradeStatus::Graded { .. })
    }

    pub fn score(&self) -> Option<f64> {
        match self.status {
            GradeStatus::Graded { score, .. } => Some(score),
            GradeStatus::Ungraded => None,
        }
    }

    pub fn percentage(&self) -> Option<f64> {
        match self.status {
            GradeStatus::Graded { percentage, .. } => percentage,
            GradeStatus::Ungraded => None,
        }
    }

    /// Fraction of points earned, used to rank records for drop rules.
    pub(crate) fn earned_ratio(&self) -> f64 {
        match self.score() {
            Some(score) if self.points_possible > 0.0 => score / self.points_possible,
            _ => 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct AssignmentRecordView {
    id: AssignmentId,
    name: String,
    points_possible: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    due_at: Option<DateTime<Utc>>,
    graded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    percentage: Option<f64>,
    late: bool,
    missing: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    score_statistics: Option<ScoreStatistics>,
}

impl From<AssignmentRecord> for AssignmentRecordView {
    fn from(record: AssignmentRecord) -> Self {
        Self {
            graded: record.is_graded(),
            score: record.score(),
            percentage: record.percentage(),
            id: record.id,
            name: record.name,
            points_possible: record.points_possible,
            due_at: record.due_at,
            late: record.late,
            missing: record.missing,
            score_statistics: record.score_statistics,
        }
    }
}

/// A category after publish/omit filtering and normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupRecord {
    pub name: String,
    pub weight: f64,
    pub drop_rule: DropRule,
    pub assignments: Vec<AssignmentRecord>,
}

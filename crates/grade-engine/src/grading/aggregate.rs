use super::domain::{AssignmentRecord, GroupRecord};
use super::drops::drop_mask;
use super::rounding::{percentage_of, round_to_cents};
use serde::Serialize;

/// Category totals after drop rules.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupBreakdown {
    pub name: String,
    pub weight: f64,
    pub earned: f64,
    pub possible: f64,
    pub percentage: Option<f64>,
    pub weighted_contribution: Option<f64>,
    pub graded_count: usize,
    pub total_count: usize,
    pub missing_count: usize,
    pub late_count: usize,
    /// Every assignment that still counts, graded or not, in listing order.
    pub assignments: Vec<AssignmentRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dropped: Vec<AssignmentRecord>,
}

impl GroupBreakdown {
    /// Unrounded earned/possible percentage.
    pub(crate) fn exact_percentage(&self) -> Option<f64> {
        if self.possible > 0.0 {
            Some(self.earned / self.possible * 100.0)
        } else {
            None
        }
    }
}

/// Sum a group's graded work after applying its drop rule.
///
/// Counts are taken before drops: dropping an assignment changes the grade,
/// not how many assignments the student sees as graded.
pub fn aggregate_group(group: &GroupRecord) -> GroupBreakdown {
    let graded: Vec<AssignmentRecord> = group
        .assignments
        .iter()
        .filter(|record| record.is_graded())
        .cloned()
        .collect();
    let mut mask = drop_mask(&graded, group.drop_rule)
        .unwrap_or_default()
        .into_iter();

    let mut assignments = Vec::with_capacity(group.assignments.len());
    let mut dropped = Vec::new();
    let mut earned = 0.0;
    let mut possible = 0.0;

    for record in &group.assignments {
        let Some(score) = record.score() else {
            assignments.push(record.clone());
            continue;
        };

        if mask.next().unwrap_or(false) {
            dropped.push(record.clone());
            continue;
        }

        earned += score;
        possible += record.points_possible;
        assignments.push(record.clone());
    }

    let percentage = percentage_of(earned, possible);
    let weighted_contribution = percentage.map(|value| round_to_cents(value * group.weight / 100.0));

    GroupBreakdown {
        name: group.name.clone(),
        weight: group.weight,
        earned,
        possible,
        percentage,
        weighted_contribution,
        graded_count: graded.len(),
        total_count: group.assignments.len(),
        missing_count: group.assignments.iter().filter(|r| r.missing).count(),
        late_count: group.assignments.iter().filter(|r| r.late).count(),
        assignments,
        dropped,
    }
}

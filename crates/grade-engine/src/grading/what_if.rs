use super::aggregate::{aggregate_group, GroupBreakdown};
use super::calculator::{exact_overall_grade, overall_grade};
use super::domain::{AssignmentId, AssignmentRecord, CourseGrades, GradePolicy, GroupRecord};
use super::error::GradingError;
use super::normalizer::normalize_course;
use super::rounding::round_to_cents;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Hypothetical scores keyed by assignment id.
pub type HypotheticalOverlay = BTreeMap<AssignmentId, f64>;

/// Hypothetical scores above this share of points possible are flagged as implausible.
pub const IMPLAUSIBLE_SCORE_RATIO: f64 = 1.5;

/// A what-if request: explicit per-assignment scores, and optionally one
/// percentage assumed on every remaining ungraded assignment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WhatIfScenario {
    #[serde(default)]
    pub overlay: HypotheticalOverlay,
    #[serde(default)]
    pub assumed_percentage: Option<f64>,
}

impl WhatIfScenario {
    pub fn with_score(mut self, id: AssignmentId, score: f64) -> Self {
        self.overlay.insert(id, score);
        self
    }

    pub fn assuming(percentage: f64) -> Self {
        Self {
            overlay: HypotheticalOverlay::new(),
            assumed_percentage: Some(percentage),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.overlay.is_empty() && self.assumed_percentage.is_none()
    }

    pub fn validate(&self) -> Result<(), GradingError> {
        if let Some((id, score)) = self.overlay.iter().find(|(_, score)| !score.is_finite()) {
            return Err(GradingError::InvalidHypotheticalScore {
                id: *id,
                score: *score,
            });
        }
        match self.assumed_percentage {
            Some(percentage) if !percentage.is_finite() || percentage < 0.0 => {
                Err(GradingError::InvalidAssumedPercentage(percentage))
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSource {
    /// Supplied explicitly for this assignment.
    Hypothetical,
    /// Filled in from the scenario's assumed percentage.
    Assumed,
}

/// A substitution the projector actually made.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedScore {
    pub assignment_id: AssignmentId,
    pub assignment_name: String,
    pub group_name: String,
    /// Position of the group in the course, since group names need not be unique.
    #[serde(skip)]
    pub group_index: usize,
    pub hypothetical_score: f64,
    pub points_possible: f64,
    pub hypothetical_percentage: Option<f64>,
    pub source: ScoreSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationLevel {
    Warning,
    Note,
}

/// Non-blocking remark about a hypothetical score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreObservation {
    pub assignment_id: AssignmentId,
    pub level: ObservationLevel,
    pub message: String,
}

/// Breakdown recomputed with a scenario overlaid on the real records.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub groups: Vec<GroupBreakdown>,
    pub overall: Option<f64>,
    pub exact_overall: Option<f64>,
    pub applied: Vec<AppliedScore>,
    pub observations: Vec<ScoreObservation>,
}

/// Project a course under `scenario`.
///
/// Ids in the overlay that match no counting assignment are ignored.
pub fn project(course: &CourseGrades, scenario: &WhatIfScenario) -> Projection {
    project_records(&normalize_course(course), course.policy(), scenario)
}

/// Project already-normalized groups. Drop rules run over the combined real and
/// hypothetical graded set, so a low hypothetical score can itself be dropped.
pub fn project_records(
    groups: &[GroupRecord],
    policy: GradePolicy,
    scenario: &WhatIfScenario,
) -> Projection {
    let mut applied = Vec::new();
    let mut observations = Vec::new();

    let breakdowns: Vec<GroupBreakdown> = groups
        .iter()
        .enumerate()
        .map(|(group_index, group)| {
            if scenario.is_empty() {
                return aggregate_group(group);
            }

            let assignments = group
                .assignments
                .iter()
                .map(|record| {
                    let Some((score, source)) = substitute_score(record, scenario) else {
                        return record.clone();
                    };

                    if source == ScoreSource::Hypothetical {
                        observations.extend(observe(record, score));
                    }
                    let projected = record.with_score(score);
                    applied.push(AppliedScore {
                        assignment_id: record.id,
                        assignment_name: record.name.clone(),
                        group_name: group.name.clone(),
                        group_index,
                        hypothetical_score: score,
                        points_possible: record.points_possible,
                        hypothetical_percentage: projected.percentage(),
                        source,
                    });
                    projected
                })
                .collect();

            aggregate_group(&GroupRecord {
                name: group.name.clone(),
                weight: group.weight,
                drop_rule: group.drop_rule,
                assignments,
            })
        })
        .collect();

    if !applied.is_empty() {
        debug!(
            substitutions = applied.len(),
            "projected course with hypothetical scores"
        );
    }

    Projection {
        overall: overall_grade(&breakdowns, policy),
        exact_overall: exact_overall_grade(&breakdowns, policy),
        groups: breakdowns,
        applied,
        observations,
    }
}

fn substitute_score(
    record: &AssignmentRecord,
    scenario: &WhatIfScenario,
) -> Option<(f64, ScoreSource)> {
    if let Some(score) = scenario.overlay.get(&record.id) {
        return Some((*score, ScoreSource::Hypothetical));
    }

    match scenario.assumed_percentage {
        Some(percentage) if !record.is_graded() && record.points_possible > 0.0 => Some((
            record.points_possible * percentage / 100.0,
            ScoreSource::Assumed,
        )),
        _ => None,
    }
}

fn observe(record: &AssignmentRecord, score: f64) -> Option<ScoreObservation> {
    let (level, message) = if score < 0.0 {
        (
            ObservationLevel::Warning,
            format!("{}: hypothetical score {score} is negative", record.name),
        )
    } else if record.points_possible <= 0.0 {
        return None;
    } else if score > record.points_possible * IMPLAUSIBLE_SCORE_RATIO {
        (
            ObservationLevel::Warning,
            format!(
                "{}: hypothetical score {score} exceeds 150% of the {} points possible",
                record.name, record.points_possible
            ),
        )
    } else if score > record.points_possible {
        (
            ObservationLevel::Note,
            format!(
                "{}: hypothetical score {score} is above the {} points possible and counts as extra credit",
                record.name, record.points_possible
            ),
        )
    } else {
        return None;
    };

    Some(ScoreObservation {
        assignment_id: record.id,
        level,
        message,
    })
}

/// Before/after view of one category touched by a scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupImpact {
    pub name: String,
    pub current_percentage: Option<f64>,
    pub projected_percentage: Option<f64>,
    pub change: Option<f64>,
}

/// Caller-facing what-if result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WhatIfOutcome {
    pub current_grade: Option<f64>,
    pub projected_grade: Option<f64>,
    pub change: Option<f64>,
    pub scenarios_applied: Vec<AppliedScore>,
    pub group_impacts: Vec<GroupImpact>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

/// Compare the real grade against the grade under `scenario`.
pub fn what_if(
    course: &CourseGrades,
    scenario: &WhatIfScenario,
) -> Result<WhatIfOutcome, GradingError> {
    scenario.validate()?;

    let records = normalize_course(course);
    let policy = course.policy();
    let current = project_records(&records, policy, &WhatIfScenario::default());
    let projected = project_records(&records, policy, scenario);

    let group_impacts = current
        .groups
        .iter()
        .zip(&projected.groups)
        .enumerate()
        .filter(|(index, _)| {
            projected
                .applied
                .iter()
                .any(|applied| applied.group_index == *index)
        })
        .map(|(_, (before, after))| GroupImpact {
            name: after.name.clone(),
            current_percentage: before.percentage,
            projected_percentage: after.percentage,
            change: difference(before.percentage, after.percentage),
        })
        .collect();

    let (warnings, notes) = projected.observations.into_iter().fold(
        (Vec::new(), Vec::new()),
        |(mut warnings, mut notes), observation| {
            match observation.level {
                ObservationLevel::Warning => warnings.push(observation.message),
                ObservationLevel::Note => notes.push(observation.message),
            }
            (warnings, notes)
        },
    );

    Ok(WhatIfOutcome {
        current_grade: current.overall,
        projected_grade: projected.overall,
        change: difference(current.overall, projected.overall),
        scenarios_applied: projected.applied,
        group_impacts,
        warnings,
        notes,
    })
}

fn difference(before: Option<f64>, after: Option<f64>) -> Option<f64> {
    before
        .zip(after)
        .map(|(before, after)| round_to_cents(after - before))
}

/// Grade if every ungraded assignment with points earned `percentage`.
pub(crate) fn grade_if_uniform(
    groups: &[GroupRecord],
    policy: GradePolicy,
    percentage: f64,
) -> Option<f64> {
    project_records(groups, policy, &WhatIfScenario::assuming(percentage)).overall
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::domain::DropRule;
    use crate::grading::tests::common::{
        graded_input, input_group, sample_course, two_assignment_course, ungraded_input,
    };

    #[test]
    fn empty_scenario_reproduces_the_real_breakdown() {
        let course = sample_course();
        let projection = project(&course, &WhatIfScenario::default());
        let records = normalize_course(&course);
        let baseline: Vec<_> = records.iter().map(aggregate_group).collect();

        assert_eq!(projection.groups, baseline);
        assert_eq!(projection.overall, overall_grade(&baseline, course.policy()));
        assert!(projection.applied.is_empty());
        assert!(projection.observations.is_empty());
    }

    #[test]
    fn overlay_grades_an_ungraded_assignment() {
        let course = two_assignment_course();
        let scenario = WhatIfScenario::default().with_score(AssignmentId(2), 100.0);

        let outcome = what_if(&course, &scenario).expect("valid scenario");

        assert_eq!(outcome.current_grade, Some(80.0));
        assert_eq!(outcome.projected_grade, Some(90.0));
        assert_eq!(outcome.change, Some(10.0));
        assert_eq!(outcome.scenarios_applied.len(), 1);
        assert_eq!(outcome.scenarios_applied[0].source, ScoreSource::Hypothetical);
        assert_eq!(outcome.group_impacts.len(), 1);
        assert!(outcome.warnings.is_empty() && outcome.notes.is_empty());
    }

    #[test]
    fn overlay_replaces_a_real_score() {
        let course = two_assignment_course();
        let scenario = WhatIfScenario::default().with_score(AssignmentId(1), 50.0);
        let outcome = what_if(&course, &scenario).expect("valid scenario");
        assert_eq!(outcome.projected_grade, Some(50.0));
        assert_eq!(outcome.change, Some(-30.0));
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let course = two_assignment_course();
        let scenario = WhatIfScenario::default().with_score(AssignmentId(999), 10.0);
        let outcome = what_if(&course, &scenario).expect("valid scenario");
        assert!(outcome.scenarios_applied.is_empty());
        assert!(outcome.group_impacts.is_empty());
        assert_eq!(outcome.projected_grade, outcome.current_grade);
        assert_eq!(outcome.change, Some(0.0));
    }

    #[test]
    fn assumed_percentage_fills_only_ungraded_work() {
        let course = two_assignment_course();
        let projection = project(&course, &WhatIfScenario::assuming(60.0));
        assert_eq!(projection.applied.len(), 1);
        assert_eq!(projection.applied[0].assignment_id, AssignmentId(2));
        assert_eq!(projection.applied[0].hypothetical_score, 60.0);
        assert_eq!(projection.applied[0].source, ScoreSource::Assumed);
        assert_eq!(projection.overall, Some(70.0));
    }

    #[test]
    fn implausible_scores_warn_and_extra_credit_notes() {
        let course = two_assignment_course();

        let wild = what_if(
            &course,
            &WhatIfScenario::default().with_score(AssignmentId(2), 160.0),
        )
        .expect("valid scenario");
        assert_eq!(wild.warnings.len(), 1);
        assert!(wild.warnings[0].contains("150%"));
        assert!(wild.notes.is_empty());

        let bonus = what_if(
            &course,
            &WhatIfScenario::default().with_score(AssignmentId(2), 120.0),
        )
        .expect("valid scenario");
        assert!(bonus.warnings.is_empty());
        assert_eq!(bonus.notes.len(), 1);
        assert!(bonus.notes[0].contains("extra credit"));
    }

    #[test]
    fn rejects_non_finite_inputs() {
        let course = two_assignment_course();
        let scenario = WhatIfScenario::default().with_score(AssignmentId(2), f64::NAN);
        assert!(matches!(
            what_if(&course, &scenario),
            Err(GradingError::InvalidHypotheticalScore { .. })
        ));
        assert!(matches!(
            what_if(&course, &WhatIfScenario::assuming(f64::INFINITY)),
            Err(GradingError::InvalidAssumedPercentage(_))
        ));
    }

    #[test]
    fn impacts_follow_the_touched_group_even_when_names_repeat() {
        let course = CourseGrades::new(
            GradePolicy::unweighted(),
            vec![
                input_group(
                    "Homework",
                    0.0,
                    DropRule::NONE,
                    vec![graded_input(1, 10.0, 9.0)],
                ),
                input_group(
                    "Homework",
                    0.0,
                    DropRule::NONE,
                    vec![graded_input(2, 10.0, 5.0), ungraded_input(3, 10.0)],
                ),
            ],
        );
        let scenario = WhatIfScenario::default().with_score(AssignmentId(3), 10.0);

        let outcome = what_if(&course, &scenario).expect("valid scenario");

        assert_eq!(outcome.scenarios_applied[0].group_index, 1);
        assert_eq!(outcome.group_impacts.len(), 1);
        assert_eq!(outcome.group_impacts[0].current_percentage, Some(50.0));
        assert_eq!(outcome.group_impacts[0].projected_percentage, Some(75.0));
        assert_eq!(outcome.group_impacts[0].change, Some(25.0));
    }
}

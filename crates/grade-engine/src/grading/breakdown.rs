use super::aggregate::{aggregate_group, GroupBreakdown};
use super::calculator::overall_grade;
use super::domain::{CourseGrades, GradePolicy, GroupRecord};
use super::normalizer::normalize_course;
use super::rounding::round_to_cents;
use super::what_if::grade_if_uniform;
use serde::Serialize;
use std::io;

/// Uniform percentages projected onto remaining work in every breakdown.
pub const PRESET_SCENARIOS: [f64; 3] = [100.0, 80.0, 60.0];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStanding {
    pub name: String,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownAnalysis {
    pub strongest_group: Option<GroupStanding>,
    pub weakest_group: Option<GroupStanding>,
    pub ungraded_points_remaining: f64,
    pub grade_if_perfect: Option<f64>,
    pub grade_if_80: Option<f64>,
    pub grade_if_60: Option<f64>,
}

/// Category-by-category view of a course with simple forward projections.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseBreakdown {
    pub policy: GradePolicy,
    pub current_grade: Option<f64>,
    pub groups: Vec<GroupBreakdown>,
    pub analysis: BreakdownAnalysis,
}

pub fn analyze_course(course: &CourseGrades) -> CourseBreakdown {
    let records = normalize_course(course);
    let policy = course.policy();
    let groups: Vec<GroupBreakdown> = records.iter().map(aggregate_group).collect();
    let [perfect, eighty, sixty] =
        PRESET_SCENARIOS.map(|percentage| grade_if_uniform(&records, policy, percentage));

    let analysis = BreakdownAnalysis {
        strongest_group: standing(&groups, |candidate, best| candidate > best),
        weakest_group: standing(&groups, |candidate, best| candidate < best),
        ungraded_points_remaining: ungraded_points(&records),
        grade_if_perfect: perfect,
        grade_if_80: eighty,
        grade_if_60: sixty,
    };

    CourseBreakdown {
        policy,
        current_grade: overall_grade(&groups, policy),
        groups,
        analysis,
    }
}

/// First group whose percentage beats every other under `better`; earlier groups win ties.
fn standing(
    groups: &[GroupBreakdown],
    better: impl Fn(f64, f64) -> bool,
) -> Option<GroupStanding> {
    groups
        .iter()
        .filter_map(|group| group.percentage.map(|percentage| (group, percentage)))
        .fold(None, |best: Option<(&GroupBreakdown, f64)>, (group, percentage)| {
            match best {
                Some((_, best_percentage)) if !better(percentage, best_percentage) => best,
                _ => Some((group, percentage)),
            }
        })
        .map(|(group, percentage)| GroupStanding {
            name: group.name.clone(),
            percentage,
        })
}

fn ungraded_points(records: &[GroupRecord]) -> f64 {
    let total: f64 = records
        .iter()
        .flat_map(|group| &group.assignments)
        .filter(|record| !record.is_graded())
        .map(|record| record.points_possible)
        .sum();
    round_to_cents(total)
}

impl CourseBreakdown {
    /// Write one CSV row per group.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record([
            "group",
            "weight",
            "earned",
            "possible",
            "percentage",
            "weighted_contribution",
            "graded",
            "total",
            "dropped",
        ])?;

        for group in &self.groups {
            csv.write_record([
                group.name.clone(),
                group.weight.to_string(),
                group.earned.to_string(),
                group.possible.to_string(),
                optional_cell(group.percentage),
                optional_cell(group.weighted_contribution),
                group.graded_count.to_string(),
                group.total_count.to_string(),
                group.dropped.len().to_string(),
            ])?;
        }

        csv.flush()?;
        Ok(())
    }
}

fn optional_cell(value: Option<f64>) -> String {
    value.map(|value| value.to_string()).unwrap_or_default()
}

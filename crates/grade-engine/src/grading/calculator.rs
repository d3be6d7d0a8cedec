use super::aggregate::GroupBreakdown;
use super::domain::GradePolicy;
use super::rounding::percentage_of;

/// Overall course percentage, or `None` when nothing counting has been graded.
///
/// Weighted courses normalize by the weight of categories that actually have
/// graded work, so an empty category does not pull the grade toward zero.
pub fn overall_grade(groups: &[GroupBreakdown], policy: GradePolicy) -> Option<f64> {
    if policy.uses_weights {
        let (weighted_sum, total_weight) = groups
            .iter()
            .filter(|group| group.weight > 0.0)
            .filter_map(|group| {
                group
                    .weighted_contribution
                    .filter(|_| group.percentage.is_some())
                    .map(|contribution| (contribution, group.weight))
            })
            .fold((0.0, 0.0), |(sum, weight), (contribution, group_weight)| {
                (sum + contribution, weight + group_weight)
            });

        if total_weight > 0.0 {
            Some((weighted_sum / total_weight * 10000.0).round() / 100.0)
        } else {
            None
        }
    } else {
        let (earned, possible) = point_totals(groups);
        percentage_of(earned, possible)
    }
}

/// Same aggregation as [`overall_grade`] without intermediate rounding.
///
/// The target solver bisects over this value; rounded steps would shift the
/// boundary it converges to.
pub fn exact_overall_grade(groups: &[GroupBreakdown], policy: GradePolicy) -> Option<f64> {
    if policy.uses_weights {
        let (weighted_sum, total_weight) = groups
            .iter()
            .filter(|group| group.weight > 0.0)
            .filter_map(|group| {
                group
                    .exact_percentage()
                    .map(|percentage| (percentage * group.weight, group.weight))
            })
            .fold((0.0, 0.0), |(sum, weight), (part, group_weight)| {
                (sum + part, weight + group_weight)
            });

        (total_weight > 0.0).then(|| weighted_sum / total_weight)
    } else {
        let (earned, possible) = point_totals(groups);
        (possible > 0.0).then(|| earned / possible * 100.0)
    }
}

fn point_totals(groups: &[GroupBreakdown]) -> (f64, f64) {
    groups.iter().fold((0.0, 0.0), |(earned, possible), group| {
        (earned + group.earned, possible + group.possible)
    })
}

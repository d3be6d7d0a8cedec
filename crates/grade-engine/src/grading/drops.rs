use super::domain::{AssignmentRecord, DropRule};
use std::borrow::Cow;
use std::cmp::Ordering;

/// Records that still count after a drop rule, plus the ones it removed.
#[derive(Debug, Clone, PartialEq)]
pub struct DropOutcome<'a> {
    pub kept: Cow<'a, [AssignmentRecord]>,
    pub dropped: Vec<AssignmentRecord>,
}

/// Apply drop-lowest / drop-highest to a group's graded records.
///
/// Records are ranked by earned percentage rather than raw points, ties keep
/// their listed order, and at least one record always survives. Both `kept`
/// and `dropped` preserve the original order.
pub fn apply_drop_rules(graded: &[AssignmentRecord], rule: DropRule) -> DropOutcome<'_> {
    let Some(mask) = drop_mask(graded, rule) else {
        return DropOutcome {
            kept: Cow::Borrowed(graded),
            dropped: Vec::new(),
        };
    };

    let (dropped, kept): (Vec<_>, Vec<_>) = graded
        .iter()
        .zip(mask)
        .partition(|(_, removed)| *removed);

    DropOutcome {
        kept: Cow::Owned(kept.into_iter().map(|(record, _)| record.clone()).collect()),
        dropped: dropped.into_iter().map(|(record, _)| record.clone()).collect(),
    }
}

/// Per-record removal flags, or `None` when the rule removes nothing.
pub(crate) fn drop_mask(graded: &[AssignmentRecord], rule: DropRule) -> Option<Vec<bool>> {
    if graded.is_empty() || rule.is_noop() {
        return None;
    }

    let count = graded.len();
    let requested_lowest = rule.drop_lowest as usize;
    let requested_highest = rule.drop_highest as usize;
    let total_to_drop = requested_lowest
        .saturating_add(requested_highest)
        .min(count - 1);
    if total_to_drop == 0 {
        return None;
    }

    let lowest = requested_lowest.min(total_to_drop);
    let highest = requested_highest.min(total_to_drop - lowest);

    // sort_by is stable, so equal ratios keep listing order.
    let mut ranked: Vec<usize> = (0..count).collect();
    ranked.sort_by(|&a, &b| {
        graded[a]
            .earned_ratio()
            .partial_cmp(&graded[b].earned_ratio())
            .unwrap_or(Ordering::Equal)
    });

    let mut mask = vec![false; count];
    for &index in ranked.iter().take(lowest) {
        mask[index] = true;
    }
    for &index in ranked.iter().rev().take(highest) {
        mask[index] = true;
    }

    Some(mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::tests::common::{graded, ids};

    #[test]
    fn no_rule_borrows_the_input() {
        let records = vec![graded(1, 10.0, 4.0), graded(2, 10.0, 9.0)];
        let outcome = apply_drop_rules(&records, DropRule::NONE);
        assert!(matches!(outcome.kept, Cow::Borrowed(_)));
        assert!(outcome.dropped.is_empty());
    }

    #[test]
    fn empty_input_is_returned_unchanged() {
        let outcome = apply_drop_rules(&[], DropRule::new(2, 2));
        assert!(outcome.kept.is_empty());
        assert!(outcome.dropped.is_empty());
    }

    #[test]
    fn compares_by_percentage_not_points() {
        // 40/100 is the larger raw score but the weaker percentage.
        let records = vec![graded(1, 10.0, 5.0), graded(2, 100.0, 40.0)];
        let outcome = apply_drop_rules(&records, DropRule::new(1, 0));
        assert_eq!(ids(&outcome.kept), vec![1]);
        assert_eq!(ids(&outcome.dropped), vec![2]);
    }

    #[test]
    fn drop_lowest_and_highest_leave_the_middle_in_order() {
        let records = vec![
            graded(1, 10.0, 7.0),
            graded(2, 10.0, 10.0),
            graded(3, 10.0, 2.0),
            graded(4, 10.0, 8.0),
            graded(5, 10.0, 6.0),
        ];
        let outcome = apply_drop_rules(&records, DropRule::new(1, 1));
        assert_eq!(ids(&outcome.kept), vec![1, 4, 5]);
        assert_eq!(ids(&outcome.dropped), vec![2, 3]);
    }

    #[test]
    fn never_drops_every_record() {
        let records = vec![graded(1, 10.0, 3.0), graded(2, 10.0, 9.0)];
        let outcome = apply_drop_rules(&records, DropRule::new(5, 5));
        assert_eq!(ids(&outcome.kept), vec![2]);

        let single = vec![graded(9, 10.0, 1.0)];
        let outcome = apply_drop_rules(&single, DropRule::new(1, 0));
        assert_eq!(ids(&outcome.kept), vec![9]);
        assert!(matches!(outcome.kept, Cow::Borrowed(_)));
    }

    #[test]
    fn capped_budget_prefers_drop_lowest() {
        let records = vec![
            graded(1, 10.0, 3.0),
            graded(2, 10.0, 9.0),
            graded(3, 10.0, 5.0),
        ];
        let outcome = apply_drop_rules(&records, DropRule::new(2, 2));
        assert_eq!(ids(&outcome.kept), vec![2]);
    }

    #[test]
    fn earliest_listed_wins_ties_for_lowest() {
        let records = vec![
            graded(1, 10.0, 5.0),
            graded(2, 20.0, 10.0),
            graded(3, 10.0, 9.0),
        ];
        let outcome = apply_drop_rules(&records, DropRule::new(1, 0));
        assert_eq!(ids(&outcome.dropped), vec![1]);
    }

    #[test]
    fn zero_point_records_rank_as_zero() {
        let records = vec![graded(1, 0.0, 3.0), graded(2, 10.0, 1.0)];
        let outcome = apply_drop_rules(&records, DropRule::new(1, 0));
        assert_eq!(ids(&outcome.dropped), vec![1]);
    }

    #[test]
    fn one_and_one_removes_extremes_from_larger_sets() {
        for count in 3..9u64 {
            let records: Vec<_> = (0..count)
                .map(|i| graded(i, 10.0, ((i * 37) % 101) as f64))
                .collect();
            let outcome = apply_drop_rules(&records, DropRule::new(1, 1));
            assert_eq!(outcome.kept.len() as u64, count - 2);

            let min = records
                .iter()
                .map(|r| r.earned_ratio())
                .fold(f64::INFINITY, f64::min);
            let max = records
                .iter()
                .map(|r| r.earned_ratio())
                .fold(f64::NEG_INFINITY, f64::max);
            assert!(outcome
                .kept
                .iter()
                .all(|r| r.earned_ratio() > min && r.earned_ratio() < max));
        }
    }
}

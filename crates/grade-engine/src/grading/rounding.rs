//! Rounding shared by every percentage the engine reports.

/// `part / whole` as a percentage with one decimal place, absent when `whole` is not positive.
pub(crate) fn percentage_of(part: f64, whole: f64) -> Option<f64> {
    if whole > 0.0 {
        Some((part / whole * 1000.0).round() / 10.0)
    } else {
        None
    }
}

pub(crate) fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

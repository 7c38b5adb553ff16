//! Period-over-period growth.

/// Percentage change from `previous` to `current`, rounded to 2 decimals.
///
/// A zero `previous` has no meaningful ratio. It reports `100` when there is
/// new positive activity and `0` otherwise; dashboards depend on this exact
/// policy, so it is not a true growth rate in that case.
pub fn compute_growth(previous: f64, current: f64) -> f64 {
    if previous == 0.0 {
        return if current > 0.0 { 100.0 } else { 0.0 };
    }
    round2((current - previous) / previous * 100.0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

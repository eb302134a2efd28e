//! Adoption-rate statistics.

/// Two-sided 95% normal quantile.
pub const Z_95: f64 = 1.959963984540054;

/// `adopters / total`, or 0.0 when there are no responses.
pub fn adoption_rate(adopters: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        adopters as f64 / total as f64
    }
}

/// Wilson score interval for a binomial proportion.
///
/// Returns `(0.0, 0.0)` when `total` is zero. Bounds are clamped to [0, 1].
pub fn wilson_interval(adopters: usize, total: usize, z: f64) -> (f64, f64) {
    if total == 0 {
        return (0.0, 0.0);
    }
    let n = total as f64;
    let p = adopters as f64 / n;
    let z2 = z * z;

    let denominator = 1.0 + z2 / n;
    let center = (p + z2 / (2.0 * n)) / denominator;
    let half_width = z * (p * (1.0 - p) / n + z2 / (4.0 * n * n)).sqrt() / denominator;

    (
        (center - half_width).clamp(0.0, 1.0),
        (center + half_width).clamp(0.0, 1.0),
    )
}

pub mod shape;

pub use shape::ShapedArray;

/// Position of a query value relative to a non-decreasing grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bracket {
    Below,
    Exact(usize),
    Between(usize, usize),
    Above,
}

/// Locates `x` on a non-decreasing grid.
///
/// Repeated grid values (absorption edges) resolve to the last repeat, so a
/// query exactly at an edge lands on the above-edge sample and a `Between`
/// segment always has non-zero width.
pub fn bracket(grid: &[f64], x: f64) -> Bracket {
    let Some(&last) = grid.last() else {
        return Bracket::Above;
    };

    let upper = grid.partition_point(|value| *value <= x);
    if upper == 0 {
        return Bracket::Below;
    }
    if upper == grid.len() {
        return if x == last {
            Bracket::Exact(grid.len() - 1)
        } else {
            Bracket::Above
        };
    }

    let lower = upper - 1;
    if grid[lower] == x {
        Bracket::Exact(lower)
    } else {
        Bracket::Between(lower, upper)
    }
}

/// Linear interpolation in log-log space, with all coordinates already logged.
pub fn log_log_between(ln_x: f64, ln_x0: f64, ln_y0: f64, ln_x1: f64, ln_y1: f64) -> f64 {
    let fraction = (ln_x - ln_x0) / (ln_x1 - ln_x0);
    (ln_y0 + fraction * (ln_y1 - ln_y0)).exp()
}

pub(crate) fn kahan_add(sum: &mut f64, correction: &mut f64, value: f64) {
    let corrected = value - *correction;
    let next = *sum + corrected;
    *correction = (next - *sum) - corrected;
    *sum = next;
}

pub fn stable_sum(values: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut correction = 0.0;

    for &value in values {
        kahan_add(&mut sum, &mut correction, value);
    }

    sum
}

pub fn within_tolerance(lhs: f64, rhs: f64, abs_tol: f64, rel_tol: f64) -> bool {
    let abs_diff = (lhs - rhs).abs();
    let scale = lhs.abs().max(rhs.abs());
    abs_diff <= abs_tol || abs_diff <= rel_tol * scale
}

#[cfg(test)]
mod tests {
    use super::{Bracket, bracket, log_log_between, stable_sum, within_tolerance};

    #[test]
    fn stable_sum_reduces_order_loss_for_large_and_small_values() {
        let input = [1.0e16, 1.0, -1.0e16];
        assert_eq!(stable_sum(&input), 0.0);
    }

    #[test]
    fn bracket_classifies_interior_knots_and_ends() {
        let grid = [1.0, 2.0, 4.0];
        assert_eq!(bracket(&grid, 0.5), Bracket::Below);
        assert_eq!(bracket(&grid, 1.0), Bracket::Exact(0));
        assert_eq!(bracket(&grid, 1.5), Bracket::Between(0, 1));
        assert_eq!(bracket(&grid, 4.0), Bracket::Exact(2));
        assert_eq!(bracket(&grid, 4.5), Bracket::Above);
        assert_eq!(bracket(&grid, f64::NAN), Bracket::Below);
    }

    #[test]
    fn bracket_resolves_edges_to_the_upper_sample() {
        let grid = [1.0, 2.0, 2.0, 3.0];
        assert_eq!(bracket(&grid, 2.0), Bracket::Exact(2));
        assert_eq!(bracket(&grid, 1.9), Bracket::Between(0, 1));
        assert_eq!(bracket(&grid, 2.1), Bracket::Between(2, 3));
    }

    #[test]
    fn log_log_between_is_exact_for_power_laws() {
        // y = 8 x^-3 sampled at x = 1 and x = 4.
        let (x0, x1) = (1.0_f64, 4.0_f64);
        let (y0, y1) = (8.0_f64, 8.0_f64 / 64.0);
        let value = log_log_between(2.0_f64.ln(), x0.ln(), y0.ln(), x1.ln(), y1.ln());
        assert!(within_tolerance(value, 1.0, 1.0e-12, 1.0e-12));
    }

    #[test]
    fn within_tolerance_accepts_abs_or_relative_match() {
        assert!(within_tolerance(10.0, 10.001, 1.0e-2, 1.0e-6));
        assert!(within_tolerance(1000.0, 1000.2, 1.0e-6, 5.0e-4));
        assert!(!within_tolerance(1.0, 1.1, 1.0e-3, 1.0e-3));
    }
}

//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - measured samples: `o`
//! - fitted curve: `-` line
//!
//! Only single-feature point sets can be drawn; the x axis is the one argument.

use crate::domain::{FittedCurve, PointSet};
use crate::report::TimeUnit;

/// Render samples and an optional fitted curve.
///
/// Returns `None` when the samples do not have exactly one feature each.
pub fn render_ascii_plot(
    points: &PointSet,
    curve: Option<&FittedCurve>,
    unit: TimeUnit,
    width: usize,
    height: usize,
) -> Option<String> {
    let samples: Vec<(f64, f64)> = points
        .points()
        .iter()
        .map(|p| match p.features.as_slice() {
            [x] => Some((*x, unit.convert(p.time))),
            _ => None,
        })
        .collect::<Option<_>>()?;
    if samples.is_empty() {
        return None;
    }

    let (x_min, x_max) = x_range(&samples).unwrap_or((0.0, 1.0));
    let curve_points = curve.map(|c| sample_curve(c, unit, x_min, x_max, width.max(2)));
    Some(render_plot(&samples, curve_points.as_deref(), x_min, x_max, unit, width, height))
}

fn render_plot(
    samples: &[(f64, f64)],
    curve_points: Option<&[(f64, f64)]>,
    x_min: f64,
    x_max: f64,
    unit: TimeUnit,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (y_min, y_max) = y_range(samples, curve_points).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Curve first so samples overlay it.
    if let Some(curve) = curve_points {
        draw_curve(&mut grid, curve, x_min, x_max, y_min, y_max);
    }

    for &(x, y) in samples {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        grid[row][col] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: x=[{x_min:.3}, {x_max:.3}] | time=[{y_min:.2}, {y_max:.2}] {unit}\n"
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn x_range(samples: &[(f64, f64)]) -> Option<(f64, f64)> {
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    for &(x, _) in samples {
        min_x = min_x.min(x);
        max_x = max_x.max(x);
    }
    if min_x.is_finite() && max_x.is_finite() && max_x > min_x {
        Some((min_x, max_x))
    } else {
        None
    }
}

/// Evaluate the curve on `n` evenly spaced x values, dropping undefined points
/// (e.g. a logarithm at `x <= 0`).
fn sample_curve(curve: &FittedCurve, unit: TimeUnit, x_min: f64, x_max: f64, n: usize) -> Vec<(f64, f64)> {
    let model = curve.kind.model();
    let n = n.max(2);
    (0..n)
        .filter_map(|i| {
            let u = i as f64 / (n as f64 - 1.0);
            let x = x_min + u * (x_max - x_min);
            let y = model.calculate_point(&[x], &curve.parameters);
            y.is_finite().then(|| (x, unit.convert(y)))
        })
        .collect()
}

fn y_range(samples: &[(f64, f64)], curve: Option<&[(f64, f64)]>) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for &(_, y) in samples.iter().chain(curve.unwrap_or_default()) {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y_max is row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], x_min: f64, x_max: f64, y_min: f64, y_max: f64) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in curve {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        if let Some((c0, r0)) = prev {
            draw_line(grid, c0, r0, col, row, '-');
        } else {
            grid[row][col] = '-';
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CurveKind, Parameters, Point};

    fn single(xy: &[(f64, f64)]) -> PointSet {
        PointSet::from_points(
            xy.iter()
                .map(|&(x, time)| Point { features: vec![x], time })
                .collect(),
        )
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let points = single(&[(1.0, 0.100), (10.0, 0.110)]);
        let curve = FittedCurve {
            kind: CurveKind::Linear,
            parameters: [("b", 0.1), ("x_0", 0.0)].into_iter().collect::<Parameters>(),
        };

        let txt = render_ascii_plot(&points, Some(&curve), TimeUnit::Milliseconds, 10, 5).unwrap();
        let expected = concat!(
            "Plot: x=[1.000, 10.000] | time=[99.50, 110.50] ms\n",
            "         o\n",
            "          \n",
            "          \n",
            "          \n",
            "o---------\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn multi_feature_samples_are_not_plotted() {
        let points = PointSet::from_points(vec![Point {
            features: vec![1.0, 2.0],
            time: 1.0,
        }]);
        assert!(render_ascii_plot(&points, None, TimeUnit::Seconds, 20, 10).is_none());
    }

    #[test]
    fn undefined_curve_points_are_dropped() {
        let curve = FittedCurve {
            kind: CurveKind::Logarithmic,
            parameters: [("a", 0.0), ("b", 1.0)].into_iter().collect::<Parameters>(),
        };
        let sampled = sample_curve(&curve, TimeUnit::Seconds, 0.0, 4.0, 5);
        assert_eq!(sampled.len(), 4);
        assert!(sampled.iter().all(|(x, y)| *x > 0.0 && y.is_finite()));
    }
}

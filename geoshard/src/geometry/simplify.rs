//! Douglas–Peucker polyline simplification.
//!
//! Works over index ranges into the input slice with an explicit work stack
//! and a keep-mask, so no intermediate sub-sequences are allocated.

use super::types::Position;

/// Squared distance from `p` to the segment `a`–`b`.
///
/// The projection of `p` onto the line is clamped to the segment; a
/// degenerate segment (`a == b`) falls back to the distance to `a`.
#[inline]
pub fn segment_distance_sq(p: Position, a: Position, b: Position) -> f64 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len_sq = dx * dx + dy * dy;

    let (cx, cy) = if len_sq == 0.0 {
        a
    } else {
        let t = (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len_sq).clamp(0.0, 1.0);
        (a.0 + t * dx, a.1 + t * dy)
    };

    let (ex, ey) = (p.0 - cx, p.1 - cy);
    ex * ex + ey * ey
}

/// Simplifies a polyline or ring, keeping every point that deviates from
/// its chord by more than `tolerance`.
///
/// Runs of two points or fewer are returned unchanged, as is any input when
/// `tolerance` is not strictly positive. The output is always a
/// subsequence of the input that keeps both endpoints.
pub fn simplify(points: &[Position], tolerance: f64) -> Vec<Position> {
    if points.len() <= 2 || !(tolerance > 0.0) {
        return points.to_vec();
    }

    let keep = keep_mask(points, tolerance * tolerance);
    points
        .iter()
        .zip(keep)
        .filter_map(|(point, kept)| kept.then_some(*point))
        .collect()
}

fn keep_mask(points: &[Position], tolerance_sq: f64) -> Vec<bool> {
    let last = points.len() - 1;
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[last] = true;

    let mut ranges = vec![(0usize, last)];
    while let Some((start, end)) = ranges.pop() {
        if end <= start + 1 {
            continue;
        }

        let (a, b) = (points[start], points[end]);
        let mut max_sq = 0.0;
        let mut split = start;
        for (i, point) in points.iter().enumerate().take(end).skip(start + 1) {
            let d = segment_distance_sq(*point, a, b);
            if d > max_sq {
                max_sq = d;
                split = i;
            }
        }

        if max_sq > tolerance_sq {
            keep[split] = true;
            ranges.push((split, end));
            ranges.push((start, split));
        }
    }

    keep
}

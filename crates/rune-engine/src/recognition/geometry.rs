//! Point-set math shared by both recognizers.
//!
//! Everything here is a pure function over polylines of `Vec2`. Callers are
//! expected to guard single-point input upstream; the functions stay total
//! (no panics) on degenerate sets but the results are not meaningful.

use glam::Vec2;

/// Golden ratio conjugate, used by the angle search.
const PHI: f32 = 0.618_034;

/// Sum of Euclidean distances between consecutive points.
pub fn path_length(points: &[Vec2]) -> f32 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// Resample a polyline into exactly `n` points evenly spaced by arc length.
///
/// Walks the original polyline and interpolates a new point whenever the
/// accumulated distance reaches `path_length / (n - 1)`. Pads with the last
/// point if floating-point rounding leaves the output short.
pub fn resample(points: &[Vec2], n: usize) -> Vec<Vec2> {
    let Some(&first) = points.first() else {
        return Vec::new();
    };
    if n < 2 {
        return vec![first; n];
    }

    let interval = path_length(points) / (n - 1) as f32;
    if interval <= f32::EPSILON {
        return vec![first; n];
    }

    let mut out = Vec::with_capacity(n);
    out.push(first);
    let mut acc = 0.0;
    let mut prev = first;
    let mut i = 1;

    while i < points.len() && out.len() < n {
        let cur = points[i];
        let seg = prev.distance(cur);
        if seg > 0.0 && acc + seg >= interval {
            let t = (interval - acc) / seg;
            let q = prev + (cur - prev) * t;
            out.push(q);
            // q becomes the start of the remaining segment
            prev = q;
            acc = 0.0;
        } else {
            acc += seg;
            prev = cur;
            i += 1;
        }
    }

    let last = points[points.len() - 1];
    while out.len() < n {
        out.push(last);
    }
    out.truncate(n);
    out
}

/// Arithmetic mean of the points.
pub fn centroid(points: &[Vec2]) -> Vec2 {
    if points.is_empty() {
        return Vec2::ZERO;
    }
    points.iter().copied().sum::<Vec2>() / points.len() as f32
}

/// Axis-aligned bounds as `(min, max)`.
pub fn bounding_box(points: &[Vec2]) -> (Vec2, Vec2) {
    points.iter().fold(
        (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY)),
        |(lo, hi), &p| (lo.min(p), hi.max(p)),
    )
}

/// Rotate all points about their centroid by `angle` radians.
pub fn rotate_by(points: &[Vec2], angle: f32) -> Vec<Vec2> {
    let c = centroid(points);
    let rot = Vec2::from_angle(angle);
    points.iter().map(|&p| c + rot.rotate(p - c)).collect()
}

/// Angle of the first point as seen from the centroid.
pub fn indicative_angle(points: &[Vec2]) -> f32 {
    let Some(&first) = points.first() else {
        return 0.0;
    };
    let d = first - centroid(points);
    d.y.atan2(d.x)
}

/// Uniformly rescale so the larger bounding-box side maps to `size`.
/// Aspect ratio is preserved. The bounding-box minimum lands on the origin.
pub fn scale_to_square(points: &[Vec2], size: f32) -> Vec<Vec2> {
    if points.is_empty() {
        return Vec::new();
    }
    let (lo, hi) = bounding_box(points);
    let extent = hi - lo;
    let scale = extent.x.max(extent.y);
    if scale <= f32::EPSILON {
        return points.iter().map(|&p| p - lo).collect();
    }
    points.iter().map(|&p| (p - lo) / scale * size).collect()
}

/// Move the centroid onto the origin.
pub fn translate_to_origin(points: &[Vec2]) -> Vec<Vec2> {
    let c = centroid(points);
    points.iter().map(|&p| p - c).collect()
}

/// Optionally rotate out the indicative angle, then recenter on the origin.
pub fn normalize(points: &[Vec2], rotate: bool) -> Vec<Vec2> {
    if rotate {
        let rotated = rotate_by(points, -indicative_angle(points));
        translate_to_origin(&rotated)
    } else {
        translate_to_origin(points)
    }
}

/// Mean index-to-index distance between two equally sampled point sets.
pub fn path_distance(a: &[Vec2], b: &[Vec2]) -> f32 {
    let count = a.len().min(b.len());
    if count == 0 {
        return f32::INFINITY;
    }
    let total: f32 = a.iter().zip(b).map(|(p, q)| p.distance(*q)).sum();
    total / count as f32
}

/// Rotate `points` by `angle` and compare against `template`.
pub fn distance_at_angle(points: &[Vec2], template: &[Vec2], angle: f32) -> f32 {
    path_distance(&rotate_by(points, angle), template)
}

/// Golden-section search for the rotation in `[-range, range]` that minimises
/// [`distance_at_angle`]. Stops once the bracket is narrower than `precision`.
pub fn distance_at_best_angle(
    points: &[Vec2],
    template: &[Vec2],
    range: f32,
    precision: f32,
) -> f32 {
    let mut a = -range;
    let mut b = range;
    let mut x1 = PHI * a + (1.0 - PHI) * b;
    let mut f1 = distance_at_angle(points, template, x1);
    let mut x2 = (1.0 - PHI) * a + PHI * b;
    let mut f2 = distance_at_angle(points, template, x2);

    while (b - a).abs() > precision {
        if f1 < f2 {
            b = x2;
            x2 = x1;
            f2 = f1;
            x1 = PHI * a + (1.0 - PHI) * b;
            f1 = distance_at_angle(points, template, x1);
        } else {
            a = x1;
            x1 = x2;
            f1 = f2;
            x2 = (1.0 - PHI) * a + PHI * b;
            f2 = distance_at_angle(points, template, x2);
        }
    }

    f1.min(f2)
}

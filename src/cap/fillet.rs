//! Corner fillets: replace a sharp polygon vertex with a circular arc
//! tangent to both adjacent edges.

use std::f64::consts::{FRAC_PI_2, PI};

use kurbo::{CubicBez, Point, Vec2};

use crate::error::FilletError;
use crate::geom::{perp, unit};

/// Corners within this angle of straight or folded back are not filleted.
const DEGENERATE_ANGLE: f64 = 1.0e-3;

/// Corner scores closer than this are tied.
const SCORE_TIE_EPS: f64 = 1.0e-12;

/// Result of filleting corner `b` between edges `a-b` and `b-c`.
///
/// The arc starts at `p` on `a-b` and ends at `q` on `b-c`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilletSplice {
    pub a: Point,
    pub b: Point,
    pub c: Point,
    pub p: Point,
    pub q: Point,
    /// Interior angle at `b`, in radians.
    pub theta: f64,
    /// Trim distance from `b` to `p` and to `q`.
    pub d: f64,
    pub center: Point,
    pub radius: f64,
    /// Signed sweep from `p` to `q` around `center` (positive = CCW).
    pub sweep: f64,
    /// Single-cubic approximation of the arc, from exactly `p` to exactly `q`.
    pub bridge: CubicBez,
    pub arc_midpoint: Point,
}

/// Interior angle at `b` in [0, π], or `None` if an edge has zero length.
pub fn interior_angle(a: Point, b: Point, c: Point) -> Option<f64> {
    let u = unit(b - a)?;
    let v = unit(c - b)?;
    Some((-u).dot(v).clamp(-1.0, 1.0).acos())
}

/// Fillet corner `b` with the given radius.
///
/// The trim distance is `radius / tan(theta / 2)`; the fillet fails with
/// [`FilletError::RadiusTooLarge`] if it exceeds either edge. Repeated
/// calls with the same input are bit-identical.
pub fn fillet_corner(
    a: Point,
    b: Point,
    c: Point,
    radius: f64,
) -> Result<FilletSplice, FilletError> {
    if !(radius > 0.0) {
        return Err(FilletError::NonPositiveRadius);
    }
    let (Some(u), Some(v)) = (unit(b - a), unit(c - b)) else {
        return Err(FilletError::DegenerateAngle);
    };
    let theta = (-u).dot(v).clamp(-1.0, 1.0).acos();
    if theta <= DEGENERATE_ANGLE || (theta - PI).abs() <= DEGENERATE_ANGLE {
        return Err(FilletError::DegenerateAngle);
    }

    let half = theta * 0.5;
    let d = radius / half.tan();
    let len_in = (b - a).hypot();
    let len_out = (c - b).hypot();
    if d > len_in {
        return Err(FilletError::RadiusTooLarge { trim: d, edge: len_in });
    }
    if d > len_out {
        return Err(FilletError::RadiusTooLarge { trim: d, edge: len_out });
    }

    let p = b - u * d;
    let q = b + v * d;
    let bisector = unit(v - u).ok_or(FilletError::DegenerateAngle)?;
    let center = b + bisector * (radius / half.sin());

    let r0 = p - center;
    let r1 = q - center;
    // The short way round is always the one facing the corner.
    let sweep = r0.cross(r1).atan2(r0.dot(r1));

    let k = 4.0 / 3.0 * (sweep.abs() / 4.0).tan();
    let dir = sweep.signum();
    let t0 = perp(r0 / radius) * dir;
    let t1 = perp(r1 / radius) * dir;
    let bridge = CubicBez::new(p, p + t0 * (k * radius), q - t1 * (k * radius), q);

    let mid_angle = r0.atan2() + sweep * 0.5;
    let arc_midpoint = center + Vec2::from_angle(mid_angle) * radius;

    Ok(FilletSplice {
        a,
        b,
        c,
        p,
        q,
        theta,
        d,
        center,
        radius,
        sweep,
        bridge,
        arc_midpoint,
    })
}

impl FilletSplice {
    /// Points on the true circle from `p` to `q`, endpoints pinned exactly.
    pub fn arc_points(&self, segments: usize) -> Vec<Point> {
        let steps = segments.max(1) + 1;
        let start = (self.p - self.center).atan2();
        let mut points: Vec<Point> = (0..steps)
            .map(|i| {
                let f = i as f64 / (steps - 1) as f64;
                self.center + Vec2::from_angle(start + self.sweep * f) * self.radius
            })
            .collect();
        points[0] = self.p;
        points[steps - 1] = self.q;
        points
    }
}

/// Pick the corner to fillet among `candidates` (indices into a closed
/// polygon given without its repeated closing point).
///
/// The corner whose interior angle is closest to 90° wins; ties go to the
/// lowest index. Degenerate corners are never chosen.
pub fn select_corner(polygon: &[Point], candidates: &[usize]) -> Result<usize, FilletError> {
    let n = polygon.len();
    if n < 3 {
        return Err(FilletError::CornerNotFound);
    }
    let mut sorted = candidates.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut best: Option<(usize, f64)> = None;
    for i in sorted.into_iter().filter(|&i| i < n) {
        let a = polygon[(i + n - 1) % n];
        let c = polygon[(i + 1) % n];
        let Some(theta) = interior_angle(a, polygon[i], c) else {
            continue;
        };
        if theta <= DEGENERATE_ANGLE || (theta - PI).abs() <= DEGENERATE_ANGLE {
            continue;
        }
        let score = (theta - FRAC_PI_2).abs();
        if best.map_or(true, |(_, s)| score < s - SCORE_TIE_EPS) {
            best = Some((i, score));
        }
    }
    best.map(|(i, _)| i).ok_or(FilletError::CornerNotFound)
}

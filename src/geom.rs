//! Shared geometry utilities: snap keys and closed-ring helpers.
//!
//! A ring is a `Vec<Point>` whose last point repeats the first.

use kurbo::{Point, Rect, Vec2};

/// Integer spatial key for a point quantized to a fixed epsilon.
///
/// Ordering is lexicographic (x, then y), which gives every keyed container
/// a deterministic iteration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SnapKey {
    pub x: i64,
    pub y: i64,
}

/// Quantize a point to its snap key (round half up at `eps` resolution).
pub fn snap_key(p: Point, eps: f64) -> SnapKey {
    SnapKey {
        x: (p.x / eps + 0.5).floor() as i64,
        y: (p.y / eps + 0.5).floor() as i64,
    }
}

pub fn approx_eq(a: Point, b: Point, eps: f64) -> bool {
    (a.x - b.x).abs() <= eps && (a.y - b.y).abs() <= eps
}

/// Signed area via the shoelace formula.
///
/// Positive = counter-clockwise, negative = clockwise. Works for open or
/// closed rings; the closing edge of a closed ring contributes zero.
pub fn signed_area(ring: &[Point]) -> f64 {
    let n = ring.len();
    if n < 3 {
        return 0.0;
    }
    let mut area = 0.0;
    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        area += a.x * b.y - b.x * a.y;
    }
    area / 2.0
}

/// Axis-aligned bounds of a point list. Empty input yields `Rect::ZERO`.
pub fn bbox(points: &[Point]) -> Rect {
    let Some(&first) = points.first() else {
        return Rect::ZERO;
    };
    points
        .iter()
        .fold(Rect::from_points(first, first), |r, &p| r.union_pt(p))
}

pub fn is_closed(ring: &[Point]) -> bool {
    match (ring.first(), ring.last()) {
        (Some(&a), Some(&b)) => ring.len() > 1 && a == b,
        _ => false,
    }
}

/// Append the first point if the ring is not already closed.
pub fn close_ring(ring: &mut Vec<Point>) {
    if let Some(&first) = ring.first() {
        if !is_closed(ring) {
            ring.push(first);
        }
    }
}

/// Drop consecutive points within `eps` of their predecessor, then close.
pub fn dedup_ring(ring: &[Point], eps: f64) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(ring.len() + 1);
    for &p in ring {
        match out.last() {
            Some(&last) if approx_eq(last, p, eps) => {}
            _ => out.push(p),
        }
    }
    // An open ring that wraps onto its own start within eps.
    while out.len() > 2 && approx_eq(out[0], out[out.len() - 1], eps) {
        out.pop();
    }
    close_ring(&mut out);
    out
}

/// Return the ring re-oriented counter-clockwise.
pub fn to_ccw(ring: &[Point]) -> Vec<Point> {
    let mut out = ring.to_vec();
    if signed_area(&out) < 0.0 {
        out.reverse();
    }
    out
}

/// Parametric intersection of segments `a0-a1` and `b0-b1`.
///
/// Returns `(t, u)` with the hit at `a0 + t (a1 - a0)` and
/// `b0 + u (b1 - b0)`, both in `[-eps, 1 + eps]`. Parallel segments
/// (|denominator| ≤ eps) never intersect here.
pub fn segment_intersection(
    a0: Point,
    a1: Point,
    b0: Point,
    b1: Point,
    eps: f64,
) -> Option<(f64, f64)> {
    let r = a1 - a0;
    let s = b1 - b0;
    let denom = r.cross(s);
    if denom.abs() <= eps {
        return None;
    }
    let ac = b0 - a0;
    let t = ac.cross(s) / denom;
    let u = ac.cross(r) / denom;
    let range = -eps..=1.0 + eps;
    if range.contains(&t) && range.contains(&u) {
        Some((t, u))
    } else {
        None
    }
}

/// Proper crossings between non-adjacent edges of a ring.
///
/// Hits that land on an edge endpoint (within `eps`) are touches, not
/// crossings, and are excluded.
pub fn ring_self_intersections(ring: &[Point], eps: f64) -> Vec<Point> {
    let n = ring.len();
    if n < 4 {
        return Vec::new();
    }
    let edge_count = if approx_eq(ring[0], ring[n - 1], eps) { n - 1 } else { n };
    let edge = |i: usize| (ring[i], ring[(i + 1) % n]);

    let mut hits = Vec::new();
    for i in 0..edge_count {
        let (a0, a1) = edge(i);
        if (a1 - a0).hypot() <= eps {
            continue;
        }
        for j in (i + 2)..edge_count {
            if i == 0 && j == edge_count - 1 {
                continue;
            }
            let (b0, b1) = edge(j);
            if (b1 - b0).hypot() <= eps {
                continue;
            }
            if let Some((t, _)) = segment_intersection(a0, a1, b0, b1, eps) {
                let hit = a0 + (a1 - a0) * t;
                let touches = [a0, a1, b0, b1].iter().any(|&p| approx_eq(hit, p, eps));
                if !touches {
                    hits.push(hit);
                }
            }
        }
    }
    hits
}

pub fn ring_self_intersection_count(ring: &[Point], eps: f64) -> usize {
    ring_self_intersections(ring, eps).len()
}

/// Unit vector, or `None` when the input is (near) zero length.
pub fn unit(v: Vec2) -> Option<Vec2> {
    let len = v.hypot();
    if len > 1.0e-12 && len.is_finite() {
        Some(v / len)
    } else {
        None
    }
}

/// Left-hand perpendicular (counter-clockwise quarter turn).
pub fn perp(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

/// Perpendicular distance from `p` to the line through `a` and `b`.
/// Falls back to the point distance when `a == b`.
pub fn distance_to_line(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len = ab.hypot();
    if len < 1.0e-12 {
        return (p - a).hypot();
    }
    ab.cross(p - a).abs() / len
}

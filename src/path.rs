//! Skeleton path and its global arc-length parameterization.
//!
//! Global t ∈ [0, 1] is normalized arc length over every segment of the
//! path. Each segment carries a cumulative chord-length table; mapping a
//! global t to a segment-local u is a binary search plus a linear blend
//! between table entries.

use kurbo::{CubicBez, ParamCurve, ParamCurveDeriv, Point, Vec2};

use crate::error::StrokeError;
use crate::geom::unit;

/// Floor for the total path length, so that t = distance / length is
/// always finite.
const MIN_TOTAL_LENGTH: f64 = 1.0e-6;

/// Ordered, immutable list of cubic segments forming a stroke centerline.
#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonPath {
    segments: Vec<CubicBez>,
}

impl SkeletonPath {
    pub fn new(segments: Vec<CubicBez>) -> Self {
        Self { segments }
    }

    /// Straight line as a single cubic with control points at the thirds.
    pub fn line(a: Point, b: Point) -> Self {
        Self::new(vec![CubicBez::new(a, a.lerp(b, 1.0 / 3.0), a.lerp(b, 2.0 / 3.0), b)])
    }

    pub fn segments(&self) -> &[CubicBez] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// First control point of the first segment.
    pub fn start(&self) -> Option<Point> {
        self.segments.first().map(|s| s.p0)
    }

    /// Last control point of the last segment.
    pub fn end(&self) -> Option<Point> {
        self.segments.last().map(|s| s.p3)
    }
}

/// Arc-length parameterization of a [`SkeletonPath`].
///
/// Built once per stroke; all queries are pure functions of the tables.
#[derive(Debug, Clone)]
pub struct PathParam {
    segments: Vec<CubicBez>,
    /// Per segment: cumulative length at u = k / samples, k = 0..=samples.
    tables: Vec<Vec<f64>>,
    /// Global distance at the start of each segment.
    offsets: Vec<f64>,
    total: f64,
    samples: usize,
}

impl PathParam {
    /// Build the tables. Fails only on an empty path.
    pub fn new(path: &SkeletonPath, samples_per_segment: usize) -> Result<Self, StrokeError> {
        if path.is_empty() {
            return Err(StrokeError::EmptyPath);
        }
        let samples = samples_per_segment.max(1);
        let mut tables = Vec::with_capacity(path.len());
        let mut offsets = Vec::with_capacity(path.len());
        let mut running = 0.0;
        for seg in path.segments() {
            let mut table = Vec::with_capacity(samples + 1);
            let mut acc = 0.0;
            let mut prev = seg.p0;
            table.push(0.0);
            for k in 1..=samples {
                let p = seg.eval(k as f64 / samples as f64);
                acc += (p - prev).hypot();
                prev = p;
                table.push(acc);
            }
            offsets.push(running);
            running += acc;
            tables.push(table);
        }
        Ok(Self {
            segments: path.segments().to_vec(),
            tables,
            offsets,
            total: running.max(MIN_TOTAL_LENGTH),
            samples,
        })
    }

    /// Total arc length (floored at a tiny positive value).
    pub fn total_length(&self) -> f64 {
        self.total
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Map a global t to `(segment index, local u)`. Out-of-range t clamps.
    pub fn map(&self, global_t: f64) -> (usize, f64) {
        let last = self.segments.len() - 1;
        if global_t.is_nan() || global_t <= 0.0 {
            return (0, 0.0);
        }
        if global_t >= 1.0 {
            return (last, 1.0);
        }
        let dist = global_t * self.total;
        // Last segment whose start offset is <= dist.
        let index = self
            .offsets
            .partition_point(|&o| o <= dist)
            .saturating_sub(1)
            .min(last);
        let local = dist - self.offsets[index];
        (index, self.local_u(index, local))
    }

    fn local_u(&self, index: usize, local: f64) -> f64 {
        let table = &self.tables[index];
        let seg_len = table[self.samples];
        if seg_len <= 0.0 || local <= 0.0 {
            return 0.0;
        }
        if local >= seg_len {
            return 1.0;
        }
        let k = table.partition_point(|&d| d < local);
        if k == 0 {
            return 0.0;
        }
        let (d0, d1) = (table[k - 1], table[k]);
        let frac = if d1 > d0 { (local - d0) / (d1 - d0) } else { 0.0 };
        ((k - 1) as f64 + frac) / self.samples as f64
    }

    /// Point on the skeleton at global t.
    ///
    /// `position(0)` and `position(1)` are exactly the first and last
    /// control points of the path.
    pub fn position(&self, global_t: f64) -> Point {
        let (index, u) = self.map(global_t);
        let seg = &self.segments[index];
        if u <= 0.0 {
            seg.p0
        } else if u >= 1.0 {
            seg.p3
        } else {
            seg.eval(u)
        }
    }

    /// Unit tangent at global t.
    ///
    /// A zero derivative falls back to the segment chord, then to +x.
    pub fn tangent(&self, global_t: f64) -> Vec2 {
        let (index, u) = self.map(global_t);
        let seg = &self.segments[index];
        let d = seg.deriv().eval(u).to_vec2();
        unit(d)
            .or_else(|| unit(seg.p3 - seg.p0))
            .unwrap_or(Vec2::new(1.0, 0.0))
    }
}

//! End caps for open strokes.
//!
//! Rails-only strokes are capped by edges joining the two rail ends; a
//! fillet additionally trims the rails where its arc takes over.
//! Rect-corner strokes are capped by reshaping the end pen quad.

pub mod fillet;

use std::f64::consts::TAU;

use kurbo::{Point, Vec2};

use crate::config::StrokeConfig;
use crate::error::{FilletError, StrokeError};
use crate::geom::unit;
use crate::rail::RailFrame;
use crate::soup::{push_chain, CapRole, EdgeSource, Segment2};

pub use fillet::{fillet_corner, interior_angle, select_corner, FilletSplice};

/// A butt join longer than this multiple of the local width scale is not drawn.
const BUTT_JOIN_FACTOR: f64 = 3.0;

/// Lower bound on the rail distance used to build a fillet corner.
const MIN_APPROACH: f64 = 5.0;

const ROUND_EPS: f64 = 1.0e-6;

/// Warning text for a corner that could not be filleted.
fn fillet_fallback(end: CapEnd, corner: &str, err: FilletError) -> String {
    format!("{} {corner} corner: {}", end.name(), StrokeError::from(err))
}

/// Cap geometry requested for one end of the stroke.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CapStyle {
    /// Straight edge between the rail ends.
    #[default]
    Butt,
    /// Semicircle across the rail separation.
    Round,
    /// Drawn like [`CapStyle::Round`].
    Ball,
    /// Sharp corner(s) replaced by tangent arcs.
    Fillet { radius: f64, side: FilletSide },
}

/// Which corner(s) of a cap a fillet rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilletSide {
    Left,
    Right,
    Both,
}

impl FilletSide {
    fn left(self) -> bool {
        matches!(self, Self::Left | Self::Both)
    }

    fn right(self) -> bool {
        matches!(self, Self::Right | Self::Both)
    }
}

/// Stroke end a cap belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapEnd {
    Start,
    End,
}

impl CapEnd {
    /// Provenance tag for an edge of this cap.
    pub fn source(self, role: CapRole, detail: &str) -> EdgeSource {
        let detail = detail.to_string();
        match self {
            Self::Start => EdgeSource::CapStart { role, detail },
            Self::End => EdgeSource::CapEnd { role, detail },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
        }
    }

    /// Direction pointing away from the stroke body.
    fn outward(self, along: Vec2) -> Vec2 {
        match self {
            Self::Start => -along,
            Self::End => along,
        }
    }
}

/// Geometry a cap was actually drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapShape {
    Butt,
    /// The butt join failed the width gate; the end is left open.
    Open,
    Round,
    Fillet { left: bool, right: bool },
}

/// What was asked for at one end, what was drawn, and why they differ.
#[derive(Debug, Clone, PartialEq)]
pub struct CapReport {
    pub end: CapEnd,
    pub requested: CapStyle,
    pub shape: CapShape,
    pub fallbacks: Vec<String>,
}

impl CapReport {
    fn new(end: CapEnd, requested: CapStyle) -> Self {
        Self {
            end,
            requested,
            shape: CapShape::Butt,
            fallbacks: Vec::new(),
        }
    }
}

fn requested_style(end: CapEnd, config: &StrokeConfig) -> CapStyle {
    match end {
        CapEnd::Start => config.start_cap,
        CapEnd::End => config.end_cap,
    }
}

/// Points of a circular arc from `left` to `right` (radius half their
/// distance) that bulges toward `outward`. Endpoints are pinned exactly.
///
/// Returns `None` if the radius or the outward direction is degenerate.
pub fn round_arc(left: Point, right: Point, outward: Vec2, segments: usize) -> Option<Vec<Point>> {
    let center = left.lerp(right, 0.5);
    let radius = (right - left).hypot() * 0.5;
    if radius <= ROUND_EPS || outward.hypot() <= ROUND_EPS {
        return None;
    }
    let a0 = (left - center).atan2();
    let a1 = (right - center).atan2();
    let ccw = (a1 - a0).rem_euclid(TAU);
    let through_outward = (outward.atan2() - a0).rem_euclid(TAU) <= ccw;
    let sweep = if through_outward { ccw } else { ccw - TAU };

    let steps = (segments + 1).max(2);
    let mut points: Vec<Point> = (0..steps)
        .map(|i| {
            let f = i as f64 / (steps - 1) as f64;
            center + Vec2::from_angle(a0 + sweep * f) * radius
        })
        .collect();
    points[0] = left;
    points[steps - 1] = right;
    Some(points)
}

// ── Rails-only caps ──────────────────────────────────────────

/// Where a rail is cut short by a fillet.
///
/// At the start the rail becomes `point, rail[keep], rail[keep + 1], ...`;
/// at the end it becomes `..., rail[keep - 1], rail[keep], point`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RailTrim {
    pub point: Point,
    pub keep: usize,
}

/// Cap edges for one end of a rails-only stroke.
#[derive(Debug, Clone, PartialEq)]
pub struct RailCap {
    pub segments: Vec<Segment2>,
    pub left_trim: Option<RailTrim>,
    pub right_trim: Option<RailTrim>,
    pub report: CapReport,
}

/// The polyline a rails-only fillet works on:
/// `[left approach, left end, right end, right approach]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapPolyline {
    pub points: [Point; 4],
    pub left_approach: usize,
    pub right_approach: usize,
}

/// First rail sample at least `min_distance` away from the rail end,
/// walking inward; the far end if none is.
fn approach_index(rail: &[Point], end: CapEnd, min_distance: f64) -> usize {
    let n = rail.len();
    match end {
        CapEnd::Start => (1..n)
            .find(|&i| (rail[i] - rail[0]).hypot() >= min_distance)
            .unwrap_or(n - 1),
        CapEnd::End => (0..n - 1)
            .rev()
            .find(|&i| (rail[i] - rail[n - 1]).hypot() >= min_distance)
            .unwrap_or(0),
    }
}

/// Build the fillet polyline at one end. `right` must be index-aligned
/// with `left`.
pub fn cap_polyline(
    end: CapEnd,
    left: &[Point],
    right: &[Point],
    min_approach: f64,
) -> Option<CapPolyline> {
    if left.len() < 2 || right.len() < 2 {
        return None;
    }
    let left_approach = approach_index(left, end, min_approach);
    let right_approach = approach_index(right, end, min_approach);
    let (left_end, right_end) = match end {
        CapEnd::Start => (left[0], right[0]),
        CapEnd::End => (left[left.len() - 1], right[right.len() - 1]),
    };
    Some(CapPolyline {
        points: [left[left_approach], left_end, right_end, right[right_approach]],
        left_approach,
        right_approach,
    })
}

/// Unit direction of travel of the rails at one end.
fn rail_direction(end: CapEnd, left: &[Point], right: &[Point]) -> Option<Vec2> {
    let n = left.len().min(right.len());
    if n < 2 {
        return None;
    }
    let (l, r) = match end {
        CapEnd::Start => (left[1] - left[0], right[1] - right[0]),
        CapEnd::End => (left[n - 1] - left[n - 2], right[n - 1] - right[n - 2]),
    };
    unit(l + r).or_else(|| unit(l)).or_else(|| unit(r))
}

fn butt_join(cap: &mut RailCap, left: Point, right: Point, width_scale: f64) {
    let end = cap.report.end;
    let length = (right - left).hypot();
    if length <= BUTT_JOIN_FACTOR * width_scale {
        push_chain(&mut cap.segments, &[left, right], end.source(CapRole::JoinLR, "butt"));
        cap.report.shape = CapShape::Butt;
    } else {
        cap.report.shape = CapShape::Open;
        cap.report.fallbacks.push(format!(
            "{} butt join {length:.3} exceeds {BUTT_JOIN_FACTOR}x width scale {width_scale:.3}",
            end.name()
        ));
    }
}

/// Cap one end of a rails-only stroke.
///
/// `right` must be index-aligned with `left`. `width_scale` is the local
/// pen width, used to reject implausibly long butt joins.
pub fn rails_cap(
    end: CapEnd,
    left: &[Point],
    right: &[Point],
    width_scale: f64,
    config: &StrokeConfig,
) -> RailCap {
    let style = requested_style(end, config);
    let mut cap = RailCap {
        segments: Vec::new(),
        left_trim: None,
        right_trim: None,
        report: CapReport::new(end, style),
    };
    let (Some(&l), Some(&r)) = (end_point(left, end), end_point(right, end)) else {
        cap.report.shape = CapShape::Open;
        cap.report.fallbacks.push(format!("{} cap has no rail points", end.name()));
        return cap;
    };

    match style {
        CapStyle::Butt => butt_join(&mut cap, l, r, width_scale),
        CapStyle::Round | CapStyle::Ball => {
            let arc = rail_direction(end, left, right)
                .and_then(|along| round_arc(l, r, end.outward(along), config.round_arc_segments));
            match arc {
                Some(points) => {
                    push_chain(&mut cap.segments, &points, end.source(CapRole::JoinLR, "round"));
                    cap.report.shape = CapShape::Round;
                }
                None => {
                    cap.report
                        .fallbacks
                        .push(format!("{} round cap is degenerate, using butt", end.name()));
                    butt_join(&mut cap, l, r, width_scale);
                }
            }
        }
        CapStyle::Fillet { radius, side } => rail_fillet(
            &mut cap,
            left,
            right,
            radius,
            side,
            width_scale,
            config.fillet_arc_segments,
        ),
    }
    cap
}

fn end_point(rail: &[Point], end: CapEnd) -> Option<&Point> {
    match end {
        CapEnd::Start => rail.first(),
        CapEnd::End => rail.last(),
    }
}

fn rail_fillet(
    cap: &mut RailCap,
    left: &[Point],
    right: &[Point],
    radius: f64,
    side: FilletSide,
    width_scale: f64,
    segments: usize,
) {
    let end = cap.report.end;
    let Some(poly) = cap_polyline(end, left, right, MIN_APPROACH.max(2.0 * radius)) else {
        cap.report.fallbacks.push(format!("{} fillet: rails too short", end.name()));
        if let (Some(&l), Some(&r)) = (end_point(left, end), end_point(right, end)) {
            butt_join(cap, l, r, width_scale);
        }
        return;
    };
    let c = poly.points;

    let mut fillet_at = |wanted: bool, corner: usize, name: &str| -> Option<FilletSplice> {
        if !wanted {
            return None;
        }
        let result = select_corner(&c, &[corner])
            .and_then(|i| fillet_corner(c[i - 1], c[i], c[i + 1], radius));
        match result {
            Ok(splice) => Some(splice),
            Err(err) => {
                cap.report.fallbacks.push(fillet_fallback(end, name, err));
                None
            }
        }
    };
    let left_splice = fillet_at(side.left(), 1, "left");
    let mut right_splice = fillet_at(side.right(), 2, "right");

    if let (Some(l), Some(r)) = (&left_splice, &right_splice) {
        let join = (c[2] - c[1]).hypot();
        if l.d + r.d > join {
            cap.report.fallbacks.push(format!(
                "{} fillets overlap on the join ({:.3} + {:.3} > {join:.3}), dropping right",
                end.name(),
                l.d,
                r.d
            ));
            right_splice = None;
        }
    }

    if left_splice.is_none() && right_splice.is_none() {
        butt_join(cap, c[1], c[2], width_scale);
        return;
    }

    if let Some(s) = &left_splice {
        let source = end.source(CapRole::JoinLR, "fillet-left");
        push_chain(&mut cap.segments, &s.arc_points(segments), source);
        cap.left_trim = Some(RailTrim { point: s.p, keep: poly.left_approach });
    }
    if let Some(s) = &right_splice {
        let source = end.source(CapRole::JoinLR, "fillet-right");
        push_chain(&mut cap.segments, &s.arc_points(segments), source);
        cap.right_trim = Some(RailTrim { point: s.q, keep: poly.right_approach });
    }
    // The raw join is never drawn once a corner is rounded.
    let from = left_splice.map_or(c[1], |s| s.q);
    let to = right_splice.map_or(c[2], |s| s.p);
    push_chain(&mut cap.segments, &[from, to], end.source(CapRole::MidSegment, "fillet-bypass"));
    cap.report.shape = CapShape::Fillet {
        left: left_splice.is_some(),
        right: right_splice.is_some(),
    };
}

// ── Rect-corner caps ─────────────────────────────────────────

/// Cap for one end of a rect-corner stroke.
#[derive(Debug, Clone, PartialEq)]
pub struct RectCap {
    /// Extra cap edges, plus the reshaped end quad when `replaces_quad`.
    pub segments: Vec<Segment2>,
    /// True if `segments` already carry the end quad's perimeter.
    pub replaces_quad: bool,
    /// Retargeted lane endpoints for filleted corners, by corner index.
    pub lane_ends: [Option<Point>; 4],
    pub report: CapReport,
}

/// Cap one end of a rect-corner stroke from its end frame.
pub fn rect_cap(end: CapEnd, frame: &RailFrame, config: &StrokeConfig) -> RectCap {
    let style = requested_style(end, config);
    let mut cap = RectCap {
        segments: Vec::new(),
        replaces_quad: false,
        lane_ends: [None; 4],
        report: CapReport::new(end, style),
    };
    let corners = frame.pen_corners().as_array();
    let center = frame.center;
    let outward = end.outward(frame.tangent);
    let reach = |p: Point| (p - center).dot(outward);

    // Quad edge facing away from the stroke body; ties go to the lowest index.
    let edge = (0..4)
        .max_by(|&a, &b| {
            let ma = reach(corners[a].lerp(corners[(a + 1) % 4], 0.5));
            let mb = reach(corners[b].lerp(corners[(b + 1) % 4], 0.5));
            ma.total_cmp(&mb).then(b.cmp(&a))
        })
        .unwrap_or(0);

    match style {
        CapStyle::Butt => {}
        CapStyle::Round | CapStyle::Ball => {
            let (i, j) = (edge, (edge + 1) % 4);
            let side = |p: Point| (p - center).dot(frame.cross_axis);
            let (l, r) = if side(corners[i]) >= side(corners[j]) {
                (corners[i], corners[j])
            } else {
                (corners[j], corners[i])
            };
            match round_arc(l, r, outward, config.round_arc_segments) {
                Some(points) => {
                    push_chain(&mut cap.segments, &points, end.source(CapRole::JoinLR, "round"));
                    cap.report.shape = CapShape::Round;
                }
                None => cap
                    .report
                    .fallbacks
                    .push(format!("{} round cap is degenerate, using butt", end.name())),
            }
        }
        CapStyle::Fillet { radius, side } => rect_fillet(
            &mut cap,
            frame,
            &corners,
            outward,
            radius,
            side,
            config.fillet_arc_segments,
        ),
    }
    cap
}

fn rect_fillet(
    cap: &mut RectCap,
    frame: &RailFrame,
    corners: &[Point; 4],
    outward: Vec2,
    radius: f64,
    side: FilletSide,
    segments: usize,
) {
    let end = cap.report.end;
    let center = frame.center;
    let candidates = |sign: f64| -> Vec<usize> {
        (0..4)
            .filter(|&k| {
                let v = corners[k] - center;
                v.dot(outward) > ROUND_EPS && v.dot(frame.cross_axis) * sign > 0.0
            })
            .collect()
    };

    let mut splices: [Option<FilletSplice>; 4] = [None; 4];
    for (wanted, sign, name) in [(side.left(), 1.0, "left"), (side.right(), -1.0, "right")] {
        if !wanted {
            continue;
        }
        let result = select_corner(corners, &candidates(sign)).and_then(|k| {
            fillet_corner(corners[(k + 3) % 4], corners[k], corners[(k + 1) % 4], radius)
                .map(|s| (k, s))
        });
        match result {
            Ok((k, s)) => splices[k] = Some(s),
            Err(err) => cap.report.fallbacks.push(fillet_fallback(end, name, err)),
        }
    }

    // Adjacent fillets must not overlap on their shared edge.
    for k in 0..4 {
        let next = (k + 1) % 4;
        if let (Some(a), Some(b)) = (splices[k], splices[next]) {
            let shared = (corners[next] - corners[k]).hypot();
            if a.d + b.d > shared {
                cap.report.fallbacks.push(format!(
                    "{} fillets overlap on a pen edge, keeping corner {k} only",
                    end.name()
                ));
                splices[next] = None;
            }
        }
    }

    let filleted = splices.iter().filter(|s| s.is_some()).count();
    if filleted == 0 {
        return;
    }

    let mut ring: Vec<(Point, EdgeSource)> = Vec::new();
    for k in 0..4 {
        match &splices[k] {
            Some(s) => {
                let arc = s.arc_points(segments);
                let last = arc.len() - 1;
                for (i, p) in arc.into_iter().enumerate() {
                    let source = if i < last {
                        end.source(CapRole::JoinLR, "fillet")
                    } else if splices[(k + 1) % 4].is_some() {
                        end.source(CapRole::MidSegment, "fillet-bypass")
                    } else {
                        EdgeSource::PenCap
                    };
                    ring.push((p, source));
                }
                // The lane arriving at this corner ends at the tangent point
                // further back from the cap.
                let back = |p: Point| (p - center).dot(outward);
                cap.lane_ends[k] = Some(if back(s.p) <= back(s.q) { s.p } else { s.q });
            }
            None => ring.push((corners[k], EdgeSource::PenCap)),
        }
    }
    for (i, (a, source)) in ring.iter().enumerate() {
        let b = ring[(i + 1) % ring.len()].0;
        push_chain(&mut cap.segments, &[*a, b], source.clone());
    }
    cap.replaces_quad = true;

    let left = (0..4)
        .any(|k| splices[k].is_some() && (corners[k] - center).dot(frame.cross_axis) > 0.0);
    cap.report.shape = CapShape::Fillet {
        left,
        right: filleted > usize::from(left),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::{PathParam, SkeletonPath};
    use crate::rail::rail_frame;
    use crate::style::SweepPlan;
    use approx::assert_abs_diff_eq;

    fn vertical_rails() -> (Vec<Point>, Vec<Point>) {
        let left = (0..=10).map(|i| Point::new(-10.0, i as f64 * 10.0)).collect();
        let right = (0..=10).map(|i| Point::new(10.0, i as f64 * 10.0)).collect();
        (left, right)
    }

    fn config(start: CapStyle, end: CapStyle) -> StrokeConfig {
        StrokeConfig {
            start_cap: start,
            end_cap: end,
            ..StrokeConfig::default()
        }
    }

    fn close(a: Point, b: Point) -> bool {
        (a - b).hypot() < 1e-9
    }

    #[test]
    fn round_arc_bulges_outward() {
        let (a, b) = (Point::new(-10.0, 0.0), Point::new(10.0, 0.0));
        let up = round_arc(a, b, Vec2::new(0.0, 1.0), 16).unwrap();
        assert_eq!(up.len(), 17);
        assert_eq!(up[0], Point::new(-10.0, 0.0));
        assert_eq!(up[16], Point::new(10.0, 0.0));
        assert_abs_diff_eq!(up[8].y, 10.0, epsilon = 1e-9);
        for p in &up {
            assert_abs_diff_eq!(p.to_vec2().hypot(), 10.0, epsilon = 1e-9);
        }

        let down = round_arc(a, b, Vec2::new(0.0, -1.0), 16).unwrap();
        assert_abs_diff_eq!(down[8].y, -10.0, epsilon = 1e-9);
    }

    #[test]
    fn round_arc_rejects_zero_radius() {
        let p = Point::new(3.0, 3.0);
        assert!(round_arc(p, p, Vec2::new(0.0, 1.0), 8).is_none());
    }

    #[test]
    fn butt_cap_joins_rail_ends() {
        let (left, right) = vertical_rails();
        let cap = rails_cap(CapEnd::Start, &left, &right, 20.0, &StrokeConfig::default());
        assert_eq!(cap.report.shape, CapShape::Butt);
        assert_eq!(cap.segments.len(), 1);
        let s = &cap.segments[0];
        assert_eq!((s.a, s.b), (Point::new(-10.0, 0.0), Point::new(10.0, 0.0)));
        assert!(matches!(s.source, EdgeSource::CapStart { role: CapRole::JoinLR, .. }));
    }

    #[test]
    fn long_butt_join_is_suppressed() {
        let (left, right) = vertical_rails();
        let cap = rails_cap(CapEnd::End, &left, &right, 1.0, &StrokeConfig::default());
        assert_eq!(cap.report.shape, CapShape::Open);
        assert!(cap.segments.is_empty());
        assert_eq!(cap.report.fallbacks.len(), 1);
    }

    #[test]
    fn round_end_cap_points_away_from_body() {
        let (left, right) = vertical_rails();
        let cfg = config(CapStyle::Butt, CapStyle::Round);
        let cap = rails_cap(CapEnd::End, &left, &right, 20.0, &cfg);
        assert_eq!(cap.report.shape, CapShape::Round);
        assert_eq!(cap.segments.len(), cfg.round_arc_segments);
        let top = cap.segments.iter().map(|s| s.a.y.max(s.b.y)).fold(f64::MIN, f64::max);
        assert_abs_diff_eq!(top, 110.0, epsilon = 1e-6);
    }

    #[test]
    fn both_fillets_replace_the_join_with_a_bypass() {
        let (left, right) = vertical_rails();
        let cfg = config(CapStyle::Fillet { radius: 2.0, side: FilletSide::Both }, CapStyle::Butt);
        let cap = rails_cap(CapEnd::Start, &left, &right, 20.0, &cfg);
        assert_eq!(cap.report.shape, CapShape::Fillet { left: true, right: true });

        let lt = cap.left_trim.unwrap();
        let rt = cap.right_trim.unwrap();
        assert!(close(lt.point, Point::new(-10.0, 2.0)), "{:?}", lt.point);
        assert!(close(rt.point, Point::new(10.0, 2.0)), "{:?}", rt.point);
        assert_eq!(lt.keep, 1);

        let mids: Vec<&Segment2> = cap
            .segments
            .iter()
            .filter(|s| matches!(s.source, EdgeSource::CapStart { role: CapRole::MidSegment, .. }))
            .collect();
        assert_eq!(mids.len(), 1);
        assert!(close(mids[0].a, Point::new(-8.0, 0.0)) && close(mids[0].b, Point::new(8.0, 0.0)));
        // No edge reaches the sharp corners any more.
        for s in &cap.segments {
            for p in [s.a, s.b] {
                assert!(!close(p, Point::new(-10.0, 0.0)) && !close(p, Point::new(10.0, 0.0)));
            }
        }
    }

    #[test]
    fn single_fillet_bypasses_to_the_sharp_corner() {
        let (left, right) = vertical_rails();
        let cfg = config(CapStyle::Butt, CapStyle::Fillet { radius: 2.0, side: FilletSide::Left });
        let cap = rails_cap(CapEnd::End, &left, &right, 20.0, &cfg);
        assert_eq!(cap.report.shape, CapShape::Fillet { left: true, right: false });
        assert!(cap.right_trim.is_none());
        let lt = cap.left_trim.unwrap();
        assert!(close(lt.point, Point::new(-10.0, 98.0)), "{:?}", lt.point);
        assert_eq!(lt.keep, 9);
        let mid = cap
            .segments
            .iter()
            .find(|s| matches!(s.source, EdgeSource::CapEnd { role: CapRole::MidSegment, .. }))
            .unwrap();
        assert!(close(mid.a, Point::new(-8.0, 100.0)) && mid.b == Point::new(10.0, 100.0));
    }

    #[test]
    fn failed_fillets_fall_back_to_butt() {
        let (left, right) = vertical_rails();
        let cfg = config(CapStyle::Fillet { radius: 50.0, side: FilletSide::Both }, CapStyle::Butt);
        let cap = rails_cap(CapEnd::Start, &left, &right, 20.0, &cfg);
        assert_eq!(cap.report.shape, CapShape::Butt);
        assert_eq!(cap.report.fallbacks.len(), 2);
        for reason in &cap.report.fallbacks {
            assert!(reason.starts_with("start "), "{reason}");
            assert!(reason.contains("cap construction failed: radius too large"), "{reason}");
        }
        assert_eq!(cap.segments.len(), 1);
        assert!(cap.left_trim.is_none() && cap.right_trim.is_none());
    }

    #[test]
    fn rect_fillet_reshapes_end_quad() {
        let path = SkeletonPath::line(Point::new(0.0, 0.0), Point::new(0.0, 100.0));
        let param = PathParam::new(&path, 64).unwrap();
        let frame = rail_frame(&param, &SweepPlan::new(20.0, 10.0), 1.0, 7);
        let cfg = config(CapStyle::Butt, CapStyle::Fillet { radius: 2.0, side: FilletSide::Both });
        let cap = rect_cap(CapEnd::End, &frame, &cfg);
        assert!(cap.replaces_quad);
        assert_eq!(cap.report.shape, CapShape::Fillet { left: true, right: true });

        // c0 = (-10, 105) and c3 = (10, 105) are the outward corners.
        let l = cap.lane_ends[0].unwrap();
        let r = cap.lane_ends[3].unwrap();
        assert!(close(l, Point::new(-10.0, 103.0)), "{l:?}");
        assert!(close(r, Point::new(10.0, 103.0)), "{r:?}");
        assert!(cap.lane_ends[1].is_none() && cap.lane_ends[2].is_none());

        let mids: Vec<&Segment2> = cap
            .segments
            .iter()
            .filter(|s| matches!(s.source, EdgeSource::CapEnd { role: CapRole::MidSegment, .. }))
            .collect();
        assert_eq!(mids.len(), 1);
        assert!(close(mids[0].a, Point::new(8.0, 105.0)));
        assert!(close(mids[0].b, Point::new(-8.0, 105.0)));
        for s in &cap.segments {
            for p in [s.a, s.b] {
                assert!(!close(p, Point::new(-10.0, 105.0)) && !close(p, Point::new(10.0, 105.0)));
            }
        }
    }

    #[test]
    fn rect_round_cap_adds_arc_on_outward_edge() {
        let path = SkeletonPath::line(Point::new(0.0, 0.0), Point::new(0.0, 100.0));
        let param = PathParam::new(&path, 64).unwrap();
        let frame = rail_frame(&param, &SweepPlan::new(20.0, 10.0), 0.0, 0);
        let cfg = config(CapStyle::Round, CapStyle::Butt);
        let cap = rect_cap(CapEnd::Start, &frame, &cfg);
        assert!(!cap.replaces_quad);
        assert_eq!(cap.report.shape, CapShape::Round);
        let low = cap.segments.iter().map(|s| s.a.y.min(s.b.y)).fold(f64::MAX, f64::min);
        assert_abs_diff_eq!(low, -15.0, epsilon = 1e-6);
    }
}

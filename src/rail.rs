//! Per-sample pen frames: tangent, normal, rotated cross axis, rail points
//! and pen-corner quads.

use kurbo::{Point, Vec2};

use crate::config::FRAME_EPS;
use crate::geom::perp;
use crate::path::PathParam;
use crate::sampling::RailSource;
use crate::style::StyleSource;

/// Pen geometry at one sample.
///
/// `right - left` always spans exactly `width_left + width_right` along
/// the unit `cross_axis`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RailFrame {
    pub index: usize,
    pub t: f64,
    pub center: Point,
    pub tangent: Vec2,
    pub normal: Vec2,
    pub cross_axis: Vec2,
    pub effective_angle: f64,
    pub left: Point,
    pub right: Point,
    pub width_left: f64,
    pub width_right: f64,
    pub width_total: f64,
    /// Pen extent along the tangent.
    pub height: f64,
}

/// The four corners of a rect pen, in cyclic order.
///
/// c0 and c1 lie on the left rail side, c2 and c3 on the right; edges
/// alternate height, width, height, width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PenCorners {
    pub c0: Point,
    pub c1: Point,
    pub c2: Point,
    pub c3: Point,
}

impl PenCorners {
    pub fn as_array(&self) -> [Point; 4] {
        [self.c0, self.c1, self.c2, self.c3]
    }
}

impl RailFrame {
    /// Rail separation minus the expected width.
    pub fn width_error(&self) -> f64 {
        (self.right - self.left).hypot() - (self.width_left + self.width_right)
    }

    /// True if the frame satisfies its invariants within `eps`.
    pub fn check(&self, eps: f64) -> bool {
        self.width_error().abs() <= eps
            && (self.tangent.hypot() - 1.0).abs() <= eps
            && (self.normal.hypot() - 1.0).abs() <= eps
    }

    /// Unit axis of the pen's height, perpendicular to the cross axis.
    pub fn height_axis(&self) -> Vec2 {
        let (sin, cos) = self.effective_angle.sin_cos();
        self.tangent * cos - self.normal * sin
    }

    /// Corners of the rect pen centered on this frame.
    pub fn pen_corners(&self) -> PenCorners {
        let up = self.height_axis() * (self.height * 0.5);
        let left = self.center + self.cross_axis * self.width_left;
        let right = self.center - self.cross_axis * self.width_right;
        PenCorners {
            c0: left + up,
            c1: left - up,
            c2: right - up,
            c3: right + up,
        }
    }
}

/// Build the frame at global t.
///
/// Orientation follows the true arc-length clock; style is read on the
/// warped clock. In relative mode the pen angle is measured from the
/// normal; in absolute mode the tangent's own rotation is folded into the
/// angle, which cancels it and fixes the cross axis in world space.
pub fn rail_frame(param: &PathParam, style: &dyn StyleSource, t: f64, index: usize) -> RailFrame {
    let point = param.position(t);
    let tangent = param.tangent(t);
    let normal = perp(tangent);
    let s = style.style_at(style.warp(t));

    let base_angle = if s.angle_is_relative { 0.0 } else { tangent.atan2() };
    let effective_angle = base_angle + s.angle;
    let (sin, cos) = effective_angle.sin_cos();
    let cross_axis = tangent * sin + normal * cos;

    let center = point + cross_axis * s.offset;
    let (width_left, width_right) = s.side_widths();
    RailFrame {
        index,
        t,
        center,
        tangent,
        normal,
        cross_axis,
        effective_angle,
        left: center + cross_axis * width_left,
        right: center - cross_axis * width_right,
        width_left,
        width_right,
        width_total: width_left + width_right,
        height: s.height,
    }
}

/// Frames for every sample, indexed in order.
pub fn build_frames(param: &PathParam, style: &dyn StyleSource, ts: &[f64]) -> Vec<RailFrame> {
    let frames: Vec<RailFrame> = ts
        .iter()
        .enumerate()
        .map(|(i, &t)| rail_frame(param, style, t, i))
        .collect();
    let bad = frames.iter().filter(|f| !f.check(FRAME_EPS)).count();
    if bad > 0 {
        log::warn!("{bad} rail frames violate the width or unit invariants");
    }
    frames
}

/// Rail source for the sampler, backed by the frame builder.
pub struct FrameRails<'a> {
    pub param: &'a PathParam,
    pub style: &'a dyn StyleSource,
}

impl RailSource for FrameRails<'_> {
    fn rails_at(&self, t: f64) -> (Point, Point) {
        let frame = rail_frame(self.param, self.style, t, 0);
        (frame.left, frame.right)
    }
}

//! Pen style as a function of global t.
//!
//! The stroke engine never captures style closures. It takes a
//! [`StyleSource`] strategy object and calls its pure `t -> value` methods.
//! [`SweepPlan`] is the keyframe-driven implementation.

use crate::track::ParamTrack;

/// Alpha values at or below this magnitude leave the clock unwarped.
const WARP_ALPHA_EPS: f64 = 1.0e-6;

/// Lower bound for the warp exponent, so a strongly negative alpha cannot
/// collapse the warped clock to a step.
const MIN_WARP_EXPONENT: f64 = 0.05;

/// How the pen angle is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AngleMode {
    /// Angle is relative to the path normal; the pen turns with the curve.
    #[default]
    Relative,
    /// Angle is measured in world space, independent of curvature.
    Absolute,
}

/// Snapshot of the pen at one global t.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepStyle {
    /// Total width, used when a side width is not positive.
    pub width: f64,
    pub width_left: f64,
    pub width_right: f64,
    /// Pen extent along the tangent (rect-corner pens only).
    pub height: f64,
    /// Pen angle in radians.
    pub angle: f64,
    /// Translation of the pen center along the rotated cross axis.
    pub offset: f64,
    pub angle_is_relative: bool,
}

impl SweepStyle {
    /// Widths actually placed on each side of the center.
    ///
    /// A non-positive side width falls back to half the total width, so a
    /// legacy single-width style splits symmetrically.
    pub fn side_widths(&self) -> (f64, f64) {
        let half = self.width * 0.5;
        let left = if self.width_left > 0.0 { self.width_left } else { half };
        let right = if self.width_right > 0.0 { self.width_right } else { half };
        (left, right)
    }
}

/// Source of pen attributes over global t.
///
/// All methods must be pure: the same t always yields the same value.
pub trait StyleSource {
    fn width_at(&self, t: f64) -> f64;

    /// Left side width. Non-positive means "half of `width_at`".
    fn width_left_at(&self, _t: f64) -> f64 {
        0.0
    }

    /// Right side width. Non-positive means "half of `width_at`".
    fn width_right_at(&self, _t: f64) -> f64 {
        0.0
    }

    fn theta_at(&self, _t: f64) -> f64 {
        0.0
    }

    fn offset_at(&self, _t: f64) -> f64 {
        0.0
    }

    /// Easing signal: drives the warp and the adaptive sampler.
    fn alpha_at(&self, _t: f64) -> f64 {
        0.0
    }

    fn height(&self) -> f64;

    fn angle_mode(&self) -> AngleMode {
        AngleMode::Relative
    }

    /// Clock on which attributes are evaluated. Identity by default.
    fn warp(&self, t: f64) -> f64 {
        t
    }

    /// Interior keyframe times of every animated attribute, sorted.
    fn keyframe_times(&self) -> Vec<f64> {
        Vec::new()
    }

    /// Full style snapshot at t (t is used as given, not warped).
    fn style_at(&self, t: f64) -> SweepStyle {
        SweepStyle {
            width: self.width_at(t),
            width_left: self.width_left_at(t),
            width_right: self.width_right_at(t),
            height: self.height(),
            angle: self.theta_at(t),
            offset: self.offset_at(t),
            angle_is_relative: self.angle_mode() == AngleMode::Relative,
        }
    }
}

/// Ease the attribute clock after `start` by `phase^(1 + alpha)`.
///
/// Below `start`, or where alpha is effectively zero, the clock is the
/// identity. The result stays inside `[start, 1]`.
pub fn alpha_warp(t: f64, alpha: f64, start: f64) -> f64 {
    if t <= start || alpha.abs() <= WARP_ALPHA_EPS {
        return t;
    }
    let span = (1.0 - start).max(WARP_ALPHA_EPS);
    let phase = ((t - start) / span).clamp(0.0, 1.0);
    let exponent = (1.0 + alpha).max(MIN_WARP_EXPONENT);
    start + phase.powf(exponent) * span
}

/// Keyframe-driven pen description.
#[derive(Debug, Clone)]
pub struct SweepPlan {
    pub width: ParamTrack,
    pub width_left: Option<ParamTrack>,
    pub width_right: Option<ParamTrack>,
    pub theta: ParamTrack,
    pub offset: ParamTrack,
    /// Explicit alpha track. Without one, the easing exponent of the
    /// current width interval is used.
    pub alpha: Option<ParamTrack>,
    pub height: f64,
    pub angle_mode: AngleMode,
    /// Global t after which the alpha warp applies.
    pub warp_start: f64,
}

impl SweepPlan {
    /// Constant-width pen with no rotation, offset or easing.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: ParamTrack::constant(width),
            width_left: None,
            width_right: None,
            theta: ParamTrack::constant(0.0),
            offset: ParamTrack::constant(0.0),
            alpha: None,
            height,
            angle_mode: AngleMode::Relative,
            warp_start: 0.85,
        }
    }

    pub fn with_width(mut self, track: ParamTrack) -> Self {
        self.width = track;
        self
    }

    pub fn with_sides(mut self, left: ParamTrack, right: ParamTrack) -> Self {
        self.width_left = Some(left);
        self.width_right = Some(right);
        self
    }

    pub fn with_theta(mut self, track: ParamTrack) -> Self {
        self.theta = track;
        self
    }

    pub fn with_offset(mut self, track: ParamTrack) -> Self {
        self.offset = track;
        self
    }

    pub fn with_alpha(mut self, track: ParamTrack) -> Self {
        self.alpha = Some(track);
        self
    }

    pub fn with_angle_mode(mut self, mode: AngleMode) -> Self {
        self.angle_mode = mode;
        self
    }

    pub fn with_warp_start(mut self, start: f64) -> Self {
        self.warp_start = start;
        self
    }

    fn tracks(&self) -> impl Iterator<Item = &ParamTrack> {
        [Some(&self.width), self.width_left.as_ref(), self.width_right.as_ref()]
            .into_iter()
            .chain([Some(&self.theta), Some(&self.offset), self.alpha.as_ref()])
            .flatten()
    }
}

impl StyleSource for SweepPlan {
    fn width_at(&self, t: f64) -> f64 {
        self.width.value(t)
    }

    fn width_left_at(&self, t: f64) -> f64 {
        self.width_left.as_ref().map_or(0.0, |track| track.value(t))
    }

    fn width_right_at(&self, t: f64) -> f64 {
        self.width_right.as_ref().map_or(0.0, |track| track.value(t))
    }

    fn theta_at(&self, t: f64) -> f64 {
        self.theta.value(t)
    }

    fn offset_at(&self, t: f64) -> f64 {
        self.offset.value(t)
    }

    fn alpha_at(&self, t: f64) -> f64 {
        match &self.alpha {
            Some(track) => track.value(t),
            None => self.width.segment_alpha(t),
        }
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn angle_mode(&self) -> AngleMode {
        self.angle_mode
    }

    fn warp(&self, t: f64) -> f64 {
        alpha_warp(t, self.alpha_at(t), self.warp_start)
    }

    fn keyframe_times(&self) -> Vec<f64> {
        let mut times: Vec<f64> = self
            .tracks()
            .filter(|track| track.is_animated())
            .flat_map(|track| track.interior_times())
            .collect();
        times.sort_by(f64::total_cmp);
        times.dedup();
        times
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::{Interp, Keyframe};
    use approx::assert_abs_diff_eq;

    #[test]
    fn side_widths_fall_back_to_half() {
        let style = SweepStyle {
            width: 20.0,
            width_left: 0.0,
            width_right: 4.0,
            height: 10.0,
            angle: 0.0,
            offset: 0.0,
            angle_is_relative: true,
        };
        assert_eq!(style.side_widths(), (10.0, 4.0));
    }

    #[test]
    fn warp_is_identity_before_start_and_without_alpha() {
        assert_eq!(alpha_warp(0.5, 2.0, 0.85), 0.5);
        assert_eq!(alpha_warp(0.95, 0.0, 0.85), 0.95);
        assert_eq!(alpha_warp(0.95, 1e-9, 0.85), 0.95);
    }

    #[test]
    fn warp_eases_inside_range() {
        let start = 0.5;
        let w = alpha_warp(0.75, 1.0, start);
        // phase 0.5 squared.
        assert_abs_diff_eq!(w, 0.5 + 0.25 * 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(alpha_warp(1.0, 1.0, start), 1.0, epsilon = 1e-12);
        // Very negative alpha is floored, never a step.
        let floor = alpha_warp(0.75, -5.0, start);
        assert!(floor > 0.75 && floor < 1.0);
    }

    #[test]
    fn plan_reports_animated_key_times_only() {
        let plan = SweepPlan::new(20.0, 10.0)
            .with_width(ParamTrack::new(
                vec![Keyframe::new(0.0, 10.0), Keyframe::new(0.4, 30.0), Keyframe::new(1.0, 10.0)],
                Interp::HermiteMonotone,
            ))
            .with_offset(ParamTrack::new(
                vec![Keyframe::new(0.0, 0.0), Keyframe::new(0.7, 0.0), Keyframe::new(1.0, 0.0)],
                Interp::Linear,
            ));
        assert_eq!(plan.keyframe_times(), vec![0.4]);
    }

    #[test]
    fn alpha_falls_back_to_width_easing() {
        let plan = SweepPlan::new(20.0, 10.0).with_width(ParamTrack::new(
            vec![Keyframe::new(0.0, 10.0).with_alpha(0.75), Keyframe::new(1.0, 30.0)],
            Interp::Hermite,
        ));
        assert_eq!(plan.alpha_at(0.3), 0.75);
        assert_eq!(plan.alpha_at(1.0), 0.0);
    }
}

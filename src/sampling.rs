//! Adaptive global-t sampling.
//!
//! Bisects [0, 1] until every interval is flat enough on the skeleton,
//! on both rails and in every pen attribute, under hard depth and sample
//! caps. Intervals are processed from an explicit worklist in left-first
//! order, so the decision trace has the same order as a depth-first
//! recursion without its stack depth.

use kurbo::Point;

use crate::config::{SamplingConfig, SamplingMode, T_EPS};
use crate::geom::distance_to_line;
use crate::path::PathParam;
use crate::style::StyleSource;

/// Left and right rail points at a global t, used as a sampling signal.
pub trait RailSource {
    fn rails_at(&self, t: f64) -> (Point, Point);
}

/// Pen attribute tested by the sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    WidthLeft,
    WidthRight,
    Theta,
    Offset,
    Alpha,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleAction {
    Accepted,
    Subdivided,
    /// Needed subdivision but hit a cap.
    ForcedStop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleReason {
    /// Interval narrower than `T_EPS`, accepted untested.
    DegenerateInterval,
    PathFlatness,
    RailDeviation,
    Attribute(Attribute),
    MaxDepthHit,
    MaxSamplesHit,
}

/// Change of each attribute across one interval.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AttributeDeltas {
    pub width_left: f64,
    pub width_right: f64,
    pub theta: f64,
    pub offset: f64,
    pub alpha: f64,
}

/// Numeric errors measured on one interval.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SampleErrors {
    pub flatness: f64,
    pub rail: f64,
    pub attributes: AttributeDeltas,
}

/// One entry of the decision trace.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleDecision {
    pub t0: f64,
    pub t1: f64,
    pub tm: f64,
    pub depth: u32,
    pub action: SampleAction,
    pub reasons: Vec<SampleReason>,
    pub errors: SampleErrors,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SamplingStats {
    pub accepted: usize,
    pub subdivided: usize,
    pub forced_stops: usize,
    pub max_depth_reached: u32,
    pub worst_flatness: f64,
    pub worst_rail: f64,
    /// Largest attribute delta relative to its epsilon.
    pub worst_attr_ratio: f64,
    pub subdivided_by_flatness: usize,
    pub subdivided_by_rail: usize,
    pub subdivided_by_attr: usize,
    /// Keyframe times inserted after refinement.
    pub keyframe_hits: usize,
}

/// Output of the sampler: strictly increasing ts from 0 to 1 plus the
/// diagnostics that explain them.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingResult {
    pub ts: Vec<f64>,
    pub trace: Vec<SampleDecision>,
    pub stats: SamplingStats,
}

impl SamplingResult {
    /// Check the output invariants: endpoints present, strictly
    /// increasing, at most `max_samples`.
    pub fn is_well_formed(&self, max_samples: usize) -> bool {
        let endpoints = self.ts.first() == Some(&0.0) && self.ts.last() == Some(&1.0);
        let increasing = self.ts.windows(2).all(|w| w[1] > w[0]);
        endpoints && increasing && self.ts.len() <= max_samples.max(2)
    }
}

/// Sample global t for one stroke.
///
/// `style` enables the attribute rule, `rails` the rail-deviation rule.
/// Both are optional so the path alone can drive sampling.
pub fn sample_global_t(
    param: &PathParam,
    style: Option<&dyn StyleSource>,
    rails: Option<&dyn RailSource>,
    config: &SamplingConfig,
) -> SamplingResult {
    match config.mode {
        SamplingMode::Fixed(count) => SamplingResult {
            ts: uniform(count),
            trace: Vec::new(),
            stats: SamplingStats::default(),
        },
        SamplingMode::Adaptive => adaptive(param, style, rails, config),
    }
}

/// `count` equally spaced samples (at least 2) with exact endpoints.
pub fn uniform(count: usize) -> Vec<f64> {
    let n = count.max(2);
    let last = (n - 1) as f64;
    (0..n)
        .map(|i| if i == n - 1 { 1.0 } else { i as f64 / last })
        .collect()
}

struct Interval {
    t0: f64,
    t1: f64,
    depth: u32,
}

fn adaptive(
    param: &PathParam,
    style: Option<&dyn StyleSource>,
    rails: Option<&dyn RailSource>,
    config: &SamplingConfig,
) -> SamplingResult {
    let mut raw = vec![0.0, 1.0];
    let mut trace = Vec::new();
    let mut stats = SamplingStats::default();
    // Distinct samples so far: the endpoints plus one per split.
    let mut count = 2usize;

    let mut work = vec![Interval { t0: 0.0, t1: 1.0, depth: 0 }];
    while let Some(Interval { t0, t1, depth }) = work.pop() {
        let tm = 0.5 * (t0 + t1);
        stats.max_depth_reached = stats.max_depth_reached.max(depth);

        if t1 - t0 <= T_EPS {
            stats.accepted += 1;
            trace.push(SampleDecision {
                t0,
                t1,
                tm,
                depth,
                action: SampleAction::Accepted,
                reasons: vec![SampleReason::DegenerateInterval],
                errors: SampleErrors::default(),
            });
            continue;
        }

        let mut reasons = Vec::new();
        let mut errors = SampleErrors::default();

        // Rule 1: skeleton flatness.
        errors.flatness =
            distance_to_line(param.position(tm), param.position(t0), param.position(t1));
        stats.worst_flatness = stats.worst_flatness.max(errors.flatness);
        if errors.flatness > config.flatness_eps {
            reasons.push(SampleReason::PathFlatness);
            stats.subdivided_by_flatness += 1;
        }

        // Rule 2: rail deviation.
        if let Some(source) = rails {
            let (l0, r0) = source.rails_at(t0);
            let (lm, rm) = source.rails_at(tm);
            let (l1, r1) = source.rails_at(t1);
            errors.rail = distance_to_line(lm, l0, l1).max(distance_to_line(rm, r0, r1));
            stats.worst_rail = stats.worst_rail.max(errors.rail);
            if errors.rail > config.rail_eps {
                reasons.push(SampleReason::RailDeviation);
                stats.subdivided_by_rail += 1;
            }
        }

        // Rule 3: attribute deltas.
        if let Some(style) = style {
            let deltas = attribute_deltas(style, t0, tm, t1);
            errors.attributes = deltas;
            let eps = &config.attr_eps;
            let checks = [
                (Attribute::WidthLeft, deltas.width_left, eps.width_left),
                (Attribute::WidthRight, deltas.width_right, eps.width_right),
                (Attribute::Theta, deltas.theta, eps.theta),
                (Attribute::Offset, deltas.offset, eps.offset),
                (Attribute::Alpha, deltas.alpha, eps.alpha),
            ];
            let mut attr_failed = false;
            for (attr, delta, limit) in checks {
                if limit > 0.0 {
                    stats.worst_attr_ratio = stats.worst_attr_ratio.max(delta / limit);
                }
                if delta > limit {
                    reasons.push(SampleReason::Attribute(attr));
                    attr_failed = true;
                }
            }
            if attr_failed {
                stats.subdivided_by_attr += 1;
            }
        }

        if reasons.is_empty() {
            stats.accepted += 1;
            trace.push(SampleDecision {
                t0,
                t1,
                tm,
                depth,
                action: SampleAction::Accepted,
                reasons,
                errors,
            });
            continue;
        }

        let depth_capped = depth >= config.max_depth;
        let samples_capped = count >= config.max_samples;
        if depth_capped || samples_capped {
            if depth_capped {
                reasons.push(SampleReason::MaxDepthHit);
            }
            if samples_capped {
                reasons.push(SampleReason::MaxSamplesHit);
            }
            stats.forced_stops += 1;
            trace.push(SampleDecision {
                t0,
                t1,
                tm,
                depth,
                action: SampleAction::ForcedStop,
                reasons,
                errors,
            });
            continue;
        }

        stats.subdivided += 1;
        count += 1;
        raw.push(tm);
        trace.push(SampleDecision {
            t0,
            t1,
            tm,
            depth,
            action: SampleAction::Subdivided,
            reasons,
            errors,
        });
        // Right half first so the left half is processed next.
        work.push(Interval { t0: tm, t1, depth: depth + 1 });
        work.push(Interval { t0, t1: tm, depth: depth + 1 });
    }

    // A flat midpoint can end refinement early; keep a uniform density floor.
    if count < config.min_uniform_samples {
        raw.extend(uniform(config.min_uniform_samples));
    }

    let mut ts = finalize(raw, config.max_samples);
    if let Some(style) = style {
        stats.keyframe_hits = merge_keyframes(&mut ts, &style.keyframe_times(), config.max_samples);
    }

    SamplingResult { ts, trace, stats }
}

/// Range spanned by an attribute over the interval's three evaluations.
fn spread(v0: f64, vm: f64, v1: f64) -> f64 {
    v0.max(vm).max(v1) - v0.min(vm).min(v1)
}

fn attribute_deltas(style: &dyn StyleSource, t0: f64, tm: f64, t1: f64) -> AttributeDeltas {
    let at = |t: f64| {
        let w = style.warp(t);
        let s = style.style_at(w);
        let (left, right) = s.side_widths();
        [left, right, s.angle, s.offset, style.alpha_at(w)]
    };
    let (a, m, b) = (at(t0), at(tm), at(t1));
    let d = |i: usize| spread(a[i], m[i], b[i]);
    AttributeDeltas {
        width_left: d(0),
        width_right: d(1),
        theta: d(2),
        offset: d(3),
        alpha: d(4),
    }
}

/// Clamp, sort, dedup within `T_EPS` and cap, keeping both endpoints.
fn finalize(mut raw: Vec<f64>, max_samples: usize) -> Vec<f64> {
    for t in &mut raw {
        *t = t.clamp(0.0, 1.0);
    }
    raw.sort_by(f64::total_cmp);
    let mut out: Vec<f64> = Vec::with_capacity(raw.len());
    for t in raw {
        match out.last() {
            Some(&last) if t <= last + T_EPS => {}
            _ => out.push(t),
        }
    }
    cap(&mut out, max_samples);
    out
}

fn cap(ts: &mut Vec<f64>, max_samples: usize) {
    let max = max_samples.max(2);
    if ts.first() != Some(&0.0) {
        ts.insert(0, 0.0);
    }
    if ts.len() > max {
        ts.truncate(max - 1);
        ts.push(1.0);
    }
    match ts.last() {
        Some(&last) if last == 1.0 => {}
        Some(&last) if last >= 1.0 - T_EPS => {
            if let Some(end) = ts.last_mut() {
                *end = 1.0;
            }
        }
        _ => ts.push(1.0),
    }
}

/// Insert keyframe times not already within `T_EPS` of a sample.
/// Existing samples are never moved. Returns the number inserted.
fn merge_keyframes(ts: &mut Vec<f64>, keys: &[f64], max_samples: usize) -> usize {
    let mut hits = 0;
    for &k in keys {
        if ts.len() >= max_samples {
            log::debug!("sample cap reached, keyframe at t={k:.6} not inserted");
            break;
        }
        if !(0.0..=1.0).contains(&k) {
            continue;
        }
        let pos = ts.partition_point(|&t| t < k);
        let near_prev = pos > 0 && k - ts[pos - 1] <= T_EPS;
        let near_next = pos < ts.len() && ts[pos] - k <= T_EPS;
        if !near_prev && !near_next {
            ts.insert(pos, k);
            hits += 1;
        }
    }
    hits
}

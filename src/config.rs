use crate::cap::CapStyle;
use crate::resolve::SelectionPolicy;

/// Quantization step for spatial snap keys. Two points closer than this
/// share a key and are treated as the same vertex.
pub const SNAP_EPS: f64 = 1.0e-6;

/// Resolution of global t. Samples closer than this are duplicates and
/// intervals narrower than this are accepted without testing.
pub const T_EPS: f64 = 1.0e-9;

/// Tolerance for parametric segment intersection (parallel rejection and
/// endpoint exclusion).
pub const INTERSECT_EPS: f64 = 1.0e-9;

/// Tolerance for rail frame invariants (unit vectors, rail separation).
pub const FRAME_EPS: f64 = 1.0e-6;

/// All stroking parameters in one struct.
/// Passed explicitly to every stage; nothing is read from global state.
#[derive(Debug, Clone)]
pub struct StrokeConfig {
    // -- Sampling stage --
    /// Global-t sampling parameters.
    pub sampling: SamplingConfig,
    /// Arc-length table resolution per cubic segment.
    pub arc_samples_per_segment: usize,

    // -- Boundary soup --
    /// Pen cross-section used to build boundary edges.
    pub pen_shape: PenShape,
    /// Cap at global t = 0.
    pub start_cap: CapStyle,
    /// Cap at global t = 1.
    pub end_cap: CapStyle,
    /// Arc steps for round and ball caps.
    pub round_arc_segments: usize,
    /// Arc steps for each fillet bridge.
    pub fillet_arc_segments: usize,

    // -- Resolution --
    /// Whether the self-overlap resolver runs on the envelope ring.
    pub resolve: ResolveMode,
    /// Face selection policy for envelope resolution.
    pub selection: SelectionPolicy,

    // -- Tolerances --
    /// Snap key quantization for tracing and planarization.
    pub snap_eps: f64,
}

/// Parameters of the adaptive global-t sampler.
#[derive(Debug, Clone)]
pub struct SamplingConfig {
    /// Adaptive bisection or a fixed uniform grid.
    pub mode: SamplingMode,
    /// Maximum midpoint deviation from the chord of the skeleton.
    pub flatness_eps: f64,
    /// Maximum midpoint deviation of either rail from its chord.
    pub rail_eps: f64,
    /// Per-attribute change allowed across one accepted interval.
    pub attr_eps: AttributeEps,
    /// Maximum bisection depth. Intervals at this depth are force-stopped.
    pub max_depth: u32,
    /// Hard cap on emitted samples, endpoints included.
    pub max_samples: usize,
    /// Density floor: if refinement yields fewer samples than this, a
    /// uniform grid of this many is merged in. 0 disables it.
    pub min_uniform_samples: usize,
}

/// Sampling strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingMode {
    /// Error-driven bisection of [0, 1].
    Adaptive,
    /// N equally spaced samples (clamped to at least 2).
    Fixed(usize),
}

/// Allowed attribute change across one interval, in attribute units
/// (`theta` in radians).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttributeEps {
    pub width_left: f64,
    pub width_right: f64,
    pub theta: f64,
    pub offset: f64,
    pub alpha: f64,
}

/// Pen cross-section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PenShape {
    /// Rect corners in absolute angle mode, rails only in relative mode.
    Auto,
    /// Two rail polylines plus end caps.
    RailsOnly,
    /// Four pen-corner lanes plus per-sample perimeter quads.
    RectCorners,
}

/// When to run self-overlap resolution on the envelope ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveMode {
    /// Only when the envelope ring self-intersects.
    Auto,
    /// Always.
    Always,
    /// Never; the envelope ring is used as is.
    Never,
}

impl Default for StrokeConfig {
    fn default() -> Self {
        Self {
            sampling: SamplingConfig::default(),
            arc_samples_per_segment: 256,
            pen_shape: PenShape::Auto,
            start_cap: CapStyle::Butt,
            end_cap: CapStyle::Butt,
            round_arc_segments: 64,
            fillet_arc_segments: 8,
            resolve: ResolveMode::Auto,
            selection: SelectionPolicy::default(),
            snap_eps: SNAP_EPS,
        }
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            mode: SamplingMode::Adaptive,
            flatness_eps: 0.25,
            rail_eps: 0.25,
            attr_eps: AttributeEps::default(),
            max_depth: 12,
            max_samples: 512,
            min_uniform_samples: 64,
        }
    }
}

impl Default for AttributeEps {
    fn default() -> Self {
        Self {
            width_left: 0.25,
            width_right: 0.25,
            theta: 0.25_f64.to_radians(),
            offset: 0.25,
            alpha: 0.25,
        }
    }
}

impl SamplingConfig {
    /// Fixed uniform sampling with `count` samples.
    pub fn fixed(count: usize) -> Self {
        Self {
            mode: SamplingMode::Fixed(count),
            ..Self::default()
        }
    }
}

//! inkstroke: skeleton path + pen style → one closed outline.
//!
//! Samples a stroke adaptively along its skeleton, sweeps a pen along it
//! to build a soup of boundary edges (rails, pen quads, caps and fillets),
//! traces closed rings from the soup, and resolves self-overlap by
//! planarizing and picking the outer face.
//!
//! # Example
//!
//! ```
//! use inkstroke::{stroke_outline, SkeletonPath, StrokeConfig, SweepPlan};
//! use inkstroke::kurbo::Point;
//!
//! let path = SkeletonPath::line(Point::new(0.0, 0.0), Point::new(0.0, 100.0));
//! let plan = SweepPlan::new(20.0, 10.0);
//! let output = stroke_outline(&path, &plan, &StrokeConfig::default(), None)?;
//! assert_eq!(output.contour.reason.code(), "max-area-simple");
//! # Ok::<(), inkstroke::StrokeError>(())
//! ```

#![forbid(unsafe_code)]

pub mod cap;
pub mod config;
pub mod contour;
pub mod error;
pub mod geom;
pub mod observer;
pub mod path;
pub mod rail;
pub mod resolve;
pub mod sampling;
pub mod soup;
pub mod style;
pub mod trace;
pub mod track;

// Re-export kurbo so callers build paths with the same version.
pub use kurbo;

pub use cap::{CapStyle, FilletSide};
pub use config::{AttributeEps, PenShape, ResolveMode, SamplingConfig, SamplingMode, StrokeConfig};
pub use contour::{ContourReason, FinalContour, Provenance, Resolution, ResolutionKind};
pub use error::{FilletError, StrokeError};
pub use observer::StrokeObserver;
pub use path::{PathParam, SkeletonPath};
pub use resolve::SelectionPolicy;
pub use style::{AngleMode, StyleSource, SweepPlan};
pub use track::{Interp, Keyframe, Knot, ParamTrack};

use kurbo::Point;
use rayon::prelude::*;

use config::INTERSECT_EPS;
use rail::{build_frames, FrameRails, RailFrame};
use sampling::{sample_global_t, SamplingResult};
use soup::{build_soup, SoupBuild};
use trace::trace_loops;

/// Everything one stroke produced, final contour first.
#[derive(Debug, Clone)]
pub struct StrokeOutput {
    pub contour: FinalContour,
    /// Closed rings traced from the soup.
    pub rings: Vec<Vec<Point>>,
    /// Index of the envelope ring in `rings`.
    pub envelope: Option<usize>,
    /// Edges the tracer could not close into rings.
    pub dropped_edges: usize,
    /// The resolver run, if one happened.
    pub resolution: Option<Resolution>,
    pub sampling: SamplingResult,
    pub frames: Vec<RailFrame>,
    pub soup: SoupBuild,
    /// Recoverable problems, in stage order.
    pub warnings: Vec<String>,
}

/// Full pipeline: skeleton + style → final contour.
///
/// Only an empty skeleton is an error. Every other degradation (cap
/// fallback, dropped edges, failed resolution) is recorded in
/// [`StrokeOutput::warnings`] and the best available contour is returned.
pub fn stroke_outline(
    path: &SkeletonPath,
    style: &dyn StyleSource,
    config: &StrokeConfig,
    mut observer: Option<&mut dyn StrokeObserver>,
) -> Result<StrokeOutput, StrokeError> {
    let mut warnings = Vec::new();

    // ── Sample ────────────────────────────────────────────
    let param = PathParam::new(path, config.arc_samples_per_segment)?;
    let frame_rails = FrameRails { param: &param, style };
    let sampling = sample_global_t(&param, Some(style), Some(&frame_rails), &config.sampling);
    log::debug!(
        "sample: {} ts, {} subdivided, {} forced stops, depth {}",
        sampling.ts.len(),
        sampling.stats.subdivided,
        sampling.stats.forced_stops,
        sampling.stats.max_depth_reached
    );
    if sampling.stats.forced_stops > 0 {
        warnings.push(format!("sampling hit its caps {} times", sampling.stats.forced_stops));
    }
    if let Some(o) = observer.as_mut() {
        o.on_sampling(&sampling);
    }

    // ── Frames ────────────────────────────────────────────
    let frames = build_frames(&param, style, &sampling.ts);
    if let Some(o) = observer.as_mut() {
        o.on_frames(&frames);
    }

    // ── Soup ──────────────────────────────────────────────
    let soup = build_soup(&frames, style.angle_mode(), config);
    warnings.extend(soup.warnings.iter().cloned());
    if let Some(o) = observer.as_mut() {
        o.on_soup(&soup);
    }

    // ── Trace ─────────────────────────────────────────────
    let traced = trace_loops(&soup.segments, config.snap_eps);
    if traced.dropped_edges > 0 {
        warnings.push(format!("tracer dropped {} open edges", traced.dropped_edges));
    }
    if traced.rings.is_empty() {
        let err = StrokeError::GeometryDegenerate("no closed rings traced".to_string());
        log::warn!("{err}");
        warnings.push(err.to_string());
    }
    if let Some(o) = observer.as_mut() {
        o.on_rings(&traced);
    }
    let envelope = contour::envelope_index(&traced.rings);

    // ── Resolve ───────────────────────────────────────────
    let resolution = if soup.pen_shape == PenShape::RectCorners {
        let policy = SelectionPolicy::rect_corners();
        Some(Resolution {
            kind: ResolutionKind::RectSoup,
            result: resolve::resolve_soup(&soup.segments, policy, config.snap_eps),
        })
    } else {
        envelope.and_then(|i| {
            let ring = &traced.rings[i];
            let crossing = geom::ring_self_intersection_count(ring, INTERSECT_EPS) > 0;
            let kind = match config.resolve {
                ResolveMode::Always => ResolutionKind::Explicit,
                ResolveMode::Auto if crossing => ResolutionKind::Auto,
                _ => return None,
            };
            let result = resolve::resolve_self_overlap(ring, config.selection, config.snap_eps);
            Some(Resolution { kind, result })
        })
    };
    if let Some(res) = &resolution {
        if let Some(failure) = res.result.failure {
            let err = StrokeError::Resolution(failure.to_string());
            log::warn!("{err}");
            warnings.push(err.to_string());
        }
        if let Some(o) = observer.as_mut() {
            o.on_resolve(res);
        }
    }

    // ── Contour ───────────────────────────────────────────
    let contour = contour::select_final_contour(&traced.rings, resolution.as_ref());
    log::debug!(
        "contour: {} points, area {:.3}, {} self-intersections ({})",
        contour.points.len(),
        contour.area,
        contour.self_intersections,
        contour.reason
    );
    if let Some(o) = observer.as_mut() {
        o.on_contour(&contour);
    }

    Ok(StrokeOutput {
        contour,
        rings: traced.rings,
        envelope,
        dropped_edges: traced.dropped_edges,
        resolution,
        sampling,
        frames,
        soup,
        warnings,
    })
}

/// One independent stroke for batch rendering.
#[derive(Debug, Clone)]
pub struct StrokeJob {
    pub path: SkeletonPath,
    pub plan: SweepPlan,
}

/// Outline many strokes in parallel. Results keep the input order.
pub fn render_strokes(
    jobs: &[StrokeJob],
    config: &StrokeConfig,
) -> Vec<Result<StrokeOutput, StrokeError>> {
    jobs.par_iter()
        .map(|job| stroke_outline(&job.path, &job.plan, config, None))
        .collect()
}

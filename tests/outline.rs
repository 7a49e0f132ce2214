use approx::{assert_abs_diff_eq, assert_relative_eq};
use inkstroke::kurbo::{CubicBez, Point};
use inkstroke::{
    render_strokes, stroke_outline, AngleMode, CapStyle, ContourReason, FilletSide, Provenance,
    ResolveMode, SamplingConfig, SkeletonPath, StrokeConfig, StrokeError, StrokeJob, SweepPlan,
};

fn vertical_line() -> SkeletonPath {
    SkeletonPath::line(Point::new(0.0, 0.0), Point::new(0.0, 100.0))
}

fn looping_cubic() -> SkeletonPath {
    SkeletonPath::new(vec![CubicBez::new(
        (0.0, 0.0),
        (150.0, 100.0),
        (-50.0, 100.0),
        (100.0, 0.0),
    )])
}

/// Two loops of opposite winding crossing at the origin. The path starts
/// at the right end and stops just short of it.
fn figure_eight() -> SkeletonPath {
    SkeletonPath::new(vec![
        CubicBez::new((100.0, 0.0), (100.0, 55.0), (40.0, 40.0), (0.0, 0.0)),
        CubicBez::new((0.0, 0.0), (-40.0, -40.0), (-100.0, -55.0), (-100.0, 0.0)),
        CubicBez::new((-100.0, 0.0), (-100.0, 55.0), (-40.0, 40.0), (0.0, 0.0)),
        CubicBez::new((0.0, 0.0), (40.0, -40.0), (100.0, -50.0), (100.0, -12.0)),
    ])
}

fn fixed(samples: usize) -> StrokeConfig {
    StrokeConfig {
        sampling: SamplingConfig::fixed(samples),
        ..StrokeConfig::default()
    }
}

#[test]
fn straight_butt_stroke_is_a_rectangle() {
    let plan = SweepPlan::new(20.0, 10.0);
    let out = stroke_outline(&vertical_line(), &plan, &fixed(32), None).unwrap();
    let c = &out.contour;
    assert_eq!(c.reason, ContourReason::MaxAreaSimple);
    assert_eq!(c.self_intersections, 0);
    assert_eq!(c.points.first(), c.points.last(), "contour must be closed");
    assert_relative_eq!(c.area, 2000.0, max_relative = 1e-9);
    assert_abs_diff_eq!(c.bbox.x0, -10.0, epsilon = 1e-9);
    assert_abs_diff_eq!(c.bbox.x1, 10.0, epsilon = 1e-9);
    assert_eq!(out.sampling.ts.len(), 32);
    assert!(out.resolution.is_none());
    assert!(out.warnings.is_empty(), "{:?}", out.warnings);
}

#[test]
fn round_caps_add_two_half_discs() {
    let config = StrokeConfig {
        start_cap: CapStyle::Round,
        end_cap: CapStyle::Round,
        ..fixed(32)
    };
    let out = stroke_outline(&vertical_line(), &SweepPlan::new(20.0, 10.0), &config, None).unwrap();
    let c = &out.contour;
    assert_eq!(c.self_intersections, 0);
    // 2000 + pi * 10^2, minus the polygonal approximation of the arcs.
    assert!(c.area > 2300.0 && c.area < 2000.0 + std::f64::consts::PI * 100.0, "area {}", c.area);
    assert_abs_diff_eq!(c.bbox.y0, -10.0, epsilon = 1e-6);
    assert_abs_diff_eq!(c.bbox.y1, 110.0, epsilon = 1e-6);
}

#[test]
fn filleted_caps_shave_the_corners() {
    let config = StrokeConfig {
        start_cap: CapStyle::Fillet { radius: 3.0, side: FilletSide::Both },
        end_cap: CapStyle::Fillet { radius: 3.0, side: FilletSide::Both },
        ..fixed(32)
    };
    let out = stroke_outline(&vertical_line(), &SweepPlan::new(20.0, 10.0), &config, None).unwrap();
    let c = &out.contour;
    assert_eq!(c.reason, ContourReason::MaxAreaSimple);
    assert_eq!(c.self_intersections, 0);
    // Four corners of 9 * (1 - pi/4) each.
    assert!(c.area < 2000.0 - 7.0 && c.area > 1990.0, "area {}", c.area);
}

#[test]
fn self_crossing_stroke_resolves_to_a_simple_outline() {
    let plan = SweepPlan::new(8.0, 4.0);
    let out = stroke_outline(&looping_cubic(), &plan, &StrokeConfig::default(), None).unwrap();
    let envelope = out.envelope.expect("envelope ring");
    assert!(inkstroke::geom::ring_self_intersection_count(&out.rings[envelope], 1e-9) > 0);

    let c = &out.contour;
    assert_eq!(c.reason, ContourReason::ResolvedOuterFace);
    assert!(matches!(c.provenance, Provenance::ResolvedFace(_)));
    assert_eq!(c.self_intersections, 0);
    assert!(c.area > 0.0);
    assert!(inkstroke::geom::signed_area(&c.points) > 0.0, "resolved outline is counter-clockwise");
}

#[test]
fn disabled_resolution_keeps_the_crossing_envelope() {
    let config = StrokeConfig {
        resolve: ResolveMode::Never,
        ..StrokeConfig::default()
    };
    let out = stroke_outline(&looping_cubic(), &SweepPlan::new(8.0, 4.0), &config, None).unwrap();
    assert!(out.resolution.is_none());
    assert_eq!(out.contour.reason, ContourReason::MaxArea);
    assert!(out.contour.self_intersections > 0);
}

#[test]
fn absolute_pen_is_planarized() {
    let path = SkeletonPath::line(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
    let plan = SweepPlan::new(20.0, 10.0).with_angle_mode(AngleMode::Absolute);
    let out = stroke_outline(&path, &plan, &fixed(8), None).unwrap();
    let c = &out.contour;
    assert_eq!(c.reason, ContourReason::PlanarizedOuterFace);
    assert_eq!(c.self_intersections, 0);
    // Width spans y, height spans x: [-5, 105] x [-10, 10].
    assert_relative_eq!(c.area, 2200.0, max_relative = 1e-9);
    assert_relative_eq!(c.bbox.area(), 2200.0, max_relative = 1e-9);
}

#[test]
fn figure_eight_resolves_to_one_simple_outline() {
    let plan = SweepPlan::new(8.0, 4.0);
    let out = stroke_outline(&figure_eight(), &plan, &StrokeConfig::default(), None).unwrap();
    let envelope = out.envelope.expect("envelope ring");
    assert!(inkstroke::geom::ring_self_intersection_count(&out.rings[envelope], 1e-9) > 0);

    let c = &out.contour;
    assert_eq!(c.reason, ContourReason::ResolvedOuterFace);
    assert_eq!(c.self_intersections, 0);
    assert!(inkstroke::geom::signed_area(&c.points) > 0.0);
    // Both loops survive: the outline spans the full width of the eight.
    assert!(c.bbox.x0 < -100.0 && c.bbox.x1 > 100.0, "{:?}", c.bbox);
}

#[test]
fn figure_eight_with_absolute_pen_keeps_its_shape() {
    let plan = SweepPlan::new(8.0, 4.0).with_angle_mode(AngleMode::Absolute);
    let config = StrokeConfig::default();
    let out = stroke_outline(&figure_eight(), &plan, &config, None).unwrap();
    assert!(out.sampling.ts.len() >= config.sampling.min_uniform_samples);

    let c = &out.contour;
    assert_eq!(c.reason, ContourReason::PlanarizedOuterFace);
    assert_eq!(c.self_intersections, 0);
    assert!(inkstroke::geom::signed_area(&c.points) > 0.0);
    assert!(c.bbox.x0 < -95.0 && c.bbox.x1 > 95.0, "{:?}", c.bbox);
    assert!(c.bbox.y0 < -35.0 && c.bbox.y1 > 35.0, "{:?}", c.bbox);
}

#[test]
fn s_curve_is_not_flattened_by_default_sampling() {
    // The midpoint of this S lies on its chord.
    let path = SkeletonPath::new(vec![CubicBez::new(
        (0.0, 0.0),
        (50.0, 100.0),
        (50.0, -100.0),
        (100.0, 0.0),
    )]);
    let plan = SweepPlan::new(4.0, 10.0).with_angle_mode(AngleMode::Absolute);
    let out = stroke_outline(&path, &plan, &StrokeConfig::default(), None).unwrap();
    assert!(out.contour.bbox.y1 > 25.0 && out.contour.bbox.y0 < -25.0, "{:?}", out.contour.bbox);
}

#[test]
fn outline_is_deterministic() {
    let plan = SweepPlan::new(12.0, 6.0);
    let a = stroke_outline(&looping_cubic(), &plan, &StrokeConfig::default(), None).unwrap();
    let b = stroke_outline(&looping_cubic(), &plan, &StrokeConfig::default(), None).unwrap();
    assert_eq!(a.sampling.ts, b.sampling.ts);
    assert_eq!(a.soup, b.soup);
    assert_eq!(a.contour, b.contour);
}

#[test]
fn batch_matches_single_strokes_in_order() {
    let config = fixed(16);
    let jobs: Vec<StrokeJob> = [6.0, 12.0, 24.0]
        .into_iter()
        .map(|w| StrokeJob {
            path: vertical_line(),
            plan: SweepPlan::new(w, 5.0),
        })
        .collect();
    let batch = render_strokes(&jobs, &config);
    assert_eq!(batch.len(), jobs.len());
    for (job, out) in jobs.iter().zip(&batch) {
        let single = stroke_outline(&job.path, &job.plan, &config, None).unwrap();
        assert_eq!(out.as_ref().unwrap().contour, single.contour);
    }
}

#[test]
fn empty_skeleton_is_rejected() {
    let empty = SkeletonPath::new(Vec::new());
    let err = stroke_outline(&empty, &SweepPlan::new(10.0, 5.0), &StrokeConfig::default(), None)
        .unwrap_err();
    assert_eq!(err, StrokeError::EmptyPath);
}

//! Self-overlap resolution: planarize, enumerate faces, pick the outline.

pub mod graph;
pub mod planarize;
pub mod select;

use kurbo::Point;

use crate::geom::{bbox, dedup_ring, signed_area};
use crate::soup::Segment2;

pub use graph::{FaceLoop, HalfEdgeGraph};
pub use planarize::{planarize, PlanarGraph, PlanarizeStats};
pub use select::{select_face, FaceSelection, Reference, SelectionFailure, SelectionPolicy};

/// Outcome of one resolution attempt.
///
/// On failure `ring` is whatever the caller should fall back to (the
/// input ring for [`resolve_self_overlap`], empty for [`resolve_soup`]).
#[derive(Debug, Clone, PartialEq)]
pub struct ResolveResult {
    pub ring: Vec<Point>,
    pub selected_face: Option<usize>,
    pub faces: Vec<FaceLoop>,
    pub small_faces: usize,
    pub stats: PlanarizeStats,
    pub policy: SelectionPolicy,
    pub failure: Option<SelectionFailure>,
}

impl ResolveResult {
    fn failed(ring: Vec<Point>, policy: SelectionPolicy, failure: SelectionFailure) -> Self {
        Self {
            ring,
            selected_face: None,
            faces: Vec::new(),
            small_faces: 0,
            stats: PlanarizeStats::default(),
            policy,
            failure: Some(failure),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }
}

fn resolve_segments(
    segments: &[(Point, Point)],
    fallback: Vec<Point>,
    policy: SelectionPolicy,
    reference: Reference,
    eps: f64,
) -> ResolveResult {
    let (planar, stats) = planarize(segments, eps);
    log::debug!(
        "planarize: {} segments, {} intersections, {} vertices, {} edges",
        stats.segments,
        stats.intersections,
        stats.split_vertices,
        stats.split_edges
    );
    if planar.edges.is_empty() {
        let mut result = ResolveResult::failed(fallback, policy, SelectionFailure::NoEdges);
        result.stats = stats;
        return result;
    }

    let (faces, small_faces) = HalfEdgeGraph::new(&planar).faces();
    let mut result = ResolveResult {
        ring: fallback,
        selected_face: None,
        faces,
        small_faces,
        stats,
        policy,
        failure: None,
    };
    match select_face(&result.faces, policy, reference) {
        Ok(selection) => {
            log::debug!(
                "resolve: face {} of {} selected by {} (area {:.3})",
                selection.face_id,
                result.faces.len(),
                policy.name(),
                selection.area
            );
            result.ring = selection.ring;
            result.selected_face = Some(selection.face_id);
        }
        Err(failure) => {
            log::debug!("resolve: {} found no outline face ({failure})", policy.name());
            result.failure = Some(failure);
        }
    }
    result
}

/// Resolve a self-overlapping closed ring into its outer face.
///
/// The ratio gate is measured against the input ring's |area|.
pub fn resolve_self_overlap(ring: &[Point], policy: SelectionPolicy, eps: f64) -> ResolveResult {
    if ring.len() < 4 {
        return ResolveResult::failed(ring.to_vec(), policy, SelectionFailure::RingTooSmall);
    }
    let closed = dedup_ring(ring, eps);
    let segments: Vec<(Point, Point)> = closed.windows(2).map(|w| (w[0], w[1])).collect();
    let reference = Reference {
        area: signed_area(&closed).abs(),
        bbox_area: bbox(&closed).area(),
    };
    resolve_segments(&segments, closed, policy, reference, eps)
}

/// Resolve a whole boundary soup directly.
///
/// The ratio gates are measured against the soup's bounding box.
pub fn resolve_soup(segments: &[Segment2], policy: SelectionPolicy, eps: f64) -> ResolveResult {
    let pairs: Vec<(Point, Point)> = segments.iter().map(|s| (s.a, s.b)).collect();
    let points: Vec<Point> = pairs.iter().flat_map(|&(a, b)| [a, b]).collect();
    let extent = bbox(&points).area();
    let reference = Reference {
        area: extent,
        bbox_area: extent,
    };
    resolve_segments(&pairs, Vec::new(), policy, reference, eps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{INTERSECT_EPS, SNAP_EPS};
    use crate::geom::ring_self_intersection_count;
    use crate::soup::EdgeSource;
    use approx::assert_abs_diff_eq;

    fn ring(pts: &[(f64, f64)]) -> Vec<Point> {
        pts.iter().map(|&p| p.into()).collect()
    }

    #[test]
    fn bowtie_resolves_to_its_silhouette() {
        let bowtie = ring(&[(0.0, 0.0), (10.0, 10.0), (10.0, 0.0), (0.0, 10.0), (0.0, 0.0)]);
        let result = resolve_self_overlap(&bowtie, SelectionPolicy::default(), SNAP_EPS);
        assert!(result.succeeded(), "{:?}", result.failure);
        assert_eq!(result.stats.intersections, 1);
        assert_abs_diff_eq!(signed_area(&result.ring), 50.0, epsilon = 1e-9);
        assert_eq!(ring_self_intersection_count(&result.ring, INTERSECT_EPS), 0);
    }

    #[test]
    fn small_ring_is_rejected() {
        let sliver = ring(&[(0.0, 0.0), (1.0, 0.0), (0.0, 0.0)]);
        let result = resolve_self_overlap(&sliver, SelectionPolicy::default(), SNAP_EPS);
        assert_eq!(result.failure, Some(SelectionFailure::RingTooSmall));
        assert_eq!(result.ring.len(), 3);
    }

    #[test]
    fn open_ring_is_closed_first() {
        let open = ring(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        let result = resolve_self_overlap(&open, SelectionPolicy::default(), SNAP_EPS);
        assert!(result.succeeded());
        assert_abs_diff_eq!(signed_area(&result.ring), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn repeated_points_are_dropped_before_planarizing() {
        let stuttered = ring(&[
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 0.0),
            (10.0, 10.0),
            (0.0, 10.0),
            (0.0, 10.0),
            (0.0, 0.0),
        ]);
        let result = resolve_self_overlap(&stuttered, SelectionPolicy::default(), SNAP_EPS);
        assert!(result.succeeded());
        assert_eq!(result.stats.segments, 4);
        assert_eq!(result.stats.dropped_zero_length, 0);
    }

    #[test]
    fn overlapping_squares_union() {
        let mut soup = Vec::new();
        for (x, y) in [(0.0, 0.0), (5.0, 5.0)] {
            let sq = ring(&[(x, y), (x + 10.0, y), (x + 10.0, y + 10.0), (x, y + 10.0), (x, y)]);
            for w in sq.windows(2) {
                soup.push(Segment2::new(w[0], w[1], EdgeSource::PenCap));
            }
        }
        let result = resolve_soup(&soup, SelectionPolicy::rect_corners(), SNAP_EPS);
        assert!(result.succeeded(), "{:?}", result.failure);
        assert_abs_diff_eq!(signed_area(&result.ring), 175.0, epsilon = 1e-9);
        assert_eq!(result.stats.intersections, 2);
    }

    #[test]
    fn degenerate_soup_has_no_edges() {
        let p = Point::new(1.0, 1.0);
        let soup = [Segment2::new(p, p, EdgeSource::PenCap)];
        let result = resolve_soup(&soup, SelectionPolicy::default(), SNAP_EPS);
        assert_eq!(result.failure, Some(SelectionFailure::NoEdges));
        assert_eq!(result.stats.dropped_zero_length, 1);
    }
}

//! Final contour selection: one outline per stroke, with the reason it
//! was chosen.

use std::fmt;

use kurbo::{Point, Rect};

use crate::config::INTERSECT_EPS;
use crate::geom::{bbox, ring_self_intersection_count, signed_area};
use crate::resolve::ResolveResult;

/// Where the final outline came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// Index into the traced rings.
    TracedRing(usize),
    /// Face id of the resolved planar graph.
    ResolvedFace(usize),
    None,
}

/// Why the final outline was chosen. Rendered as a stable code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContourReason {
    PlanarizedOuterFace,
    /// Resolution was requested explicitly.
    Resolved,
    /// Resolution ran because the envelope ring self-intersects.
    ResolvedOuterFace,
    MaxAreaSimple,
    MaxArea,
    Empty,
}

impl ContourReason {
    pub fn code(self) -> &'static str {
        match self {
            Self::PlanarizedOuterFace => "planarized-outer-face",
            Self::Resolved => "resolved",
            Self::ResolvedOuterFace => "resolved-outer-face",
            Self::MaxAreaSimple => "max-area-simple",
            Self::MaxArea => "max-area",
            Self::Empty => "empty",
        }
    }
}

impl fmt::Display for ContourReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Why the resolver ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionKind {
    /// Whole rect-corner soup.
    RectSoup,
    /// Envelope ring, because the configuration asked for it.
    Explicit,
    /// Envelope ring, because it self-intersects.
    Auto,
}

/// A resolver run and its trigger.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub kind: ResolutionKind,
    pub result: ResolveResult,
}

/// The single outline of a stroke.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalContour {
    /// Closed ring.
    pub points: Vec<Point>,
    /// Absolute area.
    pub area: f64,
    pub bbox: Rect,
    pub self_intersections: usize,
    pub provenance: Provenance,
    pub reason: ContourReason,
}

impl FinalContour {
    fn new(points: Vec<Point>, provenance: Provenance, reason: ContourReason) -> Self {
        Self {
            area: signed_area(&points).abs(),
            bbox: bbox(&points),
            self_intersections: ring_self_intersection_count(&points, INTERSECT_EPS),
            points,
            provenance,
            reason,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Index of the envelope ring: largest |area|, then larger bbox area,
/// then lowest index.
pub fn envelope_index(rings: &[Vec<Point>]) -> Option<usize> {
    rings
        .iter()
        .enumerate()
        .map(|(i, ring)| (i, signed_area(ring).abs(), bbox(ring).area()))
        .min_by(|a, b| b.1.total_cmp(&a.1).then(b.2.total_cmp(&a.2)).then(a.0.cmp(&b.0)))
        .map(|(i, _, _)| i)
}

/// Pick the final outline. The first applicable rule wins:
/// a successful rect-soup planarization, then a successful envelope
/// resolution, then the envelope ring itself.
pub fn select_final_contour(rings: &[Vec<Point>], resolution: Option<&Resolution>) -> FinalContour {
    if let Some(res) = resolution.filter(|r| r.result.succeeded()) {
        if let Some(face) = res.result.selected_face {
            let reason = match res.kind {
                ResolutionKind::RectSoup => ContourReason::PlanarizedOuterFace,
                ResolutionKind::Explicit => ContourReason::Resolved,
                ResolutionKind::Auto => ContourReason::ResolvedOuterFace,
            };
            let provenance = Provenance::ResolvedFace(face);
            return FinalContour::new(res.result.ring.clone(), provenance, reason);
        }
    }

    match envelope_index(rings) {
        Some(i) => {
            let (provenance, reason) = (Provenance::TracedRing(i), ContourReason::MaxArea);
            let mut contour = FinalContour::new(rings[i].clone(), provenance, reason);
            if contour.self_intersections == 0 {
                contour.reason = ContourReason::MaxAreaSimple;
            }
            contour
        }
        None => FinalContour::new(Vec::new(), Provenance::None, ContourReason::Empty),
    }
}

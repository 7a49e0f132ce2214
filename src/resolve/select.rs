//! Named policies for choosing the outline face among enumerated faces.

use kurbo::{Point, Rect};
use thiserror::Error;

use super::graph::FaceLoop;
use crate::config::INTERSECT_EPS;
use crate::geom::{bbox, ring_self_intersection_count, to_ccw};

/// How to pick the outline among the faces of a planarized soup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionPolicy {
    /// Largest |area|, then larger bbox, then lowest face id.
    MaxAbsArea { min_area_ratio: f64 },
    /// Crossing-free faces first, then larger bbox, then |area|, then
    /// lowest face id. Used for rect-corner soups.
    RectCornersBBox { min_area_ratio: f64, min_bbox_ratio: f64 },
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self::MaxAbsArea { min_area_ratio: 0.01 }
    }
}

impl SelectionPolicy {
    /// The policy used for rect-corner soups.
    pub fn rect_corners() -> Self {
        Self::RectCornersBBox {
            min_area_ratio: 0.01,
            min_bbox_ratio: 0.5,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::MaxAbsArea { .. } => "max-abs-area",
            Self::RectCornersBBox { .. } => "rect-corners-bbox",
        }
    }
}

/// Why resolution produced no face.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionFailure {
    #[error("ringTooSmall")]
    RingTooSmall,
    #[error("noEdges")]
    NoEdges,
    #[error("noFaces")]
    NoFaces,
    #[error("areaTooSmall")]
    AreaTooSmall,
    #[error("bboxTooSmall")]
    BBoxTooSmall,
}

/// The chosen face, re-oriented counter-clockwise.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceSelection {
    pub face_id: usize,
    pub ring: Vec<Point>,
    /// Absolute area.
    pub area: f64,
    pub bbox: Rect,
}

struct Candidate<'a> {
    face: &'a FaceLoop,
    abs_area: f64,
    bbox: Rect,
    crossings: usize,
}

/// Reference sizes the ratio gates are measured against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reference {
    pub area: f64,
    pub bbox_area: f64,
}

pub fn select_face(
    faces: &[FaceLoop],
    policy: SelectionPolicy,
    reference: Reference,
) -> Result<FaceSelection, SelectionFailure> {
    if faces.is_empty() {
        return Err(SelectionFailure::NoFaces);
    }
    let candidates: Vec<Candidate> = faces
        .iter()
        .map(|face| {
            let bbox = bbox(&face.boundary);
            Candidate {
                face,
                abs_area: face.area.abs(),
                bbox,
                crossings: 0,
            }
        })
        .collect();

    let min_area = |ratio: f64| if reference.area > 0.0 { ratio * reference.area } else { 0.0 };

    match policy {
        SelectionPolicy::MaxAbsArea { min_area_ratio } => {
            let best = candidates
                .iter()
                .min_by(|a, b| {
                    b.abs_area
                        .total_cmp(&a.abs_area)
                        .then(b.bbox.area().total_cmp(&a.bbox.area()))
                        .then(a.face.face_id.cmp(&b.face.face_id))
                })
                .ok_or(SelectionFailure::NoFaces)?;
            if best.abs_area < min_area(min_area_ratio) {
                return Err(SelectionFailure::AreaTooSmall);
            }
            Ok(finish(best))
        }
        SelectionPolicy::RectCornersBBox { min_area_ratio, min_bbox_ratio } => {
            let floor = min_area(min_area_ratio);
            let mut eligible: Vec<Candidate> = candidates
                .into_iter()
                .filter(|c| c.abs_area >= floor && c.abs_area > 0.0)
                .map(|mut c| {
                    c.crossings = ring_self_intersection_count(&c.face.boundary, INTERSECT_EPS);
                    c
                })
                .collect();
            eligible.sort_by(|a, b| {
                (a.crossings > 0)
                    .cmp(&(b.crossings > 0))
                    .then(b.bbox.area().total_cmp(&a.bbox.area()))
                    .then(b.abs_area.total_cmp(&a.abs_area))
                    .then(a.face.face_id.cmp(&b.face.face_id))
            });
            let best = eligible.first().ok_or(SelectionFailure::AreaTooSmall)?;
            let min_bbox = min_bbox_ratio * reference.bbox_area;
            if reference.bbox_area > 0.0 && best.bbox.area() < min_bbox {
                return Err(SelectionFailure::BBoxTooSmall);
            }
            Ok(finish(best))
        }
    }
}

fn finish(c: &Candidate) -> FaceSelection {
    FaceSelection {
        face_id: c.face.face_id,
        ring: to_ccw(&c.face.boundary),
        area: c.abs_area,
        bbox: c.bbox,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::signed_area;

    fn face(id: usize, pts: &[(f64, f64)]) -> FaceLoop {
        let mut boundary: Vec<Point> = pts.iter().map(|&p| p.into()).collect();
        boundary.push(boundary[0]);
        let area = signed_area(&boundary);
        FaceLoop { face_id: id, boundary, area }
    }

    fn reference(area: f64) -> Reference {
        Reference { area, bbox_area: area }
    }

    #[test]
    fn largest_face_wins_and_is_ccw() {
        let faces = vec![
            face(0, &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]),
            face(1, &[(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0)]),
        ];
        let sel = select_face(&faces, SelectionPolicy::default(), reference(100.0)).unwrap();
        assert_eq!(sel.face_id, 1);
        assert_eq!(sel.area, 100.0);
        assert!(signed_area(&sel.ring) > 0.0);
    }

    #[test]
    fn equal_area_ties_go_to_bbox_then_id() {
        let faces = vec![
            face(0, &[(0.0, 0.0), (4.0, 0.0), (4.0, 1.0), (0.0, 1.0)]),
            face(1, &[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]),
            // Same area as face 0, bbox 8 > 4.
            face(2, &[(0.0, 0.0), (4.0, 0.0), (0.0, 2.0)]),
            face(3, &[(0.0, 0.0), (4.0, 0.0), (0.0, 2.0)]),
        ];
        let sel = select_face(&faces, SelectionPolicy::default(), reference(4.0)).unwrap();
        assert_eq!(sel.face_id, 2);
    }

    #[test]
    fn tiny_faces_fail_the_ratio_gate() {
        let faces = vec![face(0, &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)])];
        let err = select_face(&faces, SelectionPolicy::default(), reference(1000.0));
        assert_eq!(err, Err(SelectionFailure::AreaTooSmall));
        assert_eq!(
            select_face(&[], SelectionPolicy::default(), reference(1.0)),
            Err(SelectionFailure::NoFaces)
        );
    }

    #[test]
    fn rect_policy_prefers_crossing_free_and_wide() {
        let faces = vec![
            face(0, &[(0.0, 0.0), (20.0, 0.0), (20.0, 1.0), (0.0, 1.0)]),
            face(1, &[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]),
        ];
        let policy = SelectionPolicy::rect_corners();
        let sel = select_face(&faces, policy, Reference { area: 100.0, bbox_area: 150.0 }).unwrap();
        assert_eq!(sel.face_id, 1);
        let err = select_face(&faces, policy, Reference { area: 100.0, bbox_area: 1000.0 });
        assert_eq!(err, Err(SelectionFailure::BBoxTooSmall));
    }

    #[test]
    fn failure_reasons_render_as_codes() {
        assert_eq!(SelectionFailure::NoFaces.to_string(), "noFaces");
        assert_eq!(SelectionFailure::BBoxTooSmall.to_string(), "bboxTooSmall");
    }
}

//! Split segments at every mutual intersection so no two edges cross.

use std::collections::{BTreeMap, BTreeSet};

use kurbo::Point;

use crate::config::{INTERSECT_EPS, T_EPS};
use crate::geom::{distance_to_line, segment_intersection, snap_key, SnapKey};

/// Counters describing one planarization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanarizeStats {
    /// Input segments that survived the zero-length filter.
    pub segments: usize,
    /// Segment pairs that touch or cross away from a shared endpoint.
    pub intersections: usize,
    /// Fewest pieces any segment was split into.
    pub split_min: usize,
    pub split_max: usize,
    pub split_avg: f64,
    pub split_vertices: usize,
    pub split_edges: usize,
    pub dropped_zero_length: usize,
}

/// Crossing-free edge set. Vertex ids follow snap-key order; edges are
/// undirected `(u, v)` with `u < v`, sorted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanarGraph {
    pub vertices: Vec<Point>,
    pub edges: Vec<(usize, usize)>,
}

struct Piece {
    a: Point,
    b: Point,
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
}

impl Piece {
    fn new(a: Point, b: Point) -> Self {
        Self {
            a,
            b,
            min_x: a.x.min(b.x),
            max_x: a.x.max(b.x),
            min_y: a.y.min(b.y),
            max_y: a.y.max(b.y),
        }
    }

    fn at(&self, t: f64) -> Point {
        self.a.lerp(self.b, t)
    }

    /// Parameter of `p` along this segment if `p` lies on its interior.
    fn interior_param(&self, p: Point, eps: f64) -> Option<f64> {
        let d = self.b - self.a;
        let t = (p - self.a).dot(d) / d.hypot2();
        let interior = t > T_EPS && t < 1.0 - T_EPS;
        (interior && distance_to_line(p, self.a, self.b) <= eps).then_some(t)
    }
}

fn is_interior(t: f64) -> bool {
    t > T_EPS && t < 1.0 - T_EPS
}

/// Planarize a set of segments, snapping vertices at `eps`.
pub fn planarize(segments: &[(Point, Point)], eps: f64) -> (PlanarGraph, PlanarizeStats) {
    let mut stats = PlanarizeStats::default();
    let pieces: Vec<Piece> = segments
        .iter()
        .filter(|(a, b)| (*b - *a).hypot() > eps)
        .map(|&(a, b)| Piece::new(a, b))
        .collect();
    stats.dropped_zero_length = segments.len() - pieces.len();
    stats.segments = pieces.len();

    let mut splits: Vec<Vec<f64>> = vec![vec![0.0, 1.0]; pieces.len()];

    // Sweep along x so only overlapping x-ranges are tested.
    let mut order: Vec<usize> = (0..pieces.len()).collect();
    order.sort_by(|&i, &j| pieces[i].min_x.total_cmp(&pieces[j].min_x).then(i.cmp(&j)));
    for (oi, &i) in order.iter().enumerate() {
        let p = &pieces[i];
        for &j in &order[oi + 1..] {
            let q = &pieces[j];
            if q.min_x > p.max_x + eps {
                break;
            }
            if q.min_y > p.max_y + eps || q.max_y < p.min_y - eps {
                continue;
            }
            let mut hit = false;
            match segment_intersection(p.a, p.b, q.a, q.b, INTERSECT_EPS) {
                Some((t, u)) => {
                    if is_interior(t) {
                        splits[i].push(t);
                        hit = true;
                    }
                    if is_interior(u) {
                        splits[j].push(u);
                        hit = true;
                    }
                }
                None => {
                    // Parallel: split collinear overlaps at each other's ends.
                    for end in [q.a, q.b] {
                        if let Some(t) = p.interior_param(end, eps) {
                            splits[i].push(t);
                            hit = true;
                        }
                    }
                    for end in [p.a, p.b] {
                        if let Some(u) = q.interior_param(end, eps) {
                            splits[j].push(u);
                            hit = true;
                        }
                    }
                }
            }
            if hit {
                stats.intersections += 1;
            }
        }
    }

    let mut positions: BTreeMap<SnapKey, Point> = BTreeMap::new();
    let mut chains: Vec<Vec<SnapKey>> = Vec::with_capacity(pieces.len());
    for (piece, ts) in pieces.iter().zip(splits.iter_mut()) {
        ts.sort_by(f64::total_cmp);
        ts.dedup_by(|later, earlier| *later - *earlier <= T_EPS);
        let chain: Vec<SnapKey> = ts
            .iter()
            .map(|&t| {
                let p = piece.at(t);
                let key = snap_key(p, eps);
                positions.entry(key).or_insert(p);
                key
            })
            .collect();
        chains.push(chain);
    }

    let counts: Vec<usize> = splits.iter().map(|ts| ts.len() - 1).collect();
    if !counts.is_empty() {
        stats.split_min = counts.iter().copied().min().unwrap_or(0);
        stats.split_max = counts.iter().copied().max().unwrap_or(0);
        stats.split_avg = counts.iter().sum::<usize>() as f64 / counts.len() as f64;
    }

    let keys: Vec<SnapKey> = positions.keys().copied().collect();
    let vertices: Vec<Point> = positions.into_values().collect();
    let mut edges: BTreeSet<(usize, usize)> = BTreeSet::new();
    for chain in &chains {
        for w in chain.windows(2) {
            let (Ok(a), Ok(b)) = (keys.binary_search(&w[0]), keys.binary_search(&w[1])) else {
                continue;
            };
            if a != b {
                edges.insert((a.min(b), a.max(b)));
            }
        }
    }

    stats.split_vertices = vertices.len();
    stats.split_edges = edges.len();
    let graph = PlanarGraph {
        vertices,
        edges: edges.into_iter().collect(),
    };
    (graph, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SNAP_EPS;

    fn seg(a: (f64, f64), b: (f64, f64)) -> (Point, Point) {
        (a.into(), b.into())
    }

    #[test]
    fn crossing_pair_becomes_four_edges() {
        let segs = [seg((0.0, 0.0), (10.0, 10.0)), seg((0.0, 10.0), (10.0, 0.0))];
        let (graph, stats) = planarize(&segs, SNAP_EPS);
        assert_eq!(stats.intersections, 1);
        assert_eq!(graph.vertices.len(), 5);
        assert_eq!(graph.edges.len(), 4);
        assert_eq!((stats.split_min, stats.split_max), (2, 2));
        assert!(graph.vertices.iter().any(|p| (*p - Point::new(5.0, 5.0)).hypot() < 1e-9));
    }

    #[test]
    fn shared_endpoints_are_not_intersections() {
        let (graph, stats) = planarize(
            &[
                seg((0.0, 0.0), (10.0, 0.0)),
                seg((10.0, 0.0), (10.0, 10.0)),
                seg((10.0, 10.0), (0.0, 0.0)),
            ],
            SNAP_EPS,
        );
        assert_eq!(stats.intersections, 0);
        assert_eq!(graph.edges.len(), 3);
        assert_eq!(stats.split_avg, 1.0);
    }

    #[test]
    fn t_junction_splits_the_through_edge() {
        let segs = [seg((0.0, 0.0), (10.0, 0.0)), seg((5.0, 0.0), (5.0, 5.0))];
        let (graph, stats) = planarize(&segs, SNAP_EPS);
        assert_eq!(stats.intersections, 1);
        assert_eq!(graph.edges.len(), 3);
    }

    #[test]
    fn collinear_overlap_is_split() {
        let segs = [seg((0.0, 0.0), (10.0, 0.0)), seg((4.0, 0.0), (14.0, 0.0))];
        let (graph, _) = planarize(&segs, SNAP_EPS);
        // 0-4, 4-10, 10-14 with the shared middle piece merged.
        assert_eq!(graph.vertices.len(), 4);
        assert_eq!(graph.edges.len(), 3);
    }

    #[test]
    fn zero_length_segments_are_dropped() {
        let segs = [seg((1.0, 1.0), (1.0, 1.0)), seg((0.0, 0.0), (1.0, 0.0))];
        let (graph, stats) = planarize(&segs, SNAP_EPS);
        assert_eq!(stats.dropped_zero_length, 1);
        assert_eq!(graph.edges.len(), 1);
    }
}

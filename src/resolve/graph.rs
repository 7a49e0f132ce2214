//! Half-edge structure over a planar graph, and face enumeration.
//!
//! Outgoing half-edges at each vertex are sorted counter-clockwise by
//! angle (ties by target vertex, then id). `next(e)` is the outgoing
//! edge at `e.to` just before `twin(e)` in that order, which keeps the
//! face on the left: bounded faces come out counter-clockwise (positive
//! area), and the outer boundary of each component clockwise.

use kurbo::Point;

use super::planarize::PlanarGraph;
use crate::geom::signed_area;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HalfEdge {
    pub from: usize,
    pub to: usize,
    pub twin: usize,
    pub next: usize,
    pub angle: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HalfEdgeGraph {
    pub vertices: Vec<Point>,
    pub half_edges: Vec<HalfEdge>,
    /// Outgoing half-edge ids per vertex, in counter-clockwise order.
    pub outgoing: Vec<Vec<usize>>,
}

/// One closed face cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceLoop {
    /// Discovery order.
    pub face_id: usize,
    /// Closed ring (last point equals the first).
    pub boundary: Vec<Point>,
    /// Signed area; negative for outer boundaries.
    pub area: f64,
}

impl HalfEdgeGraph {
    pub fn new(planar: &PlanarGraph) -> Self {
        let vertices = planar.vertices.clone();
        let mut half_edges = Vec::with_capacity(planar.edges.len() * 2);
        for &(u, v) in &planar.edges {
            let id = half_edges.len();
            for (from, to, twin) in [(u, v, id + 1), (v, u, id)] {
                let angle = (vertices[to] - vertices[from]).atan2();
                half_edges.push(HalfEdge { from, to, twin, next: usize::MAX, angle });
            }
        }

        let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); vertices.len()];
        for (id, e) in half_edges.iter().enumerate() {
            outgoing[e.from].push(id);
        }
        let mut position = vec![0; half_edges.len()];
        for list in &mut outgoing {
            list.sort_by(|&a, &b| {
                let (ea, eb) = (&half_edges[a], &half_edges[b]);
                ea.angle.total_cmp(&eb.angle).then(ea.to.cmp(&eb.to)).then(a.cmp(&b))
            });
            for (i, &id) in list.iter().enumerate() {
                position[id] = i;
            }
        }

        for id in 0..half_edges.len() {
            let twin = half_edges[id].twin;
            let around = &outgoing[half_edges[id].to];
            half_edges[id].next = around[(position[twin] + around.len() - 1) % around.len()];
        }

        Self { vertices, half_edges, outgoing }
    }

    /// Half-edge whose `next` is `id`.
    pub fn prev(&self, id: usize) -> usize {
        // next(e) sits one slot before twin(e) around e.to, so step
        // forward one slot at the start vertex of `id` and take the twin.
        let e = &self.half_edges[id];
        let around = &self.outgoing[e.from];
        let slot = around.iter().position(|&x| x == id).unwrap_or(0);
        let after = around[(slot + 1) % around.len()];
        self.half_edges[after].twin
    }

    /// Walk every half-edge cycle.
    ///
    /// Cycles with at least three vertices become faces, numbered in
    /// discovery order; the rest are counted and returned as the second
    /// value.
    pub fn faces(&self) -> (Vec<FaceLoop>, usize) {
        let mut visited = vec![false; self.half_edges.len()];
        let mut faces = Vec::new();
        let mut small = 0;
        for start in 0..self.half_edges.len() {
            if visited[start] {
                continue;
            }
            let mut cycle = Vec::new();
            let mut id = start;
            // Every half-edge belongs to exactly one cycle.
            for _ in 0..self.half_edges.len() {
                if visited[id] {
                    break;
                }
                visited[id] = true;
                cycle.push(self.half_edges[id].from);
                id = self.half_edges[id].next;
            }
            if cycle.len() < 3 {
                small += 1;
                continue;
            }
            let mut boundary: Vec<Point> = cycle.iter().map(|&v| self.vertices[v]).collect();
            boundary.push(boundary[0]);
            let area = signed_area(&boundary);
            faces.push(FaceLoop {
                face_id: faces.len(),
                boundary,
                area,
            });
        }
        (faces, small)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SNAP_EPS;
    use crate::resolve::planarize::planarize;
    use approx::assert_abs_diff_eq;

    fn square_graph() -> HalfEdgeGraph {
        let pts = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)];
        let segs: Vec<(Point, Point)> =
            pts.windows(2).map(|w| (w[0].into(), w[1].into())).collect();
        HalfEdgeGraph::new(&planarize(&segs, SNAP_EPS).0)
    }

    #[test]
    fn square_has_inner_and_outer_face() {
        let (faces, small) = square_graph().faces();
        assert_eq!(small, 0);
        assert_eq!(faces.len(), 2);
        let mut areas: Vec<f64> = faces.iter().map(|f| f.area).collect();
        areas.sort_by(f64::total_cmp);
        assert_abs_diff_eq!(areas[0], -100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(areas[1], 100.0, epsilon = 1e-9);
    }

    #[test]
    fn next_and_prev_are_inverse() {
        let g = square_graph();
        for id in 0..g.half_edges.len() {
            assert_eq!(g.prev(g.half_edges[id].next), id);
            assert_eq!(g.half_edges[g.half_edges[id].twin].twin, id);
        }
    }

    #[test]
    fn crossed_bowtie_yields_two_lobes() {
        let pts = [(0.0, 0.0), (10.0, 10.0), (10.0, 0.0), (0.0, 10.0), (0.0, 0.0)];
        let segs: Vec<(Point, Point)> =
            pts.windows(2).map(|w| (w[0].into(), w[1].into())).collect();
        let (faces, _) = HalfEdgeGraph::new(&planarize(&segs, SNAP_EPS).0).faces();
        let bounded: Vec<&FaceLoop> = faces.iter().filter(|f| f.area > 0.0).collect();
        assert_eq!(bounded.len(), 2);
        for f in bounded {
            assert_abs_diff_eq!(f.area, 25.0, epsilon = 1e-9);
        }
        let outer = faces.iter().map(|f| f.area).fold(f64::MAX, f64::min);
        assert_abs_diff_eq!(outer, -50.0, epsilon = 1e-9);
    }

    #[test]
    fn bounded_faces_are_counter_clockwise() {
        let (faces, _) = square_graph().faces();
        let inner = faces.iter().find(|f| f.area > 0.0).expect("bounded face");
        // (0,0) -> (10,0) -> (10,10) runs counter-clockwise.
        let start = inner.boundary.iter().position(|p| *p == Point::new(0.0, 0.0)).unwrap();
        assert_eq!(inner.boundary[start + 1], Point::new(10.0, 0.0));
    }

    #[test]
    fn lone_edge_is_a_small_face() {
        let segs = [(Point::new(0.0, 0.0), Point::new(1.0, 0.0))];
        let (faces, small) = HalfEdgeGraph::new(&planarize(&segs, SNAP_EPS).0).faces();
        assert!(faces.is_empty());
        assert_eq!(small, 1);
    }
}

//! Closed-loop reconstruction from an unordered edge soup.
//!
//! Endpoints are snapped to integer keys, duplicate edges merged, and
//! loops walked by always taking the straightest continuation. Vertex and
//! edge ids follow snap-key order, so the result does not depend on the
//! order of the input edges.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use kurbo::{Point, Vec2};

use crate::geom::{snap_key, SnapKey};
use crate::soup::{EdgeSource, Segment2};

/// An undirected edge of the soup graph, `u < v`.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphEdge {
    pub u: usize,
    pub v: usize,
    pub source: EdgeSource,
    /// How many soup edges collapsed onto this one.
    pub multiplicity: usize,
}

impl GraphEdge {
    fn other(&self, from: usize) -> usize {
        if from == self.u {
            self.v
        } else {
            self.u
        }
    }
}

/// Snapped, deduplicated view of a soup.
#[derive(Debug, Clone)]
pub struct SoupGraph {
    /// Position of each vertex: the first point seen for its key.
    pub vertices: Vec<Point>,
    pub keys: Vec<SnapKey>,
    pub edges: Vec<GraphEdge>,
    /// Incident edge ids per vertex, ordered by neighbor id.
    adjacency: Vec<Vec<usize>>,
    /// Soup edges whose endpoints snapped together.
    pub collapsed: usize,
    /// Soup edges merged into an existing edge.
    pub merged: usize,
}

impl SoupGraph {
    pub fn new(segments: &[Segment2], eps: f64) -> Self {
        let mut positions: BTreeMap<SnapKey, Point> = BTreeMap::new();
        for s in segments {
            for p in [s.a, s.b] {
                positions.entry(snap_key(p, eps)).or_insert(p);
            }
        }
        let keys: Vec<SnapKey> = positions.keys().copied().collect();
        let vertices: Vec<Point> = positions.values().copied().collect();
        let id_of = |p: Point| keys.binary_search(&snap_key(p, eps)).ok();

        let mut unique: BTreeMap<(usize, usize), GraphEdge> = BTreeMap::new();
        let mut collapsed = 0;
        let mut merged = 0;
        for s in segments {
            let (Some(a), Some(b)) = (id_of(s.a), id_of(s.b)) else {
                continue;
            };
            if a == b {
                collapsed += 1;
                continue;
            }
            let (u, v) = (a.min(b), a.max(b));
            match unique.get_mut(&(u, v)) {
                Some(edge) => {
                    merged += 1;
                    edge.multiplicity += 1;
                    if !edge.source.is_known() && s.source.is_known() {
                        edge.source = s.source.clone();
                    }
                }
                None => {
                    unique.insert(
                        (u, v),
                        GraphEdge { u, v, source: s.source.clone(), multiplicity: 1 },
                    );
                }
            }
        }

        let edges: Vec<GraphEdge> = unique.into_values().collect();
        let mut adjacency = vec![Vec::new(); vertices.len()];
        for (id, e) in edges.iter().enumerate() {
            adjacency[e.u].push(id);
            adjacency[e.v].push(id);
        }
        for (vertex, list) in adjacency.iter_mut().enumerate() {
            list.sort_by_key(|&id| edges[id].other(vertex));
        }

        Self {
            vertices,
            keys,
            edges,
            adjacency,
            collapsed,
            merged,
        }
    }

    pub fn degree(&self, vertex: usize) -> usize {
        self.adjacency[vertex].len()
    }

    /// Unused edge at `cur` turning least from the direction `prev -> cur`.
    fn next_edge(&self, prev: usize, cur: usize, used: &[bool]) -> Option<usize> {
        let incoming = self.vertices[cur] - self.vertices[prev];
        let turn = |id: usize| -> f64 {
            let out: Vec2 = self.vertices[self.edges[id].other(cur)] - self.vertices[cur];
            incoming.cross(out).atan2(incoming.dot(out))
        };
        self.adjacency[cur]
            .iter()
            .copied()
            .filter(|&id| !used[id])
            .min_by(|&a, &b| {
                let (ta, tb) = (turn(a), turn(b));
                match ta.abs().total_cmp(&tb.abs()) {
                    Ordering::Equal => ta.total_cmp(&tb),
                    other => other,
                }
            })
    }
}

/// Mark every edge outside the 2-core of the graph as used.
///
/// Returns the number of edges removed.
fn prune_dangling(graph: &SoupGraph, used: &mut [bool]) -> usize {
    let mut degree: Vec<usize> = (0..graph.vertices.len()).map(|v| graph.degree(v)).collect();
    let mut pending: Vec<usize> = (0..degree.len()).rev().filter(|&v| degree[v] == 1).collect();
    let mut removed = 0;
    while let Some(v) = pending.pop() {
        let Some(id) = graph.adjacency[v].iter().copied().find(|&id| !used[id]) else {
            continue;
        };
        used[id] = true;
        removed += 1;
        degree[v] -= 1;
        let other = graph.edges[id].other(v);
        degree[other] -= 1;
        if degree[other] == 1 {
            pending.push(other);
        }
    }
    removed
}

/// Closed rings recovered from a soup.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceResult {
    /// Closed rings (last point equals the first), in discovery order.
    pub rings: Vec<Vec<Point>>,
    /// Edges that belonged to no closed loop.
    pub dropped_edges: usize,
    pub vertex_count: usize,
    pub edge_count: usize,
    pub merged_edges: usize,
}

/// Trace every closed loop of the soup.
///
/// Dangling chains are pruned first; whatever still cannot close is
/// dropped and counted, never an error.
pub fn trace_loops(segments: &[Segment2], eps: f64) -> TraceResult {
    let graph = SoupGraph::new(segments, eps);
    let mut used = vec![false; graph.edges.len()];
    let mut dropped = prune_dangling(&graph, &mut used);
    let mut rings = Vec::new();

    for start in 0..graph.edges.len() {
        if used[start] {
            continue;
        }
        used[start] = true;
        let origin = graph.edges[start].u;
        let mut path = vec![origin, graph.edges[start].v];
        let closed_at = loop {
            let (prev, cur) = (path[path.len() - 2], path[path.len() - 1]);
            if cur == origin {
                break Some(0);
            }
            match graph.next_edge(prev, cur, &used) {
                Some(id) => {
                    used[id] = true;
                    path.push(graph.edges[id].other(cur));
                }
                // Stuck: keep the last loop inside the walk, if any.
                None => break path[..path.len() - 1].iter().rposition(|&v| v == cur),
            }
        };

        let first = closed_at.unwrap_or(path.len() - 1);
        dropped += first;
        let ring: Vec<Point> = path[first..].iter().map(|&v| graph.vertices[v]).collect();
        if ring.len() >= 4 {
            rings.push(ring);
        } else {
            dropped += ring.len().saturating_sub(1);
        }
    }

    if dropped > 0 {
        log::warn!("trace: dropped {dropped} edges outside closed loops");
    }
    log::debug!(
        "trace: {} rings from {} vertices, {} edges ({} merged)",
        rings.len(),
        graph.vertices.len(),
        graph.edges.len(),
        graph.merged
    );
    TraceResult {
        rings,
        dropped_edges: dropped,
        vertex_count: graph.vertices.len(),
        edge_count: graph.edges.len(),
        merged_edges: graph.merged,
    }
}

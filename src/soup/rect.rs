//! Rect-corner soup: four corner lanes plus a perimeter quad per sample.
//! The union of the quads and lanes overlaps itself everywhere, so this
//! soup is always resolved by planarization.

use kurbo::Point;

use super::{push_chain, EdgeSource, SoupBuild};
use crate::cap::{rect_cap, CapEnd};
use crate::config::{PenShape, StrokeConfig};
use crate::rail::RailFrame;

pub fn build_rect_soup(frames: &[RailFrame], config: &StrokeConfig) -> SoupBuild {
    let mut soup = SoupBuild::new(PenShape::RectCorners);
    let corners: Vec<[Point; 4]> = frames.iter().map(|f| f.pen_corners().as_array()).collect();
    let n = corners.len();
    let (Some(first), Some(last)) = (frames.first(), frames.last()) else {
        soup.warnings.push("no frames to build pen quads from".to_string());
        return soup;
    };

    let (start, end) = if n >= 2 {
        (Some(rect_cap(CapEnd::Start, first, config)), Some(rect_cap(CapEnd::End, last, config)))
    } else {
        soup.warnings.push("a single frame has no lanes, caps skipped".to_string());
        (None, None)
    };

    for k in 0..4 {
        let mut lane: Vec<Point> = corners.iter().map(|c| c[k]).collect();
        if let Some(p) = start.as_ref().and_then(|cap| cap.lane_ends[k]) {
            lane[0] = p;
        }
        if let Some(p) = end.as_ref().and_then(|cap| cap.lane_ends[k]) {
            lane[n - 1] = p;
        }
        push_chain(&mut soup.segments, &lane, EdgeSource::PenStrip);
    }

    for (i, quad) in corners.iter().enumerate() {
        let replaced = (i == 0 && start.as_ref().is_some_and(|c| c.replaces_quad))
            || (i == n - 1 && end.as_ref().is_some_and(|c| c.replaces_quad));
        if replaced {
            continue;
        }
        let outline = [quad[0], quad[1], quad[2], quad[3], quad[0]];
        push_chain(&mut soup.segments, &outline, EdgeSource::PenCap);
    }

    for cap in [start, end].into_iter().flatten() {
        soup.segments.extend(cap.segments);
        soup.absorb_cap(cap.report);
    }
    soup
}

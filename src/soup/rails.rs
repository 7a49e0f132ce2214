//! Rails-only soup: left rail, right rail, and a cap at each end.

use kurbo::Point;

use super::{push_chain, EdgeSource, SoupBuild};
use crate::cap::{rails_cap, CapEnd, RailTrim};
use crate::config::{PenShape, StrokeConfig};
use crate::rail::RailFrame;

/// Swapping must win by more than this to count.
const SWAP_EPS: f64 = 1.0e-6;

/// Pen width used to sanity-check butt joins at one end.
fn width_scale(frame: &RailFrame) -> f64 {
    let widest = frame.width_left.max(frame.width_right);
    (frame.width_left + frame.width_right).max(2.0 * widest)
}

/// Rail points between the start and end trims.
fn trimmed(rail: &[Point], start: Option<RailTrim>, end: Option<RailTrim>) -> Vec<Point> {
    let n = rail.len();
    let start = start.unwrap_or(RailTrim { point: rail[0], keep: 1 });
    let end = end.unwrap_or(RailTrim { point: rail[n - 1], keep: n.saturating_sub(2) });
    let mut points = vec![start.point];
    if start.keep <= end.keep && end.keep < n {
        points.extend_from_slice(&rail[start.keep..=end.keep]);
    }
    points.push(end.point);
    points
}

pub fn build_rails_soup(frames: &[RailFrame], config: &StrokeConfig) -> SoupBuild {
    let mut soup = SoupBuild::new(PenShape::RailsOnly);
    let (Some(first), Some(last)) = (frames.first(), frames.last()) else {
        soup.warnings.push("no frames to build rails from".to_string());
        return soup;
    };
    if frames.len() < 2 {
        soup.warnings.push("a single frame cannot form rails".to_string());
        return soup;
    }

    let left: Vec<Point> = frames.iter().map(|f| f.left).collect();
    let mut right: Vec<Point> = frames.iter().map(|f| f.right).collect();

    let direct: f64 = left.iter().zip(&right).map(|(l, r)| (*r - *l).hypot()).sum();
    let swapped: f64 = left.iter().zip(right.iter().rev()).map(|(l, r)| (*r - *l).hypot()).sum();
    if swapped + SWAP_EPS < direct {
        right.reverse();
        soup.reversed_right = true;
        log::debug!("rails: right rail reversed ({swapped:.3} < {direct:.3})");
    }

    let start = rails_cap(CapEnd::Start, &left, &right, width_scale(first), config);
    let end = rails_cap(CapEnd::End, &left, &right, width_scale(last), config);

    let left_chain = trimmed(&left, start.left_trim, end.left_trim);
    push_chain(&mut soup.segments, &left_chain, EdgeSource::RailLeft);
    let mut right_chain = trimmed(&right, start.right_trim, end.right_trim);
    right_chain.reverse();
    push_chain(&mut soup.segments, &right_chain, EdgeSource::RailRight);

    for cap in [start, end] {
        soup.segments.extend(cap.segments);
        soup.absorb_cap(cap.report);
    }
    soup
}

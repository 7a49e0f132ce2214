//! Boundary soup: every boundary edge of a stroke, unordered, tagged with
//! where it came from.

mod rails;
mod rect;

use std::fmt;

use kurbo::Point;

use crate::cap::CapReport;
use crate::config::{PenShape, StrokeConfig};
use crate::rail::RailFrame;
use crate::style::AngleMode;

pub use rails::build_rails_soup;
pub use rect::build_rect_soup;

/// Zero-length edges below this are skipped.
const MIN_EDGE: f64 = 1.0e-12;

/// Part a cap edge plays inside its cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapRole {
    /// Edge (or arc piece) joining the left side to the right side.
    JoinLR,
    /// Bypass between fillet tangent points.
    MidSegment,
}

/// Provenance of a soup edge. Diagnostic only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EdgeSource {
    RailLeft,
    RailRight,
    /// Rect-corner lane between consecutive samples.
    PenStrip,
    /// Rect-corner perimeter quad edge.
    PenCap,
    CapStart { role: CapRole, detail: String },
    CapEnd { role: CapRole, detail: String },
    Unknown(String),
}

impl EdgeSource {
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }

    pub fn is_cap(&self) -> bool {
        matches!(self, Self::CapStart { .. } | Self::CapEnd { .. })
    }
}

impl fmt::Display for EdgeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RailLeft => write!(f, "rail-left"),
            Self::RailRight => write!(f, "rail-right"),
            Self::PenStrip => write!(f, "pen-strip"),
            Self::PenCap => write!(f, "pen-cap"),
            Self::CapStart { role, detail } => write!(f, "cap-start:{role:?}:{detail}"),
            Self::CapEnd { role, detail } => write!(f, "cap-end:{role:?}:{detail}"),
            Self::Unknown(what) => write!(f, "unknown:{what}"),
        }
    }
}

/// One boundary edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment2 {
    pub a: Point,
    pub b: Point,
    pub source: EdgeSource,
}

impl Segment2 {
    pub fn new(a: Point, b: Point, source: EdgeSource) -> Self {
        Self { a, b, source }
    }

    pub fn length(&self) -> f64 {
        (self.b - self.a).hypot()
    }
}

/// Append the edges of an open polyline, skipping zero-length ones.
pub(crate) fn push_chain(out: &mut Vec<Segment2>, points: &[Point], source: EdgeSource) {
    for w in points.windows(2) {
        if (w[1] - w[0]).hypot() > MIN_EDGE {
            out.push(Segment2::new(w[0], w[1], source.clone()));
        }
    }
}

/// The soup of one stroke, with counts per edge family.
#[derive(Debug, Clone, PartialEq)]
pub struct SoupBuild {
    pub segments: Vec<Segment2>,
    /// Pen shape actually used (never `Auto`).
    pub pen_shape: PenShape,
    pub rail_segments: usize,
    pub lane_segments: usize,
    pub perimeter_segments: usize,
    pub cap_segments: usize,
    /// The right rail was reversed to line up with the left one.
    pub reversed_right: bool,
    pub caps: Vec<CapReport>,
    pub warnings: Vec<String>,
}

impl SoupBuild {
    fn new(pen_shape: PenShape) -> Self {
        Self {
            segments: Vec::new(),
            pen_shape,
            rail_segments: 0,
            lane_segments: 0,
            perimeter_segments: 0,
            cap_segments: 0,
            reversed_right: false,
            caps: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Recount the edge families from the tags.
    fn tally(&mut self) {
        let count = |f: fn(&EdgeSource) -> bool| {
            self.segments.iter().filter(|s| f(&s.source)).count()
        };
        self.rail_segments = count(|s| matches!(s, EdgeSource::RailLeft | EdgeSource::RailRight));
        self.lane_segments = count(|s| matches!(s, EdgeSource::PenStrip));
        self.perimeter_segments = count(|s| matches!(s, EdgeSource::PenCap));
        self.cap_segments = count(EdgeSource::is_cap);
    }

    fn absorb_cap(&mut self, report: CapReport) {
        for reason in &report.fallbacks {
            log::warn!("cap fallback: {reason}");
            self.warnings.push(reason.clone());
        }
        self.caps.push(report);
    }
}

/// Resolve `PenShape::Auto`: rect corners for absolute angles, rails otherwise.
pub fn effective_pen_shape(pen: PenShape, mode: AngleMode) -> PenShape {
    match (pen, mode) {
        (PenShape::Auto, AngleMode::Absolute) => PenShape::RectCorners,
        (PenShape::Auto, AngleMode::Relative) => PenShape::RailsOnly,
        (shape, _) => shape,
    }
}

/// Build the boundary soup for a stroke's frames.
pub fn build_soup(frames: &[RailFrame], mode: AngleMode, config: &StrokeConfig) -> SoupBuild {
    let mut soup = match effective_pen_shape(config.pen_shape, mode) {
        PenShape::RectCorners => build_rect_soup(frames, config),
        _ => build_rails_soup(frames, config),
    };
    soup.tally();
    log::debug!(
        "soup: {} edges ({} rail, {} lane, {} perimeter, {} cap)",
        soup.segments.len(),
        soup.rail_segments,
        soup.lane_segments,
        soup.perimeter_segments,
        soup.cap_segments
    );
    soup
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_skips_zero_length_edges() {
        let mut out = Vec::new();
        let p = Point::new(1.0, 1.0);
        push_chain(&mut out, &[Point::ZERO, p, p, Point::new(2.0, 1.0)], EdgeSource::PenStrip);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|s| s.length() > 0.0));
    }

    #[test]
    fn auto_pen_follows_angle_mode() {
        assert_eq!(effective_pen_shape(PenShape::Auto, AngleMode::Absolute), PenShape::RectCorners);
        assert_eq!(effective_pen_shape(PenShape::Auto, AngleMode::Relative), PenShape::RailsOnly);
        assert_eq!(
            effective_pen_shape(PenShape::RailsOnly, AngleMode::Absolute),
            PenShape::RailsOnly
        );
    }

    #[test]
    fn provenance_display_and_known() {
        let cap = EdgeSource::CapEnd { role: CapRole::JoinLR, detail: "butt".into() };
        assert_eq!(cap.to_string(), "cap-end:JoinLR:butt");
        assert!(cap.is_cap() && cap.is_known());
        assert!(!EdgeSource::Unknown("merged".into()).is_known());
    }
}

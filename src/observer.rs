//! Hooks into the stroke pipeline for debugging and visualization.

use crate::contour::{FinalContour, Resolution};
use crate::rail::RailFrame;
use crate::sampling::SamplingResult;
use crate::soup::SoupBuild;
use crate::trace::TraceResult;

/// Receives every intermediate product of [`crate::stroke_outline`], in
/// stage order. All methods default to doing nothing; an observer never
/// changes the result.
pub trait StrokeObserver {
    fn on_sampling(&mut self, _sampling: &SamplingResult) {}

    fn on_frames(&mut self, _frames: &[RailFrame]) {}

    fn on_soup(&mut self, _soup: &SoupBuild) {}

    fn on_rings(&mut self, _trace: &TraceResult) {}

    /// Only called when the resolver actually ran.
    fn on_resolve(&mut self, _resolution: &Resolution) {}

    fn on_contour(&mut self, _contour: &FinalContour) {}
}

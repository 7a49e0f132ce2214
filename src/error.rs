use thiserror::Error;

/// Errors that can occur while turning a stroke into an outline.
///
/// Only [`StrokeError::EmptyPath`] aborts [`crate::stroke_outline`]; the
/// other variants are produced by individual stages and downgraded to
/// warnings by the pipeline.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum StrokeError {
    #[error("skeleton path has no segments")]
    EmptyPath,

    #[error("degenerate geometry: {0}")]
    GeometryDegenerate(String),

    #[error("cap construction failed: {0}")]
    CapConstruction(#[from] FilletError),

    #[error("self-overlap resolution failed: {0}")]
    Resolution(String),
}

/// Errors from rounding a single polygon corner.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[non_exhaustive]
pub enum FilletError {
    #[error("corner angle is degenerate (edges are collinear or folded back)")]
    DegenerateAngle,

    #[error("fillet radius must be positive")]
    NonPositiveRadius,

    #[error("radius too large: trim {trim:.4} exceeds edge length {edge:.4}")]
    RadiusTooLarge { trim: f64, edge: f64 },

    #[error("no suitable corner found in cap polyline")]
    CornerNotFound,
}

use clap::{Parser, ValueEnum};
use inkstroke::kurbo::{CubicBez, Point};
use inkstroke::{
    AngleMode, CapStyle, FilletSide, PenShape, SamplingConfig, SkeletonPath, StrokeConfig,
    SweepPlan,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Fixture {
    /// Straight vertical line, 100 units long
    Line,
    /// Two loops of opposite winding crossing at the origin
    FigureEight,
    /// Two-segment S wave
    Wavy,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Cap {
    Butt,
    Round,
    FilletBoth,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Pen {
    Auto,
    Rails,
    Rect,
}

#[derive(Parser)]
#[command(
    name = "inkstroke",
    about = "Sweep a pen along a skeleton path and print the outline stats"
)]
struct Cli {
    /// Built-in skeleton to stroke
    #[arg(long, value_enum, default_value = "line")]
    fixture: Fixture,

    /// Pen width across the stroke
    #[arg(long, default_value = "20")]
    width: f64,

    /// Pen height along the stroke (rect pens only)
    #[arg(long, default_value = "10")]
    height: f64,

    /// Fixed number of samples (adaptive sampling if omitted)
    #[arg(long)]
    samples: Option<usize>,

    /// Cap style applied to both ends
    #[arg(long, value_enum, default_value = "butt")]
    cap: Cap,

    /// Fillet radius for fillet caps
    #[arg(long, default_value = "3")]
    fillet_radius: f64,

    /// Pen cross-section
    #[arg(long, value_enum, default_value = "auto")]
    pen: Pen,

    /// Fix the pen angle in world space instead of following the path
    #[arg(long)]
    absolute: bool,
}

fn skeleton(fixture: Fixture) -> SkeletonPath {
    match fixture {
        Fixture::Line => SkeletonPath::line(Point::new(0.0, 0.0), Point::new(0.0, 100.0)),
        Fixture::FigureEight => SkeletonPath::new(vec![
            CubicBez::new((100.0, 0.0), (100.0, 55.0), (40.0, 40.0), (0.0, 0.0)),
            CubicBez::new((0.0, 0.0), (-40.0, -40.0), (-100.0, -55.0), (-100.0, 0.0)),
            CubicBez::new((-100.0, 0.0), (-100.0, 55.0), (-40.0, 40.0), (0.0, 0.0)),
            CubicBez::new((0.0, 0.0), (40.0, -40.0), (100.0, -50.0), (100.0, -12.0)),
        ]),
        Fixture::Wavy => SkeletonPath::new(vec![
            CubicBez::new((0.0, 0.0), (40.0, 90.0), (80.0, -90.0), (120.0, 0.0)),
            CubicBez::new((120.0, 0.0), (160.0, 90.0), (200.0, -40.0), (240.0, 10.0)),
        ]),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    let cli = Cli::parse();

    let cap = match cli.cap {
        Cap::Butt => CapStyle::Butt,
        Cap::Round => CapStyle::Round,
        Cap::FilletBoth => CapStyle::Fillet {
            radius: cli.fillet_radius,
            side: FilletSide::Both,
        },
    };
    let config = StrokeConfig {
        sampling: cli.samples.map(SamplingConfig::fixed).unwrap_or_default(),
        pen_shape: match cli.pen {
            Pen::Auto => PenShape::Auto,
            Pen::Rails => PenShape::RailsOnly,
            Pen::Rect => PenShape::RectCorners,
        },
        start_cap: cap,
        end_cap: cap,
        ..StrokeConfig::default()
    };
    let mode = if cli.absolute { AngleMode::Absolute } else { AngleMode::Relative };
    let plan = SweepPlan::new(cli.width, cli.height).with_angle_mode(mode);
    let path = skeleton(cli.fixture);

    // Header
    let name = cli
        .fixture
        .to_possible_value()
        .map(|v| v.get_name().to_string())
        .unwrap_or_default();
    eprintln!();
    eprintln!("  inkstroke \u{00b7} {name}");
    eprintln!();

    let out = inkstroke::stroke_outline(&path, &plan, &config, None)?;

    let stats = &out.sampling.stats;
    eprintln!(
        "  Sample      {} ts ({} subdivided, {} forced, depth {})",
        out.sampling.ts.len(),
        stats.subdivided,
        stats.forced_stops,
        stats.max_depth_reached
    );
    let soup = &out.soup;
    eprintln!(
        "  Soup        {} edges ({} rail, {} lane, {} perimeter, {} cap)",
        soup.segments.len(),
        soup.rail_segments,
        soup.lane_segments,
        soup.perimeter_segments,
        soup.cap_segments
    );
    eprintln!("  Trace       {} rings, {} dropped edges", out.rings.len(), out.dropped_edges);
    if let Some(res) = &out.resolution {
        let r = &res.result;
        match r.selected_face {
            Some(face) => eprintln!(
                "  Resolve     face {} of {} ({}), {} intersections",
                face,
                r.faces.len(),
                r.policy.name(),
                r.stats.intersections
            ),
            None => eprintln!(
                "  Resolve     failed ({})",
                r.failure.map(|f| f.to_string()).unwrap_or_default()
            ),
        }
    }
    let c = &out.contour;
    eprintln!(
        "  Contour     {} points, area {:.2}, {} self-intersections",
        c.points.len(),
        c.area,
        c.self_intersections
    );
    eprintln!(
        "  Bounds      ({:.2}, {:.2}) .. ({:.2}, {:.2})",
        c.bbox.x0, c.bbox.y0, c.bbox.x1, c.bbox.y1
    );
    eprintln!("  Reason      {}", c.reason);
    for warning in &out.warnings {
        eprintln!("  Warning     {warning}");
    }

    eprintln!();
    Ok(())
}

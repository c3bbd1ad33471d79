//! Server-side SVG overlay compositing.
//!
//! The browser only ever receives the rendered overlay as a data URI, so raw
//! polygon vertices never leave the server. Every vertex is nudged by a
//! deterministic hash-based jitter: identical inputs give byte-identical
//! output, while the outline gets a slightly hand-drawn texture.

use std::collections::HashSet;
use std::fmt::Write;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use indexmap::IndexSet;

use crate::dataset::{AnnotationBoundary, AnnotationDataset, AnnotationPoint};
use crate::region::get_boundary_by_id;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Width of the canonical canvas in pixels.
pub const CANVAS_WIDTH: u32 = 1049;

/// Height of the canonical canvas in pixels.
pub const CANVAS_HEIGHT: u32 = 695;

/// Maximum absolute jitter applied to each axis, in pixels.
pub const JITTER_AMPLITUDE: f64 = 0.3;

/// Prefix of every overlay returned to clients.
pub const SVG_DATA_URI_PREFIX: &str = "data:image/svg+xml;base64,";

const OUTLINE_STROKE: &str = "rgba(255,255,255,0.55)";
const OUTLINE_DASH: &str = "4 3";

// ---------------------------------------------------------------------------
// Segment kinds
// ---------------------------------------------------------------------------

/// How a highlighted boundary is styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// Queued for a pending action. Translucent red.
    Queue,
    /// Under the pointer. Translucent blue.
    Hover,
}

impl SegmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queue => "queue",
            Self::Hover => "hover",
        }
    }

    fn fill(&self) -> &'static str {
        match self {
            Self::Queue => "rgba(239,68,68,0.35)",
            Self::Hover => "rgba(59,130,246,0.35)",
        }
    }

    fn stroke(&self) -> &'static str {
        match self {
            Self::Queue => "rgba(220,38,38,0.95)",
            Self::Hover => "rgba(37,99,235,0.95)",
        }
    }
}

/// A boundary selected for highlighting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment<'a> {
    pub kind: SegmentKind,
    pub boundary: &'a AnnotationBoundary,
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Everything the renderer needs for one overlay.
#[derive(Debug, Clone, Copy)]
pub struct OverlayRequest<'a> {
    pub dataset: &'a AnnotationDataset,
    /// Queued region ids. The hovered id is removed from this set.
    pub highlight_ids: &'a [String],
    pub hovered_id: Option<&'a str>,
    pub disabled_ids: &'a HashSet<String>,
    /// Draw a dashed outline of every boundary underneath the highlights.
    pub include_outline: bool,
}

// ---------------------------------------------------------------------------
// Jitter
// ---------------------------------------------------------------------------

/// Deterministic pseudo-random offset within `±JITTER_AMPLITUDE`.
///
/// `fract(sin(a * 12.9898 + b * 78.233) * 43758.5453)` mapped onto the
/// jitter range. Computed in f64 throughout.
pub fn jitter(a: f64, b: f64) -> f64 {
    let seed = (a * 12.9898 + b * 78.233).sin() * 43758.5453;
    let fract = seed - seed.floor();
    (fract - 0.5) * 2.0 * JITTER_AMPLITUDE
}

/// Jitter a vertex; the y offset swaps the hash arguments.
pub fn jitter_point(p: AnnotationPoint) -> (f64, f64) {
    (p.x + jitter(p.x, p.y), p.y + jitter(p.y, p.x))
}

// ---------------------------------------------------------------------------
// Path construction
// ---------------------------------------------------------------------------

/// SVG path data for a boundary, or `None` if it cannot enclose an area.
pub fn boundary_path(boundary: &AnnotationBoundary) -> Option<String> {
    if !boundary.is_drawable() {
        return None;
    }

    let mut d = String::with_capacity(boundary.vertices().len() * 16);
    for (i, vertex) in boundary.vertices().iter().enumerate() {
        let (x, y) = jitter_point(*vertex);
        let cmd = if i == 0 { 'M' } else { 'L' };
        if i > 0 {
            d.push(' ');
        }
        write!(d, "{cmd}{x:.2},{y:.2}").ok();
    }
    d.push_str(" Z");
    Some(d)
}

// ---------------------------------------------------------------------------
// Segment selection
// ---------------------------------------------------------------------------

/// Resolve which boundaries get highlighted, queue first then hover.
///
/// Disabled ids and ids that do not resolve to a boundary are dropped.
pub fn select_segments<'a>(request: &OverlayRequest<'a>) -> Vec<Segment<'a>> {
    let hovered = request.hovered_id;
    let queue: IndexSet<&str> = request
        .highlight_ids
        .iter()
        .map(String::as_str)
        .filter(|id| Some(*id) != hovered)
        .collect();

    let mut segments: Vec<Segment<'a>> = queue
        .into_iter()
        .filter(|id| !request.disabled_ids.contains(*id))
        .filter_map(|id| get_boundary_by_id(request.dataset, id))
        .map(|boundary| Segment {
            kind: SegmentKind::Queue,
            boundary,
        })
        .collect();

    if let Some(id) = hovered {
        if !request.disabled_ids.contains(id) {
            if let Some(boundary) = get_boundary_by_id(request.dataset, id) {
                segments.push(Segment {
                    kind: SegmentKind::Hover,
                    boundary,
                });
            }
        }
    }

    segments
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Render the overlay as SVG markup.
///
/// Never fails: with nothing to draw the result is an empty, transparent
/// canvas of the canonical size.
pub fn render_overlay_markup(request: &OverlayRequest<'_>) -> String {
    let mut svg = String::with_capacity(1024);
    write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = CANVAS_WIDTH,
        h = CANVAS_HEIGHT,
    )
    .ok();

    if request.include_outline {
        for d in request.dataset.boundaries.iter().filter_map(boundary_path) {
            write!(
                svg,
                r#"<path data-kind="outline" d="{d}" fill="none" stroke="{OUTLINE_STROKE}" stroke-width="1" stroke-dasharray="{OUTLINE_DASH}"/>"#,
            )
            .ok();
        }
    }

    for segment in select_segments(request) {
        let Some(d) = boundary_path(segment.boundary) else {
            continue;
        };
        let kind = segment.kind;
        write!(
            svg,
            r#"<path data-kind="{}" d="{d}" fill="{}" stroke="{}" stroke-width="2" stroke-linejoin="round"/>"#,
            kind.as_str(),
            kind.fill(),
            kind.stroke(),
        )
        .ok();
    }

    svg.push_str("</svg>");
    svg
}

/// Encode SVG markup as a base64 data URI.
pub fn svg_data_uri(markup: &str) -> String {
    format!("{SVG_DATA_URI_PREFIX}{}", STANDARD.encode(markup.as_bytes()))
}

/// Render the overlay and encode it as `data:image/svg+xml;base64,...`.
pub fn render_overlay_svg(request: &OverlayRequest<'_>) -> String {
    svg_data_uri(&render_overlay_markup(request))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

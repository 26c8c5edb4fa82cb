//! SVG export serializer.
//!
//! Converts traced outlines into a self-contained SVG string using the
//! [`svg`](::svg) crate for document construction, XML escaping, and path
//! data formatting.
//!
//! The document holds a full-size background `<rect>` in the background
//! color and a single `<path>` filled with the foreground color. All
//! outlines share that path and the even-odd fill rule, so hole borders
//! cut through the regions that contain them.
//!
//! Optional [`SvgMetadata`] embeds `<title>`, `<desc>` and a `<metadata>`
//! element carrying the settings JSON.
//!
//! This is a pure function with no I/O -- it returns a `String`.

use ::svg::Document;
use ::svg::node::element::path::Data;
use ::svg::node::element::{Description, Element, Path, Rectangle, Title};
use ::svg::node::{Node, Text, Value};

use vectrace_pipeline::{Outline, Segment, TracedShape, VectorizeSettings};

/// Namespace of the `<vectrace:settings>` metadata element.
const SETTINGS_NAMESPACE: &str = "urn:vectrace:settings:1";

/// Metadata to embed in the SVG document.
///
/// All fields are optional. Text values are XML-escaped automatically by
/// the `svg` crate.
#[derive(Debug, Clone, Default)]
pub struct SvgMetadata<'a> {
    /// Document title: emitted as `<title>`.
    ///
    /// Typically the source image filename (without extension).
    pub title: Option<&'a str>,

    /// Document description: emitted as `<desc>`.
    pub description: Option<&'a str>,

    /// Serialized [`VectorizeSettings`]: emitted inside a `<metadata>`
    /// element wrapped in a namespaced `<vectrace:settings>` element, so
    /// an exported file records the parameters that produced it.
    pub settings_json: Option<&'a str>,
}

/// Build an SVG path `d` attribute string from closed outlines.
///
/// Each outline becomes one `M … z` subpath using `L` for straight
/// segments and `C` for cubic curves. Returns an empty string when there
/// are no outlines.
///
/// # Examples
///
/// ```
/// use vectrace_pipeline::{Outline, Point, Segment};
/// use vectrace_export::build_path_data;
///
/// let outline = Outline {
///     start: Point::new(0.0, 0.0),
///     segments: vec![
///         Segment::Line { to: Point::new(10.0, 0.0) },
///         Segment::Line { to: Point::new(10.0, 10.0) },
///     ],
/// };
/// let d = build_path_data(&[outline]);
/// assert!(d.starts_with("M0,0 L10,0 L10,10"));
/// ```
#[must_use]
pub fn build_path_data(outlines: &[Outline]) -> String {
    if outlines.is_empty() {
        return String::new();
    }

    let mut data = Data::new();
    for outline in outlines {
        data = data.move_to((outline.start.x, outline.start.y));
        for segment in &outline.segments {
            data = match *segment {
                Segment::Line { to } => data.line_to((to.x, to.y)),
                Segment::Cubic { c1, c2, to } => {
                    data.cubic_curve_to((c1.x, c1.y, c2.x, c2.y, to.x, to.y))
                }
            };
        }
        data = data.close();
    }
    String::from(Value::from(data))
}

/// Serialize traced outlines into an SVG document string.
///
/// `width`, `height` and `viewBox` come from the shape's source
/// dimensions so the markup shares the image's pixel grid and scales
/// without loss. Colors come from `settings`.
///
/// # Examples
///
/// ```
/// use vectrace_pipeline::{Dimensions, TracedShape, VectorizeSettings};
/// use vectrace_export::{SvgMetadata, to_svg};
///
/// let shape = TracedShape {
///     outlines: vec![],
///     dimensions: Dimensions { width: 80, height: 60 },
/// };
/// let metadata = SvgMetadata {
///     title: Some("logo"),
///     ..SvgMetadata::default()
/// };
/// let svg = to_svg(&shape, &VectorizeSettings::default(), &metadata);
/// assert!(svg.contains("<title>logo</title>"));
/// assert!(svg.contains("viewBox=\"0 0 80 60\""));
/// ```
#[must_use]
pub fn to_svg(
    shape: &TracedShape,
    settings: &VectorizeSettings,
    metadata: &SvgMetadata<'_>,
) -> String {
    let w = shape.dimensions.width;
    let h = shape.dimensions.height;
    let mut doc = Document::new()
        .set("width", w)
        .set("height", h)
        .set("viewBox", (0, 0, w, h));

    if let Some(title) = metadata.title {
        doc = doc.add(Title::new(title));
    }

    if let Some(description) = metadata.description {
        doc = doc.add(Description::new().add(Text::new(description)));
    }

    if let Some(settings_json) = metadata.settings_json {
        let mut settings_el = Element::new("vectrace:settings");
        settings_el.assign("xmlns:vectrace", SETTINGS_NAMESPACE);
        settings_el.append(Text::new(settings_json));
        let mut metadata_el = Element::new("metadata");
        metadata_el.append(settings_el);
        doc = doc.add(metadata_el);
    }

    doc = doc.add(
        Rectangle::new()
            .set("width", w)
            .set("height", h)
            .set("fill", settings.background.to_string()),
    );

    let d = build_path_data(&shape.outlines);
    if !d.is_empty() {
        doc = doc.add(
            Path::new()
                .set("d", d)
                .set("fill", settings.color.to_string())
                .set("fill-rule", "evenodd")
                .set("stroke", "none"),
        );
    }

    // The svg crate omits the XML declaration, so we prepend it.
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n")
}

#[cfg(test)]
mod tests {
    use vectrace_pipeline::{Color, Dimensions, Point};

    use super::*;

    fn triangle() -> Outline {
        Outline {
            start: Point::new(0.0, 0.0),
            segments: vec![
                Segment::Line {
                    to: Point::new(8.0, 0.0),
                },
                Segment::Cubic {
                    c1: Point::new(8.0, 2.0),
                    c2: Point::new(6.0, 4.0),
                    to: Point::new(4.0, 6.0),
                },
            ],
        }
    }

    fn shape(outlines: Vec<Outline>) -> TracedShape {
        TracedShape {
            outlines,
            dimensions: Dimensions {
                width: 10,
                height: 8,
            },
        }
    }

    #[test]
    fn empty_outlines_produce_empty_path_data() {
        assert!(build_path_data(&[]).is_empty());
    }

    #[test]
    fn path_data_uses_line_cubic_and_close_commands() {
        let d = build_path_data(&[triangle()]);
        assert!(d.starts_with("M0,0 L8,0 C8,2,6,4,4,6"), "got {d}");
        assert!(d.trim_end().ends_with('z') || d.trim_end().ends_with('Z'), "got {d}");
    }

    #[test]
    fn one_subpath_per_outline() {
        let d = build_path_data(&[triangle(), triangle()]);
        assert_eq!(d.matches('M').count(), 2);
    }

    #[test]
    fn document_has_dimensions_background_and_fill() {
        let settings = VectorizeSettings {
            color: Color::new(0x12, 0x34, 0x56),
            background: Color::new(0xfe, 0xdc, 0xba),
            ..VectorizeSettings::default()
        };
        let svg = to_svg(&shape(vec![triangle()]), &settings, &SvgMetadata::default());
        assert!(svg.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(svg.contains("width=\"10\""));
        assert!(svg.contains("height=\"8\""));
        assert!(svg.contains("viewBox=\"0 0 10 8\""));
        assert!(svg.contains("fill=\"#fedcba\""));
        assert!(svg.contains("fill=\"#123456\""));
        assert!(svg.contains("fill-rule=\"evenodd\""));
        assert!(svg.contains("<path"));
    }

    #[test]
    fn no_outlines_means_background_only() {
        let svg = to_svg(&shape(vec![]), &VectorizeSettings::default(), &SvgMetadata::default());
        assert!(svg.contains("<rect"));
        assert!(!svg.contains("<path"));
    }

    #[test]
    fn metadata_is_escaped_and_embedded() {
        let metadata = SvgMetadata {
            title: Some("a<b>"),
            description: Some("x & y"),
            settings_json: Some(r#"{"threshold":128}"#),
        };
        let svg = to_svg(&shape(vec![]), &VectorizeSettings::default(), &metadata);
        assert!(svg.contains("<title>a&lt;b&gt;</title>"), "got {svg}");
        assert!(svg.contains("x &amp; y"));
        assert!(svg.contains("<vectrace:settings"));
        assert!(svg.contains(SETTINGS_NAMESPACE));
        assert!(svg.contains("threshold"));
    }

    #[test]
    fn no_metadata_elements_by_default() {
        let svg = to_svg(&shape(vec![]), &VectorizeSettings::default(), &SvgMetadata::default());
        assert!(!svg.contains("<title"));
        assert!(!svg.contains("<desc"));
        assert!(!svg.contains("<metadata"));
    }

    #[test]
    fn output_is_deterministic() {
        let s = shape(vec![triangle()]);
        let settings = VectorizeSettings::default();
        assert_eq!(
            to_svg(&s, &settings, &SvgMetadata::default()),
            to_svg(&s, &settings, &SvgMetadata::default())
        );
    }
}

//! SVG snapshot of an arrangement
//!
//! The snapshot only reads entity records; it is what gets submitted when the
//! analysis service is asked to look at a picture instead of the record list.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::entity::{Entity, ShapeClass};
use crate::layout::{Point, Size};

use super::SvgConfig;

/// Distance the facing arrow reaches past the entity's edge
const FACING_REACH: f64 = 12.0;

/// Build SVG elements incrementally
pub struct SvgBuilder {
    config: SvgConfig,
    defs: Vec<String>,
    elements: Vec<String>,
    indent: usize,
}

impl SvgBuilder {
    /// Create a new SVG builder
    pub fn new(config: SvgConfig) -> Self {
        Self {
            config,
            defs: vec![],
            elements: vec![],
            indent: 1,
        }
    }

    fn prefix(&self) -> String {
        self.config.class_prefix.clone().unwrap_or_default()
    }

    fn indent_str(&self) -> String {
        if self.config.pretty_print {
            "  ".repeat(self.indent)
        } else {
            String::new()
        }
    }

    fn newline(&self) -> &str {
        if self.config.pretty_print {
            "\n"
        } else {
            ""
        }
    }

    fn class_list(&self, kind: &str) -> String {
        format!("{}shape {}{}", self.prefix(), self.prefix(), kind)
    }

    /// Add the arrow marker used by facing indicators
    pub fn add_arrow_marker(&mut self) {
        let prefix = self.prefix();
        self.defs.push(format!(
            r#"<marker id="{prefix}arrow" viewBox="0 0 10 10" refX="8" refY="5" markerWidth="4" markerHeight="4" markerUnits="strokeWidth" orient="auto"><path d="M0,0 L10,5 L0,10 Z" fill="context-stroke"/></marker>"#
        ));
    }

    /// Add the canvas outline
    pub fn add_canvas(&mut self, canvas: Size) {
        let prefix = self.prefix();
        self.elements.push(format!(
            r#"{}<rect class="{}canvas" x="0" y="0" width="{}" height="{}" fill="none" stroke="black" stroke-width="4"/>"#,
            self.indent_str(),
            prefix,
            canvas.width,
            canvas.height
        ));
    }

    /// Add a rectangle element
    pub fn add_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.elements.push(format!(
            r#"{}<rect class="{}" x="{}" y="{}" width="{}" height="{}"/>"#,
            self.indent_str(),
            self.class_list("square"),
            x,
            y,
            w,
            h
        ));
    }

    /// Add a circle element
    pub fn add_circle(&mut self, cx: f64, cy: f64, r: f64) {
        self.elements.push(format!(
            r#"{}<circle class="{}" cx="{}" cy="{}" r="{}"/>"#,
            self.indent_str(),
            self.class_list("circle"),
            cx,
            cy,
            r
        ));
    }

    /// Add a polygon element
    pub fn add_polygon(&mut self, points: &[Point]) {
        let pts = points
            .iter()
            .map(|p| format!("{},{}", p.x, p.y))
            .collect::<Vec<_>>()
            .join(" ");
        self.elements.push(format!(
            r#"{}<polygon class="{}" points="{}"/>"#,
            self.indent_str(),
            self.class_list("triangle"),
            pts
        ));
    }

    /// Add a line element
    pub fn add_line(&mut self, from: Point, to: Point, class: &str, arrow: bool) {
        let prefix = self.prefix();
        let marker = if arrow {
            format!(r#" marker-end="url(#{}arrow)""#, prefix)
        } else {
            String::new()
        };
        self.elements.push(format!(
            r#"{}<line class="{}{}" x1="{}" y1="{}" x2="{}" y2="{}"{}/>"#,
            self.indent_str(),
            prefix,
            class,
            from.x,
            from.y,
            to.x,
            to.y,
            marker
        ));
    }

    /// Add a centered text element
    pub fn add_text(&mut self, text: &str, x: f64, y: f64, class: &str) {
        self.elements.push(format!(
            r#"{}<text class="{}{}" x="{}" y="{}" text-anchor="middle" dominant-baseline="middle">{}</text>"#,
            self.indent_str(),
            self.prefix(),
            class,
            x,
            y,
            escape_xml(text)
        ));
    }

    /// Start a group element
    pub fn start_group(&mut self, id: &str, classes: &[String]) {
        let class_attr = if classes.is_empty() {
            String::new()
        } else {
            format!(r#" class="{}""#, classes.join(" "))
        };
        self.elements.push(format!(
            r#"{}<g id="{}"{}>"#,
            self.indent_str(),
            escape_xml(id),
            class_attr
        ));
        self.indent += 1;
    }

    /// End a group element
    pub fn end_group(&mut self) {
        self.indent = self.indent.saturating_sub(1).max(1);
        self.elements.push(format!("{}</g>", self.indent_str()));
    }

    /// Assemble the document with the canvas as the viewBox
    pub fn build(self, canvas: Size) -> String {
        let padding = self.config.viewbox_padding;
        let nl = self.newline();

        let mut svg = String::new();

        if self.config.standalone {
            svg.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
            svg.push_str(nl);
        }

        svg.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{} {} {} {}">"#,
            -padding,
            -padding,
            canvas.width + 2.0 * padding,
            canvas.height + 2.0 * padding
        ));
        svg.push_str(nl);

        if !self.defs.is_empty() {
            let outer = self.indent_str();
            let inner = if self.config.pretty_print {
                "  ".repeat(self.indent + 1)
            } else {
                String::new()
            };
            svg.push_str(&outer);
            svg.push_str("<defs>");
            svg.push_str(nl);
            for def in &self.defs {
                svg.push_str(&inner);
                svg.push_str(def);
                svg.push_str(nl);
            }
            svg.push_str(&outer);
            svg.push_str("</defs>");
            svg.push_str(nl);
        }

        for elem in &self.elements {
            svg.push_str(elem);
            svg.push_str(nl);
        }

        svg.push_str("</svg>");

        svg
    }
}

/// Render every entity on a canvas of the given size
pub fn render_svg(entities: &[Entity], canvas: Size, config: &SvgConfig) -> String {
    let mut builder = SvgBuilder::new(config.clone());
    builder.add_arrow_marker();
    builder.add_canvas(canvas);

    for entity in entities {
        render_entity(entity, &mut builder, config.show_labels);
    }

    builder.build(canvas)
}

fn render_entity(entity: &Entity, builder: &mut SvgBuilder, show_labels: bool) {
    let prefix = builder.prefix();
    let mut classes = vec![format!("{}entity", prefix)];
    if entity.is_deceased() {
        classes.push(format!("{}deceased", prefix));
    }
    builder.start_group(&format!("entity-{}", entity.id()), &classes);

    let bounds = entity.bounds();
    let center = bounds.center();
    match entity.shape() {
        ShapeClass::Square => builder.add_rect(bounds.x, bounds.y, bounds.width, bounds.height),
        ShapeClass::Circle => {
            builder.add_circle(center.x, center.y, bounds.width.min(bounds.height) / 2.0)
        }
        ShapeClass::Triangle => builder.add_polygon(&[
            Point::new(center.x, bounds.y),
            Point::new(bounds.right(), bounds.bottom()),
            Point::new(bounds.x, bounds.bottom()),
        ]),
    }

    // Genogram convention: a cross through the outline marks the deceased
    if entity.is_deceased() {
        builder.add_line(
            Point::new(bounds.x, bounds.y),
            Point::new(bounds.right(), bounds.bottom()),
            "deceased-mark",
            false,
        );
        builder.add_line(
            Point::new(bounds.right(), bounds.y),
            Point::new(bounds.x, bounds.bottom()),
            "deceased-mark",
            false,
        );
    }

    let direction = entity.facing().unit_vector();
    let reach = entity.size().side() / 2.0 + FACING_REACH;
    builder.add_line(
        center,
        Point::new(center.x + direction.x * reach, center.y + direction.y * reach),
        "facing",
        true,
    );

    if show_labels {
        builder.add_text(entity.icon(), center.x, center.y, "icon");
        builder.add_text(entity.name(), center.x, bounds.bottom() + 14.0, "name");
        builder.add_text(entity.role(), center.x, bounds.bottom() + 30.0, "role");
    }

    builder.end_group();
}

/// Encode an SVG document as a `data:` URL for the analysis payload
pub fn snapshot_data_url(svg: &str) -> String {
    format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg))
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

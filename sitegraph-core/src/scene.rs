use crate::error::LayoutError;
use crate::model::{GraphLink, GraphNode};
use std::collections::HashMap;
use std::fmt::Write;

pub const DEFAULT_WIDTH: f64 = 800.0;
pub const DEFAULT_HEIGHT: f64 = 600.0;
pub const NODE_RADIUS: f64 = 5.0;
pub const NODE_FILL: &str = "blue";
pub const LINK_STROKE: &str = "#999";
pub const LINK_STROKE_WIDTH: f64 = 1.5;

/// A `<line>` bound to one link; endpoints follow the linked nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct LineElement {
    pub source: usize,
    pub target: usize,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// A `<circle>` bound to one node
#[derive(Debug, Clone, PartialEq)]
pub struct CircleElement {
    pub node: usize,
    pub cx: f64,
    pub cy: f64,
}

/// The SVG scene for one graph: a group of lines and a group of circles.
///
/// Elements store node indices resolved once at bind time; [`Scene::update`]
/// copies the current node positions into them.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub lines: Vec<LineElement>,
    pub circles: Vec<CircleElement>,
}

impl Scene {
    /// Create one line per link and one circle per node.
    pub fn bind(
        nodes: &[GraphNode],
        links: &[GraphLink],
        width: f64,
        height: f64,
    ) -> Result<Self, LayoutError> {
        let by_id: HashMap<usize, usize> = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id, index))
            .collect();

        let lines = links
            .iter()
            .map(|link| {
                let source = *by_id
                    .get(&link.source)
                    .ok_or(LayoutError::MissingNode { id: link.source })?;
                let target = *by_id
                    .get(&link.target)
                    .ok_or(LayoutError::MissingNode { id: link.target })?;
                Ok(LineElement {
                    source,
                    target,
                    x1: 0.0,
                    y1: 0.0,
                    x2: 0.0,
                    y2: 0.0,
                })
            })
            .collect::<Result<Vec<_>, LayoutError>>()?;

        let circles = (0..nodes.len())
            .map(|node| CircleElement {
                node,
                cx: 0.0,
                cy: 0.0,
            })
            .collect();

        let mut scene = Self {
            width,
            height,
            lines,
            circles,
        };
        scene.update(nodes);
        Ok(scene)
    }

    /// Move every element to the current node positions.
    pub fn update(&mut self, nodes: &[GraphNode]) {
        for line in self.lines.iter_mut() {
            let (source, target) = (&nodes[line.source], &nodes[line.target]);
            line.x1 = source.x;
            line.y1 = source.y;
            line.x2 = target.x;
            line.y2 = target.y;
        }
        for circle in self.circles.iter_mut() {
            let node = &nodes[circle.node];
            circle.cx = node.x;
            circle.cy = node.y;
        }
    }

    /// Serialize as a standalone SVG document.
    pub fn to_svg(&self) -> String {
        let mut out = String::with_capacity(128 + 96 * (self.lines.len() + self.circles.len()));

        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
            fmt_num(self.width),
            fmt_num(self.height),
            fmt_num(self.width),
            fmt_num(self.height)
        );

        let _ = writeln!(
            out,
            r#"  <g class="links" stroke="{}" stroke-opacity="0.6">"#,
            LINK_STROKE
        );
        for line in &self.lines {
            let _ = writeln!(
                out,
                r#"    <line stroke-width="{}" x1="{}" y1="{}" x2="{}" y2="{}"/>"#,
                fmt_num(LINK_STROKE_WIDTH),
                fmt_num(line.x1),
                fmt_num(line.y1),
                fmt_num(line.x2),
                fmt_num(line.y2)
            );
        }
        out.push_str("  </g>\n");

        out.push_str("  <g class=\"nodes\">\n");
        for circle in &self.circles {
            let _ = writeln!(
                out,
                r#"    <circle r="{}" fill="{}" cx="{}" cy="{}"/>"#,
                fmt_num(NODE_RADIUS),
                NODE_FILL,
                fmt_num(circle.cx),
                fmt_num(circle.cy)
            );
        }
        out.push_str("  </g>\n");
        out.push_str("</svg>\n");

        out
    }
}

/// Fixed 3-decimal formatting with trailing zeros trimmed.
pub fn fmt_num(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let mut out = format!("{:.3}", value);
    if out.contains('.') {
        let trimmed = out.trim_end_matches('0').trim_end_matches('.').len();
        out.truncate(trimmed);
    }
    if out == "-0" {
        out = "0".to_string();
    }
    out
}

/// The element the visualization is mounted into.
///
/// Mounting clears the previous scene first, so the container never holds
/// more than one SVG.
#[derive(Debug, Clone)]
pub struct SvgContainer {
    id: String,
    children: Vec<Scene>,
}

impl SvgContainer {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn clear(&mut self) {
        self.children.clear();
    }

    pub fn mount(&mut self, scene: Scene) {
        self.clear();
        self.children.push(scene);
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.children.last()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Default for SvgContainer {
    fn default() -> Self {
        Self::new("sitemap")
    }
}

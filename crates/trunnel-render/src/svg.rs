use crate::fmt::{escape_xml, fmt};
use crate::model::{AxisOrient, AxisSpec, ItemPath, TreeChartLayout};
use std::fmt::Write as _;

const TRUNNEL_CSS: &str = include_str!("../assets/trunnel.css");

/// Axis tick size (inner and outer), in px.
const TICK_SIZE: f64 = 6.0;
/// Gap between a tick line's end and its label, in px.
const TICK_PADDING: f64 = 3.0;
/// Half-pixel offset that keeps 1px axis strokes crisp.
const AXIS_OFFSET: f64 = 0.5;

/// A minimal owned SVG element tree. It doubles as the visual's mount point: the root keeps
/// its identity across updates while its drawn children are cleared and rebuilt.
#[derive(Debug, Clone, PartialEq)]
pub struct SvgElement {
    tag: String,
    attrs: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<SvgElement>,
}

impl SvgElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attr(mut self, key: &str, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Sets an attribute, replacing an existing value in place so attribute order stays stable.
    pub fn set_attr(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value,
            None => self.attrs.push((key.to_string(), value)),
        }
    }

    pub fn get_attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.get_attr("class")
            .is_some_and(|c| c.split_whitespace().any(|c| c == class))
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn children(&self) -> &[SvgElement] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [SvgElement] {
        &mut self.children
    }

    /// Appends `child` and returns a handle to it for further appends.
    pub fn append(&mut self, child: SvgElement) -> &mut SvgElement {
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Removes every direct child with the given tag and returns how many were removed.
    pub fn remove_children(&mut self, tag: &str) -> usize {
        let before = self.children.len();
        self.children.retain(|c| c.tag != tag);
        before - self.children.len()
    }

    /// All descendants (not including `self`) with the given tag, in document order.
    pub fn descendants(&self, tag: &str) -> Vec<&SvgElement> {
        let mut out = Vec::new();
        let mut stack: Vec<&SvgElement> = self.children.iter().rev().collect();
        while let Some(el) = stack.pop() {
            if el.tag == tag {
                out.push(el);
            }
            stack.extend(el.children.iter().rev());
        }
        out
    }

    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        self.write_markup(&mut out);
        out
    }

    pub fn write_markup(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (k, v) in &self.attrs {
            let _ = write!(out, r#" {k}="{}""#, escape_xml(v));
        }
        let text = self.text.as_deref().unwrap_or("");
        if self.children.is_empty() && text.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        if self.tag == "style" {
            out.push_str(text);
        } else {
            out.push_str(&escape_xml(text));
        }
        for c in &self.children {
            c.write_markup(out);
        }
        let _ = write!(out, "</{}>", self.tag);
    }
}

#[derive(Debug, Clone)]
pub struct SvgRenderOptions {
    /// Optional id for the root `<svg>`.
    pub diagram_id: Option<String>,
    /// When true, embed the chart stylesheet.
    pub include_style: bool,
}

impl Default for SvgRenderOptions {
    fn default() -> Self {
        Self {
            diagram_id: None,
            include_style: true,
        }
    }
}

/// The root `<svg class="trunnel">` element every chart is drawn into.
pub fn chart_root() -> SvgElement {
    SvgElement::new("svg")
        .attr("xmlns", "http://www.w3.org/2000/svg")
        .attr("class", "trunnel")
}

pub fn stylesheet() -> SvgElement {
    SvgElement::new("style").with_text(TRUNNEL_CSS)
}

/// Renders a laid-out chart as a standalone SVG document.
pub fn render_tree_chart_svg(layout: &TreeChartLayout, options: &SvgRenderOptions) -> String {
    let mut root = chart_root();
    if let Some(id) = options.diagram_id.as_deref() {
        root.set_attr("id", id);
    }
    root.set_attr("width", fmt(layout.viewport.width));
    root.set_attr("height", fmt(layout.viewport.height));
    root.set_attr(
        "viewBox",
        format!(
            "0 0 {} {}",
            fmt(layout.viewport.width),
            fmt(layout.viewport.height)
        ),
    );
    if options.include_style {
        root.append(stylesheet());
    }
    draw_tree_chart(&mut root, layout);
    root.to_markup()
}

/// Clears every `<g>` under `root` and appends the item container and the three axes.
pub fn draw_tree_chart(root: &mut SvgElement, layout: &TreeChartLayout) {
    let removed = root.remove_children("g");
    tracing::trace!(removed, "cleared tree chart mount");

    let translate = layout.container_translate;
    let container = root.append(
        SvgElement::new("g").attr(
            "transform",
            format!("translate({}, {})", fmt(translate.x), fmt(translate.y)),
        ),
    );
    for item in &layout.items {
        let line = container.append(SvgElement::new("g"));
        line.append(item_path(item, &item.full_path, "geometricPrecision"));
        line.append(item_path(item, &item.stop_path, "crispEdges"));
    }

    for axis in layout.axes() {
        root.append(axis_group(axis));
    }
}

fn item_path(item: &ItemPath, d: &str, shape_rendering: &str) -> SvgElement {
    SvgElement::new("path")
        .attr("stroke", item.stroke.as_str())
        .attr("stroke-width", fmt(item.stroke_width))
        .attr("fill", "none")
        .attr("shape-rendering", shape_rendering)
        .attr("d", d)
}

fn axis_group(axis: &AxisSpec) -> SvgElement {
    let k = axis.orient.k();
    let vertical = axis.orient.is_vertical();
    let range0 = axis.range.0 + AXIS_OFFSET;
    let range1 = axis.range.1 + AXIS_OFFSET;
    let outer = fmt(k * TICK_SIZE);

    let anchor = match axis.orient {
        AxisOrient::Left => "end",
        AxisOrient::Right => "start",
        AxisOrient::Top => "middle",
    };

    let mut g = SvgElement::new("g")
        .attr("fill", "none")
        .attr("font-size", "10")
        .attr("font-family", "sans-serif")
        .attr("text-anchor", anchor);

    let domain = if vertical {
        format!(
            "M{outer},{}H{}V{}H{outer}",
            fmt(range0),
            fmt(AXIS_OFFSET),
            fmt(range1)
        )
    } else {
        format!(
            "M{},{outer}V{}H{}V{outer}",
            fmt(range0),
            fmt(AXIS_OFFSET),
            fmt(range1)
        )
    };
    g.append(
        SvgElement::new("path")
            .attr("class", "domain")
            .attr("stroke", "currentColor")
            .attr("d", domain),
    );

    let (line_axis, text_axis) = if vertical { ("x2", "x") } else { ("y2", "y") };
    let dy = match axis.orient {
        AxisOrient::Top => "0em",
        AxisOrient::Left | AxisOrient::Right => "0.32em",
    };
    for tick in &axis.ticks {
        let pos = fmt(tick.position + AXIS_OFFSET);
        let transform = if vertical {
            format!("translate(0,{pos})")
        } else {
            format!("translate({pos},0)")
        };
        let t = g.append(
            SvgElement::new("g")
                .attr("class", "tick")
                .attr("opacity", "1")
                .attr("transform", transform),
        );
        t.append(
            SvgElement::new("line")
                .attr("stroke", "currentColor")
                .attr(line_axis, fmt(k * TICK_SIZE)),
        );
        t.append(
            SvgElement::new("text")
                .attr("fill", "currentColor")
                .attr(text_axis, fmt(k * (TICK_SIZE + TICK_PADDING)))
                .attr("dy", dy)
                .with_text(tick.label.as_str()),
        );
    }

    g.attr("class", "axis").attr(
        "transform",
        format!(
            "translate({}, {})",
            fmt(axis.translate.x),
            fmt(axis.translate.y)
        ),
    )
}

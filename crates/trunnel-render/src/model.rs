use serde::{Deserialize, Serialize};
use trunnel_core::Partition;
use trunnel_core::geom::Point;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 300.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutPoint {
    pub x: f64,
    pub y: f64,
}

impl From<Point> for LayoutPoint {
    fn from(p: Point) -> Self {
        Self { x: p.x, y: p.y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrunkMetrics {
    pub height: f64,
    pub width: f64,
    /// Vertical offset that centres the trunk within the chart area.
    pub top: f64,
    /// Horizontal room between the trunk's right edge and the chart's right edge.
    pub leaf_width: f64,
}

/// Draw geometry for one series item.
///
/// The full path starts at `(0, trunk_pos)`, runs horizontally to `horizontal_end`, then
/// follows a cubic bezier through `control1`/`control2` to `end`. The stop path is only the
/// horizontal run, drawn with crisp edges to cap the stroke before the curve begins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemPath {
    pub name: String,
    pub value: f64,
    pub index: usize,
    pub is_leaf: bool,
    pub trunk_pos: f64,
    pub horizontal_end: f64,
    pub control1: LayoutPoint,
    pub control2: LayoutPoint,
    pub end: LayoutPoint,
    pub stroke_width: f64,
    pub stroke: String,
    pub full_path: String,
    pub stop_path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisOrient {
    Left,
    Top,
    Right,
}

impl AxisOrient {
    /// Direction ticks point in: away from the chart for left/top axes.
    pub fn k(self) -> f64 {
        match self {
            Self::Left | Self::Top => -1.0,
            Self::Right => 1.0,
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisTick {
    pub position: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisSpec {
    pub orient: AxisOrient,
    /// Translation of the axis group relative to the root SVG.
    pub translate: LayoutPoint,
    pub range: (f64, f64),
    pub ticks: Vec<AxisTick>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeChartLayout {
    pub viewport: Viewport,
    pub chart_width: f64,
    pub chart_height: f64,
    /// Translation of the item container relative to the root SVG.
    pub container_translate: LayoutPoint,
    pub trunk: TrunkMetrics,
    pub partition: Partition,
    pub items: Vec<ItemPath>,
    pub value_axis: AxisSpec,
    pub branch_axis: AxisSpec,
    pub leaf_axis: AxisSpec,
}

impl TreeChartLayout {
    pub fn axes(&self) -> [&AxisSpec; 3] {
        [&self.value_axis, &self.branch_axis, &self.leaf_axis]
    }
}

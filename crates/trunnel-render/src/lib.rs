#![forbid(unsafe_code)]

//! Headless layout + SVG rendering for trunnel tree charts.
//!
//! - [`layout::layout_tree_chart`] turns a series, a viewport and a [`TreeConfig`] into draw
//!   geometry (paths, stroke widths, colours, axis specs).
//! - [`svg`] draws that geometry into an owned SVG element tree and serializes it.
//! - [`visual::Visual`] wraps both behind a construct/update lifecycle for a host.

pub mod fmt;
pub mod layout;
pub mod model;
pub mod scale;
pub mod svg;
pub mod visual;

pub use layout::layout_tree_chart;
pub use model::{TreeChartLayout, Viewport};
pub use svg::{SvgElement, SvgRenderOptions, render_tree_chart_svg};
pub use trunnel_core::TreeConfig;
pub use visual::{
    EnumerateVisualObjectInstancesOptions, Visual, VisualConstructorOptions, VisualUpdateOptions,
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] trunnel_core::Error),
    #[error(
        "viewport {width}x{height} leaves no room for the chart area ({chart_width}x{chart_height})"
    )]
    InvalidViewport {
        width: f64,
        height: f64,
        chart_width: f64,
        chart_height: f64,
    },
    #[error("invalid color: {color}")]
    InvalidColor { color: String },
    #[error("category \"{name}\" is not in the {axis} axis domain")]
    UnknownCategory { axis: &'static str, name: String },
}

pub type Result<T> = std::result::Result<T, Error>;

//! Headless visual lifecycle.
//!
//! A host constructs the visual once with a mount element, then calls [`Visual::update`]
//! whenever the viewport or data changes. Every update clears the drawn groups and rebuilds
//! them, so an update never depends on what a previous one left behind.

use crate::layout::layout_tree_chart;
use crate::model::{TreeChartLayout, Viewport};
use crate::svg::{SvgElement, chart_root, draw_tree_chart, stylesheet};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use trunnel_core::{DataView, Series, VisualObjectInstance, VisualSettings};

#[derive(Debug, Clone)]
pub struct VisualConstructorOptions {
    /// Host element the chart's `<svg>` is appended to.
    pub element: SvgElement,
}

impl Default for VisualConstructorOptions {
    fn default() -> Self {
        Self {
            element: SvgElement::new("div").attr("class", "visual"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualUpdateOptions {
    pub viewport: Viewport,
    #[serde(default)]
    pub data_views: Vec<DataView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumerateVisualObjectInstancesOptions {
    pub object_name: String,
}

#[derive(Debug, Clone)]
pub struct Visual {
    element: SvgElement,
    svg_index: usize,
    settings: VisualSettings,
    layout: Option<TreeChartLayout>,
}

impl Visual {
    pub fn new(options: VisualConstructorOptions) -> Self {
        let mut element = options.element;
        let mut svg = chart_root();
        svg.append(stylesheet());
        element.append(svg);
        let svg_index = element.children().len() - 1;
        Self {
            element,
            svg_index,
            settings: VisualSettings::default(),
            layout: None,
        }
    }

    pub fn element(&self) -> &SvgElement {
        &self.element
    }

    pub fn svg(&self) -> &SvgElement {
        &self.element.children()[self.svg_index]
    }

    fn svg_mut(&mut self) -> &mut SvgElement {
        &mut self.element.children_mut()[self.svg_index]
    }

    pub fn settings(&self) -> &VisualSettings {
        &self.settings
    }

    /// The layout drawn by the last successful update.
    pub fn layout(&self) -> Option<&TreeChartLayout> {
        self.layout.as_ref()
    }

    pub fn markup(&self) -> String {
        self.svg().to_markup()
    }

    /// Resizes the chart and redraws it from the first data view, returning the drawn layout.
    /// Without categorical data the built-in sample series is drawn. On error the mount is left
    /// cleared.
    pub fn update(&mut self, options: &VisualUpdateOptions) -> Result<&TreeChartLayout> {
        let viewport = options.viewport;
        {
            let svg = self.svg_mut();
            svg.set_attr("width", crate::fmt::fmt(viewport.width));
            svg.set_attr("height", crate::fmt::fmt(viewport.height));
            svg.remove_children("g");
        }
        self.layout = None;

        let data_view = options.data_views.first();
        self.settings = data_view
            .map(DataView::settings)
            .unwrap_or_default();

        let series = match data_view.map(DataView::to_series).transpose()?.flatten() {
            Some(series) => series,
            None => {
                tracing::warn!("no categorical data in update; drawing the sample series");
                Series::sample()
            }
        };

        let config = self.settings.tree_config()?;
        let layout = layout_tree_chart(&series, viewport, &config)?;
        draw_tree_chart(self.svg_mut(), &layout);
        tracing::debug!(
            width = viewport.width,
            height = viewport.height,
            items = layout.items.len(),
            "updated visual"
        );
        Ok(self.layout.insert(layout))
    }

    pub fn enumerate_object_instances(
        &self,
        options: &EnumerateVisualObjectInstancesOptions,
    ) -> Result<Vec<VisualObjectInstance>> {
        self.settings
            .enumerate_object_instances(&options.object_name)
            .map_err(Error::from)
    }
}

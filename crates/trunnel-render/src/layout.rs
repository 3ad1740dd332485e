use crate::fmt::fmt_path;
use crate::model::{
    AxisOrient, AxisSpec, AxisTick, ItemPath, LayoutPoint, TreeChartLayout, TrunkMetrics,
    Viewport,
};
use crate::scale::{ColorScale, LinearScale, PointScale};
use crate::{Error, Result};
use trunnel_core::geom::{Point, point};
use trunnel_core::{Series, TreeConfig};

/// Ticks requested from the trunk value axis.
const VALUE_AXIS_TICKS: usize = 10;
/// Gap between the value axis and the trunk.
const VALUE_AXIS_GAP: f64 = 10.0;
/// Lift of the branch axis above the chart area.
const BRANCH_AXIS_GAP: f64 = 5.0;
/// Gap between the chart's right edge and the leaf axis.
const LEAF_AXIS_GAP: f64 = 5.0;

pub fn layout_tree_chart(
    series: &Series,
    viewport: Viewport,
    config: &TreeConfig,
) -> Result<TreeChartLayout> {
    config.validate()?;

    let width = viewport.width - (config.y_axis_width + config.y_leaves_axis_width);
    let height = viewport.height - config.x_axis_height;
    if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
        return Err(Error::InvalidViewport {
            width: viewport.width,
            height: viewport.height,
            chart_width: width,
            chart_height: height,
        });
    }

    let trunk_height = height * config.trunk_height_percent;
    let trunk_width = width * config.trunk_width_percent;
    let leaf_width = width - trunk_width;
    let trunk_top = (height - trunk_height) / 2.0;

    let leaves_range_start = (height / 2.0) * (1.0 - config.leaves_height_percent);
    let leaves_range_end = height - leaves_range_start;

    let partition = series.partition(config.leaf_count)?;
    let branches = partition.branch_count() as f64;
    let item_count = partition.item_count();
    let spacing = config.branch_spacing;

    let value_scale = LinearScale::new((0.0, partition.total_value), (0.0, trunk_height));
    let leaf_scale = PointScale::new(
        partition.leaf_names.clone(),
        (leaves_range_start, leaves_range_end),
    );
    let index_scale = LinearScale::new(
        (0.0, branches + 1.0),
        (trunk_width / (branches + 1.0), trunk_width),
    );
    let branch_scale = PointScale::new(
        partition.branch_names.clone(),
        (
            index_scale.apply(spacing),
            index_scale.apply(branches - 1.0 + spacing),
        ),
    );
    let color_scale = ColorScale::new(
        &config.color_start,
        &config.color_end,
        (0.0, item_count as f64),
    )?;

    let mut items = Vec::with_capacity(item_count);
    for (index, row) in partition.rows.iter().enumerate() {
        let trunk_pos = value_scale.apply(row.run_sum + row.value / 2.0) + trunk_top;

        let (horizontal_end, control1, control2, end) = if row.is_leaf {
            let Some(leaf_y) = leaf_scale.apply(&row.name) else {
                return Err(Error::UnknownCategory {
                    axis: "leaf",
                    name: row.name.clone(),
                });
            };
            let bend_x = trunk_width + leaf_width / 2.0;
            (
                index_scale.apply(branches),
                point(bend_x, trunk_pos),
                point(bend_x, leaf_y),
                point(width, leaf_y),
            )
        } else {
            // Both control points share the start height, so the curve rises almost
            // vertically into the tip instead of easing like an S-curve.
            let tip_x = index_scale.apply(index as f64 + spacing);
            (
                index_scale.apply(index as f64),
                point(tip_x, trunk_pos),
                point(tip_x, trunk_pos),
                point(tip_x, 0.0),
            )
        };

        let stop_path = stop_path_data(trunk_pos, horizontal_end);
        let full_path = full_path_data(trunk_pos, horizontal_end, control1, control2, end);
        let stroke = color_scale.apply(index as f64);
        let stroke_width = value_scale.apply(row.value);

        tracing::trace!(
            index,
            name = %row.name,
            is_leaf = row.is_leaf,
            trunk_pos,
            stroke_width,
            "laid out tree chart item"
        );

        items.push(ItemPath {
            name: row.name.clone(),
            value: row.value,
            index,
            is_leaf: row.is_leaf,
            trunk_pos,
            horizontal_end,
            control1: control1.into(),
            control2: control2.into(),
            end: end.into(),
            stroke_width,
            stroke,
            full_path,
            stop_path,
        });
    }

    let value_axis = AxisSpec {
        orient: AxisOrient::Left,
        translate: point(
            config.y_axis_width - VALUE_AXIS_GAP,
            config.x_axis_height + trunk_top,
        )
        .into(),
        range: value_scale.range,
        ticks: value_scale
            .ticks(VALUE_AXIS_TICKS)
            .into_iter()
            .zip(value_scale.tick_labels(VALUE_AXIS_TICKS))
            .map(|(v, label)| AxisTick {
                position: value_scale.apply(v),
                label,
            })
            .collect(),
    };
    let branch_axis = point_axis(
        AxisOrient::Top,
        point(config.y_axis_width, config.x_axis_height - BRANCH_AXIS_GAP).into(),
        &branch_scale,
    );
    let leaf_axis = point_axis(
        AxisOrient::Right,
        point(
            config.y_axis_width + width + LEAF_AXIS_GAP,
            config.x_axis_height,
        )
        .into(),
        &leaf_scale,
    );

    tracing::debug!(
        width,
        height,
        branches = partition.branch_count(),
        leaves = partition.leaf_count(),
        total = partition.total_value,
        "laid out tree chart"
    );

    Ok(TreeChartLayout {
        viewport,
        chart_width: width,
        chart_height: height,
        container_translate: point(config.y_axis_width, config.x_axis_height).into(),
        trunk: TrunkMetrics {
            height: trunk_height,
            width: trunk_width,
            top: trunk_top,
            leaf_width,
        },
        partition,
        items,
        value_axis,
        branch_axis,
        leaf_axis,
    })
}

fn point_axis(orient: AxisOrient, translate: LayoutPoint, scale: &PointScale) -> AxisSpec {
    AxisSpec {
        orient,
        translate,
        range: scale.range,
        ticks: scale
            .domain
            .iter()
            .filter_map(|name| {
                scale.apply(name).map(|position| AxisTick {
                    position,
                    label: name.clone(),
                })
            })
            .collect(),
    }
}

fn stop_path_data(trunk_pos: f64, horizontal_end: f64) -> String {
    format!("M0,{}H{}", fmt_path(trunk_pos), fmt_path(horizontal_end))
}

fn full_path_data(
    trunk_pos: f64,
    horizontal_end: f64,
    control1: Point,
    control2: Point,
    end: Point,
) -> String {
    format!(
        "{}C{},{} {},{} {},{}",
        stop_path_data(trunk_pos, horizontal_end),
        fmt_path(control1.x),
        fmt_path(control1.y),
        fmt_path(control2.x),
        fmt_path(control2.y),
        fmt_path(end.x),
        fmt_path(end.y),
    )
}

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Layout constants for a tree chart.
///
/// Every field has a default, so partial JSON such as `{"leafCount": 2}` deserializes into a
/// complete config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TreeConfig {
    /// Number of trailing series items drawn as leaves.
    pub leaf_count: usize,
    /// Space reserved left of the chart for the trunk value axis.
    pub y_axis_width: f64,
    /// Space reserved right of the chart for the leaf category axis.
    pub y_leaves_axis_width: f64,
    /// Space reserved above the chart for the branch category axis.
    pub x_axis_height: f64,
    pub trunk_height_percent: f64,
    pub trunk_width_percent: f64,
    pub leaves_height_percent: f64,
    /// Offset, in branch index units, between a branch's split point and its tip.
    pub branch_spacing: f64,
    pub color_start: String,
    pub color_end: String,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            leaf_count: 3,
            y_axis_width: 50.0,
            y_leaves_axis_width: 50.0,
            x_axis_height: 25.0,
            trunk_height_percent: 0.4,
            trunk_width_percent: 0.8,
            leaves_height_percent: 0.8,
            branch_spacing: 1.0,
            color_start: "red".to_string(),
            color_end: "yellow".to_string(),
        }
    }
}

impl TreeConfig {
    pub fn from_value(value: &Value) -> Result<Self> {
        let mut value = value.clone();
        if let Some(v) = value.get_mut("leafCount") {
            *v = whole_count("leafCount", v)?;
        }
        let cfg: Self = serde_json::from_value(value)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        fn percent(key: &'static str, v: f64) -> Result<()> {
            if v.is_finite() && v > 0.0 && v <= 1.0 {
                return Ok(());
            }
            Err(Error::InvalidConfig {
                key,
                message: format!("{v} is outside (0, 1]"),
            })
        }

        fn extent(key: &'static str, v: f64) -> Result<()> {
            if v.is_finite() && v >= 0.0 {
                return Ok(());
            }
            Err(Error::InvalidConfig {
                key,
                message: format!("{v} must be finite and >= 0"),
            })
        }

        extent("yAxisWidth", self.y_axis_width)?;
        extent("yLeavesAxisWidth", self.y_leaves_axis_width)?;
        extent("xAxisHeight", self.x_axis_height)?;
        percent("trunkHeightPercent", self.trunk_height_percent)?;
        percent("trunkWidthPercent", self.trunk_width_percent)?;
        percent("leavesHeightPercent", self.leaves_height_percent)?;
        if !(self.branch_spacing.is_finite() && self.branch_spacing > 0.0) {
            return Err(Error::InvalidConfig {
                key: "branchSpacing",
                message: format!("{} must be finite and > 0", self.branch_spacing),
            });
        }
        for (key, color) in [
            ("colorStart", &self.color_start),
            ("colorEnd", &self.color_end),
        ] {
            if color.trim().is_empty() {
                return Err(Error::InvalidConfig {
                    key,
                    message: "color must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Hosts persist every numeric property as a JSON number, so a count may arrive as `2.0`.
fn whole_count(key: &'static str, v: &Value) -> Result<Value> {
    if v.is_u64() {
        return Ok(v.clone());
    }
    let Some(n) = v.as_f64() else {
        return Ok(v.clone());
    };
    if n.is_finite() && n >= 0.0 && n.fract() == 0.0 {
        return Ok(Value::from(n as u64));
    }
    Err(Error::InvalidConfig {
        key,
        message: format!("{n} is not a whole number >= 0"),
    })
}

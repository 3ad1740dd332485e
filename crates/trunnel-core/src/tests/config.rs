use crate::*;
use serde_json::json;

#[test]
fn tree_config_defaults_match_observed_constants() {
    let cfg = TreeConfig::default();
    assert_eq!(cfg.leaf_count, 3);
    assert_eq!(cfg.y_axis_width, 50.0);
    assert_eq!(cfg.y_leaves_axis_width, 50.0);
    assert_eq!(cfg.x_axis_height, 25.0);
    assert_eq!(cfg.trunk_height_percent, 0.4);
    assert_eq!(cfg.trunk_width_percent, 0.8);
    assert_eq!(cfg.leaves_height_percent, 0.8);
    assert_eq!(cfg.branch_spacing, 1.0);
    cfg.validate().unwrap();
}

#[test]
fn tree_config_partial_json_keeps_defaults() {
    let cfg = TreeConfig::from_value(&json!({ "leafCount": 2, "trunkWidthPercent": 0.5 })).unwrap();
    assert_eq!(cfg.leaf_count, 2);
    assert_eq!(cfg.trunk_width_percent, 0.5);
    assert_eq!(cfg.trunk_height_percent, 0.4);
    assert_eq!(cfg.color_end, "yellow");
}

#[test]
fn tree_config_rejects_out_of_range_percentages() {
    for bad in [0.0, -0.1, 1.5, f64::NAN] {
        let cfg = TreeConfig {
            leaves_height_percent: bad,
            ..Default::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidConfig {
                key: "leavesHeightPercent",
                ..
            }
        ));
    }
}

#[test]
fn tree_config_rejects_non_positive_branch_spacing() {
    let cfg = TreeConfig {
        branch_spacing: 0.0,
        ..Default::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn settings_override_tree_config() {
    let settings = VisualSettings::from_value(json!({
        "tree": { "leafCount": 2, "branchSpacing": 0.5 },
        "colors": { "colorEnd": "#00ff00" },
        "unrelated": { "leafCount": 9 }
    }));
    let cfg = settings.tree_config().unwrap();
    assert_eq!(cfg.leaf_count, 2);
    assert_eq!(cfg.branch_spacing, 0.5);
    assert_eq!(cfg.color_end, "#00ff00");
    assert_eq!(cfg.color_start, "red");
}

#[test]
fn settings_accept_whole_float_leaf_count() {
    let settings = VisualSettings::from_value(json!({ "tree": { "leafCount": 2.0 } }));
    assert_eq!(settings.tree_config().unwrap().leaf_count, 2);

    let cfg = TreeConfig::from_value(&json!({ "leafCount": 0.0 })).unwrap();
    assert_eq!(cfg.leaf_count, 0);
}

#[test]
fn settings_reject_fractional_or_negative_leaf_count() {
    for bad in [json!(2.5), json!(-1), json!(-1.0)] {
        let settings = VisualSettings::from_value(json!({ "tree": { "leafCount": bad } }));
        let err = settings.tree_config().unwrap_err();
        assert!(
            matches!(err, Error::InvalidConfig { key: "leafCount", .. }),
            "{err:?}"
        );
    }
}

#[test]
fn settings_set_value_and_deep_merge() {
    let mut settings = VisualSettings::from_value(json!(null));
    settings.set_value("tree.leafCount", json!(1));
    settings.deep_merge(&json!({ "tree": { "trunkWidthPercent": 0.6 } }));
    assert_eq!(settings.get_f64("tree.leafCount"), Some(1.0));
    assert_eq!(settings.get_f64("tree.trunkWidthPercent"), Some(0.6));
    assert_eq!(settings.get_str("colors.colorStart"), None);
}

#[test]
fn settings_enumerate_known_objects() {
    let settings = VisualSettings::from_value(json!({ "axes": { "xAxisHeight": 30.0 } }));
    let axes = settings.enumerate_object_instances("axes").unwrap();
    assert_eq!(axes.len(), 1);
    assert_eq!(axes[0].object_name, "axes");
    assert_eq!(axes[0].properties.get("xAxisHeight"), Some(&json!(30.0)));
    assert_eq!(axes[0].properties.get("yAxisWidth"), Some(&json!(50.0)));
    assert!(axes[0].properties.get("leafCount").is_none());

    assert!(settings.enumerate_object_instances("dataPoint").unwrap().is_empty());
    assert_eq!(
        VisualSettings::object_names().collect::<Vec<_>>(),
        ["tree", "axes", "colors"]
    );
}

#[test]
fn settings_with_invalid_values_fail_to_resolve() {
    let settings = VisualSettings::from_value(json!({ "tree": { "trunkHeightPercent": 2.0 } }));
    assert!(settings.tree_config().is_err());
}

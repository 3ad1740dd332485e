use crate::{Result, TreeConfig};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Host-enumerable objects and the `TreeConfig` keys each one owns.
const OBJECTS: &[(&str, &[&str])] = &[
    (
        "tree",
        &[
            "leafCount",
            "trunkHeightPercent",
            "trunkWidthPercent",
            "leavesHeightPercent",
            "branchSpacing",
        ],
    ),
    ("axes", &["yAxisWidth", "yLeavesAxisWidth", "xAxisHeight"]),
    ("colors", &["colorStart", "colorEnd"]),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualObjectInstance {
    pub object_name: String,
    #[serde(default)]
    pub selector: Option<Value>,
    pub properties: Map<String, Value>,
}

/// Persisted visual properties, shaped like the host's `objects` bag:
/// `{ "tree": { "leafCount": 3 }, "colors": { "colorEnd": "#00ff00" } }`.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualSettings(Value);

impl Default for VisualSettings {
    fn default() -> Self {
        Self::empty_object()
    }
}

impl VisualSettings {
    pub fn empty_object() -> Self {
        Self(Value::Object(Map::new()))
    }

    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn object_names() -> impl Iterator<Item = &'static str> {
        OBJECTS.iter().map(|(name, _)| *name)
    }

    pub fn get(&self, dotted_path: &str) -> Option<&Value> {
        let mut cur = &self.0;
        for segment in dotted_path.split('.') {
            cur = cur.as_object()?.get(segment)?;
        }
        Some(cur)
    }

    pub fn get_f64(&self, dotted_path: &str) -> Option<f64> {
        self.get(dotted_path).and_then(Value::as_f64)
    }

    pub fn get_str(&self, dotted_path: &str) -> Option<&str> {
        self.get(dotted_path).and_then(Value::as_str)
    }

    pub fn set_value(&mut self, dotted_path: &str, value: Value) {
        if !self.0.is_object() {
            self.0 = Value::Object(Map::new());
        }

        let Value::Object(ref mut root) = self.0 else {
            return;
        };
        let mut cur: &mut Map<String, Value> = root;
        let mut segments = dotted_path.split('.').peekable();
        while let Some(seg) = segments.next() {
            if segments.peek().is_none() {
                cur.insert(seg.to_string(), value);
                return;
            }
            let slot = cur.entry(seg).or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            let Some(next) = slot.as_object_mut() else {
                return;
            };
            cur = next;
        }
    }

    pub fn deep_merge(&mut self, other: &Value) {
        deep_merge_value(&mut self.0, other);
    }

    /// Resolves the effective layout config: defaults overridden by whatever the known objects
    /// carry. Unknown objects and keys are ignored.
    pub fn tree_config(&self) -> Result<TreeConfig> {
        let mut flat = serde_json::to_value(TreeConfig::default())?;
        if let Value::Object(flat) = &mut flat {
            for (object, keys) in OBJECTS {
                for key in *keys {
                    if let Some(v) = self.get(&format!("{object}.{key}")) {
                        flat.insert((*key).to_string(), v.clone());
                    }
                }
            }
        }
        TreeConfig::from_value(&flat)
    }

    /// Lists the property instances of one object for the host's property pane. Unknown
    /// object names produce no instances.
    pub fn enumerate_object_instances(&self, object_name: &str) -> Result<Vec<VisualObjectInstance>> {
        let Some((_, keys)) = OBJECTS.iter().find(|(name, _)| *name == object_name) else {
            return Ok(Vec::new());
        };
        let effective = serde_json::to_value(self.tree_config()?)?;
        let mut properties = Map::new();
        for key in *keys {
            if let Some(v) = effective.get(*key) {
                properties.insert((*key).to_string(), v.clone());
            }
        }
        Ok(vec![VisualObjectInstance {
            object_name: object_name.to_string(),
            selector: None,
            properties,
        }])
    }
}

fn deep_merge_value(base: &mut Value, incoming: &Value) {
    match (base, incoming) {
        (Value::Object(base_map), Value::Object(in_map)) => {
            for (key, in_value) in in_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge_value(base_value, in_value),
                    None => {
                        base_map.insert(key.clone(), in_value.clone());
                    }
                }
            }
        }
        (base_slot, in_value) => {
            *base_slot = in_value.clone();
        }
    }
}

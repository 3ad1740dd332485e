use crate::{Error, Result, Series, SeriesItem, VisualSettings};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Data handed over by the host on every update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataView {
    #[serde(default)]
    pub categorical: Option<CategoricalView>,
    #[serde(default)]
    pub metadata: DataViewMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoricalView {
    pub categories: Vec<String>,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataViewMetadata {
    /// Persisted visual properties (the host's `objects` bag).
    #[serde(default)]
    pub objects: Option<Value>,
}

impl DataView {
    pub fn from_series(series: &Series) -> Self {
        Self {
            categorical: Some(CategoricalView {
                categories: series.items().iter().map(|i| i.name.clone()).collect(),
                values: series.items().iter().map(|i| Some(i.value)).collect(),
            }),
            metadata: DataViewMetadata::default(),
        }
    }

    /// Converts the categorical columns into a series. `Ok(None)` means the view carries no
    /// categorical data at all.
    pub fn to_series(&self) -> Result<Option<Series>> {
        let Some(cat) = self.categorical.as_ref() else {
            return Ok(None);
        };
        if cat.categories.len() != cat.values.len() {
            return Err(Error::InvalidDataView {
                message: format!(
                    "{} categories but {} values",
                    cat.categories.len(),
                    cat.values.len()
                ),
            });
        }

        let mut items = Vec::with_capacity(cat.categories.len());
        for (name, value) in cat.categories.iter().zip(&cat.values) {
            let Some(value) = *value else {
                return Err(Error::InvalidDataView {
                    message: format!("category \"{name}\" has no value"),
                });
            };
            items.push(SeriesItem::new(name.clone(), value));
        }
        Ok(Some(Series::new(items)))
    }

    pub fn settings(&self) -> VisualSettings {
        match self.metadata.objects.as_ref() {
            Some(objects) => VisualSettings::from_value(objects.clone()),
            None => VisualSettings::empty_object(),
        }
    }
}

use crate::{Error, Result};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesItem {
    pub name: String,
    pub value: f64,
}

impl SeriesItem {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// An ordered category/value series. The last `leaf_count` items become leaves, everything
/// before them is a branch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Series(Vec<SeriesItem>);

impl Series {
    pub fn new(items: Vec<SeriesItem>) -> Self {
        Self(items)
    }

    /// Student outcomes dataset the chart was first built around.
    pub fn sample() -> Self {
        Self(vec![
            SeriesItem::new("Withdrawn", 15.0),
            SeriesItem::new("Transfered", 10.0),
            SeriesItem::new("Certificate", 5.0),
            SeriesItem::new("Diploma", 5.0),
            SeriesItem::new("1st", 20.0),
            SeriesItem::new("2.1", 20.0),
            SeriesItem::new("2.2", 20.0),
        ])
    }

    pub fn items(&self) -> &[SeriesItem] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Splits the series into its branch prefix and leaf suffix and derives the running sums.
    pub fn partition(&self, leaf_count: usize) -> Result<Partition> {
        if self.0.is_empty() {
            return Err(Error::EmptySeries);
        }
        for item in &self.0 {
            if !(item.value.is_finite() && item.value >= 0.0) {
                return Err(Error::InvalidValue {
                    name: item.name.clone(),
                    value: item.value,
                });
            }
        }
        if leaf_count >= self.0.len() {
            return Err(Error::NoBranches {
                leaf_count,
                series_len: self.0.len(),
            });
        }

        let branch_count = self.0.len() - leaf_count;
        let mut branch_names: IndexSet<String> = IndexSet::with_capacity(branch_count);
        let mut leaf_names: IndexSet<String> = IndexSet::with_capacity(leaf_count);
        let mut rows = Vec::with_capacity(self.0.len());

        let mut run_sum = 0.0;
        let mut leaf_run_sum = 0.0;
        let mut leaf_total = 0.0;

        for (index, item) in self.0.iter().enumerate() {
            let is_leaf = index >= branch_count;
            let (names, partition) = if is_leaf {
                leaf_total += item.value;
                (&mut leaf_names, "leaf")
            } else {
                (&mut branch_names, "branch")
            };
            if !names.insert(item.name.clone()) {
                return Err(Error::DuplicateCategory {
                    partition,
                    name: item.name.clone(),
                });
            }

            rows.push(DerivedRow {
                name: item.name.clone(),
                value: item.value,
                run_sum,
                leaf_run_sum,
                is_leaf,
            });

            run_sum += item.value;
            if is_leaf {
                leaf_run_sum += item.value;
            }
        }

        tracing::trace!(
            branch_count,
            leaf_count,
            total = run_sum,
            leaf_total,
            "partitioned series"
        );

        Ok(Partition {
            branch_names,
            leaf_names,
            rows,
            total_value: run_sum,
            leaf_total,
        })
    }
}

impl From<Vec<SeriesItem>> for Series {
    fn from(items: Vec<SeriesItem>) -> Self {
        Self(items)
    }
}

impl FromIterator<SeriesItem> for Series {
    fn from_iter<I: IntoIterator<Item = SeriesItem>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedRow {
    pub name: String,
    pub value: f64,
    /// Sum of the values of every preceding item.
    pub run_sum: f64,
    /// Sum of the values of preceding leaf items only; zero for every branch.
    pub leaf_run_sum: f64,
    pub is_leaf: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    pub branch_names: IndexSet<String>,
    pub leaf_names: IndexSet<String>,
    pub rows: Vec<DerivedRow>,
    pub total_value: f64,
    pub leaf_total: f64,
}

impl Partition {
    pub fn branch_count(&self) -> usize {
        self.branch_names.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.leaf_names.len()
    }

    pub fn item_count(&self) -> usize {
        self.rows.len()
    }

    pub fn branches(&self) -> impl Iterator<Item = &DerivedRow> {
        self.rows.iter().filter(|r| !r.is_leaf)
    }

    pub fn leaves(&self) -> impl Iterator<Item = &DerivedRow> {
        self.rows.iter().filter(|r| r.is_leaf)
    }
}

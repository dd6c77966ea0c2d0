use std::collections::BTreeMap;
use std::fmt;

use super::error::FilterError;
use super::model::{Dataset, DimValue, Dimension, Plan};

/// Label of the "no constraint" selector entry.
pub const ALL_LABEL: &str = "All";

// ---------------------------------------------------------------------------
// Filter predicate: which value is selected per dimension
// ---------------------------------------------------------------------------

/// The choice made in one selector.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    Only(DimValue),
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => f.write_str(ALL_LABEL),
            Selection::Only(v) => write!(f, "{v}"),
        }
    }
}

/// Per-dimension selection state.
/// A dimension that is absent means `All`, i.e. no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    selected: BTreeMap<Dimension, DimValue>,
}

impl FilterSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, dim: Dimension, value: impl Into<DimValue>) -> Self {
        self.set(dim, Selection::Only(value.into()));
        self
    }

    pub fn set(&mut self, dim: Dimension, selection: Selection) {
        match selection {
            Selection::All => {
                self.selected.remove(&dim);
            }
            Selection::Only(value) => {
                self.selected.insert(dim, value);
            }
        }
    }

    pub fn get(&self, dim: Dimension) -> Selection {
        self.selected
            .get(&dim)
            .cloned()
            .map(Selection::Only)
            .unwrap_or_default()
    }

    /// Put every dimension back to `All`.
    pub fn reset(&mut self) {
        self.selected.clear();
    }

    /// Dimensions that currently constrain rows.
    pub fn active(&self) -> impl Iterator<Item = (Dimension, &DimValue)> {
        self.selected.iter().map(|(d, v)| (*d, v))
    }

    pub fn is_all(&self) -> bool {
        self.selected.is_empty()
    }

    /// Parse a selector label for a dimension. `"All"` is the sentinel;
    /// capacity labels must be numeric.
    pub fn set_from_label(&mut self, dim: Dimension, label: &str) -> Result<(), FilterError> {
        let selection = if label == ALL_LABEL {
            Selection::All
        } else if dim.is_numeric() {
            let value = label
                .trim()
                .parse::<f64>()
                .map_err(|_| FilterError::InvalidValue {
                    dimension: dim.key().to_string(),
                    value: label.to_string(),
                })?;
            Selection::Only(DimValue::Number(value))
        } else {
            Selection::Only(DimValue::Text(label.to_string()))
        };
        self.set(dim, selection);
        Ok(())
    }

    /// Build a selection from key/value pairs as they arrive from a UI.
    /// Keys are dimension keys (`country`) or source columns (`Country`).
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut selection = Self::new();
        for (key, value) in pairs {
            let dim = Dimension::from_name(key)
                .ok_or_else(|| FilterError::UnknownDimension(key.to_string()))?;
            selection.set_from_label(dim, value)?;
        }
        Ok(selection)
    }

    fn accepts(&self, plan: &Plan) -> bool {
        self.selected
            .iter()
            .all(|(dim, value)| plan.matches(*dim, value))
    }
}

/// Selector entries for a dimension: `All` followed by the sorted distinct values.
pub fn selector_options(dataset: &Dataset, dim: Dimension) -> Vec<Selection> {
    std::iter::once(Selection::All)
        .chain(
            dataset
                .unique_values
                .get(&dim)
                .into_iter()
                .flatten()
                .cloned()
                .map(Selection::Only),
        )
        .collect()
}

// ---------------------------------------------------------------------------
// Filtered view
// ---------------------------------------------------------------------------

/// A read-only subset of a dataset, held as row indices.
#[derive(Debug, Clone)]
pub struct PlanView<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> PlanView<'a> {
    /// Every row of the dataset.
    pub fn all(dataset: &'a Dataset) -> Self {
        Self {
            dataset,
            indices: (0..dataset.len()).collect(),
        }
    }

    /// Narrow this view further. Filters are independent equality
    /// predicates, so the order of successive calls does not matter.
    pub fn filter(&self, selection: &FilterSelection) -> Self {
        let indices = self
            .indices
            .iter()
            .copied()
            .filter(|&i| selection.accepts(&self.dataset.plans[i]))
            .collect();
        Self {
            dataset: self.dataset,
            indices,
        }
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Plan> + '_ {
        let dataset: &'a Dataset = self.dataset;
        self.indices.iter().map(move |&i| &dataset.plans[i])
    }
}

/// Apply a selection to the full dataset.
pub fn apply<'a>(dataset: &'a Dataset, selection: &FilterSelection) -> PlanView<'a> {
    PlanView::all(dataset).filter(selection)
}

/// Return indices of plans that pass all active filters.
pub fn filtered_indices(dataset: &Dataset, selection: &FilterSelection) -> Vec<usize> {
    apply(dataset, selection).indices
}

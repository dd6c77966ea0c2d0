use std::collections::HashMap;

use super::filter::PlanView;
use super::model::{DimValue, Dimension, Field, Plan};

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// Collect `extract(plan)` per distinct value of `dim`, keyed in order of
/// first appearance. Rows with a missing key form their own
/// [`DimValue::Missing`] group. Rows where `extract` yields nothing are
/// skipped, so a group always holds at least one item.
fn group<'a, T>(
    view: &PlanView<'a>,
    dim: Dimension,
    extract: impl Fn(&'a Plan) -> Option<T>,
) -> Vec<(DimValue, Vec<T>)> {
    let mut position: HashMap<DimValue, usize> = HashMap::new();
    let mut groups: Vec<(DimValue, Vec<T>)> = Vec::new();

    for plan in view.iter() {
        let key = plan.value(dim);
        let Some(item) = extract(plan) else {
            continue;
        };
        match position.get(&key) {
            Some(&i) => groups[i].1.push(item),
            None => {
                position.insert(key.clone(), groups.len());
                groups.push((key, vec![item]));
            }
        }
    }
    groups
}

/// Arithmetic mean of the finite inputs, kept within their `[min, max]`.
fn mean(values: &[f64]) -> Option<f64> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return None;
    }
    let sum: f64 = finite.iter().sum();
    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = sum / finite.len() as f64;
    if min <= max {
        Some(mean.clamp(min, max))
    } else {
        Some(mean)
    }
}

// ---------------------------------------------------------------------------
// Single-metric aggregation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Count,
    Mean(Field),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupRow {
    pub key: DimValue,
    pub value: f64,
}

/// Grouped summary keyed by dimension value, in order of first appearance.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationResult {
    pub dimension: Dimension,
    pub metric: Metric,
    pub rows: Vec<GroupRow>,
}

impl AggregationResult {
    pub fn get(&self, key: &DimValue) -> Option<f64> {
        self.rows.iter().find(|r| &r.key == key).map(|r| r.value)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.rows.iter().map(|r| r.value).sum()
    }
}

/// Count rows, or average a field, per distinct value of `dim`.
///
/// For [`Metric::Mean`] only rows where the field is defined contribute, so
/// plans without a `price_per_GB` drop out of that mean.
pub fn group_by(view: &PlanView<'_>, dim: Dimension, metric: Metric) -> AggregationResult {
    let rows = match metric {
        Metric::Count => group(view, dim, |_| Some(()))
            .into_iter()
            .map(|(key, items)| GroupRow {
                key,
                value: items.len() as f64,
            })
            .collect(),
        Metric::Mean(field) => group(view, dim, |p| field.value(p))
            .into_iter()
            .filter_map(|(key, values)| mean(&values).map(|value| GroupRow { key, value }))
            .collect(),
    };
    AggregationResult {
        dimension: dim,
        metric,
        rows,
    }
}

// ---------------------------------------------------------------------------
// Joint count + mean
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct JointRow {
    pub key: DimValue,
    pub count: usize,
    /// `None` when no row in the group has the field defined.
    pub mean: Option<f64>,
}

/// Two metrics over the same grouping: number of plans and mean of `field`.
pub fn count_and_mean(view: &PlanView<'_>, dim: Dimension, field: Field) -> Vec<JointRow> {
    group(view, dim, |p| Some(field.value(p)))
        .into_iter()
        .map(|(key, values)| {
            let defined: Vec<f64> = values.iter().flatten().copied().collect();
            JointRow {
                key,
                count: values.len(),
                mean: mean(&defined),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Distribution (pie)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ShareRow {
    pub key: DimValue,
    pub count: usize,
    /// Share of all grouped rows, in `[0, 1]`.
    pub fraction: f64,
}

pub fn distribution(view: &PlanView<'_>, dim: Dimension) -> Vec<ShareRow> {
    let groups = group(view, dim, |_| Some(()));
    let total: usize = groups.iter().map(|(_, items)| items.len()).sum();
    groups
        .into_iter()
        .map(|(key, items)| ShareRow {
            key,
            count: items.len(),
            fraction: items.len() as f64 / total as f64,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Spread (box plot)
// ---------------------------------------------------------------------------

/// Five-number summary plus mean.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub mean: f64,
}

impl Summary {
    /// `None` when no input is finite.
    pub fn of(values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        sorted.sort_by(f64::total_cmp);
        let mean = mean(&sorted)?;
        Some(Summary {
            min: sorted[0],
            q1: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q3: quantile(&sorted, 0.75),
            max: sorted[sorted.len() - 1],
            mean,
        })
    }
}

/// Linear interpolation between closest ranks. `sorted` must be non-empty.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpreadRow {
    pub key: DimValue,
    pub values: Vec<f64>,
    pub summary: Summary,
}

pub fn spread(view: &PlanView<'_>, dim: Dimension, field: Field) -> Vec<SpreadRow> {
    group(view, dim, |p| field.value(p).filter(|v| v.is_finite()))
        .into_iter()
        .filter_map(|(key, values)| {
            let summary = Summary::of(&values)?;
            Some(SpreadRow {
                key,
                values,
                summary,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{apply, FilterSelection};
    use crate::data::model::tests::plan;
    use crate::data::model::Dataset;

    fn dataset() -> Dataset {
        let mut zero = plan("Asia", "Japan", "Y", 0.0, 2.0);
        zero.capacity_gb = None;
        Dataset::from_plans(
            vec![
                plan("Asia", "Japan", "X", 1000.0, 10.0),
                plan("Europe", "France", "X", 2000.0, 20.0),
                plan("Asia", "Japan", "X", 3000.0, 30.0),
                plan("Asia", "Korea", "X", 1000.0, 40.0),
                plan("Europe", "France", "Y", 1000.0, 5.0),
                zero,
            ],
            Vec::new(),
        )
    }

    #[test]
    fn test_count_per_country_in_first_appearance_order() {
        let ds = dataset();
        let result = group_by(&PlanView::all(&ds), Dimension::Country, Metric::Count);
        let keys: Vec<String> = result.rows.iter().map(|r| r.key.to_string()).collect();
        assert_eq!(keys, vec!["Japan", "France", "Korea"]);
        assert_eq!(result.get(&"Japan".into()), Some(3.0));
        assert_eq!(result.get(&"France".into()), Some(2.0));
    }

    #[test]
    fn test_count_total_matches_filtered_rows() {
        let ds = dataset();
        for selection in [
            FilterSelection::new(),
            FilterSelection::new().with(Dimension::Region, "Asia"),
            FilterSelection::new().with(Dimension::Provider, "Y"),
            FilterSelection::new().with(Dimension::Country, "Nowhere"),
        ] {
            let view = apply(&ds, &selection);
            for dim in Dimension::ALL {
                let result = group_by(&view, dim, Metric::Count);
                assert_eq!(result.total() as usize, view.len(), "{dim}");
                let shares: usize = distribution(&view, dim).iter().map(|s| s.count).sum();
                assert_eq!(shares, view.len(), "{dim}");
            }
        }
    }

    #[test]
    fn test_single_filter_scenario() {
        let ds = Dataset::from_plans(
            vec![
                plan("Asia", "Japan", "A", 1000.0, 1.0),
                plan("Asia", "Korea", "A", 1000.0, 1.0),
                plan("Asia", "Japan", "B", 1000.0, 1.0),
                plan("Europe", "Spain", "B", 1000.0, 1.0),
                plan("Asia", "Japan", "C", 1000.0, 1.0),
            ],
            Vec::new(),
        );
        let view = apply(&ds, &FilterSelection::new().with(Dimension::Country, "Japan"));
        assert_eq!(view.len(), 3);
        let result = group_by(&view, Dimension::Country, Metric::Count);
        assert_eq!(
            result.rows,
            vec![GroupRow {
                key: "Japan".into(),
                value: 3.0
            }]
        );
    }

    #[test]
    fn test_empty_view_gives_empty_results() {
        let ds = dataset();
        let selection = FilterSelection::new()
            .with(Dimension::Region, "Asia")
            .with(Dimension::Provider, "AstroCell");
        let view = apply(&ds, &selection);
        assert!(view.is_empty());
        assert!(group_by(&view, Dimension::Country, Metric::Count).is_empty());
        assert!(group_by(&view, Dimension::Country, Metric::Mean(Field::UsdPrice)).is_empty());
        assert!(count_and_mean(&view, Dimension::Provider, Field::UsdPrice).is_empty());
        assert!(distribution(&view, Dimension::CapacityGb).is_empty());
        assert!(spread(&view, Dimension::CapacityGb, Field::UsdPrice).is_empty());
    }

    #[test]
    fn test_provider_joint_aggregation() {
        let ds = dataset();
        let view = apply(&ds, &FilterSelection::new().with(Dimension::Provider, "X"));
        let rows = count_and_mean(&view, Dimension::Provider, Field::UsdPrice);
        assert_eq!(
            rows,
            vec![JointRow {
                key: "X".into(),
                count: 4,
                mean: Some(25.0)
            }]
        );
    }

    #[test]
    fn test_mean_price_per_gb_skips_underivable_rows() {
        let ds = dataset();
        let view = PlanView::all(&ds);
        let per_gb = group_by(&view, Dimension::Country, Metric::Mean(Field::PricePerGb));
        // Japan: 10/1 and 30/3; the zero-capacity plan does not contribute.
        assert_eq!(per_gb.get(&"Japan".into()), Some(10.0));
        let price = group_by(&view, Dimension::Country, Metric::Mean(Field::UsdPrice));
        assert_eq!(price.get(&"Japan".into()), Some(14.0));
    }

    #[test]
    fn test_mean_within_group_bounds() {
        let ds = Dataset::from_plans(
            vec![
                plan("Asia", "Japan", "A", 1000.0, 0.1),
                plan("Asia", "Japan", "A", 1000.0, 0.1),
                plan("Asia", "Japan", "A", 1000.0, 0.1),
                plan("Asia", "Korea", "A", 1000.0, 3.3),
                plan("Asia", "Korea", "A", 1000.0, 7.9),
            ],
            Vec::new(),
        );
        let view = PlanView::all(&ds);
        let result = group_by(&view, Dimension::Country, Metric::Mean(Field::UsdPrice));
        for row in &result.rows {
            let values: Vec<f64> = view
                .iter()
                .filter(|p| p.value(Dimension::Country) == row.key)
                .map(|p| p.usd_price)
                .collect();
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            assert!(min <= row.value && row.value <= max, "{row:?}");
        }
    }

    #[test]
    fn test_non_finite_prices_do_not_poison_means() {
        let mut broken = plan("Asia", "Japan", "X", 1000.0, 0.0);
        broken.usd_price = f64::NAN;
        let mut infinite = plan("Asia", "Korea", "X", 1000.0, 0.0);
        infinite.usd_price = f64::INFINITY;
        let ds = Dataset::from_plans(
            vec![plan("Asia", "Japan", "X", 1000.0, 8.0), broken, infinite],
            Vec::new(),
        );
        let view = PlanView::all(&ds);

        let result = group_by(&view, Dimension::Country, Metric::Mean(Field::UsdPrice));
        assert_eq!(result.get(&"Japan".into()), Some(8.0));
        assert_eq!(result.get(&"Korea".into()), None);

        let joint = count_and_mean(&view, Dimension::Provider, Field::UsdPrice);
        assert_eq!(joint[0].count, 3);
        assert_eq!(joint[0].mean, Some(8.0));

        let rows = spread(&view, Dimension::Country, Field::UsdPrice);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].values, vec![8.0]);
        assert_eq!(rows[0].summary.median, 8.0);
    }

    #[test]
    fn test_distribution_fractions() {
        let ds = dataset();
        let shares = distribution(&PlanView::all(&ds), Dimension::CapacityGb);
        let total: usize = shares.iter().map(|s| s.count).sum();
        assert_eq!(total, 6);
        let one_gb = shares.iter().find(|s| s.key == DimValue::from(1.0)).unwrap();
        assert_eq!(one_gb.count, 3);
        assert!((one_gb.fraction - 0.5).abs() < 1e-12);
        // The plan with no capacity gets its own bucket.
        let unknown = shares.iter().find(|s| s.key.is_missing()).unwrap();
        assert_eq!(unknown.count, 1);
        assert_eq!(unknown.key.to_string(), "Unknown");
        let sum: f64 = shares.iter().map(|s| s.fraction).sum();
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_spread_summary() {
        let summary = Summary::of(&[40.0, 10.0, 30.0, 20.0]).unwrap();
        assert_eq!(summary.min, 10.0);
        assert_eq!(summary.max, 40.0);
        assert_eq!(summary.median, 25.0);
        assert_eq!(summary.q1, 17.5);
        assert_eq!(summary.q3, 32.5);
        assert_eq!(summary.mean, 25.0);
        assert!(Summary::of(&[]).is_none());

        let ds = dataset();
        let rows = spread(&PlanView::all(&ds), Dimension::CapacityGb, Field::UsdPrice);
        let one_gb = rows.iter().find(|r| r.key == DimValue::from(1.0)).unwrap();
        assert_eq!(one_gb.values, vec![10.0, 40.0, 5.0]);
        assert_eq!(one_gb.summary.median, 10.0);
    }
}

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ---------------------------------------------------------------------------
// DimValue – a single cell in a dimension column
// ---------------------------------------------------------------------------

/// A dimension value as it appears in a selector or as a group key.
/// Used as a `BTreeSet` / `HashMap` key downstream, so it must be `Ord + Hash`.
#[derive(Debug, Clone)]
pub enum DimValue {
    Text(String),
    /// Capacity buckets are numeric (`Capacity_in_GB`).
    Number(f64),
    Missing,
}

// -- Manual Eq/Ord so we can put DimValue in BTreeSet --

impl PartialEq for DimValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for DimValue {}

impl PartialOrd for DimValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DimValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use DimValue::*;
        fn discriminant(v: &DimValue) -> u8 {
            match v {
                Missing => 0,
                Number(_) => 1,
                Text(_) => 2,
            }
        }
        match (self, other) {
            (Missing, Missing) => std::cmp::Ordering::Equal,
            (Number(a), Number(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => discriminant(self).cmp(&discriminant(other)),
        }
    }
}

impl std::hash::Hash for DimValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            DimValue::Text(s) => s.hash(state),
            DimValue::Number(f) => f.to_bits().hash(state),
            DimValue::Missing => {}
        }
    }
}

impl fmt::Display for DimValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DimValue::Text(s) => write!(f, "{s}"),
            DimValue::Number(v) => write!(f, "{v}"),
            DimValue::Missing => write!(f, "Unknown"),
        }
    }
}

impl From<&str> for DimValue {
    fn from(s: &str) -> Self {
        DimValue::Text(s.to_string())
    }
}

impl From<f64> for DimValue {
    fn from(v: f64) -> Self {
        DimValue::Number(v)
    }
}

impl DimValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, DimValue::Missing)
    }
}

// ---------------------------------------------------------------------------
// Dimension – categorical columns usable for filtering and grouping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dimension {
    Region,
    Country,
    Provider,
    PlanType,
    CapacityGb,
    Period,
}

impl Dimension {
    /// Selector order, as laid out in the filter bar.
    pub const ALL: [Dimension; 6] = [
        Dimension::Region,
        Dimension::Country,
        Dimension::Provider,
        Dimension::PlanType,
        Dimension::CapacityGb,
        Dimension::Period,
    ];

    /// Column name in the source file (after whitespace normalisation).
    pub fn column(self) -> &'static str {
        match self {
            Dimension::Region => "Region",
            Dimension::Country => "Country",
            Dimension::Provider => "provider.name",
            Dimension::PlanType => "Plan_Type",
            Dimension::CapacityGb => "Capacity_in_GB",
            Dimension::Period => "period",
        }
    }

    /// Stable key used in key/value selections.
    pub fn key(self) -> &'static str {
        match self {
            Dimension::Region => "region",
            Dimension::Country => "country",
            Dimension::Provider => "provider_name",
            Dimension::PlanType => "plan_type",
            Dimension::CapacityGb => "capacity_GB",
            Dimension::Period => "period",
        }
    }

    /// Human label shown next to the selector.
    pub fn label(self) -> &'static str {
        match self {
            Dimension::Region => "Region",
            Dimension::Country => "Country",
            Dimension::Provider => "Provider",
            Dimension::PlanType => "Plan type",
            Dimension::CapacityGb => "Capacity",
            Dimension::Period => "Period",
        }
    }

    /// Resolve either a selection key or a source column name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|d| d.key() == name || d.column() == name)
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Dimension::CapacityGb)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// ---------------------------------------------------------------------------
// Field – numeric columns usable as aggregation inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    UsdPrice,
    PricePerGb,
}

impl Field {
    /// Read the field from a plan. `None` means undefined for this row.
    pub fn value(self, plan: &Plan) -> Option<f64> {
        match self {
            Field::UsdPrice => Some(plan.usd_price),
            Field::PricePerGb => plan.price_per_gb,
        }
    }
}

// ---------------------------------------------------------------------------
// Plan – one row of the dataset
// ---------------------------------------------------------------------------

/// A single eSIM plan offering.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub region: String,
    pub country: String,
    pub provider_name: String,
    pub plan_type: String,
    pub capacity_mb: Option<f64>,
    pub capacity_gb: Option<f64>,
    pub usd_price: f64,
    pub period: String,
    /// `usd_price / (capacity_mb / 1000)`; `None` when capacity is zero or missing.
    pub price_per_gb: Option<f64>,
}

impl Plan {
    /// The dimension cell for this row.
    pub fn value(&self, dim: Dimension) -> DimValue {
        match dim {
            Dimension::CapacityGb => self
                .capacity_gb
                .map(DimValue::Number)
                .unwrap_or(DimValue::Missing),
            text => DimValue::Text(self.text(text).unwrap_or_default().to_string()),
        }
    }

    /// Exact, case-sensitive equality against a selected value.
    pub fn matches(&self, dim: Dimension, selected: &DimValue) -> bool {
        match (dim, selected) {
            (Dimension::CapacityGb, DimValue::Number(want)) => self
                .capacity_gb
                .is_some_and(|have| have.total_cmp(want).is_eq()),
            (Dimension::CapacityGb, DimValue::Missing) => self.capacity_gb.is_none(),
            (Dimension::CapacityGb, DimValue::Text(_)) => false,
            (dim, DimValue::Text(want)) => self.text(dim) == Some(want.as_str()),
            (_, _) => false,
        }
    }

    fn text(&self, dim: Dimension) -> Option<&str> {
        match dim {
            Dimension::Region => Some(&self.region),
            Dimension::Country => Some(&self.country),
            Dimension::Provider => Some(&self.provider_name),
            Dimension::PlanType => Some(&self.plan_type),
            Dimension::Period => Some(&self.period),
            Dimension::CapacityGb => None,
        }
    }
}

/// Derive price per GB. Undefined unless capacity is strictly positive and
/// the result is finite.
pub fn derive_price_per_gb(usd_price: f64, capacity_mb: Option<f64>) -> Option<f64> {
    let mb = capacity_mb.filter(|mb| *mb > 0.0)?;
    let value = usd_price / (mb / 1000.0);
    value.is_finite().then_some(value)
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed selector values.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// All plans (rows), in source order.
    pub plans: Vec<Plan>,
    /// Normalised column names in source order, plus `price_per_GB`.
    pub column_names: Vec<String>,
    /// For each dimension the sorted set of distinct present values.
    pub unique_values: BTreeMap<Dimension, BTreeSet<DimValue>>,
    /// Rows (0-based) whose `price_per_GB` could not be derived.
    pub underivable_rows: Vec<usize>,
}

impl Dataset {
    /// Build selector indices from the loaded plans.
    pub fn from_plans(plans: Vec<Plan>, column_names: Vec<String>) -> Self {
        let mut unique_values: BTreeMap<Dimension, BTreeSet<DimValue>> = Dimension::ALL
            .into_iter()
            .map(|d| (d, BTreeSet::new()))
            .collect();
        let mut underivable_rows = Vec::new();

        for (row, plan) in plans.iter().enumerate() {
            for dim in Dimension::ALL {
                let value = plan.value(dim);
                if !value.is_missing() {
                    unique_values.entry(dim).or_default().insert(value);
                }
            }
            if plan.price_per_gb.is_none() {
                underivable_rows.push(row);
            }
        }

        Dataset {
            plans,
            column_names,
            unique_values,
            underivable_rows,
        }
    }

    /// Number of plans.
    pub fn len(&self) -> usize {
        self.plans.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build a plan with a derived price per GB.
    pub(crate) fn plan(
        region: &str,
        country: &str,
        provider: &str,
        capacity_mb: f64,
        usd_price: f64,
    ) -> Plan {
        Plan {
            region: region.to_string(),
            country: country.to_string(),
            provider_name: provider.to_string(),
            plan_type: "Data only".to_string(),
            capacity_mb: Some(capacity_mb),
            capacity_gb: Some(capacity_mb / 1000.0),
            usd_price,
            period: "30 days".to_string(),
            price_per_gb: derive_price_per_gb(usd_price, Some(capacity_mb)),
        }
    }

    #[test]
    fn test_price_per_gb_derivation() {
        let value = derive_price_per_gb(10.0, Some(2000.0)).unwrap();
        assert!((value - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_price_per_gb_undefined_for_zero_or_missing_capacity() {
        assert_eq!(derive_price_per_gb(10.0, Some(0.0)), None);
        assert_eq!(derive_price_per_gb(10.0, None), None);
        assert_eq!(derive_price_per_gb(10.0, Some(-500.0)), None);
    }

    #[test]
    fn test_dim_value_ordering() {
        let mut values = vec![
            DimValue::from("b"),
            DimValue::from(10.0),
            DimValue::Missing,
            DimValue::from(0.5),
            DimValue::from("a"),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![
                DimValue::Missing,
                DimValue::from(0.5),
                DimValue::from(10.0),
                DimValue::from("a"),
                DimValue::from("b"),
            ]
        );
    }

    #[test]
    fn test_matches_is_case_sensitive() {
        let p = plan("Asia", "Japan", "AstroCell", 1000.0, 4.5);
        assert!(p.matches(Dimension::Country, &DimValue::from("Japan")));
        assert!(!p.matches(Dimension::Country, &DimValue::from("japan")));
        assert!(p.matches(Dimension::CapacityGb, &DimValue::from(1.0)));
        assert!(!p.matches(Dimension::CapacityGb, &DimValue::from("1")));
    }

    #[test]
    fn test_dataset_indices() {
        let mut zero = plan("Asia", "Japan", "AstroCell", 0.0, 3.0);
        zero.capacity_gb = None;
        let ds = Dataset::from_plans(
            vec![
                plan("Asia", "Japan", "AstroCell", 1000.0, 4.5),
                plan("Europe", "France", "Nomad", 3000.0, 9.0),
                zero,
            ],
            Vec::new(),
        );
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.underivable_rows, vec![2]);
        let countries = &ds.unique_values[&Dimension::Country];
        assert_eq!(countries.len(), 2);
        // Missing capacity never shows up as a selectable value.
        assert_eq!(ds.unique_values[&Dimension::CapacityGb].len(), 2);
    }

    #[test]
    fn test_dimension_from_name() {
        assert_eq!(Dimension::from_name("provider.name"), Some(Dimension::Provider));
        assert_eq!(Dimension::from_name("provider_name"), Some(Dimension::Provider));
        assert_eq!(Dimension::from_name("Capacity_in_GB"), Some(Dimension::CapacityGb));
        assert_eq!(Dimension::from_name("colour"), None);
    }
}

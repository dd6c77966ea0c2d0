use std::fmt;
use std::str::FromStr;

use super::aggregate::Metric;
use super::error::UnknownViewError;
use super::model::{Dimension, Field};

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PageId {
    #[default]
    CountryAnalysis,
    ProviderAnalysis,
    PlanTypeAndCapacity,
    PricingAnalysis,
    AllPlans,
}

impl PageId {
    /// Navigation order in the sidebar.
    pub const ALL: [PageId; 5] = [
        PageId::CountryAnalysis,
        PageId::ProviderAnalysis,
        PageId::PlanTypeAndCapacity,
        PageId::PricingAnalysis,
        PageId::AllPlans,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PageId::CountryAnalysis => "Country Analysis",
            PageId::ProviderAnalysis => "Provider Analysis",
            PageId::PlanTypeAndCapacity => "Plan Type & Capacity",
            PageId::PricingAnalysis => "Pricing Analysis",
            PageId::AllPlans => "All Plans",
        }
    }

    /// Heading shown above the page content.
    pub fn heading(self) -> &'static str {
        match self {
            PageId::AllPlans => "Tabular View of All plans",
            other => other.label(),
        }
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PageId {
    type Err = UnknownViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PageId::ALL
            .into_iter()
            .find(|p| p.label() == s)
            .ok_or_else(|| UnknownViewError(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Requests and encodings
// ---------------------------------------------------------------------------

/// What to compute from the filtered plans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    GroupBy { dimension: Dimension, metric: Metric },
    CountAndMean { dimension: Dimension, field: Field },
    Distribution { dimension: Dimension },
    Spread { dimension: Dimension, field: Field },
    /// The filtered rows themselves.
    Rows,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// Per-country shading.
    Choropleth,
    Bar,
    /// Donut with percent + label.
    Pie,
    Box,
    Table,
}

/// Which metric of a result a chart binds to its value axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    Count,
    Mean,
}

/// How one chart binds a query result to visual channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Encoding {
    pub kind: ChartKind,
    pub title: &'static str,
    pub x: &'static str,
    pub y: &'static str,
    /// The value axis also drives the colour scale.
    pub color_by_value: bool,
    pub measure: Measure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationRequest {
    pub query: Query,
    pub charts: Vec<Encoding>,
}

// ---------------------------------------------------------------------------
// Page → requests
// ---------------------------------------------------------------------------

/// The aggregations a page needs and how each is drawn.
///
/// `PlanTypeAndCapacity` and `PricingAnalysis` are navigable but have no views yet.
pub fn views_for(page: PageId) -> Vec<AggregationRequest> {
    match page {
        PageId::CountryAnalysis => vec![
            AggregationRequest {
                query: Query::GroupBy {
                    dimension: Dimension::Country,
                    metric: Metric::Count,
                },
                charts: vec![
                    Encoding {
                        kind: ChartKind::Choropleth,
                        title: "Number of eSIM Plans by Country",
                        x: "Country",
                        y: "Number of Plans",
                        color_by_value: true,
                        measure: Measure::Count,
                    },
                    Encoding {
                        kind: ChartKind::Bar,
                        title: "Number of eSIM Plans by Country",
                        x: "Country",
                        y: "Number of Plans",
                        color_by_value: true,
                        measure: Measure::Count,
                    },
                ],
            },
            AggregationRequest {
                query: Query::GroupBy {
                    dimension: Dimension::Country,
                    metric: Metric::Mean(Field::UsdPrice),
                },
                charts: vec![Encoding {
                    kind: ChartKind::Bar,
                    title: "Average Price of eSIM Plans per Country",
                    x: "Country",
                    y: "Average Price per Plan",
                    color_by_value: true,
                    measure: Measure::Mean,
                }],
            },
            AggregationRequest {
                query: Query::GroupBy {
                    dimension: Dimension::Country,
                    metric: Metric::Mean(Field::PricePerGb),
                },
                charts: vec![Encoding {
                    kind: ChartKind::Bar,
                    title: "Average Price per GB by Country",
                    x: "Country",
                    y: "Average Price per GB (USD)",
                    color_by_value: true,
                    measure: Measure::Mean,
                }],
            },
        ],
        PageId::ProviderAnalysis => vec![
            AggregationRequest {
                query: Query::CountAndMean {
                    dimension: Dimension::Provider,
                    field: Field::UsdPrice,
                },
                charts: vec![
                    Encoding {
                        kind: ChartKind::Bar,
                        title: "Number of Plans per Provider",
                        x: "Provider",
                        y: "Number of Plans",
                        color_by_value: true,
                        measure: Measure::Count,
                    },
                    Encoding {
                        kind: ChartKind::Bar,
                        title: "Average Price per Provider",
                        x: "Provider",
                        y: "Average Price",
                        color_by_value: true,
                        measure: Measure::Mean,
                    },
                ],
            },
            AggregationRequest {
                query: Query::Distribution {
                    dimension: Dimension::CapacityGb,
                },
                charts: vec![Encoding {
                    kind: ChartKind::Pie,
                    title: "Distribution of Plan Types by Capacity",
                    x: "Capacity_in_GB",
                    y: "Number of Plans",
                    color_by_value: false,
                    measure: Measure::Count,
                }],
            },
            AggregationRequest {
                query: Query::Spread {
                    dimension: Dimension::CapacityGb,
                    field: Field::UsdPrice,
                },
                charts: vec![Encoding {
                    kind: ChartKind::Box,
                    title: "Price Distributions for Different Capacity Ranges",
                    x: "Capacity_in_GB",
                    y: "usdPrice",
                    color_by_value: false,
                    measure: Measure::Mean,
                }],
            },
        ],
        PageId::PlanTypeAndCapacity | PageId::PricingAnalysis => Vec::new(),
        PageId::AllPlans => vec![AggregationRequest {
            query: Query::Rows,
            charts: vec![Encoding {
                kind: ChartKind::Table,
                title: "Tabular View of All plans",
                x: "",
                y: "",
                color_by_value: false,
                measure: Measure::Count,
            }],
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_round_trip() {
        for page in PageId::ALL {
            assert_eq!(page.label().parse::<PageId>(), Ok(page));
        }
    }

    #[test]
    fn test_unknown_page() {
        assert_eq!(
            "Trend Analysis".parse::<PageId>(),
            Err(UnknownViewError("Trend Analysis".to_string()))
        );
    }

    #[test]
    fn test_country_analysis_views() {
        let requests = views_for(PageId::CountryAnalysis);
        let queries: Vec<Query> = requests.iter().map(|r| r.query).collect();
        assert_eq!(
            queries,
            vec![
                Query::GroupBy {
                    dimension: Dimension::Country,
                    metric: Metric::Count
                },
                Query::GroupBy {
                    dimension: Dimension::Country,
                    metric: Metric::Mean(Field::UsdPrice)
                },
                Query::GroupBy {
                    dimension: Dimension::Country,
                    metric: Metric::Mean(Field::PricePerGb)
                },
            ]
        );
        let kinds: Vec<ChartKind> = requests[0].charts.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![ChartKind::Choropleth, ChartKind::Bar]);
    }

    #[test]
    fn test_provider_analysis_views() {
        let requests = views_for(PageId::ProviderAnalysis);
        assert_eq!(requests.len(), 3);
        assert!(matches!(
            requests[0].query,
            Query::CountAndMean {
                dimension: Dimension::Provider,
                field: Field::UsdPrice
            }
        ));
        let measures: Vec<Measure> = requests[0].charts.iter().map(|c| c.measure).collect();
        assert_eq!(measures, vec![Measure::Count, Measure::Mean]);
        assert_eq!(requests[1].charts[0].kind, ChartKind::Pie);
        assert_eq!(requests[2].charts[0].kind, ChartKind::Box);
    }

    #[test]
    fn test_placeholder_pages_are_empty_and_all_plans_is_a_table() {
        assert!(views_for(PageId::PlanTypeAndCapacity).is_empty());
        assert!(views_for(PageId::PricingAnalysis).is_empty());
        let all = views_for(PageId::AllPlans);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].query, Query::Rows);
    }

    #[test]
    fn test_views_for_is_idempotent() {
        for page in PageId::ALL {
            assert_eq!(views_for(page), views_for(page));
        }
    }
}

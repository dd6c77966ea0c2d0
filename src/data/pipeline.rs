use super::aggregate::{
    count_and_mean, distribution, group_by, spread, AggregationResult, JointRow, ShareRow,
    SpreadRow,
};
use super::error::RequestError;
use super::filter::{apply, FilterSelection, PlanView};
use super::model::Dataset;
use super::view::{views_for, AggregationRequest, PageId, Query};

/// Computed data for one request.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewData {
    Grouped(AggregationResult),
    Joint(Vec<JointRow>),
    Shares(Vec<ShareRow>),
    Spread(Vec<SpreadRow>),
    /// Indices into the dataset's plans.
    Rows(Vec<usize>),
}

impl ViewData {
    pub fn is_empty(&self) -> bool {
        match self {
            ViewData::Grouped(r) => r.is_empty(),
            ViewData::Joint(rows) => rows.is_empty(),
            ViewData::Shares(rows) => rows.is_empty(),
            ViewData::Spread(rows) => rows.is_empty(),
            ViewData::Rows(rows) => rows.is_empty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub request: AggregationRequest,
    pub data: ViewData,
}

/// Everything one page render needs, computed in a single pass.
#[derive(Debug, Clone, PartialEq)]
pub struct PageReport {
    pub page: PageId,
    pub total_rows: usize,
    pub filtered_rows: usize,
    pub panels: Vec<Panel>,
}

pub fn evaluate(query: Query, view: &PlanView<'_>) -> ViewData {
    match query {
        Query::GroupBy { dimension, metric } => ViewData::Grouped(group_by(view, dimension, metric)),
        Query::CountAndMean { dimension, field } => {
            ViewData::Joint(count_and_mean(view, dimension, field))
        }
        Query::Distribution { dimension } => ViewData::Shares(distribution(view, dimension)),
        Query::Spread { dimension, field } => ViewData::Spread(spread(view, dimension, field)),
        Query::Rows => ViewData::Rows(view.indices().to_vec()),
    }
}

/// Filter, then compute every view the page asks for.
pub fn run(dataset: &Dataset, selection: &FilterSelection, page: PageId) -> PageReport {
    let view = apply(dataset, selection);
    log::debug!(
        "{page}: {} of {} plans pass {} active filters",
        view.len(),
        dataset.len(),
        selection.active().count()
    );

    let panels = views_for(page)
        .into_iter()
        .map(|request| {
            let data = evaluate(request.query, &view);
            Panel { request, data }
        })
        .collect();

    PageReport {
        page,
        total_rows: dataset.len(),
        filtered_rows: view.len(),
        panels,
    }
}

/// Same as [`run`], taking the selection and page as they arrive from a UI.
pub fn run_request<'a, I>(dataset: &Dataset, pairs: I, page: &str) -> Result<PageReport, RequestError>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let selection = FilterSelection::from_pairs(pairs)?;
    let page = page.parse::<PageId>()?;
    Ok(run(dataset, &selection, page))
}

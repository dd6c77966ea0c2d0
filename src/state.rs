use std::sync::Arc;

use esim_dashboard::data::filter::Selection;
use esim_dashboard::data::pipeline;
use esim_dashboard::{Dataset, DerivationPolicy, Dimension, FilterSelection, PageId, PageReport};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset (None until a load succeeds). Never mutated once loaded.
    pub dataset: Option<Arc<Dataset>>,

    /// Current selector values.
    pub selection: FilterSelection,

    /// Active page.
    pub page: PageId,

    /// Result of the last recomputation pass.
    pub report: Option<PageReport>,

    /// Policy used for files opened from the menu.
    pub policy: DerivationPolicy,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(page: PageId, policy: DerivationPolicy) -> Self {
        Self {
            dataset: None,
            selection: FilterSelection::new(),
            page,
            report: None,
            policy,
            status_message: None,
        }
    }

    /// Ingest a newly loaded dataset and reset the filters.
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        self.dataset = Some(dataset);
        self.selection.reset();
        self.status_message = None;
        self.recompute();
    }

    /// Show a blocking load failure; no partial dashboard is kept.
    pub fn set_load_error(&mut self, message: String) {
        self.dataset = None;
        self.report = None;
        self.status_message = Some(message);
    }

    pub fn select(&mut self, dim: Dimension, selection: Selection) {
        if self.selection.get(dim) != selection {
            self.selection.set(dim, selection);
            self.recompute();
        }
    }

    pub fn reset_filters(&mut self) {
        if !self.selection.is_all() {
            self.selection.reset();
            self.recompute();
        }
    }

    pub fn set_page(&mut self, page: PageId) {
        if self.page != page {
            log::info!("Switching to page {page}");
            self.page = page;
            self.recompute();
        }
    }

    /// One full pass: filter → aggregate → views.
    fn recompute(&mut self) {
        self.report = self
            .dataset
            .as_deref()
            .map(|ds| pipeline::run(ds, &self.selection, self.page));
    }
}

//! eSIM market analysis: load a plan dataset once, filter it through the
//! dashboard's selectors and compute the summaries each page draws.
//!
//! ```ignore
//! use esim_dashboard::data::{filter::FilterSelection, loader, model::Dimension, pipeline, view::PageId};
//!
//! let dataset = loader::load_file("eSimDB_Sep23.csv".as_ref(), Default::default())?;
//! let selection = FilterSelection::new().with(Dimension::Country, "Japan");
//! let report = pipeline::run(&dataset, &selection, PageId::CountryAnalysis);
//! ```

pub mod data;

pub use data::error::{DerivationError, FilterError, LoadError, RequestError, UnknownViewError};
pub use data::filter::{FilterSelection, PlanView, Selection};
pub use data::loader::{load_file, DerivationPolicy};
pub use data::model::{Dataset, DimValue, Dimension, Field, Plan};
pub use data::pipeline::{run, PageReport, Panel, ViewData};
pub use data::view::{views_for, PageId};

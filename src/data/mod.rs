//! Data layer: plan model, loading, filtering, aggregation and page views.
//!
//! Architecture:
//! ```text
//!  .csv / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → Dataset (trimmed columns, price_per_GB)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  FilterSelection → PlanView (row indices)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌───────────┐
//!   │ aggregate │  counts / means / shares / spreads per dimension
//!   └───────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │   view    │  PageId → requests + chart encodings
//!   └──────────┘
//! ```
//!
//! [`pipeline::run`] drives one pass through all of the above.

pub mod aggregate;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod pipeline;
pub mod view;

//! Filtered views over the catalog.
//!
//! A view is a freshly allocated copy of the catalog with the same category
//! sequence and a filtered, optionally reordered item sequence per category.

mod builder;
mod state_filter;

pub use builder::{build_view, FilteredCatalog, ViewFilters, ViewOrder};
pub use state_filter::StateFilters;

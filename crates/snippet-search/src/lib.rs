//! Search, filter, and highlight engine for a snippet manager.
//!
//! This crate provides the core used by the snippet sidebar and dashboard:
//! - Case-insensitive literal search over categories and items
//! - Scope-aware structural matches for result navigation
//! - Filtered, reordered views by item state, tags, and type
//! - Overlap-safe highlight markup
//! - A debounced incremental query controller

pub mod catalog;
pub mod config;
pub mod controller;
pub mod error;
pub mod highlight;
pub mod query;
pub mod view;

// Re-export main types
pub use catalog::{Catalog, CatalogSource, Category, Item, ItemType};
pub use config::SearchConfig;
pub use controller::{ControllerEvent, ControllerState, FilterChange, QueryController};
pub use error::{Result, SearchError};
pub use highlight::{highlight, Highlighter, MarkedText};
pub use query::{search, search_category, search_scoped, Match, MatchKind, ScopeFilters};
pub use view::{build_view, FilteredCatalog, StateFilters, ViewFilters, ViewOrder};

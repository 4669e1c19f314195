//! Query matching over the catalog.
//!
//! This module provides:
//! - Query normalisation and case-folded substring matching
//! - Scope flags and structural match locations
//! - The item search used by the sidebar and the scoped search used by the dashboard
//! - Item type aliases for type filters

mod matcher;
mod scope;
mod text_match;
mod type_filter;

pub use matcher::{dedup_item_matches, search, search_category, search_scoped, QueryMatcher};
pub use scope::{Match, MatchKind, ScopeFilters};
pub use text_match::{contains_folded, fold_case, normalize_query, FoldedText};
pub use type_filter::{lookup_item_type, lookup_item_types};

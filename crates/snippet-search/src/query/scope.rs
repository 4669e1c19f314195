//! Search scope flags and match locations.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Fields a scoped query is allowed to test.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ScopeFilters: u8 {
        /// Category names.
        const CATEGORIES = 0b0001;
        /// Item labels.
        const ITEMS      = 0b0010;
        const TAGS       = 0b0100;
        const CONTENT    = 0b1000;
    }
}

impl Default for ScopeFilters {
    fn default() -> Self {
        Self::all()
    }
}

impl ScopeFilters {
    /// Resolves an empty scope to every field.
    pub fn effective(self) -> Self {
        if self.is_empty() {
            Self::all()
        } else {
            self
        }
    }
}

/// Which field of the catalog satisfied a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchKind {
    Category,
    ItemLabel,
    ItemContent,
    ItemTag,
}

impl MatchKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::ItemLabel => "item-label",
            Self::ItemContent => "item-content",
            Self::ItemTag => "item-tag",
        }
    }

    pub fn is_item(self) -> bool {
        !matches!(self, Self::Category)
    }
}

/// One structural location that satisfied a query.
///
/// Indices refer to the snapshot the match was produced from and are only
/// meaningful against that snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Match {
    pub kind: MatchKind,
    pub category_index: usize,
    pub item_index: Option<usize>,
}

impl Match {
    pub fn category(category_index: usize) -> Self {
        Self {
            kind: MatchKind::Category,
            category_index,
            item_index: None,
        }
    }

    pub fn item(kind: MatchKind, category_index: usize, item_index: usize) -> Self {
        debug_assert!(kind.is_item(), "item matches need an item kind");
        Self {
            kind,
            category_index,
            item_index: Some(item_index),
        }
    }
}

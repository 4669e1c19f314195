//! Catalog model read by the search engine.
//!
//! The catalog is owned by the persistence layer and handed to the engine as
//! a read-only snapshot. Categories exclusively own their items; the engine
//! addresses them by `(category index, item index)` pairs.

use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};
use crate::query::{Match, MatchKind};

/// Kind of payload an item carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    #[default]
    Text,
    Code,
    Url,
    Path,
}

impl ItemType {
    pub const ALL: [ItemType; 4] = [Self::Text, Self::Code, Self::Url, Self::Path];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Code => "code",
            Self::Url => "url",
            Self::Path => "path",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = SearchError;

    fn from_str(value: &str) -> Result<Self> {
        let lowered = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == lowered)
            .ok_or_else(|| SearchError::InvalidInput(format!("unknown item type: {value}")))
    }
}

fn default_true() -> bool {
    true
}

/// A single stored snippet.
///
/// Every flag is always present; snapshots that omit one decode to the
/// documented default instead of "missing".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub label: String,
    pub content: String,
    #[serde(rename = "type", default)]
    pub item_type: ItemType,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub is_sensitive: bool,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub use_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used: Option<DateTime<Utc>>,
}

impl Item {
    pub fn new(id: impl Into<String>, label: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            content: content.into(),
            item_type: ItemType::Text,
            tags: BTreeSet::new(),
            is_favorite: false,
            is_sensitive: false,
            is_archived: false,
            is_active: true,
            use_count: 0,
            last_used: None,
        }
    }

    pub fn with_type(mut self, item_type: ItemType) -> Self {
        self.item_type = item_type;
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn favorite(mut self) -> Self {
        self.is_favorite = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.is_sensitive = true;
        self
    }

    pub fn archived(mut self) -> Self {
        self.is_archived = true;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }
}

/// A named, ordered group of items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl Category {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            icon: String::new(),
            is_active: true,
            items: Vec::new(),
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn with_items(mut self, items: Vec<Item>) -> Self {
        self.items = items;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }
}

/// Provides the current catalog snapshot.
///
/// The engine reads a fresh snapshot on every evaluation and never holds on
/// to it between calls.
pub trait CatalogSource {
    fn snapshot(&self) -> &[Category];
}

impl CatalogSource for Vec<Category> {
    fn snapshot(&self) -> &[Category] {
        self.as_slice()
    }
}

impl CatalogSource for [Category] {
    fn snapshot(&self) -> &[Category] {
        self
    }
}

impl<T: CatalogSource + ?Sized> CatalogSource for &T {
    fn snapshot(&self) -> &[Category] {
        (**self).snapshot()
    }
}

impl<T: CatalogSource + ?Sized> CatalogSource for Rc<T> {
    fn snapshot(&self) -> &[Category] {
        (**self).snapshot()
    }
}

impl<T: CatalogSource + ?Sized> CatalogSource for Arc<T> {
    fn snapshot(&self) -> &[Category] {
        (**self).snapshot()
    }
}

/// An owned catalog snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    categories: Vec<Category>,
}

impl Catalog {
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    /// Decodes a snapshot produced by the persistence layer.
    pub fn from_json_str(data: &str) -> Result<Self> {
        serde_json::from_str(data).map_err(|error| {
            SearchError::Serialization(format!("failed to parse catalog snapshot: {error}"))
        })
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|error| {
            SearchError::Serialization(format!("failed to serialize catalog snapshot: {error}"))
        })
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn into_categories(self) -> Vec<Category> {
        self.categories
    }

    pub fn item_count(&self) -> usize {
        self.categories.iter().map(|category| category.items.len()).sum()
    }

    /// Finds an item by id, returning its owning category alongside it.
    pub fn find_item(&self, id: &str) -> Option<(&Category, &Item)> {
        self.categories.iter().find_map(|category| {
            category
                .items
                .iter()
                .find(|item| item.id == id)
                .map(|item| (category, item))
        })
    }

    pub fn resolve(&self, location: &Match) -> Option<ResolvedMatch<'_>> {
        resolve_match(&self.categories, location)
    }
}

impl CatalogSource for Catalog {
    fn snapshot(&self) -> &[Category] {
        &self.categories
    }
}

impl From<Vec<Category>> for Catalog {
    fn from(categories: Vec<Category>) -> Self {
        Self::new(categories)
    }
}

/// A match resolved against the snapshot it was produced from.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedMatch<'a> {
    pub kind: MatchKind,
    pub category: &'a Category,
    pub item: Option<&'a Item>,
}

/// Looks up the category and item a match points at.
///
/// Returns `None` when the indices no longer fit the given snapshot.
pub fn resolve_match<'a>(categories: &'a [Category], location: &Match) -> Option<ResolvedMatch<'a>> {
    let category = categories.get(location.category_index)?;
    let item = match location.item_index {
        Some(index) => Some(category.items.get(index)?),
        None => None,
    };
    Some(ResolvedMatch {
        kind: location.kind,
        category,
        item,
    })
}

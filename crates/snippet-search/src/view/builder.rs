use std::cmp::Reverse;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogSource, Category, Item, ItemType};
use crate::query::fold_case;

use super::state_filter::StateFilters;

/// Display order of items inside each category of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewOrder {
    /// Keep the catalog order.
    #[default]
    Catalog,
    /// Highest `use_count` first.
    MostUsed,
    /// Most recent `last_used` first; never-used items last.
    RecentlyUsed,
    /// By label, ignoring case.
    Alphabetical,
}

/// Everything a view is narrowed by.
///
/// State filters combine with OR among themselves; tags and types then
/// combine with AND against the state result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewFilters {
    #[serde(default)]
    pub state: StateFilters,
    /// Every listed tag must be present on the item (case-insensitive).
    #[serde(default)]
    pub tags: Vec<String>,
    /// The item type must be one of these.
    #[serde(default)]
    pub types: Vec<ItemType>,
    #[serde(default)]
    pub order: ViewOrder,
}

impl ViewFilters {
    pub fn new(state: StateFilters) -> Self {
        Self {
            state,
            ..Self::default()
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_types<I>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = ItemType>,
    {
        self.types = types.into_iter().collect();
        self
    }

    pub fn with_order(mut self, order: ViewOrder) -> Self {
        self.order = order;
        self
    }

    /// True when the filters let every item through in catalog order.
    pub fn is_pass_through(&self) -> bool {
        self.state.is_empty()
            && self.tags.is_empty()
            && self.types.is_empty()
            && self.order == ViewOrder::Catalog
    }

    pub fn passes(&self, item: &Item) -> bool {
        self.state.passes(item) && self.passes_types(item) && self.passes_tags(item)
    }

    fn passes_types(&self, item: &Item) -> bool {
        self.types.is_empty() || self.types.contains(&item.item_type)
    }

    fn passes_tags(&self, item: &Item) -> bool {
        if self.tags.is_empty() {
            return true;
        }
        let item_tags = item.tags.iter().map(|tag| fold_case(tag)).collect::<Vec<_>>();
        self.tags
            .iter()
            .map(|required| fold_case(required.trim()))
            .all(|required| item_tags.contains(&required))
    }
}

/// A filtered copy of the catalog.
///
/// Holds the same categories, in the same order, as the catalog it was built
/// from, so category indices line up with the source snapshot. Categories
/// left without items keep an empty item list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilteredCatalog {
    pub categories: Vec<Category>,
}

impl FilteredCatalog {
    pub fn total_items(&self) -> usize {
        self.categories.iter().map(|category| category.items.len()).sum()
    }

    /// `(category name, surviving item count)` for every active category.
    pub fn category_counts(&self) -> Vec<(&str, usize)> {
        self.active_categories()
            .map(|category| (category.name.as_str(), category.items.len()))
            .collect()
    }

    pub fn active_categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter().filter(|category| category.is_active)
    }

    pub fn into_categories(self) -> Vec<Category> {
        self.categories
    }
}

impl CatalogSource for FilteredCatalog {
    fn snapshot(&self) -> &[Category] {
        &self.categories
    }
}

/// Builds a filtered view of `categories`.
///
/// The input is never modified; the view is always a new allocation.
pub fn build_view(categories: &[Category], filters: &ViewFilters) -> FilteredCatalog {
    let started = Instant::now();
    let categories = categories
        .iter()
        .map(|category| Category {
            id: category.id.clone(),
            name: category.name.clone(),
            icon: category.icon.clone(),
            is_active: category.is_active,
            items: filter_items(&category.items, filters),
        })
        .collect::<Vec<_>>();
    let view = FilteredCatalog { categories };

    log::trace!(
        "built view state={:?} tags={} types={} order={:?} items={} elapsed_us={}",
        filters.state,
        filters.tags.len(),
        filters.types.len(),
        filters.order,
        view.total_items(),
        started.elapsed().as_micros(),
    );
    view
}

fn filter_items(items: &[Item], filters: &ViewFilters) -> Vec<Item> {
    let mut kept = items
        .iter()
        .filter(|item| filters.passes(item))
        .cloned()
        .collect::<Vec<_>>();

    // Stable sorts: ties keep catalog order.
    match filters.order {
        ViewOrder::Catalog => {}
        ViewOrder::MostUsed => kept.sort_by_key(|item| Reverse(item.use_count)),
        ViewOrder::RecentlyUsed => kept.sort_by_key(|item| Reverse(item.last_used)),
        ViewOrder::Alphabetical => kept.sort_by_cached_key(|item| fold_case(&item.label)),
    }
    kept
}

//! Query matcher for catalog search.

use fnv::FnvHashSet;
use memchr::memmem::Finder;

use crate::catalog::{Category, Item};

use super::scope::{Match, MatchKind, ScopeFilters};
use super::text_match::{fold_case, normalize_query};

/// A compiled query.
///
/// The raw query is trimmed and lowercased once at compile time; every field
/// is then tested with literal, case-insensitive substring containment.
#[derive(Debug, Clone)]
pub struct QueryMatcher {
    needle: Option<String>,
    finder: Option<Finder<'static>>,
}

impl QueryMatcher {
    pub fn compile(raw_query: &str) -> Self {
        let needle = normalize_query(raw_query);
        let finder = needle
            .as_deref()
            .map(|needle| Finder::new(needle.as_bytes()).into_owned());
        Self { needle, finder }
    }

    /// Returns true when the query places no text constraint.
    pub fn is_empty(&self) -> bool {
        self.needle.is_none()
    }

    /// The normalised (trimmed, lowercased) query, if any.
    pub fn needle(&self) -> Option<&str> {
        self.needle.as_deref()
    }

    /// Tests a single field. An empty query matches everything.
    pub fn matches_text(&self, field: &str) -> bool {
        match self.finder.as_ref() {
            Some(finder) => finder.find(fold_case(field).as_bytes()).is_some(),
            None => true,
        }
    }

    /// Label, content, or any tag contains the query.
    ///
    /// Tags are checked last and stop at the first hit.
    pub fn matches_item(&self, item: &Item) -> bool {
        self.matches_text(&item.label)
            || self.matches_text(&item.content)
            || item.tags.iter().any(|tag| self.matches_text(tag))
    }

    /// Collects one match kind per field of `item` that satisfies the query
    /// within `scope`, in label, content, tag order.
    pub fn item_match_kinds(&self, item: &Item, scope: ScopeFilters) -> Vec<MatchKind> {
        let mut kinds = Vec::new();
        if scope.contains(ScopeFilters::ITEMS) && self.matches_text(&item.label) {
            kinds.push(MatchKind::ItemLabel);
        }
        if scope.contains(ScopeFilters::CONTENT) && self.matches_text(&item.content) {
            kinds.push(MatchKind::ItemContent);
        }
        if scope.contains(ScopeFilters::TAGS) && item.tags.iter().any(|tag| self.matches_text(tag))
        {
            kinds.push(MatchKind::ItemTag);
        }
        kinds
    }

    /// Items of the active categories that match, in catalog order.
    pub fn search<'a>(&self, categories: &'a [Category]) -> Vec<&'a Item> {
        categories
            .iter()
            .filter(|category| category.is_active)
            .flat_map(|category| self.search_category(category))
            .collect()
    }

    /// Items of a single category that match, in item order.
    ///
    /// An inactive category yields nothing.
    pub fn search_category<'a>(&self, category: &'a Category) -> Vec<&'a Item> {
        if !category.is_active {
            return Vec::new();
        }
        category
            .items
            .iter()
            .filter(|item| self.is_empty() || self.matches_item(item))
            .collect()
    }

    /// Structure-aware search used by the dashboard.
    ///
    /// A category whose name matches yields a category match ahead of its item
    /// matches. Every matching field of an item yields its own match, so an
    /// item can appear more than once. An empty query has nothing to locate
    /// and yields no matches.
    pub fn search_scoped(&self, scope: ScopeFilters, categories: &[Category]) -> Vec<Match> {
        if self.is_empty() {
            return Vec::new();
        }

        let scope = scope.effective();
        let mut matches = Vec::new();
        for (category_index, category) in categories.iter().enumerate() {
            if !category.is_active {
                continue;
            }
            if scope.contains(ScopeFilters::CATEGORIES) && self.matches_text(&category.name) {
                matches.push(Match::category(category_index));
            }
            for (item_index, item) in category.items.iter().enumerate() {
                matches.extend(
                    self.item_match_kinds(item, scope)
                        .into_iter()
                        .map(|kind| Match::item(kind, category_index, item_index)),
                );
            }
        }
        matches
    }
}

/// Searches the active categories for items whose label, content, or tags
/// contain `query`.
///
/// An empty or whitespace-only query returns every item of every active
/// category, in catalog order.
pub fn search<'a>(query: &str, categories: &'a [Category]) -> Vec<&'a Item> {
    QueryMatcher::compile(query).search(categories)
}

/// Searches a single category, as the sidebar search bar does.
pub fn search_category<'a>(query: &str, category: &'a Category) -> Vec<&'a Item> {
    QueryMatcher::compile(query).search_category(category)
}

/// Searches the active categories field by field within `scope`.
pub fn search_scoped(query: &str, scope: ScopeFilters, categories: &[Category]) -> Vec<Match> {
    QueryMatcher::compile(query).search_scoped(scope, categories)
}

/// Keeps the first match of every item, plus every category match, in order.
pub fn dedup_item_matches(matches: &[Match]) -> Vec<Match> {
    let mut seen = FnvHashSet::default();
    matches
        .iter()
        .filter(|location| match location.item_index {
            Some(item_index) => seen.insert((location.category_index, item_index)),
            None => true,
        })
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Category;

    fn git() -> Category {
        Category::new("git", "Git").with_items(vec![
            Item::new("g1", "status", "git status"),
            Item::new("g2", "add all", "git add .").with_tags(["staging"]),
        ])
    }

    fn docker() -> Category {
        Category::new("docker", "Docker").with_items(vec![
            Item::new("d1", "ps", "docker ps -a"),
            Item::new("d2", "Status of compose", "docker compose ps").with_tags(["Compose"]),
        ])
    }

    fn labels(items: &[&Item]) -> Vec<String> {
        items.iter().map(|item| item.label.clone()).collect()
    }

    #[test]
    fn label_match_only_returns_matching_item() {
        let catalog = vec![git()];
        assert_eq!(labels(&search("status", &catalog)), vec!["status"]);
    }

    #[test]
    fn content_match_returns_every_item() {
        let catalog = vec![git()];
        assert_eq!(labels(&search("git", &catalog)), vec!["status", "add all"]);
    }

    #[test]
    fn tag_match_is_case_insensitive() {
        let catalog = vec![git()];
        assert_eq!(labels(&search("STAGING", &catalog)), vec!["add all"]);
    }

    #[test]
    fn query_is_trimmed_before_matching() {
        let catalog = vec![git()];
        assert_eq!(labels(&search("  status\t", &catalog)), vec!["status"]);
    }

    #[test]
    fn empty_query_returns_all_active_items_in_order() {
        let catalog = vec![git(), docker().inactive(), docker()];
        let all = search("   ", &catalog);
        assert_eq!(
            labels(&all),
            vec!["status", "add all", "ps", "Status of compose"]
        );
    }

    #[test]
    fn inactive_categories_are_never_searched() {
        let catalog = vec![git().inactive()];
        assert!(search("status", &catalog).is_empty());
        assert!(search("", &catalog).is_empty());
        assert!(search_scoped("git", ScopeFilters::all(), &catalog).is_empty());
        assert!(search_category("status", &catalog[0]).is_empty());
    }

    #[test]
    fn results_follow_catalog_order() {
        let catalog = vec![docker(), git()];
        assert_eq!(
            labels(&search("status", &catalog)),
            vec!["Status of compose", "status"]
        );
    }

    #[test]
    fn special_characters_are_literal() {
        let catalog = vec![Category::new("c", "Misc").with_items(vec![
            Item::new("1", "regex-ish", "axb"),
            Item::new("2", "dotted", "a.b"),
            Item::new("3", "star", "(.*)"),
        ])];
        assert_eq!(labels(&search("a.b", &catalog)), vec!["dotted"]);
        assert_eq!(labels(&search("(.*)", &catalog)), vec!["star"]);
        assert!(search("[", &catalog).is_empty());
    }

    #[test]
    fn scoped_search_emits_one_match_per_field() {
        let catalog = vec![docker()];
        let matches = search_scoped("compose", ScopeFilters::all(), &catalog);
        assert_eq!(
            matches,
            vec![
                Match::item(MatchKind::ItemLabel, 0, 1),
                Match::item(MatchKind::ItemContent, 0, 1),
                Match::item(MatchKind::ItemTag, 0, 1),
            ]
        );
    }

    #[test]
    fn scoped_search_emits_category_match_before_items() {
        let catalog = vec![git(), docker()];
        let matches = search_scoped("docker", ScopeFilters::all(), &catalog);
        assert_eq!(
            matches,
            vec![
                Match::category(1),
                Match::item(MatchKind::ItemContent, 1, 0),
                Match::item(MatchKind::ItemContent, 1, 1),
            ]
        );
    }

    #[test]
    fn scope_flags_gate_fields() {
        let catalog = vec![git(), docker()];

        let names_only = search_scoped("docker", ScopeFilters::CATEGORIES, &catalog);
        assert_eq!(names_only, vec![Match::category(1)]);

        let tags_only = search_scoped("compose", ScopeFilters::TAGS, &catalog);
        assert_eq!(tags_only, vec![Match::item(MatchKind::ItemTag, 1, 1)]);

        let labels_only = search_scoped("git", ScopeFilters::ITEMS, &catalog);
        assert!(labels_only.is_empty());
    }

    #[test]
    fn empty_scope_tests_every_field() {
        let catalog = vec![git()];
        assert_eq!(
            search_scoped("git", ScopeFilters::empty(), &catalog),
            search_scoped("git", ScopeFilters::all(), &catalog)
        );
    }

    #[test]
    fn scoped_search_with_empty_query_has_no_matches() {
        let catalog = vec![git()];
        assert!(search_scoped("  ", ScopeFilters::all(), &catalog).is_empty());
    }

    #[test]
    fn dedup_keeps_first_match_per_item() {
        let catalog = vec![docker()];
        let matches = search_scoped("compose", ScopeFilters::all(), &catalog);
        assert_eq!(
            dedup_item_matches(&matches),
            vec![Match::item(MatchKind::ItemLabel, 0, 1)]
        );

        let with_category = vec![
            Match::category(0),
            Match::item(MatchKind::ItemContent, 0, 0),
            Match::category(0),
        ];
        assert_eq!(dedup_item_matches(&with_category), with_category);
    }

    #[test]
    fn single_category_search_returns_each_item_once() {
        let category = docker();
        let found = search_category("compose", &category);
        assert_eq!(labels(&found), vec!["Status of compose"]);
    }
}

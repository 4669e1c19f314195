//! Incremental query controller.
//!
//! Owns the debounce timer, the last committed query, the active filters and
//! the navigation cursor. Everything runs on the caller's thread: hosts either
//! schedule a callback for the returned [`ScheduledEvaluation`] and hand the
//! ticket back through [`QueryController::fire`], poll with
//! [`QueryController::poll`], or await [`QueryController::settle`] on a tokio
//! runtime.

mod clock;
mod debounce;

use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::broadcast;

use crate::catalog::{resolve_match, CatalogSource, ItemType};
use crate::config::SearchConfig;
use crate::highlight::{Highlighter, MarkedText};
use crate::query::{Match, MatchKind, QueryMatcher, ScopeFilters};
use crate::view::{build_view, FilteredCatalog, StateFilters, ViewFilters};

pub use clock::{Clock, ManualClock, SystemClock, TokioClock};
pub use debounce::{Debouncer, EvaluationTicket, ScheduledEvaluation};

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ControllerState {
    /// No query is active.
    Idle,
    /// A keystroke is waiting out the quiet period.
    Pending,
    /// A non-empty query has been evaluated and its results are available.
    Committed,
}

/// Notifications for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControllerEvent {
    /// A new result list was committed. The selection is 0-based.
    ResultsChanged {
        match_count: usize,
        selected_index: Option<usize>,
    },
    /// Navigation moved the cursor.
    SelectionChanged { index: usize, selected: Match },
}

/// A discrete filter change from the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterChange {
    Scope(ScopeFilters),
    State(StateFilters),
    Tags(Vec<String>),
    Types(Vec<ItemType>),
    View(ViewFilters),
}

/// The selected match expressed with stable identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchLocation {
    pub kind: MatchKind,
    pub category_id: String,
    pub item_id: Option<String>,
}

pub struct QueryController<S, C = SystemClock> {
    source: S,
    clock: C,
    debouncer: Debouncer,
    highlighter: Highlighter,
    raw_query: String,
    committed_query: Option<String>,
    scope: ScopeFilters,
    view_filters: ViewFilters,
    view: FilteredCatalog,
    results: Vec<Match>,
    cursor: Option<usize>,
    state: ControllerState,
    events: broadcast::Sender<ControllerEvent>,
}

impl<S: CatalogSource> QueryController<S, SystemClock> {
    pub fn new(source: S, config: &SearchConfig) -> Self {
        Self::with_clock(source, SystemClock, config)
    }
}

impl<S: CatalogSource, C: Clock> QueryController<S, C> {
    pub fn with_clock(source: S, clock: C, config: &SearchConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let view_filters = ViewFilters::default();
        let view = build_view(source.snapshot(), &view_filters);
        Self {
            source,
            clock,
            debouncer: Debouncer::new(config.debounce()),
            highlighter: Highlighter::from_config(&config.highlight),
            raw_query: String::new(),
            committed_query: None,
            scope: config.default_scope,
            view_filters,
            view,
            results: Vec::new(),
            cursor: None,
            state: ControllerState::Idle,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    /// Records the latest raw text and restarts the quiet period.
    ///
    /// Clearing the text evaluates immediately and returns `None`.
    pub fn on_input(&mut self, raw: &str) -> Option<ScheduledEvaluation> {
        self.raw_query.clear();
        self.raw_query.push_str(raw);

        if raw.trim().is_empty() {
            self.debouncer.cancel();
            self.evaluate();
            return None;
        }

        let scheduled = self.debouncer.schedule(self.clock.now());
        self.state = ControllerState::Pending;
        log::trace!(
            "query scheduled ticket={} delay_ms={}",
            scheduled.ticket.version(),
            scheduled.delay.as_millis()
        );
        Some(scheduled)
    }

    /// Applies a filter change. With a non-empty query the results are
    /// re-evaluated at once, skipping the quiet period.
    pub fn on_filter_changed(&mut self, change: FilterChange) {
        match change {
            FilterChange::Scope(scope) => self.scope = scope,
            FilterChange::State(state) => self.view_filters.state = state,
            FilterChange::Tags(tags) => self.view_filters.tags = tags,
            FilterChange::Types(types) => self.view_filters.types = types,
            FilterChange::View(filters) => self.view_filters = filters,
        }

        if self.raw_query.trim().is_empty() {
            self.view = build_view(self.source.snapshot(), &self.view_filters);
            return;
        }

        self.debouncer.cancel();
        self.evaluate();
    }

    /// Clears the query and its results immediately.
    pub fn clear(&mut self) {
        self.raw_query.clear();
        self.debouncer.cancel();
        self.evaluate();
    }

    // -----------------------------------------------------------------------
    // Timer entry points
    // -----------------------------------------------------------------------

    /// Called by the host timer when a scheduled evaluation comes due.
    ///
    /// Stale tickets are ignored and return false.
    pub fn fire(&mut self, ticket: EvaluationTicket) -> bool {
        if !self.debouncer.take(ticket) {
            log::trace!("ignoring stale query ticket={}", ticket.version());
            return false;
        }
        self.evaluate();
        true
    }

    /// Evaluates the pending query if its quiet period has elapsed.
    pub fn poll(&mut self) -> bool {
        match self.debouncer.take_due(self.clock.now()) {
            Some(_) => {
                self.evaluate();
                true
            }
            None => false,
        }
    }

    /// Waits out the pending quiet period on the tokio timer and evaluates.
    ///
    /// Returns false when nothing was pending. Pair with [`TokioClock`] so the
    /// deadline and the timer share a time source.
    pub async fn settle(&mut self) -> bool {
        let Some(deadline) = self.debouncer.deadline() else {
            return false;
        };
        tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await;
        self.poll()
    }

    // -----------------------------------------------------------------------
    // Catalog
    // -----------------------------------------------------------------------

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Swaps in a new catalog snapshot after a CRUD change.
    ///
    /// A committed query is re-evaluated against it at once; a pending one
    /// picks it up when its quiet period ends.
    pub fn refresh(&mut self, source: S) {
        self.source = source;
        match self.state {
            ControllerState::Committed => self.evaluate(),
            ControllerState::Pending => {}
            ControllerState::Idle => {
                self.view = build_view(self.source.snapshot(), &self.view_filters);
            }
        }
    }

    pub fn pending_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    pub fn quiet_period(&self) -> Duration {
        self.debouncer.quiet_period()
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    /// Moves to the next result, wrapping to the first after the last.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<usize> {
        let count = self.results.len();
        let current = self.cursor?;
        self.select((current + 1) % count)
    }

    /// Moves to the previous result, wrapping to the last before the first.
    pub fn previous(&mut self) -> Option<usize> {
        let count = self.results.len();
        let current = self.cursor?;
        self.select((current + count - 1) % count)
    }

    fn select(&mut self, index: usize) -> Option<usize> {
        let selected = *self.results.get(index)?;
        self.cursor = Some(index);
        let _ = self
            .events
            .send(ControllerEvent::SelectionChanged { index, selected });
        Some(index)
    }

    // -----------------------------------------------------------------------
    // Evaluation
    // -----------------------------------------------------------------------

    fn evaluate(&mut self) {
        let started = Instant::now();
        let matcher = QueryMatcher::compile(&self.raw_query);
        self.view = build_view(self.source.snapshot(), &self.view_filters);
        self.results = matcher.search_scoped(self.scope, &self.view.categories);
        self.cursor = if self.results.is_empty() { None } else { Some(0) };
        self.committed_query = matcher.needle().map(str::to_string);
        self.state = if matcher.is_empty() {
            ControllerState::Idle
        } else {
            ControllerState::Committed
        };

        log::debug!(
            "query committed query={:?} scope={:?} matches={} elapsed_us={}",
            self.committed_query.as_deref().unwrap_or(""),
            self.scope,
            self.results.len(),
            started.elapsed().as_micros(),
        );

        let _ = self.events.send(ControllerEvent::ResultsChanged {
            match_count: self.results.len(),
            selected_index: self.cursor,
        });
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// The latest raw input, including text still waiting to be evaluated.
    pub fn raw_query(&self) -> &str {
        &self.raw_query
    }

    /// The normalised query behind the current results.
    pub fn committed_query(&self) -> Option<&str> {
        self.committed_query.as_deref()
    }

    pub fn scope(&self) -> ScopeFilters {
        self.scope
    }

    pub fn view_filters(&self) -> &ViewFilters {
        &self.view_filters
    }

    /// The filtered view the current results index into.
    pub fn view(&self) -> &FilteredCatalog {
        &self.view
    }

    pub fn results(&self) -> &[Match] {
        &self.results
    }

    pub fn match_count(&self) -> usize {
        self.results.len()
    }

    /// 0-based index of the selected result.
    pub fn selected_index(&self) -> Option<usize> {
        self.cursor
    }

    pub fn selected(&self) -> Option<&Match> {
        self.results.get(self.cursor?)
    }

    /// 1-based position of the selection and the result count, for "3 of 10".
    pub fn position(&self) -> Option<(usize, usize)> {
        self.cursor.map(|index| (index + 1, self.results.len()))
    }

    pub fn selected_location(&self) -> Option<MatchLocation> {
        let resolved = resolve_match(&self.view.categories, self.selected()?)?;
        Some(MatchLocation {
            kind: resolved.kind,
            category_id: resolved.category.id.clone(),
            item_id: resolved.item.map(|item| item.id.clone()),
        })
    }

    /// Highlights the committed query in a displayed field.
    pub fn highlight(&self, text: &str) -> MarkedText {
        self.highlighter
            .highlight(text, self.committed_query.as_deref().unwrap_or(""))
    }
}

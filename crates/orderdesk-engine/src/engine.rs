//! # Order Table Engine
//!
//! Main orchestrator for the order table. Couples the query builder, the
//! enrichment stage, the view-model reducer, and the selection/mutation
//! tracker behind one instance-scoped API.
//!
//! ## Engine Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     OrderTableEngine                                    │
//! │                                                                         │
//! │  refresh():                                                            │
//! │    ViewState ──► build_query ──► OrderSource.fetch ──► enrich ──┐      │
//! │                                                                 │      │
//! │    ┌────────────────────────────────────────────────────────────┘      │
//! │    ▼                                                                    │
//! │    generation still newest? ──NO──► discard (stale response)           │
//! │    │ YES                                                                │
//! │    ▼                                                                    │
//! │    OrderTable.load() + prune selection + Loaded event                  │
//! │                                                                         │
//! │  MUTATIONS (update_status / save_order / delete / bulk delete):        │
//! │    per-id in-flight guard ──► server call ──► patch/remove locally     │
//! │    (no optimistic update: local state changes only after the server    │
//! │     confirms; failures leave prior state untouched)                    │
//! │                                                                         │
//! │  OWNERSHIP: one engine instance owns its records and view state        │
//! │  exclusively; shells share the instance behind Arc, never the state.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Stale-Response Suppression
//! Every refresh stamps a monotonically increasing generation. A response
//! is committed only if its generation is still the newest one issued, so
//! a slow page-1 response can never clobber a faster page-2 response that
//! superseded it. No request cancellation is needed.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::RwLock;
use tracing::{debug, info};

use orderdesk_core::{export, OrderAggregates, OrderRecord, OrderStatus, PaymentMethod};

use crate::api::{NameResolver, OrderMutator, OrderSource};
use crate::config::TableConfig;
use crate::enrich::enrich;
use crate::error::{EngineError, EngineResult};
use crate::events::{NoOpEmitter, TableEvent, TableEventEmitter};
use crate::query::{build_query, OrderFilters, PageState, SortField, SortSpec};
use crate::table::OrderTable;

// =============================================================================
// Load Outcome
// =============================================================================

/// What happened to a refresh's response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The response was the newest and was committed.
    Applied,
    /// A newer refresh superseded this one; the response was discarded.
    Superseded,
}

// =============================================================================
// View State
// =============================================================================

/// Ephemeral per-instance view state. Never persisted.
#[derive(Debug, Default)]
struct ViewState {
    /// Active filter set (search term is local-only).
    filters: OrderFilters,

    /// Active sort column and direction.
    sort: SortSpec,

    /// Pagination state machine.
    page: PageState,

    /// Checked row ids; always a subset of the loaded page's ids.
    selected: HashSet<String>,

    /// The single open detail row, if any (last expand wins).
    expanded: Option<String>,
}

// =============================================================================
// Order Table Engine
// =============================================================================

/// The order table engine: one instance per rendered order table.
pub struct OrderTableEngine {
    /// Engine tunables.
    config: TableConfig,

    /// Raw listing fetches.
    source: Arc<dyn OrderSource>,

    /// Reference resolution for enrichment.
    resolver: Arc<dyn NameResolver>,

    /// Server-side mutations.
    mutator: Arc<dyn OrderMutator>,

    /// Event channel to the UI shell.
    emitter: Arc<dyn TableEventEmitter>,

    /// Ephemeral view state.
    state: RwLock<ViewState>,

    /// Canonical loaded records.
    table: RwLock<OrderTable>,

    /// Fetch generation counter for stale-response suppression.
    fetch_generation: AtomicU64,

    /// Order ids with a mutation currently in flight.
    in_flight: Mutex<HashSet<String>>,
}

impl OrderTableEngine {
    /// Creates an engine with default config and no event delivery.
    pub fn new(
        source: Arc<dyn OrderSource>,
        resolver: Arc<dyn NameResolver>,
        mutator: Arc<dyn OrderMutator>,
    ) -> Self {
        Self::with_emitter(
            TableConfig::default(),
            source,
            resolver,
            mutator,
            Arc::new(NoOpEmitter),
        )
    }

    /// Creates an engine with explicit config and event emitter.
    pub fn with_emitter(
        config: TableConfig,
        source: Arc<dyn OrderSource>,
        resolver: Arc<dyn NameResolver>,
        mutator: Arc<dyn OrderMutator>,
        emitter: Arc<dyn TableEventEmitter>,
    ) -> Self {
        let page = PageState::new(config.default_page_size);

        OrderTableEngine {
            config,
            source,
            resolver,
            mutator,
            emitter,
            state: RwLock::new(ViewState {
                page,
                ..ViewState::default()
            }),
            table: RwLock::new(OrderTable::new()),
            fetch_generation: AtomicU64::new(0),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Fetches, enriches, and commits the current page.
    ///
    /// Committing prunes the selection (and the expanded row) down to ids
    /// present in the new page. A response superseded by a newer refresh is
    /// discarded and reported as [`LoadOutcome::Superseded`].
    pub async fn refresh(&self) -> EngineResult<LoadOutcome> {
        let generation = self.fetch_generation.fetch_add(1, Ordering::SeqCst) + 1;

        let query = {
            let state = self.state.read().await;
            build_query(&state.filters, &state.sort, &state.page)
        };

        debug!(generation, query = %query.to_query_string(), "Fetching orders");

        let payload = match self.source.fetch_orders(&query).await {
            Ok(payload) => payload,
            Err(e) => {
                self.surface_error(&e);
                return Err(e);
            }
        };

        let batch = match enrich(&payload, self.resolver.as_ref()).await {
            Ok(batch) => batch,
            Err(e) => {
                self.surface_error(&e);
                return Err(e);
            }
        };

        let count = batch.records.len();
        let total = batch.total_count;
        let loaded_ids: HashSet<String> = batch.records.iter().map(|r| r.id.clone()).collect();

        // Commit only if no newer refresh was issued while this one ran.
        // The check happens under the table lock so commits serialize.
        {
            let mut table = self.table.write().await;
            if self.fetch_generation.load(Ordering::SeqCst) != generation {
                debug!(generation, "Discarding stale fetch response");
                return Ok(LoadOutcome::Superseded);
            }
            table.load(batch.records, total);
        }

        {
            let mut state = self.state.write().await;
            state.page.total_count = total;
            state.selected.retain(|id| loaded_ids.contains(id));
            if let Some(expanded) = &state.expanded {
                if !loaded_ids.contains(expanded) {
                    state.expanded = None;
                }
            }
        }

        info!(count, total, "Order page loaded");
        self.emitter.emit(TableEvent::Loaded { count, total });
        Ok(LoadOutcome::Applied)
    }

    // =========================================================================
    // Pagination / Filter / Sort Transitions
    // =========================================================================
    // Every transition below couples the state change to a refetch: the
    // pagination state machine and the data reload move together.

    /// Moves to a page, clamped to `[1, total_pages]`, and refetches.
    pub async fn go_to_page(&self, page: u32) -> EngineResult<LoadOutcome> {
        {
            let mut state = self.state.write().await;
            state.page.page = state.page.clamp_page(page);
        }
        self.refresh().await
    }

    /// Changes the page size (clamped to config bounds), resets to page 1,
    /// and refetches.
    pub async fn set_page_size(&self, size: u32) -> EngineResult<LoadOutcome> {
        {
            let mut state = self.state.write().await;
            state.page.page_size = self.config.clamp_page_size(size);
            state.page.page = 1;
        }
        self.refresh().await
    }

    /// Sets the status filter (`None` = all), resets to page 1, refetches.
    pub async fn set_status_filter(&self, status: Option<OrderStatus>) -> EngineResult<LoadOutcome> {
        {
            let mut state = self.state.write().await;
            state.filters.status = status;
            state.page.page = 1;
        }
        self.refresh().await
    }

    /// Sets the payment-method filter (`None` = all), resets to page 1,
    /// refetches.
    pub async fn set_payment_filter(
        &self,
        method: Option<PaymentMethod>,
    ) -> EngineResult<LoadOutcome> {
        {
            let mut state = self.state.write().await;
            state.filters.payment_method = method;
            state.page.page = 1;
        }
        self.refresh().await
    }

    /// Sets the inclusive date range, resets to page 1, refetches.
    pub async fn set_date_range(
        &self,
        start: Option<chrono::NaiveDate>,
        end: Option<chrono::NaiveDate>,
    ) -> EngineResult<LoadOutcome> {
        {
            let mut state = self.state.write().await;
            state.filters.start_date = start;
            state.filters.end_date = end;
            state.page.page = 1;
        }
        self.refresh().await
    }

    /// Column-header sort: clicking the active column flips direction,
    /// a new column sorts ascending. Refetches.
    pub async fn sort_by(&self, field: SortField) -> EngineResult<LoadOutcome> {
        {
            let mut state = self.state.write().await;
            state.sort.toggle(field);
        }
        self.refresh().await
    }

    /// Sets the local search term. No refetch: search only ever filters
    /// the loaded page, so typing costs nothing on the wire.
    pub async fn set_search_term(&self, term: impl Into<String>) {
        let mut state = self.state.write().await;
        state.filters.search_term = term.into();
    }

    // =========================================================================
    // Selection & Expansion
    // =========================================================================

    /// Toggles one row's checkbox. Ids that are not loaded are ignored.
    /// Returns whether the row is selected afterwards.
    pub async fn toggle_select(&self, id: &str) -> bool {
        if !self.table.read().await.contains(id) {
            return false;
        }

        let mut state = self.state.write().await;
        if state.selected.remove(id) {
            false
        } else {
            state.selected.insert(id.to_string());
            true
        }
    }

    /// Header checkbox: selects every loaded row, or clears the selection
    /// if every loaded row is already selected.
    ///
    /// Scope is the loaded page, ignoring the local search term.
    pub async fn toggle_select_all(&self) {
        let ids = self.table.read().await.ids();

        let mut state = self.state.write().await;
        if !ids.is_empty() && state.selected.len() == ids.len() {
            state.selected.clear();
        } else {
            state.selected = ids.into_iter().collect();
        }
    }

    /// Currently selected ids, sorted for deterministic output.
    pub async fn selected_ids(&self) -> Vec<String> {
        let state = self.state.read().await;
        let mut ids: Vec<String> = state.selected.iter().cloned().collect();
        ids.sort();
        ids
    }

    /// True when the row is currently selected.
    pub async fn is_selected(&self, id: &str) -> bool {
        self.state.read().await.selected.contains(id)
    }

    /// Opens one row's detail panel, closing any other (last expand wins);
    /// toggling the open row closes it.
    pub async fn toggle_expanded(&self, id: &str) {
        let mut state = self.state.write().await;
        state.expanded = if state.expanded.as_deref() == Some(id) {
            None
        } else {
            Some(id.to_string())
        };
    }

    /// The currently expanded row id, if any.
    pub async fn expanded(&self) -> Option<String> {
        self.state.read().await.expanded.clone()
    }

    // =========================================================================
    // Mutations
    // =========================================================================
    // All mutations are server-first: the reducer is only touched after the
    // collaborator confirms. A NotFound answer means the record is gone on
    // the server, so it is evicted locally as well.

    /// Updates one order's fulfilment status.
    ///
    /// Idempotent at the id level: repeating the call with the same status
    /// yields the same observable state.
    pub async fn update_status(&self, id: &str, status: OrderStatus) -> EngineResult<()> {
        self.begin_mutation(id)?;
        let result = self.mutator.update_status(id, status).await;
        self.end_mutation(id);

        match result {
            Ok(()) => {
                self.table.write().await.patch_status(id, status);
                info!(id, status = %status, "Order status updated");
                self.emitter.emit(TableEvent::StatusUpdated {
                    id: id.to_string(),
                    status,
                });
                Ok(())
            }
            Err(e) => self.handle_mutation_failure(id, e).await,
        }
    }

    /// Saves a full-record edit.
    pub async fn save_order(&self, record: OrderRecord) -> EngineResult<()> {
        let id = record.id.clone();
        self.begin_mutation(&id)?;
        let result = self.mutator.update_order(&record).await;
        self.end_mutation(&id);

        match result {
            Ok(()) => {
                self.table.write().await.replace(record);
                info!(id, "Order updated");
                self.emitter.emit(TableEvent::OrderReplaced { id });
                Ok(())
            }
            Err(e) => self.handle_mutation_failure(&id, e).await,
        }
    }

    /// Deletes one order. Confirmation is the caller's concern: this is the
    /// post-confirmation entry point, and the engine never deletes through
    /// any other path.
    pub async fn delete_confirmed(&self, id: &str) -> EngineResult<()> {
        self.begin_mutation(id)?;
        let result = self.mutator.delete_order(id).await;
        self.end_mutation(id);

        match result {
            Ok(()) => {
                self.evict(&[id.to_string()]).await;
                info!(id, "Order deleted");
                self.emitter.emit(TableEvent::Deleted { count: 1 });
                Ok(())
            }
            Err(e) => self.handle_mutation_failure(id, e).await,
        }
    }

    /// Deletes the current selection as one atomic server call.
    ///
    /// Same confirmation contract as [`Self::delete_confirmed`]. On success
    /// every selected row leaves the table in a single batch (one
    /// re-render); on failure nothing is removed and the selection stays.
    /// Returns how many rows were deleted.
    pub async fn bulk_delete_confirmed(&self) -> EngineResult<usize> {
        let ids = self.selected_ids().await;
        if ids.is_empty() {
            return Ok(0);
        }

        self.begin_mutations(&ids)?;
        let result = self.mutator.bulk_delete(&ids).await;
        self.end_mutations(&ids);

        match result {
            Ok(()) => {
                self.evict(&ids).await;
                let count = ids.len();
                info!(count, "Orders bulk-deleted");
                self.emitter.emit(TableEvent::Deleted { count });
                Ok(count)
            }
            Err(e) => {
                // All-or-nothing: the server call failed, so nothing local
                // changes either
                self.surface_error(&e);
                Err(e)
            }
        }
    }

    // =========================================================================
    // Exports
    // =========================================================================

    /// CSV bytes for the selected rows, or for the locally-filtered rows
    /// when nothing is selected.
    pub async fn export_csv(&self) -> Vec<u8> {
        let (selected, term) = {
            let state = self.state.read().await;
            (state.selected.clone(), state.filters.search_term.clone())
        };

        let table = self.table.read().await;
        let rows: Vec<OrderRecord> = if selected.is_empty() {
            table.filtered(&term).into_iter().cloned().collect()
        } else {
            table
                .records()
                .iter()
                .filter(|r| selected.contains(&r.id))
                .cloned()
                .collect()
        };

        export::export_csv(&rows)
    }

    /// Printable receipt bytes for one loaded order.
    pub async fn receipt_for(&self, id: &str) -> Option<Vec<u8>> {
        self.table.read().await.get(id).map(export::render_receipt)
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    /// The rows the shell should render: loaded records, local search
    /// applied, cloned out of the lock.
    pub async fn rows(&self) -> Vec<OrderRecord> {
        let term = self.state.read().await.filters.search_term.clone();
        let table = self.table.read().await;
        table.filtered(&term).into_iter().cloned().collect()
    }

    /// Summary aggregates over the loaded page.
    pub async fn aggregates(&self) -> OrderAggregates {
        self.table.read().await.aggregates()
    }

    /// Current pagination state.
    pub async fn page_state(&self) -> PageState {
        self.state.read().await.page
    }

    /// Current sort state.
    pub async fn sort(&self) -> SortSpec {
        self.state.read().await.sort
    }

    /// Current filter set.
    pub async fn filters(&self) -> OrderFilters {
        self.state.read().await.filters.clone()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Marks an id as having a mutation in flight, rejecting doubles.
    fn begin_mutation(&self, id: &str) -> EngineResult<()> {
        let mut in_flight = self.in_flight.lock().expect("in-flight mutex poisoned");
        if !in_flight.insert(id.to_string()) {
            return Err(EngineError::MutationInFlight(id.to_string()));
        }
        Ok(())
    }

    /// Marks a whole id set in flight, rejecting if any id already is.
    fn begin_mutations(&self, ids: &[String]) -> EngineResult<()> {
        let mut in_flight = self.in_flight.lock().expect("in-flight mutex poisoned");
        if let Some(busy) = ids.iter().find(|id| in_flight.contains(*id)) {
            return Err(EngineError::MutationInFlight(busy.clone()));
        }
        for id in ids {
            in_flight.insert(id.clone());
        }
        Ok(())
    }

    fn end_mutation(&self, id: &str) {
        self.in_flight
            .lock()
            .expect("in-flight mutex poisoned")
            .remove(id);
    }

    fn end_mutations(&self, ids: &[String]) {
        let mut in_flight = self.in_flight.lock().expect("in-flight mutex poisoned");
        for id in ids {
            in_flight.remove(id);
        }
    }

    /// Removes records locally and prunes selection/expansion to match.
    async fn evict(&self, ids: &[String]) {
        self.table.write().await.remove_many(ids);

        let mut state = self.state.write().await;
        for id in ids {
            state.selected.remove(id);
        }
        if let Some(expanded) = &state.expanded {
            if ids.contains(expanded) {
                state.expanded = None;
            }
        }
    }

    /// Shared failure path for single-target mutations.
    ///
    /// A NotFound answer is the server confirming the record is gone: evict
    /// it locally so the table stops showing a phantom row, then surface
    /// the error anyway so the shell can explain what happened.
    async fn handle_mutation_failure(&self, id: &str, error: EngineError) -> EngineResult<()> {
        if error.is_not_found() {
            self.evict(&[id.to_string()]).await;
        }
        self.surface_error(&error);
        Err(error)
    }

    fn surface_error(&self, error: &EngineError) {
        self.emitter.emit(TableEvent::Error {
            message: error.to_string(),
            retryable: error.is_retryable(),
        });
    }
}

// =============================================================================
// Tests
// =============================================================================

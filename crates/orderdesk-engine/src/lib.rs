//! # orderdesk-engine: Order Table Engine for OrderDesk
//!
//! This crate provides the headless engine behind the order tables of the
//! OrderDesk admin and staff panels: fetch, enrich, reduce, select, mutate.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Order Table Engine Architecture                      │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                 OrderTableEngine (Main Orchestrator)             │  │
//! │  │                                                                  │  │
//! │  │  One instance per rendered order table                           │  │
//! │  │  Owns view state, records, and the mutation guards              │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │         ┌─────────────────────┼─────────────────────┐                  │
//! │         ▼                     ▼                     ▼                   │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │ Query Builder  │  │  Enrichment    │  │  OrderTable            │    │
//! │  │                │  │                │  │  (view-model reducer)  │    │
//! │  │ Filters/sort/  │  │ Raw payload →  │  │                        │    │
//! │  │ page → request │  │ records via    │  │ Canonical records,     │    │
//! │  │ descriptor     │  │ name lookups   │  │ local search, derived  │    │
//! │  │                │  │ (join_all)     │  │ aggregates             │    │
//! │  └────────────────┘  └────────────────┘  └────────────────────────┘    │
//! │                                                                         │
//! │  COLLABORATOR SEAMS (api.rs, implemented by the shell):                │
//! │  • OrderSource   - raw order listings                                  │
//! │  • NameResolver  - customer / product reference resolution             │
//! │  • OrderMutator  - status updates, edits, deletes                      │
//! │                                                                         │
//! │  EVENTS (events.rs, consumed by the shell):                            │
//! │  • Loaded / StatusUpdated / OrderReplaced / Deleted / Error            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`engine`] - Main `OrderTableEngine` orchestrator
//! - [`query`] - Filter/sort/pagination state and the query builder
//! - [`enrich`] - Enrichment stage (reference resolution fan-out)
//! - [`table`] - View-model reducer over the loaded page
//! - [`api`] - Collaborator trait contracts (REST seams)
//! - [`events`] - Instance-scoped notification channel
//! - [`config`] - Engine configuration (TOML file + env overrides)
//! - [`error`] - Engine error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use orderdesk_engine::{ChannelEmitter, OrderTableEngine, TableConfig};
//!
//! // Collaborators implement the api.rs traits over the REST endpoints
//! let (emitter, mut events) = ChannelEmitter::new();
//! let engine = OrderTableEngine::with_emitter(
//!     TableConfig::load_or_default(None)?,
//!     source,
//!     resolver,
//!     mutator,
//!     Arc::new(emitter),
//! );
//!
//! engine.refresh().await?;
//! engine.set_search_term("momo").await;      // local, no refetch
//! engine.go_to_page(2).await?;               // coupled to a refetch
//! engine.update_status("ord-1", OrderStatus::Ready).await?;
//! let csv = engine.export_csv().await;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod api;
pub mod config;
pub mod engine;
pub mod enrich;
pub mod error;
pub mod events;
pub mod query;
pub mod table;

// =============================================================================
// Re-exports
// =============================================================================

// Core types, re-exported so shells depend on one crate
pub use orderdesk_core::{
    LineItem, OrderAggregates, OrderRecord, OrderStatus, PaymentMethod, UNKNOWN_CUSTOMER,
    UNKNOWN_PRODUCT,
};

// Engine surface
pub use api::{NameResolver, OrderMutator, OrderSource};
pub use config::TableConfig;
pub use engine::{LoadOutcome, OrderTableEngine};
pub use enrich::EnrichedBatch;
pub use error::{EngineError, EngineResult};
pub use events::{ChannelEmitter, NoOpEmitter, TableEvent, TableEventEmitter};
pub use query::{
    build_query, OrderFilters, PageState, QueryDescriptor, SortDirection, SortField, SortSpec,
};
pub use table::OrderTable;

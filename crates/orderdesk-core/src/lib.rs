//! # orderdesk-core: Pure Domain Logic for OrderDesk
//!
//! This crate is the **heart** of the OrderDesk order administration stack.
//! It contains all domain logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      OrderDesk Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Admin / Staff Panel (SPA shells)                   │   │
//! │  │    Search UI ──► Order Table ──► Detail Panel ──► Export        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ snapshots + events                     │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    orderdesk-engine                             │   │
//! │  │    fetch, enrich, reduce, select, mutate (async)                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ orderdesk-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │    raw    │  │   stats   │  │  export   │  │   │
//! │  │   │OrderRecord│  │ RawOrder  │  │Aggregates │  │ CSV bytes │  │   │
//! │  │   │ LineItem  │  │ parsing   │  │ revenue   │  │ receipts  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO DATABASE • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (OrderRecord, LineItem, OrderStatus, etc.)
//! - [`raw`] - Raw server-payload schema and its single validation pass
//! - [`amount`] - Display-amount parsing ("Rs 100" → 100.0)
//! - [`stats`] - Aggregates over loaded records (revenue, pending, today)
//! - [`export`] - CSV export and receipt rendering as pure byte producers
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Server Totals Are Authoritative**: display totals are parsed for
//!    summary tiles only, never recomputed from line items
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use orderdesk_core::amount::parse_display_amount;
//!
//! // Parse a server-formatted total for the revenue tile
//! assert_eq!(parse_display_amount("Rs 150.50"), 150.50);
//!
//! // Malformed totals contribute zero instead of failing
//! assert_eq!(parse_display_amount("Rs abc"), 0.0);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod amount;
pub mod error;
pub mod export;
pub mod raw;
pub mod stats;
pub mod types;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use orderdesk_core::OrderRecord` instead of
// `use orderdesk_core::types::OrderRecord`

pub use error::ValidationError;
pub use raw::{RawBatch, RawCart, RawCartItem, RawOrder};
pub use stats::OrderAggregates;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Display fallback when a customer reference cannot be resolved.
///
/// ## Why a constant?
/// The fallback leaks into search results, CSV exports, and receipts, so
/// every layer must agree on the exact literal.
pub const UNKNOWN_CUSTOMER: &str = "Unknown User";

/// Display fallback when a product reference cannot be resolved.
pub const UNKNOWN_PRODUCT: &str = "Unknown Product";

/// Currency prefix used in display amounts ("Rs 150.50").
///
/// The ordering API formats all totals with this prefix; parsing strips it
/// back out for the revenue aggregate.
pub const CURRENCY_PREFIX: &str = "Rs";

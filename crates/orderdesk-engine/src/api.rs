//! # Collaborator Contracts
//!
//! The REST seams the engine is implemented against. The engine never
//! touches HTTP itself; UI shells hand it implementations of these traits
//! (and tests hand it stubs).
//!
//! ## Collaborators
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Engine Collaborators                               │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │  OrderSource   │  │  NameResolver  │  │  OrderMutator          │    │
//! │  │                │  │                │  │                        │    │
//! │  │ fetch_orders   │  │ resolve_       │  │ update_status          │    │
//! │  │ (raw listing   │  │   customer     │  │ update_order           │    │
//! │  │  payload)      │  │ resolve_       │  │ delete_order           │    │
//! │  │                │  │   product      │  │ bulk_delete            │    │
//! │  └────────────────┘  └────────────────┘  └────────────────────────┘    │
//! │                                                                         │
//! │  FAILURE KINDS: Network (no response), Server (non-2xx),               │
//! │                 NotFound (mutation target gone)                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `fetch_orders` returns the raw response body as JSON; shape validation
//! happens once, at the enrichment boundary, not inside every source
//! implementation.

use async_trait::async_trait;
use serde_json::Value;

use orderdesk_core::{OrderRecord, OrderStatus};

use crate::error::EngineResult;
use crate::query::QueryDescriptor;

// =============================================================================
// Order Source
// =============================================================================

/// Fetches raw order listings.
#[async_trait]
pub trait OrderSource: Send + Sync {
    /// Fetches the listing payload for a query descriptor.
    ///
    /// Returns the raw response body; the engine validates its shape.
    async fn fetch_orders(&self, query: &QueryDescriptor) -> EngineResult<Value>;
}

// =============================================================================
// Name Resolver
// =============================================================================

/// Resolves opaque foreign references into display names.
///
/// Failures here are always recoverable: the enrichment stage substitutes
/// the fallback literals and keeps going.
#[async_trait]
pub trait NameResolver: Send + Sync {
    /// Resolves a customer reference to a display name.
    async fn resolve_customer(&self, customer_ref: &str) -> EngineResult<String>;

    /// Resolves a product reference to a display name.
    async fn resolve_product(&self, product_ref: &str) -> EngineResult<String>;
}

// =============================================================================
// Order Mutator
// =============================================================================

/// Applies order mutations on the server.
///
/// Every call is all-or-nothing from the engine's perspective: the local
/// view model is only touched after the server confirms.
#[async_trait]
pub trait OrderMutator: Send + Sync {
    /// Sets the fulfilment status of one order.
    async fn update_status(&self, id: &str, status: OrderStatus) -> EngineResult<()>;

    /// Replaces one order's editable fields with the given record.
    async fn update_order(&self, record: &OrderRecord) -> EngineResult<()>;

    /// Deletes one order.
    async fn delete_order(&self, id: &str) -> EngineResult<()>;

    /// Deletes a set of orders as a single atomic call.
    async fn bulk_delete(&self, ids: &[String]) -> EngineResult<()>;
}

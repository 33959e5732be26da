//! # Domain Error Types
//!
//! Error types for orderdesk-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  orderdesk-core errors (this file)                                     │
//! │  └── ValidationError  - Raw payload shape failures                     │
//! │                                                                         │
//! │  orderdesk-engine errors (separate crate)                              │
//! │  └── EngineError      - Fetch/mutation failures (wraps ValidationError)│
//! │                                                                         │
//! │  Flow: ValidationError → EngineError → UI shell                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (index, field name)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Validation Error
// =============================================================================

/// Raw order payload validation errors.
///
/// Produced by the single validation pass at the enrichment boundary
/// ([`crate::raw::parse_batch`]). A batch that fails validation produces no
/// records at all; missing *nested* fields inside an otherwise well-formed
/// order are defaulted instead and never reach this error.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The response body is not a JSON object.
    #[error("Response payload is not a JSON object")]
    NotAnObject,

    /// The server reported an unsuccessful response (`success` missing or false).
    #[error("Server reported an unsuccessful response")]
    Unsuccessful,

    /// The `orders` field is missing or not an array.
    #[error("Response payload has no `orders` array")]
    MissingOrders,

    /// A single order entry could not be parsed as an order object.
    #[error("Order at index {index} is malformed: {reason}")]
    MalformedOrder { index: usize, reason: String },
}

// =============================================================================
// Unit Tests
// =============================================================================

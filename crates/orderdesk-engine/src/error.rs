//! # Engine Error Types
//!
//! Error types for the order table engine.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Engine Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │    Transport    │  │     Payload     │  │      Mutation           │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Network        │  │  Validation     │  │  NotFound               │ │
//! │  │  Server         │  │  (from core)    │  │  MutationInFlight       │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐                                                   │
//! │  │  Configuration  │   Lookup failures never appear here: reference    │
//! │  │                 │   resolution degrades to fallback literals        │
//! │  │  InvalidConfig  │   inside the enrichment stage and is absorbed.    │
//! │  │  ConfigLoad     │                                                   │
//! │  └─────────────────┘                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use orderdesk_core::ValidationError;

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Engine error type covering fetch, payload, and mutation failures.
///
/// ## Design Principles
/// - Each variant includes enough context for debugging
/// - Errors are categorized for different handling strategies
/// - All errors are `Send + Sync` for async compatibility
#[derive(Debug, Error)]
pub enum EngineError {
    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// Request produced no response at all (DNS, refused, dropped).
    #[error("Network error: {0}")]
    Network(String),

    /// Server answered with a non-success status.
    #[error("Server error (status {status}): {message}")]
    Server { status: u16, message: String },

    // =========================================================================
    // Payload Errors
    // =========================================================================
    /// The fetched batch failed shape validation; no records were produced.
    #[error("Invalid order payload: {0}")]
    Validation(#[from] ValidationError),

    // =========================================================================
    // Mutation Errors
    // =========================================================================
    /// The mutation target no longer exists on the server.
    #[error("Order not found: {0}")]
    NotFound(String),

    /// A mutation for the same order id is already in flight.
    #[error("A mutation for order {0} is already in flight")]
    MutationInFlight(String),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid engine configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load the config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for EngineError {
    fn from(err: toml::de::Error) -> Self {
        EngineError::ConfigLoadFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization (for surfacing strategy)
// =============================================================================

impl EngineError {
    /// Returns true if retrying the same operation could succeed.
    ///
    /// ## Retryable Errors
    /// - Network failures (connectivity issues)
    /// - Server errors (transient 5xx)
    /// - In-flight collisions (retry after the first mutation settles)
    ///
    /// ## Non-Retryable Errors
    /// - Payload validation failures (server contract drift)
    /// - NotFound (the record is gone)
    /// - Configuration errors
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EngineError::Network(_)
                | EngineError::Server { .. }
                | EngineError::MutationInFlight(_)
        )
    }

    /// Returns true if this error means the target record no longer exists.
    pub fn is_not_found(&self) -> bool {
        matches!(self, EngineError::NotFound(_))
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidConfig(_) | EngineError::ConfigLoadFailed(_)
        )
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

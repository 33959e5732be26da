//! # Engine Events
//!
//! The notification channel between the engine and its UI shell.
//!
//! ## Why A Channel Instead Of Toasts
//! The panels historically fired toast notifications from a module-level
//! singleton wherever a mutation happened. Here every notification flows
//! through an emitter owned by the engine *instance*: shells subscribe,
//! tests assert on the stream, and nothing outlives the engine.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Event Flow                                        │
//! │                                                                         │
//! │  OrderTableEngine ──► TableEventEmitter ──► UI shell                   │
//! │                          │                                              │
//! │                          ├── NoOpEmitter      (tests, headless use)    │
//! │                          └── ChannelEmitter   (mpsc stream for shells) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tokio::sync::mpsc;

use orderdesk_core::OrderStatus;

// =============================================================================
// Events
// =============================================================================

/// Everything the engine tells its shell about.
#[derive(Debug, Clone, PartialEq)]
pub enum TableEvent {
    /// A load committed: `count` rows on the page, `total` across the
    /// filtered result set.
    Loaded { count: usize, total: u64 },

    /// One order's status was updated (server-confirmed).
    StatusUpdated { id: String, status: OrderStatus },

    /// One order was replaced by a full edit (server-confirmed).
    OrderReplaced { id: String },

    /// Orders were deleted (server-confirmed); `count` rows left the table.
    Deleted { count: usize },

    /// A surfaced, non-fatal failure. The engine stays usable.
    Error { message: String, retryable: bool },
}

// =============================================================================
// Emitter Trait
// =============================================================================

/// Trait for delivering engine events to the shell.
pub trait TableEventEmitter: Send + Sync {
    /// Delivers one event.
    fn emit(&self, event: TableEvent);
}

/// No-op event emitter for tests and headless embedding.
pub struct NoOpEmitter;

impl TableEventEmitter for NoOpEmitter {
    fn emit(&self, _event: TableEvent) {}
}

// =============================================================================
// Channel Emitter
// =============================================================================

/// Emitter backed by an unbounded channel; the shell consumes the receiver.
///
/// Unbounded is deliberate: event production happens inside engine calls
/// and must never block on a slow consumer. A shell that stops draining
/// only leaks its own events.
pub struct ChannelEmitter {
    tx: mpsc::UnboundedSender<TableEvent>,
}

impl ChannelEmitter {
    /// Creates an emitter plus the receiving end for the shell.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TableEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ChannelEmitter { tx }, rx)
    }
}

impl TableEventEmitter for ChannelEmitter {
    fn emit(&self, event: TableEvent) {
        // A dropped receiver just means the shell went away; not an error
        let _ = self.tx.send(event);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # Domain Types
//!
//! Core domain types used throughout OrderDesk.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  OrderRecord    │   │    LineItem     │   │  OrderStatus    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (string)    │   │  product_name   │   │  New            │       │
//! │  │  customer_name  │   │  quantity       │   │  Confirmed      │       │
//! │  │  line_items     │   │  unit_price     │   │  Preparing      │       │
//! │  │  total_display  │   │  (display)      │   │  Ready          │       │
//! │  │  status         │   └─────────────────┘   │  Cancelled      │       │
//! │  └─────────────────┘                         └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐                                                   │
//! │  │ PaymentMethod   │   Payment *status* is never stored: it is a       │
//! │  │  ─────────────  │   pure derivation from the method                 │
//! │  │  Cash           │   (OnlineKhalti → "Paid", Cash → "Pending").      │
//! │  │  OnlineKhalti   │                                                   │
//! │  └─────────────────┘                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Server Totals Are Authoritative
//! `total_display` is the server-formatted total string. It is never
//! recomputed from line items; the revenue tile parses it back out with
//! [`crate::amount::parse_display_amount`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Order Status
// =============================================================================

/// The fulfilment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum OrderStatus {
    /// Order just placed, not yet acknowledged by staff.
    New,
    /// Staff acknowledged the order.
    Confirmed,
    /// Kitchen is working on it.
    Preparing,
    /// Ready for pickup / delivery handoff.
    Ready,
    /// Order was cancelled.
    Cancelled,
}

impl OrderStatus {
    /// All statuses, in the order the UI presents them.
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::New,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Cancelled,
    ];

    /// Parses a wire status string leniently.
    ///
    /// The ordering API historically emitted free-form status strings;
    /// anything unrecognized (or absent) lands on `New`, matching the
    /// platform's default for a freshly placed order.
    pub fn from_wire(value: Option<&str>) -> Self {
        match value {
            Some("New") => OrderStatus::New,
            Some("Confirmed") => OrderStatus::Confirmed,
            Some("Preparing") => OrderStatus::Preparing,
            Some("Ready") => OrderStatus::Ready,
            Some("Cancelled") => OrderStatus::Cancelled,
            _ => OrderStatus::New,
        }
    }

    /// The wire/display label for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::New => "New",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Preparing => "Preparing",
            OrderStatus::Ready => "Ready",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    /// True for orders that still need staff attention.
    #[inline]
    pub fn is_pending(&self) -> bool {
        matches!(self, OrderStatus::New | OrderStatus::Confirmed)
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::New
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How the customer paid for the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum PaymentMethod {
    /// Cash on delivery / at the counter.
    Cash,
    /// Online payment through the Khalti wallet.
    OnlineKhalti,
}

impl PaymentMethod {
    /// Parses a wire payment-method string leniently.
    ///
    /// The API emits `"khalti"` for wallet payments (older payloads used
    /// `"online"`); everything else, including a missing field, is cash.
    pub fn from_wire(value: Option<&str>) -> Self {
        match value {
            Some("khalti") | Some("online") => PaymentMethod::OnlineKhalti,
            _ => PaymentMethod::Cash,
        }
    }

    /// The value sent in query descriptors and mutation payloads.
    pub fn wire_value(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::OnlineKhalti => "khalti",
        }
    }

    /// Human-facing label used in exports and receipts.
    pub fn display_label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash on Delivery",
            PaymentMethod::OnlineKhalti => "Online Payment (Khalti)",
        }
    }

    /// Derives the displayed payment status from the method.
    ///
    /// This is a display heuristic, not a real payment state: wallet
    /// payments are collected up front ("Paid"), cash is settled on
    /// handoff ("Pending"). It is derived on read, never stored.
    pub fn payment_status(&self) -> &'static str {
        match self {
            PaymentMethod::OnlineKhalti => "Paid",
            PaymentMethod::Cash => "Pending",
        }
    }
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Cash
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// A single line of an order, as displayed in the table.
///
/// ## Design Notes
/// - `product_name`: resolved display name (falls back to
///   [`crate::UNKNOWN_PRODUCT`] when the product reference cannot be resolved)
/// - `unit_price_display`: server-formatted price string, kept verbatim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Resolved product display name.
    pub product_name: String,

    /// Quantity ordered (always ≥ 1; payloads without one default to 1).
    pub quantity: i64,

    /// Server-formatted unit price ("Rs 250").
    pub unit_price_display: String,
}

// =============================================================================
// Order Record
// =============================================================================

/// A fully enriched order, as held by the view-model reducer.
///
/// Constructed once by the enrichment stage from a raw server payload plus
/// resolved name lookups; after that only `status` is patched in place (or
/// the whole record replaced on a full edit).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    /// Opaque unique order identifier.
    pub id: String,

    /// Resolved customer display name.
    pub customer_name: String,

    /// Ordered line items (display order = server order).
    pub line_items: Vec<LineItem>,

    /// Server-formatted order total ("Rs 1050"). Authoritative; never
    /// recomputed from line items.
    pub total_display: String,

    /// Current fulfilment status.
    pub status: OrderStatus,

    /// When the order was placed.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// How the customer paid.
    pub payment_method: PaymentMethod,

    /// Uploaded payment receipt reference. Present only for Khalti orders
    /// that came with a screenshot.
    pub receipt_image_ref: Option<String>,

    /// Free-text order notes.
    pub notes: Option<String>,

    /// Customer phone number, when the order carried one.
    pub phone: Option<String>,

    /// Delivery address, when the order carried one.
    pub address: Option<String>,
}

impl OrderRecord {
    /// Derived payment status display string ("Paid" / "Pending").
    #[inline]
    pub fn payment_status(&self) -> &'static str {
        self.payment_method.payment_status()
    }

    /// Case-insensitive substring match against the order id, the customer
    /// name, and every line item's product name.
    ///
    /// An empty (or whitespace-only) term matches every record, so the
    /// search box can be cleared without special-casing upstream.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }

        self.id.to_lowercase().contains(&term)
            || self.customer_name.to_lowercase().contains(&term)
            || self
                .line_items
                .iter()
                .any(|item| item.product_name.to_lowercase().contains(&term))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with(id: &str, customer: &str, products: &[&str]) -> OrderRecord {
        OrderRecord {
            id: id.to_string(),
            customer_name: customer.to_string(),
            line_items: products
                .iter()
                .map(|p| LineItem {
                    product_name: p.to_string(),
                    quantity: 1,
                    unit_price_display: "Rs 100".to_string(),
                })
                .collect(),
            total_display: "Rs 100".to_string(),
            status: OrderStatus::New,
            created_at: Utc::now(),
            payment_method: PaymentMethod::Cash,
            receipt_image_ref: None,
            notes: None,
            phone: None,
            address: None,
        }
    }

    #[test]
    fn test_status_from_wire_lenient() {
        assert_eq!(OrderStatus::from_wire(Some("Ready")), OrderStatus::Ready);
        assert_eq!(OrderStatus::from_wire(Some("shipped")), OrderStatus::New);
        assert_eq!(OrderStatus::from_wire(None), OrderStatus::New);
    }

    #[test]
    fn test_payment_method_from_wire() {
        assert_eq!(
            PaymentMethod::from_wire(Some("khalti")),
            PaymentMethod::OnlineKhalti
        );
        // Older payloads used "online" for the same wallet flow
        assert_eq!(
            PaymentMethod::from_wire(Some("online")),
            PaymentMethod::OnlineKhalti
        );
        assert_eq!(PaymentMethod::from_wire(Some("cash")), PaymentMethod::Cash);
        assert_eq!(PaymentMethod::from_wire(None), PaymentMethod::Cash);
    }

    #[test]
    fn test_payment_status_derivation() {
        assert_eq!(PaymentMethod::OnlineKhalti.payment_status(), "Paid");
        assert_eq!(PaymentMethod::Cash.payment_status(), "Pending");
    }

    #[test]
    fn test_pending_statuses() {
        assert!(OrderStatus::New.is_pending());
        assert!(OrderStatus::Confirmed.is_pending());
        assert!(!OrderStatus::Preparing.is_pending());
        assert!(!OrderStatus::Cancelled.is_pending());
    }

    #[test]
    fn test_matches_search_fields() {
        let record = record_with("ord-001", "Asha Gurung", &["Chicken Momo", "Chowmein"]);

        assert!(record.matches_search("ORD-001"));
        assert!(record.matches_search("asha"));
        assert!(record.matches_search("momo"));
        assert!(!record.matches_search("pizza"));
    }

    #[test]
    fn test_matches_search_empty_term_matches_all() {
        let record = record_with("ord-002", "Bikram", &[]);
        assert!(record.matches_search(""));
        assert!(record.matches_search("   "));
    }
}

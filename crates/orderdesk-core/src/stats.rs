//! # Order Aggregates
//!
//! Derived summary statistics for the dashboard tiles above the order table.
//!
//! ## Scope: Loaded Records Only
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Aggregate Scope                                    │
//! │                                                                         │
//! │   Server result set (totalCount = 240)                                 │
//! │   ┌───────────────────────────────────────────────┐                    │
//! │   │ page 1 │ page 2 │ ★ page 3 (loaded) ★ │ ...   │                    │
//! │   └───────────────────────────────────────────────┘                    │
//! │                         ▲                                               │
//! │                         │                                               │
//! │   total_revenue, pending_count, today_count are computed over the      │
//! │   loaded page ONLY. The server exposes no aggregate endpoint, so the   │
//! │   tiles describe what the operator is looking at, not the full set.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! "Today" is the host's local calendar day, matching how the panels
//! display order dates.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::amount::parse_display_amount;
use crate::types::OrderRecord;

// =============================================================================
// Aggregates
// =============================================================================

/// Summary statistics over the currently loaded records.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderAggregates {
    /// Sum of the parsed display totals of loaded records. Malformed totals
    /// contribute zero.
    pub total_revenue: f64,

    /// Loaded orders still needing staff attention (New or Confirmed).
    pub pending_count: usize,

    /// Loaded orders placed on the reference calendar day.
    pub today_count: usize,
}

/// Computes aggregates over `records` with `today` as the reference day.
///
/// Pure function: callers pass the reference date so tests are not pinned
/// to the wall clock. Production callers use [`local_today`].
pub fn aggregates(records: &[OrderRecord], today: NaiveDate) -> OrderAggregates {
    let total_revenue = records
        .iter()
        .map(|r| parse_display_amount(&r.total_display))
        .sum();

    let pending_count = records.iter().filter(|r| r.status.is_pending()).count();

    let today_count = records
        .iter()
        .filter(|r| r.created_at.with_timezone(&Local).date_naive() == today)
        .count();

    OrderAggregates {
        total_revenue,
        pending_count,
        today_count,
    }
}

/// The host's current local calendar day.
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OrderStatus, PaymentMethod};
    use chrono::{Duration, Utc};

    fn record(total: &str, status: OrderStatus, days_ago: i64) -> OrderRecord {
        OrderRecord {
            id: format!("ord-{}-{}", total, days_ago),
            customer_name: "Test Customer".to_string(),
            line_items: Vec::new(),
            total_display: total.to_string(),
            status,
            created_at: Utc::now() - Duration::days(days_ago),
            payment_method: PaymentMethod::Cash,
            receipt_image_ref: None,
            notes: None,
            phone: None,
            address: None,
        }
    }

    #[test]
    fn test_revenue_sums_parsed_totals() {
        let records = vec![
            record("Rs 100", OrderStatus::Ready, 0),
            record("Rs 50.50", OrderStatus::Ready, 0),
            record("Rs abc", OrderStatus::Ready, 0),
        ];

        let agg = aggregates(&records, local_today());
        // Malformed total contributes 0, never an error
        assert_eq!(agg.total_revenue, 150.50);
    }

    #[test]
    fn test_pending_counts_new_and_confirmed() {
        let records = vec![
            record("Rs 10", OrderStatus::New, 0),
            record("Rs 10", OrderStatus::Confirmed, 0),
            record("Rs 10", OrderStatus::Preparing, 0),
            record("Rs 10", OrderStatus::Cancelled, 0),
        ];

        assert_eq!(aggregates(&records, local_today()).pending_count, 2);
    }

    #[test]
    fn test_today_count_uses_reference_day() {
        let records = vec![
            record("Rs 10", OrderStatus::New, 0),
            record("Rs 10", OrderStatus::New, 0),
            record("Rs 10", OrderStatus::New, 3),
        ];

        assert_eq!(aggregates(&records, local_today()).today_count, 2);
    }

    #[test]
    fn test_empty_slice_yields_defaults() {
        let agg = aggregates(&[], local_today());
        assert_eq!(agg, OrderAggregates::default());
    }
}

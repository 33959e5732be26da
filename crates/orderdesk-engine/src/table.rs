//! # Order Table (View-Model Reducer)
//!
//! Holds the canonical collection of enriched orders for one engine
//! instance, plus the server's filtered total count.
//!
//! ## Reducer Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Order Table Operations                               │
//! │                                                                         │
//! │  Engine Action              Reducer Call           Collection Change    │
//! │  ─────────────              ────────────           ─────────────────    │
//! │                                                                         │
//! │  Fetch + enrich ──────────► load() ──────────────► replace everything  │
//! │                                                                         │
//! │  Status confirmed ────────► patch_status() ──────► records[i].status   │
//! │                                                                         │
//! │  Edit confirmed ──────────► replace() ───────────► records[i] = record │
//! │                                                                         │
//! │  Delete confirmed ────────► remove() ────────────► records.retain(..)  │
//! │                                                                         │
//! │  Bulk delete confirmed ───► remove_many() ───────► one batch eviction  │
//! │                                                                         │
//! │  Render / search ─────────► filtered() ──────────► (read only)         │
//! │                                                                         │
//! │  Summary tiles ───────────► aggregates() ────────► (read only, lazy)   │
//! │                                                                         │
//! │  NOTE: load() has replace semantics - a refetch can never duplicate    │
//! │        records, and every mutation is an atomic patch/remove.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashSet;

use orderdesk_core::{stats, OrderAggregates, OrderRecord, OrderStatus};

// =============================================================================
// Order Table
// =============================================================================

/// The canonical loaded page of orders.
///
/// ## Invariants
/// - Record ids are unique (load replaces, mutations patch in place)
/// - `total_count` reflects the server's count for the current filter set,
///   independent of page size
#[derive(Debug, Clone, Default)]
pub struct OrderTable {
    /// Loaded records, in server order.
    records: Vec<OrderRecord>,

    /// Server-side count for the current filter set.
    total_count: u64,
}

impl OrderTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        OrderTable::default()
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Replaces the collection with a freshly enriched page.
    ///
    /// Replace, never append: a refetch supersedes the previous page
    /// wholesale, so duplicate insertion is impossible by construction.
    pub fn load(&mut self, records: Vec<OrderRecord>, total_count: u64) {
        self.records = records;
        self.total_count = total_count;
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Loaded records in server order.
    pub fn records(&self) -> &[OrderRecord] {
        &self.records
    }

    /// Server-side count for the current filter set.
    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    /// Number of loaded records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when nothing is loaded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Looks up one loaded record by id.
    pub fn get(&self, id: &str) -> Option<&OrderRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// True when a record with this id is loaded.
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Ids of all loaded records, in order.
    pub fn ids(&self) -> Vec<String> {
        self.records.iter().map(|r| r.id.clone()).collect()
    }

    /// Loaded records matching the local search term, non-mutating.
    ///
    /// Search is layered on top of server-side filtering and only ever sees
    /// the loaded page - it never triggers a fetch.
    pub fn filtered(&self, search_term: &str) -> Vec<&OrderRecord> {
        self.records
            .iter()
            .filter(|r| r.matches_search(search_term))
            .collect()
    }

    /// Summary aggregates over the loaded records, recomputed on read.
    pub fn aggregates(&self) -> OrderAggregates {
        stats::aggregates(&self.records, stats::local_today())
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Patches one record's status in place. No-op (false) if the id is
    /// not loaded.
    pub fn patch_status(&mut self, id: &str, status: OrderStatus) -> bool {
        match self.records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                record.status = status;
                true
            }
            None => false,
        }
    }

    /// Replaces one record wholesale (full edit). No-op (false) if the id
    /// is not loaded.
    pub fn replace(&mut self, record: OrderRecord) -> bool {
        match self.records.iter_mut().find(|r| r.id == record.id) {
            Some(slot) => {
                *slot = record;
                true
            }
            None => false,
        }
    }

    /// Evicts one record. No-op (false) if the id is not loaded.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        let removed = self.records.len() != before;
        if removed {
            self.total_count = self.total_count.saturating_sub(1);
        }
        removed
    }

    /// Evicts a set of records in one pass; returns how many left the table.
    ///
    /// One batch eviction, not per-id events - callers re-render once.
    pub fn remove_many(&mut self, ids: &[String]) -> usize {
        let targets: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let before = self.records.len();
        self.records.retain(|r| !targets.contains(r.id.as_str()));
        let removed = before - self.records.len();
        self.total_count = self.total_count.saturating_sub(removed as u64);
        removed
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use orderdesk_core::{LineItem, PaymentMethod};

    fn record(id: &str, customer: &str, product: &str, total: &str) -> OrderRecord {
        OrderRecord {
            id: id.to_string(),
            customer_name: customer.to_string(),
            line_items: vec![LineItem {
                product_name: product.to_string(),
                quantity: 1,
                unit_price_display: total.to_string(),
            }],
            total_display: total.to_string(),
            status: OrderStatus::New,
            created_at: Utc::now(),
            payment_method: PaymentMethod::Cash,
            receipt_image_ref: None,
            notes: None,
            phone: None,
            address: None,
        }
    }

    fn loaded_table() -> OrderTable {
        let mut table = OrderTable::new();
        table.load(
            vec![
                record("ord-1", "Asha", "Chicken Momo", "Rs 100"),
                record("ord-2", "Bikram", "Veg Pizza", "Rs 50.50"),
                record("ord-3", "Chandra", "Chowmein", "Rs abc"),
            ],
            30,
        );
        table
    }

    #[test]
    fn test_load_has_replace_semantics() {
        let mut table = loaded_table();
        assert_eq!(table.len(), 3);

        // Re-loading the same page must not duplicate records
        table.load(vec![record("ord-1", "Asha", "Chicken Momo", "Rs 100")], 30);
        assert_eq!(table.len(), 1);
        assert_eq!(table.total_count(), 30);
    }

    #[test]
    fn test_filtered_matches_loaded_only() {
        let table = loaded_table();

        let hits = table.filtered("pizza");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "ord-2");

        // Empty term returns the whole page
        assert_eq!(table.filtered("").len(), 3);
    }

    #[test]
    fn test_patch_status() {
        let mut table = loaded_table();

        assert!(table.patch_status("ord-1", OrderStatus::Ready));
        assert_eq!(table.get("ord-1").unwrap().status, OrderStatus::Ready);

        // Repeating the same patch leaves state identical
        let snapshot = table.records().to_vec();
        assert!(table.patch_status("ord-1", OrderStatus::Ready));
        assert_eq!(table.records(), snapshot.as_slice());

        // Absent id is a no-op
        assert!(!table.patch_status("ord-99", OrderStatus::Ready));
    }

    #[test]
    fn test_replace_record() {
        let mut table = loaded_table();
        let mut edited = record("ord-2", "Bikram Thapa", "Veg Pizza", "Rs 60");
        edited.status = OrderStatus::Confirmed;

        assert!(table.replace(edited));
        let current = table.get("ord-2").unwrap();
        assert_eq!(current.customer_name, "Bikram Thapa");
        assert_eq!(current.status, OrderStatus::Confirmed);

        assert!(!table.replace(record("ord-99", "Nobody", "Nothing", "Rs 0")));
    }

    #[test]
    fn test_remove_absent_id_is_structural_noop() {
        let mut table = loaded_table();
        let snapshot = table.records().to_vec();
        let count = table.total_count();

        assert!(!table.remove("ord-99"));
        assert_eq!(table.records(), snapshot.as_slice());
        assert_eq!(table.total_count(), count);
    }

    #[test]
    fn test_remove_many_is_one_batch() {
        let mut table = loaded_table();
        let removed = table.remove_many(&["ord-1".to_string(), "ord-3".to_string()]);

        assert_eq!(removed, 2);
        assert_eq!(table.ids(), vec!["ord-2"]);
        assert_eq!(table.total_count(), 28);
    }

    #[test]
    fn test_aggregates_over_loaded_page() {
        let table = loaded_table();
        let agg = table.aggregates();

        // "Rs abc" contributes zero, never an error
        assert_eq!(agg.total_revenue, 150.50);
        assert_eq!(agg.pending_count, 3);
        assert_eq!(agg.today_count, 3);
    }
}

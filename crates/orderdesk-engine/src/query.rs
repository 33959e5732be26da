//! # Query Building
//!
//! Filter/sort/pagination state and its translation into a request
//! descriptor for the order source.
//!
//! ## Descriptor Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      build_query()                                      │
//! │                                                                         │
//! │  OPTIONAL (omitted when unset; "All" never goes on the wire):          │
//! │    status=Confirmed                                                    │
//! │    paymentMethod=khalti                                                │
//! │    startDate=2025-03-01   endDate=2025-03-31                           │
//! │                                                                         │
//! │  MANDATORY (always present):                                           │
//! │    page=1   limit=10   sortBy=createdAt   sortOrder=desc               │
//! │                                                                         │
//! │  NEVER SENT:                                                           │
//! │    the search term: search is applied client-side over the loaded      │
//! │    page, so typing never costs a round trip                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `build_query` is a pure function: same inputs, same descriptor, no
//! side effects.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use orderdesk_core::{OrderStatus, PaymentMethod};

// =============================================================================
// Sort State
// =============================================================================

/// Server-sortable columns of the order table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    /// Order placement time (the default).
    CreatedAt,
    /// Order id.
    Id,
    /// Order total.
    Total,
    /// Fulfilment status.
    Status,
}

impl SortField {
    /// Parses a wire sort key; unknown keys fall back to `CreatedAt`.
    pub fn from_wire(value: &str) -> Self {
        match value {
            "createdAt" => SortField::CreatedAt,
            "id" | "_id" => SortField::Id,
            "total" => SortField::Total,
            "status" => SortField::Status,
            _ => SortField::CreatedAt,
        }
    }

    /// The `sortBy` value sent to the server.
    pub fn wire_value(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "createdAt",
            SortField::Id => "id",
            SortField::Total => "total",
            SortField::Status => "status",
        }
    }
}

impl Default for SortField {
    fn default() -> Self {
        SortField::CreatedAt
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// The `sortOrder` value sent to the server.
    pub fn wire_value(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    fn flipped(&self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl Default for SortDirection {
    fn default() -> Self {
        SortDirection::Desc
    }
}

/// The active sort column and direction.
///
/// Defaults to newest-first (`createdAt desc`); invalid sort input always
/// lands back here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortSpec {
    /// Column-header click semantics: clicking the active column flips the
    /// direction, clicking a new column sorts it ascending.
    pub fn toggle(&mut self, field: SortField) {
        if self.field == field {
            self.direction = self.direction.flipped();
        } else {
            self.field = field;
            self.direction = SortDirection::Asc;
        }
    }
}

// =============================================================================
// Filter State
// =============================================================================

/// The active filter set.
///
/// `None` means "All" for the enum filters; empty means unset for the date
/// bounds. The search term is local-only and never reaches the server.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderFilters {
    /// Client-side search term (order id, customer name, item name).
    pub search_term: String,

    /// Status filter; `None` = all statuses.
    pub status: Option<OrderStatus>,

    /// Payment-method filter; `None` = all methods.
    pub payment_method: Option<PaymentMethod>,

    /// Inclusive start of the date range.
    pub start_date: Option<NaiveDate>,

    /// Inclusive end of the date range.
    pub end_date: Option<NaiveDate>,
}

// =============================================================================
// Pagination State
// =============================================================================

/// The pagination state machine: `(page, page_size, total_count)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageState {
    /// Current page, 1-based.
    pub page: u32,

    /// Rows per page.
    pub page_size: u32,

    /// Server-side count for the current filter set.
    pub total_count: u64,
}

impl PageState {
    /// Creates the initial state for a given page size (clamped to ≥ 1).
    pub fn new(page_size: u32) -> Self {
        PageState {
            page: 1,
            page_size: page_size.max(1),
            total_count: 0,
        }
    }

    /// Number of pages for the current count; never less than 1 so an empty
    /// result set still has a valid current page.
    pub fn total_pages(&self) -> u32 {
        let pages = self.total_count.div_ceil(self.page_size as u64);
        pages.clamp(1, u32::MAX as u64) as u32
    }

    /// Clamps a requested page into `[1, total_pages]`.
    pub fn clamp_page(&self, requested: u32) -> u32 {
        requested.clamp(1, self.total_pages())
    }
}

impl Default for PageState {
    fn default() -> Self {
        PageState::new(10)
    }
}

// =============================================================================
// Query Descriptor
// =============================================================================

/// An ordered key/value request descriptor for the order source.
///
/// Opaque to the engine beyond construction; REST implementations typically
/// flatten it into a query string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryDescriptor {
    params: Vec<(String, String)>,
}

impl QueryDescriptor {
    /// The descriptor's parameters in build order.
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// First value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Flattens into a `key=value&...` query string.
    ///
    /// Values are engine-controlled (enum labels, ISO dates, numbers), so
    /// no percent-encoding is needed.
    pub fn to_query_string(&self) -> String {
        self.params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }

    fn push(&mut self, key: &str, value: impl ToString) {
        self.params.push((key.to_string(), value.to_string()));
    }
}

/// Builds the request descriptor for the current view state.
///
/// Pure and idempotent: the descriptor depends only on the arguments, never
/// on call order or prior calls.
pub fn build_query(filters: &OrderFilters, sort: &SortSpec, page: &PageState) -> QueryDescriptor {
    let mut descriptor = QueryDescriptor::default();

    // Optional filters: absent means "All" and stays off the wire
    if let Some(status) = filters.status {
        descriptor.push("status", status.as_str());
    }
    if let Some(method) = filters.payment_method {
        descriptor.push("paymentMethod", method.wire_value());
    }
    if let Some(start) = filters.start_date {
        descriptor.push("startDate", start.format("%Y-%m-%d"));
    }
    if let Some(end) = filters.end_date {
        descriptor.push("endDate", end.format("%Y-%m-%d"));
    }

    // Mandatory pagination + sort
    descriptor.push("page", page.page.max(1));
    descriptor.push("limit", page.page_size.max(1));
    descriptor.push("sortBy", sort.field.wire_value());
    descriptor.push("sortOrder", sort.direction.wire_value());

    descriptor
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_query_defaults() {
        let descriptor = build_query(
            &OrderFilters::default(),
            &SortSpec::default(),
            &PageState::new(10),
        );

        assert_eq!(
            descriptor.to_query_string(),
            "page=1&limit=10&sortBy=createdAt&sortOrder=desc"
        );
    }

    #[test]
    fn test_build_query_is_idempotent() {
        let filters = OrderFilters {
            status: Some(OrderStatus::Ready),
            payment_method: Some(PaymentMethod::OnlineKhalti),
            ..Default::default()
        };
        let sort = SortSpec::default();
        let page = PageState::new(25);

        let first = build_query(&filters, &sort, &page);
        let second = build_query(&filters, &sort, &page);
        assert_eq!(first, second);
    }

    #[test]
    fn test_all_filters_are_omitted() {
        let descriptor = build_query(
            &OrderFilters::default(),
            &SortSpec::default(),
            &PageState::new(10),
        );

        assert!(descriptor.get("status").is_none());
        assert!(descriptor.get("paymentMethod").is_none());
        assert!(descriptor.get("startDate").is_none());
        assert!(descriptor.get("endDate").is_none());
    }

    #[test]
    fn test_active_filters_are_included() {
        let filters = OrderFilters {
            status: Some(OrderStatus::Confirmed),
            payment_method: Some(PaymentMethod::Cash),
            start_date: NaiveDate::from_ymd_opt(2025, 3, 1),
            end_date: NaiveDate::from_ymd_opt(2025, 3, 31),
            ..Default::default()
        };

        let descriptor = build_query(&filters, &SortSpec::default(), &PageState::new(10));
        assert_eq!(descriptor.get("status"), Some("Confirmed"));
        assert_eq!(descriptor.get("paymentMethod"), Some("cash"));
        assert_eq!(descriptor.get("startDate"), Some("2025-03-01"));
        assert_eq!(descriptor.get("endDate"), Some("2025-03-31"));
    }

    #[test]
    fn test_search_term_never_sent() {
        let filters = OrderFilters {
            search_term: "momo".to_string(),
            ..Default::default()
        };

        let descriptor = build_query(&filters, &SortSpec::default(), &PageState::new(10));
        assert!(!descriptor.to_query_string().contains("momo"));
    }

    #[test]
    fn test_invalid_sort_falls_back() {
        assert_eq!(SortField::from_wire("garbage"), SortField::CreatedAt);
        let spec = SortSpec::default();
        assert_eq!(spec.field, SortField::CreatedAt);
        assert_eq!(spec.direction, SortDirection::Desc);
    }

    #[test]
    fn test_sort_toggle_semantics() {
        let mut sort = SortSpec::default();

        // New column starts ascending
        sort.toggle(SortField::Total);
        assert_eq!(sort.field, SortField::Total);
        assert_eq!(sort.direction, SortDirection::Asc);

        // Same column flips
        sort.toggle(SortField::Total);
        assert_eq!(sort.direction, SortDirection::Desc);
    }

    #[test]
    fn test_page_state_clamping() {
        let page = PageState {
            page: 1,
            page_size: 10,
            total_count: 35,
        };

        assert_eq!(page.total_pages(), 4);
        assert_eq!(page.clamp_page(0), 1);
        assert_eq!(page.clamp_page(4), 4);
        assert_eq!(page.clamp_page(99), 4);
    }

    #[test]
    fn test_empty_result_set_has_one_page() {
        let page = PageState::new(10);
        assert_eq!(page.total_pages(), 1);
        assert_eq!(page.clamp_page(7), 1);
    }

    #[test]
    fn test_zero_page_size_clamped() {
        let page = PageState::new(0);
        assert_eq!(page.page_size, 1);

        let descriptor = build_query(
            &OrderFilters::default(),
            &SortSpec::default(),
            &PageState {
                page: 1,
                page_size: 0,
                total_count: 0,
            },
        );
        assert_eq!(descriptor.get("limit"), Some("1"));
    }
}

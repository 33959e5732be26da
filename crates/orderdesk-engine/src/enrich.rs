//! # Enrichment Stage
//!
//! Turns a raw listing payload into display-ready [`OrderRecord`]s by
//! resolving foreign references (customer id → name, product id → name).
//!
//! ## Enrichment Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Enrichment Pipeline                                │
//! │                                                                         │
//! │  raw payload (serde_json::Value)                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. Validate shape (one pass)      ──► ValidationError = zero records  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  2. Collect DISTINCT refs          customer ids ∪ product ids         │
//! │       │                            (50 orders, 1 customer = 1 lookup) │
//! │       ▼                                                                 │
//! │  3. Resolve concurrently           join_all fan-out, unordered;        │
//! │       │                            each failure → fallback literal,    │
//! │       │                            logged, NEVER aborts the batch      │
//! │       ▼                                                                 │
//! │  4. Assemble records               only after every lookup settles;    │
//! │                                    raw order preserved 1:1, in order   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use futures_util::future::{join, join_all};
use serde_json::Value;
use tracing::{debug, warn};

use orderdesk_core::{
    raw, LineItem, OrderRecord, OrderStatus, PaymentMethod, CURRENCY_PREFIX, UNKNOWN_CUSTOMER,
    UNKNOWN_PRODUCT,
};

use crate::api::NameResolver;
use crate::error::EngineResult;

// =============================================================================
// Enriched Batch
// =============================================================================

/// The enrichment stage's output: one record per raw order, plus the
/// server's filtered total count.
#[derive(Debug, Clone, Default)]
pub struct EnrichedBatch {
    /// Display-ready records, in server order.
    pub records: Vec<OrderRecord>,

    /// Server-side count for the current filter set.
    pub total_count: u64,
}

// =============================================================================
// Enrichment
// =============================================================================

/// Enriches a raw listing payload into display-ready records.
///
/// Produces exactly one record per raw order. Individual lookup failures
/// degrade to [`UNKNOWN_CUSTOMER`] / [`UNKNOWN_PRODUCT`]; only a payload
/// that fails shape validation errors out, and then with zero records.
pub async fn enrich(payload: &Value, resolver: &dyn NameResolver) -> EngineResult<EnrichedBatch> {
    let batch = raw::parse_batch(payload)?;

    let customer_refs = batch.customer_refs();
    let product_refs = batch.product_refs();

    debug!(
        orders = batch.orders.len(),
        customers = customer_refs.len(),
        products = product_refs.len(),
        "Enriching order batch"
    );

    // Fan out every lookup at once; join waits for all of them to settle
    let customer_lookups = join_all(customer_refs.iter().map(|r| async move {
        (r.clone(), resolve_customer_name(resolver, r).await)
    }));
    let product_lookups = join_all(product_refs.iter().map(|r| async move {
        (r.clone(), resolve_product_name(resolver, r).await)
    }));

    let (customers, products) = join(customer_lookups, product_lookups).await;
    let customer_names: HashMap<String, String> = customers.into_iter().collect();
    let product_names: HashMap<String, String> = products.into_iter().collect();

    let records = batch
        .orders
        .iter()
        .map(|order| assemble_record(order, &customer_names, &product_names))
        .collect();

    Ok(EnrichedBatch {
        records,
        total_count: batch.total_count,
    })
}

async fn resolve_customer_name(resolver: &dyn NameResolver, customer_ref: &str) -> String {
    match resolver.resolve_customer(customer_ref).await {
        Ok(name) if !name.trim().is_empty() => name,
        Ok(_) => UNKNOWN_CUSTOMER.to_string(),
        Err(e) => {
            warn!(customer_ref, error = %e, "Customer lookup failed, using fallback");
            UNKNOWN_CUSTOMER.to_string()
        }
    }
}

async fn resolve_product_name(resolver: &dyn NameResolver, product_ref: &str) -> String {
    match resolver.resolve_product(product_ref).await {
        Ok(name) if !name.trim().is_empty() => name,
        Ok(_) => UNKNOWN_PRODUCT.to_string(),
        Err(e) => {
            warn!(product_ref, error = %e, "Product lookup failed, using fallback");
            UNKNOWN_PRODUCT.to_string()
        }
    }
}

// =============================================================================
// Record Assembly
// =============================================================================

fn assemble_record(
    order: &raw::RawOrder,
    customer_names: &HashMap<String, String>,
    product_names: &HashMap<String, String>,
) -> OrderRecord {
    let customer_name = order
        .customer_ref()
        .and_then(|r| customer_names.get(r).cloned())
        .unwrap_or_else(|| UNKNOWN_CUSTOMER.to_string());

    let line_items = order
        .items()
        .iter()
        .map(|item| LineItem {
            product_name: item
                .product_id
                .as_deref()
                .and_then(|r| product_names.get(r).cloned())
                .unwrap_or_else(|| UNKNOWN_PRODUCT.to_string()),
            quantity: item.quantity.unwrap_or(1).max(1),
            unit_price_display: display_price(item.price.unwrap_or(0.0)),
        })
        .collect();

    let payment_method = PaymentMethod::from_wire(order.method.as_deref());

    // Receipt uploads only exist for wallet payments
    let receipt_image_ref = match payment_method {
        PaymentMethod::OnlineKhalti => order
            .screenshot
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        PaymentMethod::Cash => None,
    };

    OrderRecord {
        id: order.display_id(),
        customer_name,
        line_items,
        total_display: display_price(order.final_total()),
        status: OrderStatus::from_wire(order.status.as_deref()),
        created_at: order.created_at.unwrap_or_else(chrono::Utc::now),
        payment_method,
        receipt_image_ref,
        notes: non_empty(order.notes.as_deref()),
        phone: non_empty(order.phone.as_deref()),
        address: non_empty(order.address.as_deref()),
    }
}

/// Formats a server amount the way the API prints it: integers without a
/// decimal tail ("Rs 1050"), fractional amounts as-is ("Rs 50.5").
fn display_price(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{} {}", CURRENCY_PREFIX, amount as i64)
    } else {
        format!("{} {}", CURRENCY_PREFIX, amount)
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|s| !s.is_empty()).map(str::to_string)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Stub resolver: fixed names, optional forced failure, call counting.
    struct StubResolver {
        fail_customers: bool,
        fail_products: bool,
        customer_calls: AtomicUsize,
        product_calls: AtomicUsize,
    }

    impl StubResolver {
        fn new() -> Self {
            StubResolver {
                fail_customers: false,
                fail_products: false,
                customer_calls: AtomicUsize::new(0),
                product_calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            StubResolver {
                fail_customers: true,
                fail_products: true,
                ..StubResolver::new()
            }
        }
    }

    #[async_trait]
    impl NameResolver for StubResolver {
        async fn resolve_customer(&self, customer_ref: &str) -> EngineResult<String> {
            self.customer_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_customers {
                return Err(EngineError::Network("lookup down".into()));
            }
            Ok(format!("Customer {}", customer_ref))
        }

        async fn resolve_product(&self, product_ref: &str) -> EngineResult<String> {
            self.product_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_products {
                return Err(EngineError::Network("lookup down".into()));
            }
            Ok(format!("Product {}", product_ref))
        }
    }

    fn listing_payload() -> Value {
        json!({
            "success": true,
            "totalCount": 2,
            "orders": [
                {
                    "_id": "ord-001",
                    "cartId": {
                        "userId": "user-1",
                        "items": [
                            { "productId": "prod-1", "productQuantity": 2, "price": 250 },
                            { "productId": "prod-2", "productQuantity": 1, "price": 550.5 }
                        ],
                        "finalTotal": 1050.5
                    },
                    "orderStatus": "Confirmed",
                    "createdAt": "2025-03-10T08:30:00Z",
                    "orderMethod": "khalti",
                    "screenshot": "uploads/rcpt-1.png"
                },
                {
                    "_id": "ord-002",
                    "cartId": {
                        "userId": "user-1",
                        "items": [
                            { "productId": "prod-1", "productQuantity": 1, "price": 250 }
                        ],
                        "finalTotal": 250
                    },
                    "orderStatus": "New",
                    "createdAt": "2025-03-10T09:00:00Z",
                    "orderMethod": "cash",
                    "screenshot": "uploads/sneaky.png"
                }
            ]
        })
    }

    #[tokio::test]
    async fn test_enrich_resolves_names_in_order() {
        let resolver = StubResolver::new();
        let batch = enrich(&listing_payload(), &resolver).await.unwrap();

        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.total_count, 2);
        assert_eq!(batch.records[0].id, "ord-001");
        assert_eq!(batch.records[0].customer_name, "Customer user-1");
        assert_eq!(batch.records[0].line_items[0].product_name, "Product prod-1");
        assert_eq!(batch.records[0].total_display, "Rs 1050.5");
        assert_eq!(batch.records[1].id, "ord-002");
        assert_eq!(batch.records[1].total_display, "Rs 250");
    }

    #[tokio::test]
    async fn test_shared_refs_resolved_once() {
        let resolver = StubResolver::new();
        enrich(&listing_payload(), &resolver).await.unwrap();

        // user-1 backs both orders, prod-1 both carts: one lookup each
        assert_eq!(resolver.customer_calls.load(Ordering::SeqCst), 1);
        assert_eq!(resolver.product_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_lookup_failures_fall_back_and_never_abort() {
        let resolver = StubResolver::failing();
        let batch = enrich(&listing_payload(), &resolver).await.unwrap();

        // Still one record per raw order
        assert_eq!(batch.records.len(), 2);
        for record in &batch.records {
            assert_eq!(record.customer_name, UNKNOWN_CUSTOMER);
            for item in &record.line_items {
                assert_eq!(item.product_name, UNKNOWN_PRODUCT);
            }
        }
    }

    #[tokio::test]
    async fn test_blank_resolved_name_falls_back() {
        struct BlankResolver;

        #[async_trait]
        impl NameResolver for BlankResolver {
            async fn resolve_customer(&self, _: &str) -> EngineResult<String> {
                Ok("   ".to_string())
            }
            async fn resolve_product(&self, _: &str) -> EngineResult<String> {
                Ok(String::new())
            }
        }

        let batch = enrich(&listing_payload(), &BlankResolver).await.unwrap();
        assert_eq!(batch.records[0].customer_name, UNKNOWN_CUSTOMER);
        assert_eq!(batch.records[0].line_items[0].product_name, UNKNOWN_PRODUCT);
    }

    #[tokio::test]
    async fn test_malformed_payload_is_batch_error() {
        let resolver = StubResolver::new();
        let err = enrich(&json!({ "success": false }), &resolver)
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::Validation(_)));
        // Validation failure means no lookups were ever attempted
        assert_eq!(resolver.customer_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_receipt_ref_only_for_wallet_orders() {
        let resolver = StubResolver::new();
        let batch = enrich(&listing_payload(), &resolver).await.unwrap();

        // Khalti order keeps its upload, cash order's screenshot is ignored
        assert_eq!(
            batch.records[0].receipt_image_ref.as_deref(),
            Some("uploads/rcpt-1.png")
        );
        assert_eq!(batch.records[1].receipt_image_ref, None);
    }

    #[tokio::test]
    async fn test_missing_cart_yields_empty_order() {
        let resolver = StubResolver::new();
        let payload = json!({
            "success": true,
            "orders": [ { "_id": "ord-003", "orderMethod": "cash" } ]
        });

        let batch = enrich(&payload, &resolver).await.unwrap();
        let record = &batch.records[0];

        assert!(record.line_items.is_empty());
        assert_eq!(record.total_display, "Rs 0");
        assert_eq!(record.customer_name, UNKNOWN_CUSTOMER);
    }
}

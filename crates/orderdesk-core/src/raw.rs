//! # Raw Order Payloads
//!
//! Schema and validation for the loosely-typed payload the ordering API
//! returns from its order-listing endpoint.
//!
//! ## One Validation Pass
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Payload Validation Boundary                           │
//! │                                                                         │
//! │   serde_json::Value  ──►  parse_batch()  ──►  RawBatch                 │
//! │                                                                         │
//! │   BATCH-LEVEL (hard failures → ValidationError, zero records):         │
//! │   • body is not an object                                              │
//! │   • `success` missing / falsy                                          │
//! │   • `orders` missing / not an array                                    │
//! │   • an order entry that is not an object                               │
//! │                                                                         │
//! │   FIELD-LEVEL (soft failures → defaults, order still produced):        │
//! │   • missing cart            → no line items, zero total                │
//! │   • missing item quantity   → 1                                        │
//! │   • missing price / total   → 0                                        │
//! │   • missing `_id`           → generated "#ORD-xxxxxxxx"                │
//! │   • missing / bad timestamp → caller substitutes "now"                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Numeric ids and amounts arrive inconsistently typed from the API
//! (numbers in some deployments, strings in others), so the field
//! deserializers below accept both and fall back to `None` otherwise.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use uuid::Uuid;

use crate::error::ValidationError;

// =============================================================================
// Lenient Field Deserializers
// =============================================================================

/// Accepts a JSON string or number as a string; anything else is `None`.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Accepts a JSON number or numeric string as f64; anything else is `None`.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

/// Accepts a JSON number or numeric string as i64; anything else is `None`.
fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    })
}

/// Accepts a cart object; unpopulated references (bare id strings) and other
/// shapes collapse to `None`.
fn lenient_cart<'de, D>(deserializer: D) -> Result<Option<RawCart>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Object(_) => serde_json::from_value(value).ok(),
        _ => None,
    })
}

/// Accepts an item array, dropping entries that are not objects; any other
/// shape collapses to `None`.
fn lenient_items<'de, D>(deserializer: D) -> Result<Option<Vec<RawCartItem>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(entries) => Some(
            entries
                .into_iter()
                .filter_map(|entry| serde_json::from_value(entry).ok())
                .collect(),
        ),
        _ => None,
    })
}

/// Accepts an RFC 3339 string or a millisecond epoch number as a timestamp.
fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
        _ => None,
    })
}

// =============================================================================
// Raw Payload Schema
// =============================================================================

/// One cart line as it arrives from the server.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCartItem {
    /// Opaque product reference, resolved to a name during enrichment.
    #[serde(rename = "productId", default, deserialize_with = "lenient_string")]
    pub product_id: Option<String>,

    /// Quantity ordered; missing quantities default to 1 downstream.
    #[serde(
        rename = "productQuantity",
        default,
        deserialize_with = "lenient_i64"
    )]
    pub quantity: Option<i64>,

    /// Unit price; missing prices default to 0 downstream.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: Option<f64>,
}

/// The embedded cart of a raw order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCart {
    /// Opaque customer reference, resolved to a name during enrichment.
    #[serde(rename = "userId", default, deserialize_with = "lenient_string")]
    pub user_id: Option<String>,

    /// Cart lines; an absent or malformed list means an empty order.
    #[serde(default, deserialize_with = "lenient_items")]
    pub items: Option<Vec<RawCartItem>>,

    /// Server-computed order total.
    #[serde(rename = "finalTotal", default, deserialize_with = "lenient_f64")]
    pub final_total: Option<f64>,
}

/// One order exactly as the listing endpoint returns it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawOrder {
    /// Server order id.
    #[serde(rename = "_id", default, deserialize_with = "lenient_string")]
    pub id: Option<String>,

    /// Embedded cart (customer reference, lines, total). Unpopulated
    /// references arrive as bare id strings and collapse to `None`.
    #[serde(rename = "cartId", default, deserialize_with = "lenient_cart")]
    pub cart: Option<RawCart>,

    /// Fulfilment status string; unknown values fall back to "New".
    #[serde(rename = "orderStatus", default, deserialize_with = "lenient_string")]
    pub status: Option<String>,

    /// When the order was placed.
    #[serde(rename = "createdAt", default, deserialize_with = "lenient_datetime")]
    pub created_at: Option<DateTime<Utc>>,

    /// Payment method string ("khalti" / "cash").
    #[serde(rename = "orderMethod", default, deserialize_with = "lenient_string")]
    pub method: Option<String>,

    /// Uploaded payment-receipt reference (Khalti orders only).
    #[serde(default, deserialize_with = "lenient_string")]
    pub screenshot: Option<String>,

    /// Free-text order notes.
    #[serde(default, deserialize_with = "lenient_string")]
    pub notes: Option<String>,

    /// Customer phone number.
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone: Option<String>,

    /// Delivery address.
    #[serde(default, deserialize_with = "lenient_string")]
    pub address: Option<String>,
}

impl RawOrder {
    /// The order id, or a generated placeholder for payloads without one.
    pub fn display_id(&self) -> String {
        match &self.id {
            Some(id) if !id.is_empty() => id.clone(),
            _ => {
                let tag = Uuid::new_v4().simple().to_string();
                format!("#ORD-{}", &tag[..8])
            }
        }
    }

    /// The customer reference, if the cart carries one.
    pub fn customer_ref(&self) -> Option<&str> {
        self.cart.as_ref()?.user_id.as_deref()
    }

    /// Cart lines, absent levels flattened to an empty slice.
    pub fn items(&self) -> &[RawCartItem] {
        self.cart
            .as_ref()
            .and_then(|c| c.items.as_deref())
            .unwrap_or(&[])
    }

    /// Server-computed total, defaulting to 0 when absent.
    pub fn final_total(&self) -> f64 {
        self.cart
            .as_ref()
            .and_then(|c| c.final_total)
            .unwrap_or(0.0)
    }
}

// =============================================================================
// Raw Batch
// =============================================================================

/// A validated batch of raw orders plus the server's filtered total count.
#[derive(Debug, Clone, Default)]
pub struct RawBatch {
    /// Orders in server order.
    pub orders: Vec<RawOrder>,

    /// Server-side count for the current filter set (independent of page
    /// size); falls back to the batch length when the endpoint omits it.
    pub total_count: u64,
}

impl RawBatch {
    /// Distinct customer references across the batch, first-seen order.
    ///
    /// A customer referenced by fifty orders is still looked up once.
    pub fn customer_refs(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut refs = Vec::new();
        for order in &self.orders {
            if let Some(user_id) = order.customer_ref() {
                if seen.insert(user_id.to_string()) {
                    refs.push(user_id.to_string());
                }
            }
        }
        refs
    }

    /// Distinct product references across the batch, first-seen order.
    pub fn product_refs(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut refs = Vec::new();
        for order in &self.orders {
            for item in order.items() {
                if let Some(product_id) = item.product_id.as_deref() {
                    if seen.insert(product_id.to_string()) {
                        refs.push(product_id.to_string());
                    }
                }
            }
        }
        refs
    }
}

// =============================================================================
// Batch Validation
// =============================================================================

/// Truthiness in the JavaScript sense, for the `success` flag.
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Some(Value::String(s)) => !s.is_empty(),
        _ => false,
    }
}

/// Validates a listing-endpoint response body into a [`RawBatch`].
///
/// This is the single validation pass for the enrichment boundary: a batch
/// that fails here produces no records; a batch that passes may still have
/// per-field gaps, which the schema above defaults instead of rejecting.
pub fn parse_batch(payload: &Value) -> Result<RawBatch, ValidationError> {
    let body = payload.as_object().ok_or(ValidationError::NotAnObject)?;

    if !is_truthy(body.get("success")) {
        return Err(ValidationError::Unsuccessful);
    }

    let entries = body
        .get("orders")
        .and_then(Value::as_array)
        .ok_or(ValidationError::MissingOrders)?;

    let mut orders = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        if !entry.is_object() {
            return Err(ValidationError::MalformedOrder {
                index,
                reason: format!("expected object, found {}", json_kind(entry)),
            });
        }

        let order: RawOrder = serde_json::from_value(entry.clone()).map_err(|e| {
            ValidationError::MalformedOrder {
                index,
                reason: e.to_string(),
            }
        })?;
        orders.push(order);
    }

    let total_count = body
        .get("totalCount")
        .and_then(Value::as_u64)
        .unwrap_or(orders.len() as u64);

    Ok(RawBatch { orders, total_count })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_payload() -> Value {
        json!({
            "success": true,
            "totalCount": 42,
            "orders": [
                {
                    "_id": "ord-001",
                    "cartId": {
                        "userId": "user-1",
                        "items": [
                            { "productId": "prod-1", "productQuantity": 2, "price": 250 },
                            { "productId": "prod-2", "productQuantity": 1, "price": 550 }
                        ],
                        "finalTotal": 1050
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
                    "orderMethod": "cash"
                }
            ]
        })
    }

    #[test]
    fn test_parse_valid_batch() {
        let batch = parse_batch(&sample_payload()).unwrap();
        assert_eq!(batch.orders.len(), 2);
        assert_eq!(batch.total_count, 42);
        assert_eq!(batch.orders[0].display_id(), "ord-001");
        assert_eq!(batch.orders[0].final_total(), 1050.0);
    }

    #[test]
    fn test_total_count_falls_back_to_batch_length() {
        let mut payload = sample_payload();
        payload.as_object_mut().unwrap().remove("totalCount");
        let batch = parse_batch(&payload).unwrap();
        assert_eq!(batch.total_count, 2);
    }

    #[test]
    fn test_refs_are_deduplicated_in_order() {
        let batch = parse_batch(&sample_payload()).unwrap();
        // user-1 appears on both orders, prod-1 on both carts
        assert_eq!(batch.customer_refs(), vec!["user-1"]);
        assert_eq!(batch.product_refs(), vec!["prod-1", "prod-2"]);
    }

    #[test]
    fn test_rejects_non_object_payload() {
        assert!(matches!(
            parse_batch(&json!([1, 2, 3])),
            Err(ValidationError::NotAnObject)
        ));
    }

    #[test]
    fn test_rejects_unsuccessful_payload() {
        assert!(matches!(
            parse_batch(&json!({ "success": false, "orders": [] })),
            Err(ValidationError::Unsuccessful)
        ));
        assert!(matches!(
            parse_batch(&json!({ "orders": [] })),
            Err(ValidationError::Unsuccessful)
        ));
    }

    #[test]
    fn test_rejects_missing_orders_array() {
        assert!(matches!(
            parse_batch(&json!({ "success": true, "orders": "nope" })),
            Err(ValidationError::MissingOrders)
        ));
    }

    #[test]
    fn test_rejects_non_object_order_entry() {
        let err = parse_batch(&json!({ "success": true, "orders": ["oops"] })).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::MalformedOrder { index: 0, .. }
        ));
    }

    #[test]
    fn test_missing_nested_fields_default() {
        let payload = json!({
            "success": true,
            "orders": [ { "_id": "ord-003" } ]
        });
        let batch = parse_batch(&payload).unwrap();
        let order = &batch.orders[0];

        assert!(order.items().is_empty());
        assert_eq!(order.final_total(), 0.0);
        assert_eq!(order.customer_ref(), None);
        assert!(order.created_at.is_none());
    }

    #[test]
    fn test_numeric_ids_and_string_amounts_accepted() {
        let payload = json!({
            "success": 1,
            "orders": [
                {
                    "_id": 7,
                    "cartId": {
                        "userId": 12,
                        "items": [ { "productId": 3, "productQuantity": "2", "price": "9.5" } ],
                        "finalTotal": "19"
                    }
                }
            ]
        });
        let batch = parse_batch(&payload).unwrap();
        let order = &batch.orders[0];

        assert_eq!(order.display_id(), "7");
        assert_eq!(order.customer_ref(), Some("12"));
        assert_eq!(order.items()[0].quantity, Some(2));
        assert_eq!(order.items()[0].price, Some(9.5));
        assert_eq!(order.final_total(), 19.0);
    }

    #[test]
    fn test_unpopulated_cart_reference_collapses() {
        // A cart that was never populated server-side arrives as its id
        let payload = json!({
            "success": true,
            "orders": [ { "_id": "ord-005", "cartId": "cart-77" } ]
        });
        let batch = parse_batch(&payload).unwrap();
        let order = &batch.orders[0];

        assert!(order.cart.is_none());
        assert!(order.items().is_empty());
        assert_eq!(order.final_total(), 0.0);
    }

    #[test]
    fn test_malformed_items_list_is_empty() {
        let payload = json!({
            "success": true,
            "orders": [
                {
                    "_id": "ord-006",
                    "cartId": { "userId": "user-9", "items": "not-a-list", "finalTotal": 40 }
                }
            ]
        });
        let batch = parse_batch(&payload).unwrap();
        let order = &batch.orders[0];

        assert!(order.items().is_empty());
        assert_eq!(order.final_total(), 40.0);
    }

    #[test]
    fn test_generated_fallback_id_shape() {
        let order = RawOrder::default();
        let id = order.display_id();
        assert!(id.starts_with("#ORD-"));
        assert_eq!(id.len(), "#ORD-".len() + 8);
    }

    #[test]
    fn test_epoch_millis_timestamp() {
        let payload = json!({
            "success": true,
            "orders": [ { "_id": "ord-004", "createdAt": 1741600200000u64 } ]
        });
        let batch = parse_batch(&payload).unwrap();
        assert!(batch.orders[0].created_at.is_some());
    }
}

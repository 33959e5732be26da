//! # Export Rendering
//!
//! Pure byte producers for the two export paths the panels expose:
//! CSV export of table rows and a printable per-order receipt.
//!
//! Neither function performs I/O; triggering downloads or sending bytes to
//! a printer is the UI shell's job.

use crate::types::{OrderRecord, PaymentMethod};
use chrono::Local;

// =============================================================================
// CSV Export
// =============================================================================

/// Column headers, in the order operators expect them in spreadsheets.
const CSV_HEADERS: [&str; 9] = [
    "Order ID",
    "Customer",
    "Date",
    "Time",
    "Status",
    "Payment Method",
    "Payment Status",
    "Total",
    "Items",
];

/// Renders rows as CSV bytes.
///
/// Every cell is quoted, with embedded quotes doubled, so free-text fields
/// (customer names, item names) cannot break the row structure.
pub fn export_csv(rows: &[OrderRecord]) -> Vec<u8> {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(csv_line(&CSV_HEADERS.map(String::from)));

    for row in rows {
        let local = row.created_at.with_timezone(&Local);
        let items = row
            .line_items
            .iter()
            .map(|item| format!("{}x {}", item.quantity, item.product_name))
            .collect::<Vec<_>>()
            .join(", ");

        lines.push(csv_line(&[
            row.id.clone(),
            row.customer_name.clone(),
            local.format("%Y-%m-%d").to_string(),
            local.format("%H:%M").to_string(),
            row.status.to_string(),
            row.payment_method.display_label().to_string(),
            row.payment_status().to_string(),
            row.total_display.clone(),
            items,
        ]));
    }

    lines.join("\n").into_bytes()
}

fn csv_line(cells: &[String]) -> String {
    cells
        .iter()
        .map(|cell| format!("\"{}\"", cell.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(",")
}

// =============================================================================
// Receipt Rendering
// =============================================================================

/// Renders a printable plain-text receipt for one order.
///
/// Layout mirrors the panels' receipt template: title, order info block,
/// items table, total line, optional notes, thank-you footer.
pub fn render_receipt(order: &OrderRecord) -> Vec<u8> {
    let mut doc = String::new();

    doc.push_str("            ORDER RECEIPT\n");
    doc.push_str("========================================\n\n");

    doc.push_str(&format!("Order ID:        {}\n", order.id));
    doc.push_str(&format!("Customer:        {}\n", order.customer_name));
    doc.push_str(&format!(
        "Order Date:      {}\n",
        order
            .created_at
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M")
    ));
    doc.push_str(&format!("Status:          {}\n", order.status));
    doc.push_str(&format!(
        "Payment Method:  {}\n",
        order.payment_method.display_label()
    ));
    doc.push_str(&format!("Payment Status:  {}\n", order.payment_status()));
    if let Some(phone) = &order.phone {
        doc.push_str(&format!("Phone:           {}\n", phone));
    }
    if let Some(address) = &order.address {
        doc.push_str(&format!("Address:         {}\n", address));
    }

    doc.push_str("\n----------------------------------------\n");
    doc.push_str("Item                          Qty   Price\n");
    doc.push_str("----------------------------------------\n");
    for item in &order.line_items {
        doc.push_str(&format!(
            "{:<28}  {:>3}  {:>6}\n",
            truncate(&item.product_name, 28),
            item.quantity,
            item.unit_price_display
        ));
    }
    doc.push_str("----------------------------------------\n");
    doc.push_str(&format!("{:<33} {:>6}\n", "Total", order.total_display));

    if let Some(notes) = order.notes.as_deref().filter(|n| !n.is_empty()) {
        doc.push_str("\nNotes:\n");
        doc.push_str(notes);
        doc.push('\n');
    }

    doc.push_str("\n      Thank you for your order!\n");

    doc.into_bytes()
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

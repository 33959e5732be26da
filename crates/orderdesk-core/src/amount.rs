//! # Display Amounts
//!
//! Parsing and formatting of server-formatted currency strings.
//!
//! ## Why Parse Display Strings At All?
//! The ordering API is the source of truth for order totals and ships them
//! pre-formatted ("Rs 1050"). The only client-side arithmetic over money is
//! the revenue summary tile, which sums the totals of the *currently loaded*
//! records. Parsing the display string back out keeps the server
//! authoritative: we never recompute a total from line items.
//!
//! ## Parsing Rules
//! ```text
//! "Rs 100"     → 100.0
//! "Rs 50.50"   → 50.5
//! "Rs abc"     → 0.0     (malformed contributes zero, never an error)
//! ""           → 0.0
//! ```

use crate::CURRENCY_PREFIX;

// =============================================================================
// Parsing
// =============================================================================

/// Parses a display amount ("Rs 150.50") into its numeric value.
///
/// Strips every character that is not an ASCII digit or a decimal point,
/// then parses the remainder. Anything unparsable yields `0.0`: a
/// malformed total must never take down the summary tiles.
pub fn parse_display_amount(display: &str) -> f64 {
    let cleaned: String = display
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    cleaned.parse::<f64>().unwrap_or(0.0)
}

// =============================================================================
// Formatting
// =============================================================================

/// Formats a numeric amount the way the platform displays money ("Rs 150.50").
pub fn format_display_amount(amount: f64) -> String {
    format!("{} {:.2}", CURRENCY_PREFIX, amount)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_amount() {
        assert_eq!(parse_display_amount("Rs 100"), 100.0);
    }

    #[test]
    fn test_parse_decimal_amount() {
        assert_eq!(parse_display_amount("Rs 50.50"), 50.50);
    }

    #[test]
    fn test_parse_malformed_amount_is_zero() {
        assert_eq!(parse_display_amount("Rs abc"), 0.0);
        assert_eq!(parse_display_amount(""), 0.0);
        // Two decimal points cannot parse as a number
        assert_eq!(parse_display_amount("Rs 1.2.3"), 0.0);
    }

    #[test]
    fn test_parse_ignores_currency_and_separators() {
        assert_eq!(parse_display_amount("NPR Rs. 1050"), 1050.0);
    }

    #[test]
    fn test_format_round_trip() {
        assert_eq!(format_display_amount(150.5), "Rs 150.50");
        assert_eq!(parse_display_amount(&format_display_amount(99.0)), 99.0);
    }
}

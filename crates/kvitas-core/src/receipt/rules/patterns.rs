//! Common regex patterns for receipt line extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Whitespace-separated token, with its byte span
    pub static ref TOKEN: Regex = Regex::new(r"\S+").unwrap();

    // Canonical receipt date: YYYY-MM-DD, nothing else
    pub static ref ISO_DATE: Regex = Regex::new(
        r"^(\d{4})-(\d{2})-(\d{2})$"
    ).unwrap();

    // Weight or volume written into a product name ("500g", "0,612kg", "1,5L").
    // Applied to the name with spaces removed; unit case is left to the unit table.
    pub static ref STATIC_WEIGHT: Regex = Regex::new(
        r"(?i)(\d+[.,]?\d*)(kg|g|ml|l)"
    ).unwrap();

    // Weighed item printed inline as "<kg>x<price per kg>" (e.g. "0,466x1,95")
    pub static ref INLINE_WEIGHT: Regex = Regex::new(
        r"(\d+(?:[.,]\d+)?)x(\d+(?:[.,]\d+)?)"
    ).unwrap();

    // Seven-digit article code opening a product line
    pub static ref PRODUCT_CODE: Regex = Regex::new(r"^\d{7}").unwrap();
}

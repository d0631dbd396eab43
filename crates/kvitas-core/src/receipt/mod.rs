//! Receipt text parsing.

mod block;
mod detector;
mod normalize;
mod processor;
pub mod retailer;
pub mod rules;

pub use block::{deposit_surcharge, DepositSign, UnparsedProductLine};
pub use detector::RetailerDetector;
pub use normalize::normalize_lines;
pub use processor::{parse_receipt, ExtractionResult, ReceiptProcessor};
pub use retailer::RetailerParser;

use chrono::NaiveDate;

use crate::error::ReceiptError;
use crate::models::receipt::{ParsedProduct, ParsedReceipt, Retailer};

/// Result type for receipt parsing operations.
pub type Result<T> = std::result::Result<T, ReceiptError>;

/// Trait implemented by every retailer grammar.
pub trait ReceiptParser {
    /// Purchase date printed on the receipt.
    fn parse_date(&self) -> Result<NaiveDate>;

    /// Products in print order. Fails on the first malformed block.
    fn parse_products(&self) -> Result<Vec<ParsedProduct>>;

    /// Retailer this grammar belongs to.
    fn retailer(&self) -> Retailer;

    /// Parse date and products into a complete receipt.
    fn parse_receipt(&self) -> Result<ParsedReceipt> {
        let date = self.parse_date()?;
        let products = self.parse_products()?;
        Ok(ParsedReceipt {
            retailer: self.retailer(),
            date,
            products,
        })
    }
}

//! Core library for grocery receipt parsing.
//!
//! This crate provides:
//! - Retailer detection from receipt header signatures
//! - Line grammars for Norfa, Maxima, Lidl and Barbora receipts
//! - Price, discount, deposit and quantity extraction
//! - Receipt data models serializable to JSON

pub mod error;
pub mod models;
pub mod receipt;

pub use error::{KvitasError, ParseRetailerError, ReceiptError, Result};
pub use models::config::{DetectionConfig, KvitasConfig, OutputConfig, RetailerSignature};
pub use models::receipt::{ParsedProduct, ParsedReceipt, Price, Quantity, Retailer, Unit};
pub use receipt::{
    parse_receipt, ExtractionResult, ReceiptParser, ReceiptProcessor, RetailerDetector,
    RetailerParser,
};

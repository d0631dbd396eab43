//! Error types for the kvitas-core library.

use thiserror::Error;

use crate::models::receipt::Retailer;

/// Main error type for the kvitas library.
#[derive(Error, Debug)]
pub enum KvitasError {
    /// Receipt parsing error.
    #[error("receipt error: {0}")]
    Receipt(#[from] ReceiptError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors produced while parsing a single receipt.
///
/// Every variant is terminal for the call that produced it: no partial
/// receipt is ever returned alongside one of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReceiptError {
    /// None of the configured retailer signatures occurs in the text.
    #[error("unknown retailer")]
    UnknownRetailer,

    /// The receipt is structurally unusable: too short, or an anchor line
    /// (date, start of the product list) is missing or malformed.
    #[error("invalid {retailer} receipt: {reason}")]
    InvalidReceipt { retailer: Retailer, reason: String },

    /// A recognized product block could not be reduced to a price or quantity.
    #[error("failed to parse {retailer} product {line:?}: {reason}")]
    ParseFailure {
        retailer: Retailer,
        line: String,
        reason: String,
    },
}

impl ReceiptError {
    pub(crate) fn invalid(retailer: Retailer, reason: impl Into<String>) -> Self {
        Self::InvalidReceipt {
            retailer,
            reason: reason.into(),
        }
    }

    pub(crate) fn parse(retailer: Retailer, line: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ParseFailure {
            retailer,
            line: line.into(),
            reason: reason.into(),
        }
    }

    /// The raw text the error refers to, when there is one.
    pub fn offending_line(&self) -> Option<&str> {
        match self {
            Self::ParseFailure { line, .. } => Some(line),
            _ => None,
        }
    }
}

/// A retailer identifier that names no supported retailer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown retailer {0:?}")]
pub struct ParseRetailerError(pub String);

/// Result type for the kvitas library.
pub type Result<T> = std::result::Result<T, KvitasError>;

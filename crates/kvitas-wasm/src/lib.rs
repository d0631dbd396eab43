//! WASM bindings for grocery receipt parsing.
//!
//! This crate provides WebAssembly bindings for use in browsers and Node.js.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use kvitas_core::{KvitasConfig, ParsedReceipt, ReceiptProcessor, Retailer, RetailerSignature};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Parse receipt text with the built-in retailer signatures.
///
/// Returns `{retailer, date, products}`; throws on unknown retailers and
/// malformed receipts.
#[wasm_bindgen]
pub fn parse_receipt(text: &str) -> Result<JsValue, JsValue> {
    let receipt = kvitas_core::parse_receipt(text).map_err(to_js_error)?;
    serde_wasm_bindgen::to_value(&receipt).map_err(to_js_error)
}

/// Identifier of the retailer that issued a receipt (e.g. `"maxima"`).
#[wasm_bindgen]
pub fn detect_retailer(text: &str) -> Result<String, JsValue> {
    ReceiptProcessor::new()
        .detect(text)
        .map(|retailer| retailer.as_str().to_string())
        .map_err(to_js_error)
}

/// Identifiers of all supported retailers.
#[wasm_bindgen]
pub fn supported_retailers() -> Result<JsValue, JsValue> {
    let names: Vec<&str> = Retailer::ALL.iter().map(|r| r.as_str()).collect();
    serde_wasm_bindgen::to_value(&names).map_err(to_js_error)
}

/// Receipt extractor class for browser use.
#[wasm_bindgen]
pub struct ReceiptExtractor {
    processor: ReceiptProcessor,
}

#[wasm_bindgen]
impl ReceiptExtractor {
    /// Create an extractor with the built-in retailer signatures.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            processor: ReceiptProcessor::new(),
        }
    }

    /// Create an extractor from a JSON configuration document.
    #[wasm_bindgen]
    pub fn from_config(json: &str) -> Result<ReceiptExtractor, JsValue> {
        let config: KvitasConfig = serde_json::from_str(json).map_err(to_js_error)?;
        config.validate().map_err(to_js_error)?;
        Ok(Self {
            processor: ReceiptProcessor::from_config(&config),
        })
    }

    /// Recognize receipts containing `marker` as `retailer`'s, ahead of
    /// every other signature.
    #[wasm_bindgen]
    pub fn add_signature(&mut self, retailer: &str, marker: &str) -> Result<(), JsValue> {
        let retailer: Retailer = retailer.parse().map_err(to_js_error)?;
        if marker.trim().is_empty() {
            return Err(JsValue::from_str("signature marker must not be empty"));
        }

        let processor = std::mem::take(&mut self.processor);
        self.processor = processor.with_signature(RetailerSignature::new(retailer, marker));
        Ok(())
    }

    /// Detect the retailer of a receipt.
    #[wasm_bindgen]
    pub fn detect(&self, text: &str) -> Result<String, JsValue> {
        self.processor
            .detect(text)
            .map(|retailer| retailer.as_str().to_string())
            .map_err(to_js_error)
    }

    /// Parse a receipt.
    #[wasm_bindgen]
    pub fn extract(&self, text: &str) -> Result<JsValue, JsValue> {
        let receipt = self.processor.parse_receipt(text).map_err(to_js_error)?;
        serde_wasm_bindgen::to_value(&receipt).map_err(to_js_error)
    }

    /// Parse a receipt and add totals and the product name list.
    #[wasm_bindgen]
    pub fn extract_with_summary(&self, text: &str) -> Result<JsValue, JsValue> {
        let receipt = self.processor.parse_receipt(text).map_err(to_js_error)?;

        #[derive(Serialize)]
        struct ExtractSummary<'a> {
            receipt: &'a ParsedReceipt,
            product_names: Vec<&'a str>,
            total_full: String,
            total_discount: String,
            total_paid: String,
        }

        let output = ExtractSummary {
            receipt: &receipt,
            product_names: receipt.product_names(),
            total_full: receipt.total_full().to_string(),
            total_discount: receipt.total_discount().to_string(),
            total_paid: receipt.total_paid().to_string(),
        };

        serde_wasm_bindgen::to_value(&output).map_err(to_js_error)
    }
}

impl Default for ReceiptExtractor {
    fn default() -> Self {
        Self::new()
    }
}

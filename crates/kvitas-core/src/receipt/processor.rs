//! Receipt processing entry point.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::models::config::{KvitasConfig, RetailerSignature};
use crate::models::receipt::{ParsedReceipt, Retailer};

use super::detector::RetailerDetector;
use super::{ReceiptParser, Result};

/// Result of receipt extraction.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Parsed receipt.
    pub receipt: ParsedReceipt,
    /// Number of non-blank lines in the input.
    pub line_count: usize,
    /// Extraction warnings (products without a quantity, empty product list).
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Detects the retailer of a receipt and runs its grammar.
#[derive(Debug, Clone, Default)]
pub struct ReceiptProcessor {
    detector: RetailerDetector,
}

impl ReceiptProcessor {
    /// Create a processor with the built-in retailer signatures.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a processor from configuration.
    pub fn from_config(config: &KvitasConfig) -> Self {
        Self {
            detector: RetailerDetector::from_config(&config.detection),
        }
    }

    /// Replace the retailer detector.
    pub fn with_detector(mut self, detector: RetailerDetector) -> Self {
        self.detector = detector;
        self
    }

    /// Add a signature tried before the configured ones.
    pub fn with_signature(mut self, signature: RetailerSignature) -> Self {
        self.detector = self.detector.with_signature(signature);
        self
    }

    pub fn detector(&self) -> &RetailerDetector {
        &self.detector
    }

    /// Detect the retailer without parsing.
    pub fn detect(&self, text: &str) -> Result<Retailer> {
        self.detector.detect(text)
    }

    /// Parse a receipt.
    pub fn parse_receipt(&self, text: &str) -> Result<ParsedReceipt> {
        self.detector.bind(text)?.parse_receipt()
    }

    /// Parse a receipt, collecting timing and warnings.
    pub fn parse(&self, text: &str) -> Result<ExtractionResult> {
        let start = Instant::now();
        info!("Parsing receipt from {} characters of text", text.len());

        let parser = self.detector.bind(text)?;
        let receipt = parser.parse_receipt()?;

        let mut warnings = Vec::new();
        if receipt.products.is_empty() {
            warnings.push("No products found".to_string());
        }
        for product in receipt.products.iter().filter(|p| p.quantity.is_none()) {
            warnings.push(format!("No quantity for {:?}", product.name));
        }
        if !warnings.is_empty() {
            warn!("{} receipt parsed with {} warnings", receipt.retailer, warnings.len());
        }

        debug!(
            "Extracted {} products from {} receipt dated {}",
            receipt.products.len(),
            receipt.retailer,
            receipt.date
        );

        Ok(ExtractionResult {
            line_count: parser.line_count(),
            receipt,
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}

/// Parse a receipt with the built-in retailer signatures.
pub fn parse_receipt(text: &str) -> Result<ParsedReceipt> {
    ReceiptProcessor::new().parse_receipt(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReceiptError;

    const BARBORA: &str = "Barbora
2023-04-16
1 Nektarinai, 1 kg 0.612 kg €1.6569 €1.3693 21,00 €0.84 €1.01
2 Užtepėlė 1 pak. €1.2900 €1.0661 21,00 €0.22 €1.29
Pritaikytos nuolaidos
Nektarinai, 1 kg -€1.10";

    #[test]
    fn test_parse_collects_warnings() {
        let result = ReceiptProcessor::new().parse(BARBORA).unwrap();
        assert_eq!(result.receipt.retailer, Retailer::Barbora);
        assert_eq!(result.line_count, 6);
        assert_eq!(result.receipt.products.len(), 2);
        assert_eq!(result.warnings, vec!["No quantity for \"Užtepėlė\"".to_string()]);
    }

    #[test]
    fn test_unknown_retailer() {
        let err = parse_receipt("RIMI\n2024-01-01").unwrap_err();
        assert_eq!(err, ReceiptError::UnknownRetailer);
    }

    #[test]
    fn test_custom_signature() {
        let processor = ReceiptProcessor::new()
            .with_signature(RetailerSignature::new(Retailer::Barbora, "e-parduotuvė"));
        let text = BARBORA.replacen("Barbora", "e-parduotuvė", 1);
        assert_eq!(processor.detect(&text).unwrap(), Retailer::Barbora);
        assert_eq!(processor.parse_receipt(&text).unwrap().products.len(), 2);
    }

    #[test]
    fn test_from_config() {
        let mut config = KvitasConfig::default();
        config.detection.signatures = vec![RetailerSignature::new(Retailer::Maxima, "Barbora")];
        let processor = ReceiptProcessor::from_config(&config);
        assert_eq!(processor.detect(BARBORA).unwrap(), Retailer::Maxima);
    }
}

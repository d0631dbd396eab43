//! Retailer detection from header signatures.

use tracing::debug;

use crate::error::ReceiptError;
use crate::models::config::{DetectionConfig, RetailerSignature};
use crate::models::receipt::Retailer;

use super::retailer::RetailerParser;
use super::Result;

/// Picks the grammar for a receipt by searching its text for retailer
/// signatures. Signatures are tried in order and the first hit wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetailerDetector {
    signatures: Vec<RetailerSignature>,
}

impl RetailerDetector {
    pub fn new(signatures: Vec<RetailerSignature>) -> Self {
        Self { signatures }
    }

    pub fn from_config(config: &DetectionConfig) -> Self {
        Self::new(config.signatures.clone())
    }

    /// Try `signature` before all configured ones.
    pub fn with_signature(mut self, signature: RetailerSignature) -> Self {
        self.signatures.insert(0, signature);
        self
    }

    pub fn signatures(&self) -> &[RetailerSignature] {
        &self.signatures
    }

    /// Retailer whose signature occurs first in detection order.
    pub fn detect(&self, text: &str) -> Result<Retailer> {
        self.signatures
            .iter()
            .find(|sig| !sig.marker.is_empty() && text.contains(sig.marker.as_str()))
            .map(|sig| sig.retailer)
            .ok_or(ReceiptError::UnknownRetailer)
    }

    /// Detect the retailer and bind the text to its grammar.
    pub fn bind<'a>(&self, text: &'a str) -> Result<RetailerParser<'a>> {
        let retailer = self.detect(text)?;
        debug!(%retailer, "retailer detected");
        Ok(RetailerParser::new(retailer, text))
    }
}

impl Default for RetailerDetector {
    fn default() -> Self {
        Self::from_config(&DetectionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receipt::ReceiptParser;

    #[test]
    fn test_detect_default_signatures() {
        let detector = RetailerDetector::default();
        assert_eq!(detector.detect("D1_\nUAB NORFOS MAŽMENA\n").unwrap(), Retailer::Norfa);
        assert_eq!(detector.detect("UAB \"Lidl Lietuva\" Į. k.").unwrap(), Retailer::Lidl);
        assert_eq!(detector.detect("Barbora\n2023-04-16").unwrap(), Retailer::Barbora);
        assert_eq!(detector.detect("\nMAXIMA LT, UAB\n").unwrap(), Retailer::Maxima);
    }

    #[test]
    fn test_detection_order() {
        let detector = RetailerDetector::default();
        let text = "MAXIMA LT, UAB\nBarbora";
        assert_eq!(detector.detect(text).unwrap(), Retailer::Barbora);
    }

    #[test]
    fn test_unknown_retailer() {
        let detector = RetailerDetector::default();
        assert_eq!(detector.detect("RIMI LIETUVA"), Err(ReceiptError::UnknownRetailer));
        assert_eq!(detector.detect(""), Err(ReceiptError::UnknownRetailer));
    }

    #[test]
    fn test_custom_signature_takes_priority() {
        let detector = RetailerDetector::default()
            .with_signature(RetailerSignature::new(Retailer::Maxima, "MAXIMA"));
        assert_eq!(detector.detect("MAXIMA Barbora").unwrap(), Retailer::Maxima);
    }

    #[test]
    fn test_empty_marker_never_matches() {
        let detector = RetailerDetector::new(vec![RetailerSignature::new(Retailer::Lidl, "")]);
        assert_eq!(detector.detect("anything"), Err(ReceiptError::UnknownRetailer));
    }

    #[test]
    fn test_bind() {
        let parser = RetailerDetector::default().bind("Barbora\n2023-04-16").unwrap();
        assert_eq!(parser.retailer(), Retailer::Barbora);
    }
}

//! Configuration structures for receipt processing.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{KvitasError, Result};
use crate::models::receipt::Retailer;

/// Main configuration for kvitas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KvitasConfig {
    /// Retailer detection configuration.
    pub detection: DetectionConfig,

    /// Output configuration.
    pub output: OutputConfig,
}

/// Retailer detection configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Signatures tested in order; the first one found in the receipt wins.
    pub signatures: Vec<RetailerSignature>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            signatures: Retailer::ALL
                .iter()
                .map(|&retailer| RetailerSignature::default_for(retailer))
                .collect(),
        }
    }
}

/// A header substring that identifies one retailer's receipts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetailerSignature {
    /// Retailer whose grammar handles matching receipts.
    pub retailer: Retailer,

    /// Substring searched for in the raw receipt text.
    pub marker: String,
}

impl RetailerSignature {
    pub fn new(retailer: Retailer, marker: impl Into<String>) -> Self {
        Self {
            retailer,
            marker: marker.into(),
        }
    }

    /// Built-in signature for a retailer.
    pub fn default_for(retailer: Retailer) -> Self {
        let marker = match retailer {
            Retailer::Norfa => "UAB NORFOS MAŽMENA",
            Retailer::Lidl => "Lidl Lietuva",
            Retailer::Barbora => "Barbora",
            Retailer::Maxima => "MAXIMA LT, UAB",
        };
        Self::new(retailer, marker)
    }
}

/// Output configuration (used by the CLI).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format: "json", "csv" or "text".
    pub format: String,

    /// Pretty-print JSON output.
    pub pretty: bool,

    /// Include the assembled receipt line of each product in text output.
    pub show_receipt_lines: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "json".to_string(),
            pretty: false,
            show_receipt_lines: false,
        }
    }
}

impl KvitasConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check the configuration for values the parser cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.detection.signatures.is_empty() {
            return Err(KvitasError::Config(
                "detection.signatures must not be empty".to_string(),
            ));
        }
        if let Some(sig) = self
            .detection
            .signatures
            .iter()
            .find(|s| s.marker.trim().is_empty())
        {
            return Err(KvitasError::Config(format!(
                "empty signature marker for retailer {}",
                sig.retailer
            )));
        }
        if !matches!(self.output.format.as_str(), "json" | "csv" | "text") {
            return Err(KvitasError::Config(format!(
                "unsupported output format: {}",
                self.output.format
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_signature_order() {
        let config = KvitasConfig::default();
        let order: Vec<Retailer> = config
            .detection
            .signatures
            .iter()
            .map(|s| s.retailer)
            .collect();
        assert_eq!(order, Retailer::ALL.to_vec());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: KvitasConfig = serde_json::from_str(r#"{"output": {"pretty": true}}"#).unwrap();
        assert!(config.output.pretty);
        assert_eq!(config.output.format, "json");
        assert_eq!(config.detection, DetectionConfig::default());
    }

    #[test]
    fn test_validate_rejects_empty_marker() {
        let mut config = KvitasConfig::default();
        config.detection.signatures[0].marker = "  ".to_string();
        assert!(matches!(config.validate(), Err(KvitasError::Config(_))));
    }

    #[test]
    fn test_custom_signatures_round_trip_through_file() {
        let dir = std::env::temp_dir().join(format!("kvitas-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");

        let mut config = KvitasConfig::default();
        config.detection.signatures = vec![RetailerSignature::new(Retailer::Lidl, "LIDL")];
        config.save(&path).unwrap();

        let loaded = KvitasConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}

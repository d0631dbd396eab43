//! Intermediate product blocks built by the line assemblers.

use rust_decimal::Decimal;

/// One logical product reconstructed from consecutive print lines.
///
/// Only lives inside a single `parse_products` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnparsedProductLine {
    /// Product line text, wrapped continuations joined with a space.
    pub primary_text: String,
    /// A returnable-packaging deposit line followed the product.
    pub has_deposit: bool,
    /// Discount line(s) attached to the product, joined with a space.
    pub discount_text: String,
    /// The block is still open: the next line may continue it.
    pub continuation: bool,
    /// Tokens of the weight-breakdown line, if one followed.
    pub dynamic_weight: Vec<String>,
}

impl UnparsedProductLine {
    /// Start a block from a product line.
    pub fn start(line: &str, closed: bool) -> Self {
        Self {
            primary_text: line.to_string(),
            continuation: !closed,
            ..Self::default()
        }
    }

    pub fn push_text(&mut self, line: &str) {
        self.primary_text.push(' ');
        self.primary_text.push_str(line);
    }

    pub fn push_discount(&mut self, line: &str) {
        if !self.discount_text.is_empty() {
            self.discount_text.push(' ');
        }
        self.discount_text.push_str(line);
    }

    pub fn set_dynamic_weight(&mut self, tokens: &[&str]) {
        self.dynamic_weight = tokens.iter().map(|t| t.to_string()).collect();
        self.continuation = false;
    }

    /// Weight line tokens joined back into one line.
    pub fn dynamic_weight_text(&self) -> String {
        self.dynamic_weight.join(" ")
    }

    /// Text identifying the block in errors and output.
    pub fn receipt_line(&self) -> String {
        if self.dynamic_weight.is_empty() {
            self.primary_text.clone()
        } else {
            format!("{} {}", self.primary_text, self.dynamic_weight_text())
        }
    }
}

/// Whether a deposit line raises or lowers the preceding product's price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepositSign {
    Add,
    Subtract,
}

impl DepositSign {
    /// Apply the fixed deposit surcharge to an amount. `None` on overflow.
    pub fn apply(self, amount: Decimal) -> Option<Decimal> {
        match self {
            DepositSign::Add => amount.checked_add(deposit_surcharge()),
            DepositSign::Subtract => amount.checked_sub(deposit_surcharge()),
        }
    }
}

/// Deposit for one returnable package, in EUR.
pub fn deposit_surcharge() -> Decimal {
    Decimal::new(10, 2)
}

/// Whether the last whitespace token of a line equals `marker`.
pub fn ends_with_marker(line: &str, marker: &str) -> bool {
    line.split_whitespace().next_back() == Some(marker)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_continuation() {
        let mut block = UnparsedProductLine::start("Šv. viščiukų broil. šlaunelių mėsa WELL", false);
        assert!(block.continuation);
        block.push_text("DON    3,99 A");
        assert_eq!(block.primary_text, "Šv. viščiukų broil. šlaunelių mėsa WELL DON    3,99 A");
    }

    #[test]
    fn test_receipt_line_includes_weight() {
        let mut block = UnparsedProductLine::start("Raudonėliai SALDVA", false);
        block.set_dynamic_weight(&["0,65", "X", "2", "vnt.", "1,30", "A"]);
        assert!(!block.continuation);
        assert_eq!(block.receipt_line(), "Raudonėliai SALDVA 0,65 X 2 vnt. 1,30 A");
    }

    #[test]
    fn test_deposit_sign() {
        assert_eq!(DepositSign::Add.apply(Decimal::new(99, 2)), Some(Decimal::new(109, 2)));
        assert_eq!(DepositSign::Subtract.apply(Decimal::new(99, 2)), Some(Decimal::new(89, 2)));
        assert_eq!(DepositSign::Add.apply(Decimal::MAX), None);
    }

    #[test]
    fn test_ends_with_marker() {
        assert!(ends_with_marker("Ledai AURUM 0,39 M1", "M1"));
        assert!(ends_with_marker("  0,99 X 2 vnt.     1,98 A", "A"));
        assert!(!ends_with_marker("Sūris GOUDA", "A"));
        assert!(!ends_with_marker("", "A"));
    }
}

//! Parsed receipt data models.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::ParseRetailerError;

/// Grocery chains with an implemented receipt grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Retailer {
    /// UAB Norfos mažmena.
    Norfa,
    /// MAXIMA LT, UAB (in-store receipts).
    Maxima,
    /// UAB "Lidl Lietuva".
    Lidl,
    /// Barbora e-shop.
    Barbora,
}

impl Retailer {
    /// All retailers, in default detection order.
    pub const ALL: [Retailer; 4] = [
        Retailer::Norfa,
        Retailer::Lidl,
        Retailer::Barbora,
        Retailer::Maxima,
    ];

    /// Stable identifier used in output and configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Retailer::Norfa => "norfa",
            Retailer::Maxima => "maxima",
            Retailer::Lidl => "lidl",
            Retailer::Barbora => "barbora",
        }
    }

}

impl FromStr for Retailer {
    type Err = ParseRetailerError;

    /// Parse a retailer identifier (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "norfa" => Ok(Retailer::Norfa),
            "maxima" => Ok(Retailer::Maxima),
            "lidl" => Ok(Retailer::Lidl),
            "barbora" => Ok(Retailer::Barbora),
            _ => Err(ParseRetailerError(s.to_string())),
        }
    }
}

impl fmt::Display for Retailer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit a product quantity is measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Pieces,
    Grams,
    Milliliters,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Pieces => "pieces",
            Unit::Grams => "grams",
            Unit::Milliliters => "milliliters",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Amount of a product bought.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quantity {
    pub unit: Unit,

    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

impl Quantity {
    pub fn new(unit: Unit, amount: Decimal) -> Self {
        Self {
            unit,
            amount: amount.normalize(),
        }
    }

    pub fn pieces(amount: Decimal) -> Self {
        Self::new(Unit::Pieces, amount)
    }

    pub fn grams(amount: Decimal) -> Self {
        Self::new(Unit::Grams, amount)
    }

    pub fn milliliters(amount: Decimal) -> Self {
        Self::new(Unit::Milliliters, amount)
    }

    /// Same quantity rounded to `dp` decimal places, halves away from zero.
    pub fn rounded(&self, dp: u32) -> Self {
        Self::new(
            self.unit,
            self.amount
                .round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero),
        )
    }
}

/// Price of a single receipt entry.
///
/// `paid` always equals `full - discount`; all three are rounded to cents
/// once, when the price is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Price before any discount.
    #[serde(with = "rust_decimal::serde::float")]
    pub full: Decimal,

    /// Discount applied to this entry.
    #[serde(with = "rust_decimal::serde::float")]
    pub discount: Decimal,

    /// Amount actually paid.
    #[serde(with = "rust_decimal::serde::float")]
    pub paid: Decimal,
}

impl Price {
    /// Build a price from the printed full price and a discount.
    ///
    /// Returns `None` when the discount exceeds the full price or either
    /// amount is negative.
    pub fn from_full(full: Decimal, discount: Decimal) -> Option<Self> {
        let full = round_money(full);
        let discount = round_money(discount);
        if full.is_sign_negative() || discount.is_sign_negative() || discount > full {
            return None;
        }
        Some(Self {
            full,
            discount,
            paid: full - discount,
        })
    }

    /// Build a price from the printed paid amount and a discount.
    ///
    /// Returns `None` when either amount is negative or their sum overflows.
    pub fn from_paid(paid: Decimal, discount: Decimal) -> Option<Self> {
        let paid = round_money(paid);
        let discount = round_money(discount);
        if paid.is_sign_negative() || discount.is_sign_negative() {
            return None;
        }
        Some(Self {
            full: paid.checked_add(discount)?,
            discount,
            paid,
        })
    }
}

/// Round a money amount to cents, halves away from zero.
pub(crate) fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// A single product extracted from a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedProduct {
    /// Product name as printed, without price and weight columns.
    pub name: String,

    /// Price breakdown.
    pub price: Price,

    /// Quantity, when the receipt states one. `None` means the receipt
    /// carries no usable quantity; callers decide on a default.
    pub quantity: Option<Quantity>,

    /// Assembled print text the product was parsed from.
    pub receipt_line: String,
}

/// Result of parsing one receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedReceipt {
    /// Retailer whose grammar was used.
    pub retailer: Retailer,

    /// Purchase date.
    pub date: NaiveDate,

    /// Products in print order.
    pub products: Vec<ParsedProduct>,
}

impl ParsedReceipt {
    /// Product names, in print order (input for name-based lookups).
    pub fn product_names(&self) -> Vec<&str> {
        self.products.iter().map(|p| p.name.as_str()).collect()
    }

    /// Sum of amounts paid. Totals saturate at `Decimal::MAX`.
    pub fn total_paid(&self) -> Decimal {
        self.products
            .iter()
            .fold(Decimal::ZERO, |total, p| total.saturating_add(p.price.paid))
    }

    /// Sum of discounts.
    pub fn total_discount(&self) -> Decimal {
        self.products
            .iter()
            .fold(Decimal::ZERO, |total, p| total.saturating_add(p.price.discount))
    }

    /// Sum of full prices.
    pub fn total_full(&self) -> Decimal {
        self.products
            .iter()
            .fold(Decimal::ZERO, |total, p| total.saturating_add(p.price.full))
    }
}

//! Line grammars of the supported retailers.

mod barbora;
mod lidl;
mod maxima;
mod norfa;

pub use barbora::BarboraParser;
pub use lidl::LidlParser;
pub use maxima::MaximaParser;
pub use norfa::NorfaParser;

use chrono::NaiveDate;

use crate::error::ReceiptError;
use crate::models::receipt::{ParsedProduct, Price, Retailer};

use super::block::{DepositSign, UnparsedProductLine};
use super::normalize::normalize_lines;
use super::rules::{discount_amount, locate_price, parse_amount, parse_iso_date};
use super::{ReceiptParser, Result};

/// Grammar selected for one receipt.
#[derive(Debug, Clone)]
pub enum RetailerParser<'a> {
    Norfa(NorfaParser<'a>),
    Maxima(MaximaParser<'a>),
    Lidl(LidlParser<'a>),
    Barbora(BarboraParser<'a>),
}

impl<'a> RetailerParser<'a> {
    /// Normalize `text` and bind it to the grammar of `retailer`.
    pub fn new(retailer: Retailer, text: &'a str) -> Self {
        let lines = normalize_lines(text);
        match retailer {
            Retailer::Norfa => Self::Norfa(NorfaParser::new(lines)),
            Retailer::Maxima => Self::Maxima(MaximaParser::new(lines)),
            Retailer::Lidl => Self::Lidl(LidlParser::new(lines)),
            Retailer::Barbora => Self::Barbora(BarboraParser::new(lines)),
        }
    }

    /// Normalized receipt lines.
    pub fn lines(&self) -> &[&'a str] {
        match self {
            Self::Norfa(p) => p.lines(),
            Self::Maxima(p) => p.lines(),
            Self::Lidl(p) => p.lines(),
            Self::Barbora(p) => p.lines(),
        }
    }

    pub fn line_count(&self) -> usize {
        self.lines().len()
    }
}

impl ReceiptParser for RetailerParser<'_> {
    fn parse_date(&self) -> Result<NaiveDate> {
        match self {
            Self::Norfa(p) => p.parse_date(),
            Self::Maxima(p) => p.parse_date(),
            Self::Lidl(p) => p.parse_date(),
            Self::Barbora(p) => p.parse_date(),
        }
    }

    fn parse_products(&self) -> Result<Vec<ParsedProduct>> {
        match self {
            Self::Norfa(p) => p.parse_products(),
            Self::Maxima(p) => p.parse_products(),
            Self::Lidl(p) => p.parse_products(),
            Self::Barbora(p) => p.parse_products(),
        }
    }

    fn retailer(&self) -> Retailer {
        match self {
            Self::Norfa(p) => p.retailer(),
            Self::Maxima(p) => p.retailer(),
            Self::Lidl(p) => p.retailer(),
            Self::Barbora(p) => p.retailer(),
        }
    }
}

/// Parse the date field of a date line.
fn parse_date_field(retailer: Retailer, field: &str) -> Result<NaiveDate> {
    parse_iso_date(field)
        .ok_or_else(|| ReceiptError::invalid(retailer, format!("invalid date {:?}", field)))
}

/// Name and raw price token of a block priced in a class-marker column.
///
/// A priced weight line wins over the product line; the whole product line
/// is then the name.
fn class_priced(
    retailer: Retailer,
    primary: &str,
    block: &UnparsedProductLine,
    marker: &str,
) -> Result<(String, String)> {
    let weight_text = block.dynamic_weight_text();
    if let Some(priced) = locate_price(&weight_text, marker) {
        return Ok((primary.trim().to_string(), priced.price.to_string()));
    }

    locate_price(primary, marker)
        .map(|priced| (priced.name, priced.price.to_string()))
        .ok_or_else(|| {
            ReceiptError::parse(
                retailer,
                block.receipt_line(),
                format!("no price before {:?}", marker),
            )
        })
}

/// Price of a block whose printed amount is the full, undiscounted price.
fn printed_full_price(
    retailer: Retailer,
    block: &UnparsedProductLine,
    price_token: &str,
    discount_marker: &str,
    deposit: DepositSign,
) -> Result<Price> {
    let line = block.receipt_line();
    let mut full = parse_amount(price_token).ok_or_else(|| {
        ReceiptError::parse(retailer, &line, format!("invalid price {:?}", price_token))
    })?;
    if block.has_deposit {
        full = deposit.apply(full).ok_or_else(|| {
            ReceiptError::parse(retailer, &line, format!("price {} with deposit out of range", full))
        })?;
    }

    let discount = discount_amount(&block.discount_text, discount_marker)
        .map_err(|reason| ReceiptError::parse(retailer, &line, reason))?;

    Price::from_full(full, discount).ok_or_else(|| {
        ReceiptError::parse(
            retailer,
            &line,
            format!("discount {} exceeds price {}", discount, full),
        )
    })
}

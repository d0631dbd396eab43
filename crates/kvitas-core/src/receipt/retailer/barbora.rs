//! Barbora e-shop receipts.
//!
//! Each product is a numbered row of columns ending in the paid price:
//!
//! ```text
//! 1 Nektarinai, 1 kg 0.612 kg €1.6569 €1.3693 21,00 €0.84 €1.01
//! ```
//!
//! Discounts are listed after the `Pritaikytos nuolaidos` header as
//! `<product name> -€<amount>` and matched back to products by name.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::ReceiptError;
use crate::models::receipt::{ParsedProduct, Price, Retailer, Unit};
use crate::receipt::block::{DepositSign, UnparsedProductLine};
use crate::receipt::rules::{parse_amount, quantity_from_unit};
use crate::receipt::{ReceiptParser, Result};

use super::parse_date_field;

const DATE_LINE: usize = 1;
const PRODUCTS_START: usize = 2;
const DISCOUNTS_HEADER: &str = "Pritaikytos nuolaidos";
const DISCOUNT_SEPARATOR: &str = " -€";
const DEPOSIT: &str = "(depozitinis)";
const DEPOSIT_SIGN: DepositSign = DepositSign::Add;
/// Index, name, amount, unit, price, price without VAT, VAT %, VAT, paid.
const MIN_COLUMNS: usize = 9;
/// Columns after the name, starting with the amount.
const TRAILING_COLUMNS: usize = 7;

/// Parser for Barbora receipts.
#[derive(Debug, Clone)]
pub struct BarboraParser<'a> {
    lines: Vec<&'a str>,
}

impl<'a> BarboraParser<'a> {
    pub fn new(lines: Vec<&'a str>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[&'a str] {
        &self.lines
    }
}

impl ReceiptParser for BarboraParser<'_> {
    fn parse_date(&self) -> Result<NaiveDate> {
        let line = self.lines.get(DATE_LINE).ok_or_else(|| {
            ReceiptError::invalid(Retailer::Barbora, "receipt too short for a date line")
        })?;
        parse_date_field(Retailer::Barbora, line)
    }

    fn parse_products(&self) -> Result<Vec<ParsedProduct>> {
        let blocks = assemble(&self.lines)?;
        let mut discounts = discount_entries(&self.lines)?;
        debug!(
            retailer = %Retailer::Barbora,
            blocks = blocks.len(),
            discounts = discounts.len(),
            "assembled product blocks"
        );

        let products = blocks
            .iter()
            .map(|block| parse_block(block, &mut discounts))
            .collect::<Result<Vec<_>>>()?;

        if let Some((name, _)) = discounts.first() {
            return Err(ReceiptError::parse(
                Retailer::Barbora,
                name.as_str(),
                "discount does not match any product",
            ));
        }
        Ok(products)
    }

    fn retailer(&self) -> Retailer {
        Retailer::Barbora
    }
}

fn assemble(lines: &[&str]) -> Result<Vec<UnparsedProductLine>> {
    if lines.len() <= PRODUCTS_START {
        return Err(ReceiptError::invalid(
            Retailer::Barbora,
            "receipt too short for a product list",
        ));
    }

    let rows = lines[PRODUCTS_START..]
        .iter()
        .take_while(|line| !line.starts_with(DISCOUNTS_HEADER))
        .fold(Vec::new(), |mut rows, line| {
            push_line(&mut rows, line.trim());
            rows
        });

    rows.into_iter().try_fold(Vec::new(), |mut blocks, row| {
        if row.contains(DEPOSIT) {
            let last: &mut UnparsedProductLine = blocks.last_mut().ok_or_else(|| {
                ReceiptError::parse(Retailer::Barbora, row.as_str(), "deposit without a product")
            })?;
            last.has_deposit = true;
        } else {
            blocks.push(UnparsedProductLine::start(&row, true));
        }
        Ok::<_, ReceiptError>(blocks)
    })
}

/// A row starts when its first field is the next row number.
fn push_line(rows: &mut Vec<String>, line: &str) {
    let next_index = (rows.len() + 1).to_string();
    match rows.last_mut() {
        Some(last) if line.split_whitespace().next() != Some(next_index.as_str()) => {
            last.push(' ');
            last.push_str(line);
        }
        _ => rows.push(line.to_string()),
    }
}

/// Discounts by product name, in print order. Repeated names are summed.
fn discount_entries(lines: &[&str]) -> Result<Vec<(String, Decimal)>> {
    let Some(header) = lines.iter().position(|line| line.starts_with(DISCOUNTS_HEADER)) else {
        return Ok(Vec::new());
    };

    let entries = lines[header + 1..].iter().fold(Vec::<String>::new(), |mut entries, line| {
        match entries.last_mut() {
            Some(last) if !last.contains(DISCOUNT_SEPARATOR) => {
                last.push(' ');
                last.push_str(line.trim());
            }
            _ => entries.push(line.trim().to_string()),
        }
        entries
    });

    entries.iter().try_fold(Vec::new(), |mut discounts: Vec<(String, Decimal)>, entry| {
        let (name, amount) = entry.rsplit_once(DISCOUNT_SEPARATOR).ok_or_else(|| {
            ReceiptError::parse(Retailer::Barbora, entry.as_str(), "discount entry without amount")
        })?;
        let amount = parse_amount(amount).ok_or_else(|| {
            ReceiptError::parse(
                Retailer::Barbora,
                entry.as_str(),
                format!("invalid discount amount {:?}", amount),
            )
        })?;

        let name = normalize_name(name);
        match discounts.iter_mut().find(|(known, _)| *known == name) {
            Some((_, total)) => {
                *total = total.checked_add(amount).ok_or_else(|| {
                    ReceiptError::parse(Retailer::Barbora, entry.as_str(), "discount total out of range")
                })?;
            }
            None => discounts.push((name, amount)),
        }
        Ok::<_, ReceiptError>(discounts)
    })
}

fn normalize_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove and return the discount recorded for `name`.
fn take_discount(discounts: &mut Vec<(String, Decimal)>, name: &str) -> Decimal {
    discounts
        .iter()
        .position(|(known, _)| known == name)
        .map_or(Decimal::ZERO, |i| discounts.remove(i).1)
}

fn parse_block(
    block: &UnparsedProductLine,
    discounts: &mut Vec<(String, Decimal)>,
) -> Result<ParsedProduct> {
    let line = block.receipt_line();
    let fail = |reason: String| ReceiptError::parse(Retailer::Barbora, &line, reason);

    let columns: Vec<&str> = block.primary_text.split_whitespace().collect();
    if columns.len() < MIN_COLUMNS {
        return Err(fail(format!(
            "expected at least {} columns, found {}",
            MIN_COLUMNS,
            columns.len()
        )));
    }

    let amount_idx = columns.len() - TRAILING_COLUMNS;
    let name = columns[1..amount_idx].join(" ");

    let paid_column = columns[columns.len() - 1];
    let mut paid =
        parse_amount(paid_column).ok_or_else(|| fail(format!("invalid price {:?}", paid_column)))?;
    if block.has_deposit {
        paid = DEPOSIT_SIGN
            .apply(paid)
            .ok_or_else(|| fail(format!("price {} with deposit out of range", paid)))?;
    }
    let discount = take_discount(discounts, &name);
    let price = Price::from_paid(paid, discount)
        .ok_or_else(|| fail(format!("invalid price {} with discount {}", paid, discount)))?;

    let amount_column = columns[amount_idx];
    let amount = parse_amount(amount_column)
        .ok_or_else(|| fail(format!("invalid amount {:?}", amount_column)))?;
    let quantity = quantity_from_unit(amount, columns[amount_idx + 1])
        .map_err(fail)?
        .map(|q| match q.unit {
            Unit::Grams => q.rounded(0),
            _ => q,
        });

    Ok(ParsedProduct {
        name,
        price,
        quantity,
        receipt_line: line,
    })
}

//! Lidl (UAB "Lidl Lietuva") receipts.
//!
//! Product lines start with a 7-digit article code. A line without the
//! `A` tax class wraps; the wrapped part is either a weight line or the
//! rest of the name.

use chrono::NaiveDate;
use tracing::debug;

use crate::error::ReceiptError;
use crate::models::receipt::{ParsedProduct, Retailer};
use crate::receipt::block::{ends_with_marker, DepositSign, UnparsedProductLine};
use crate::receipt::rules::patterns::PRODUCT_CODE;
use crate::receipt::rules::weight_line_quantity;
use crate::receipt::{ReceiptParser, Result};

use super::{class_priced, parse_date_field, printed_full_price};

const HEADER_LINES: usize = 4;
const PRODUCTS_END: &str = "------------------------------------------------------";
const CLASS_MARKER: &str = "A";
const DEPOSIT: &str = "užstatas";
const DEPOSIT_SIGN: DepositSign = DepositSign::Add;
const RECEIPT_CODE: &str = "Kvito kodas";
const MIN_DATE_LINES: usize = 6;
const WEIGHT_LINE_TOKENS: usize = 6;

/// Parser for Lidl receipts.
#[derive(Debug, Clone)]
pub struct LidlParser<'a> {
    lines: Vec<&'a str>,
}

impl<'a> LidlParser<'a> {
    pub fn new(lines: Vec<&'a str>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[&'a str] {
        &self.lines
    }
}

impl ReceiptParser for LidlParser<'_> {
    /// The date is the second-to-last field of the closing line, or of the
    /// line six from the end when the receipt ends with a `Kvito kodas` block.
    fn parse_date(&self) -> Result<NaiveDate> {
        let len = self.lines.len();
        if len < MIN_DATE_LINES {
            return Err(ReceiptError::invalid(
                Retailer::Lidl,
                "receipt too short for a date line",
            ));
        }

        let line = if self.lines[len - 1].contains(RECEIPT_CODE) {
            self.lines[len - MIN_DATE_LINES]
        } else {
            self.lines[len - 1]
        };

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 2 {
            return Err(ReceiptError::invalid(
                Retailer::Lidl,
                format!("unexpected date line {:?}", line),
            ));
        }
        parse_date_field(Retailer::Lidl, fields[fields.len() - 2])
    }

    fn parse_products(&self) -> Result<Vec<ParsedProduct>> {
        let blocks = assemble(&self.lines)?;
        debug!(retailer = %Retailer::Lidl, blocks = blocks.len(), "assembled product blocks");
        blocks.iter().map(parse_block).collect()
    }

    fn retailer(&self) -> Retailer {
        Retailer::Lidl
    }
}

fn assemble(lines: &[&str]) -> Result<Vec<UnparsedProductLine>> {
    if lines.len() <= HEADER_LINES {
        return Err(ReceiptError::invalid(
            Retailer::Lidl,
            "receipt too short for a product list",
        ));
    }

    Ok(lines[HEADER_LINES..]
        .iter()
        .take_while(|line| !line.ends_with(PRODUCTS_END))
        .fold(Vec::new(), |mut blocks, line| {
            push_line(&mut blocks, line);
            blocks
        }))
}

fn push_line(blocks: &mut Vec<UnparsedProductLine>, line: &str) {
    let line = line.trim();
    let Some(last) = blocks.last_mut() else {
        blocks.push(start_block(line));
        return;
    };

    if line.to_lowercase().contains(DEPOSIT) {
        last.has_deposit = true;
    } else if last.continuation {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() == WEIGHT_LINE_TOKENS && tokens[1].eq_ignore_ascii_case("x") {
            last.set_dynamic_weight(&tokens);
        } else {
            last.push_text(line);
            last.continuation = !ends_with_marker(line, CLASS_MARKER);
        }
    } else if PRODUCT_CODE.is_match(line) {
        blocks.push(start_block(line));
    } else if line.to_lowercase().contains("nuolaida") {
        last.discount_text = line.to_string();
    } else {
        debug!(line, "unrecognized line kept with the previous product");
        last.push_text(line);
    }
}

fn start_block(line: &str) -> UnparsedProductLine {
    UnparsedProductLine::start(line, ends_with_marker(line, CLASS_MARKER))
}

fn parse_block(block: &UnparsedProductLine) -> Result<ParsedProduct> {
    let primary = PRODUCT_CODE
        .find(&block.primary_text)
        .map(|code| &block.primary_text[code.end()..])
        .ok_or_else(|| {
            ReceiptError::parse(Retailer::Lidl, block.receipt_line(), "missing article code")
        })?;

    let (name, price_token) = class_priced(Retailer::Lidl, primary, block, CLASS_MARKER)?;
    let price = printed_full_price(Retailer::Lidl, block, &price_token, CLASS_MARKER, DEPOSIT_SIGN)?;
    let quantity = weight_line_quantity(&block.dynamic_weight)
        .map_err(|reason| ReceiptError::parse(Retailer::Lidl, block.receipt_line(), reason))?;

    Ok(ParsedProduct {
        name,
        price,
        quantity,
        receipt_line: block.receipt_line(),
    })
}

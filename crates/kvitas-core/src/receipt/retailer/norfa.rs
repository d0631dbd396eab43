//! Norfa (UAB Norfos mažmena) receipts.
//!
//! Products follow the `Kvito numeris` line. Priced lines end with the
//! `M1` tax class; a line without it wraps onto the next one. Weighed
//! goods carry `<weight>x<unit price>` inside the product line and
//! discounts are printed in EUR right after the product.

use chrono::NaiveDate;
use tracing::debug;

use crate::error::ReceiptError;
use crate::models::receipt::{ParsedProduct, Retailer};
use crate::receipt::block::{ends_with_marker, DepositSign, UnparsedProductLine};
use crate::receipt::rules::patterns::INLINE_WEIGHT;
use crate::receipt::rules::{locate_price, parse_amount, quantity_from_unit, static_weight};
use crate::receipt::{ReceiptParser, Result};

use super::{parse_date_field, printed_full_price};

const PRODUCTS_START: &str = "Kvito numeris";
const PRODUCTS_END: char = '#';
const PRICE_MARKER: &str = "M1";
const DISCOUNT_MARKER: &str = "EUR";
const DEPOSIT: &str = "užstatas už pakuotę";
const DEPOSIT_SIGN: DepositSign = DepositSign::Add;
const DATE_LEN: usize = 10;

/// Parser for Norfa receipts.
#[derive(Debug, Clone)]
pub struct NorfaParser<'a> {
    lines: Vec<&'a str>,
}

impl<'a> NorfaParser<'a> {
    pub fn new(lines: Vec<&'a str>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[&'a str] {
        &self.lines
    }
}

impl ReceiptParser for NorfaParser<'_> {
    /// The date opens the second-to-last line: `2023-02-21 17:03 KAS#00000`.
    fn parse_date(&self) -> Result<NaiveDate> {
        if self.lines.len() < 2 {
            return Err(ReceiptError::invalid(
                Retailer::Norfa,
                "receipt too short for a date line",
            ));
        }

        let line = self.lines[self.lines.len() - 2];
        let field = line.get(..DATE_LEN).ok_or_else(|| {
            ReceiptError::invalid(Retailer::Norfa, format!("date line too short: {:?}", line))
        })?;
        parse_date_field(Retailer::Norfa, field)
    }

    fn parse_products(&self) -> Result<Vec<ParsedProduct>> {
        let blocks = assemble(&self.lines)?;
        debug!(retailer = %Retailer::Norfa, blocks = blocks.len(), "assembled product blocks");
        blocks.iter().map(parse_block).collect()
    }

    fn retailer(&self) -> Retailer {
        Retailer::Norfa
    }
}

fn assemble(lines: &[&str]) -> Result<Vec<UnparsedProductLine>> {
    let start = lines
        .iter()
        .position(|line| line.contains(PRODUCTS_START))
        .ok_or_else(|| {
            ReceiptError::invalid(
                Retailer::Norfa,
                format!("product list start {:?} not found", PRODUCTS_START),
            )
        })?;

    Ok(lines[start + 1..]
        .iter()
        .take_while(|line| !line.ends_with(PRODUCTS_END))
        .fold(Vec::new(), |mut blocks, line| {
            push_line(&mut blocks, line);
            blocks
        }))
}

fn push_line(blocks: &mut Vec<UnparsedProductLine>, line: &str) {
    let line = line.trim().trim_start_matches('*');
    let Some(last) = blocks.last_mut() else {
        blocks.push(start_block(line));
        return;
    };

    let lower = line.to_lowercase();
    if lower.contains(DEPOSIT) {
        last.has_deposit = true;
    } else if lower.contains("nuolaida") && lower.contains("eur") {
        last.discount_text = line.to_string();
    } else if last.continuation {
        last.push_text(line);
        last.continuation = false;
    } else {
        blocks.push(start_block(line));
    }
}

fn start_block(line: &str) -> UnparsedProductLine {
    UnparsedProductLine::start(line, ends_with_marker(line, PRICE_MARKER))
}

fn parse_block(block: &UnparsedProductLine) -> Result<ParsedProduct> {
    let line = block.receipt_line();
    let priced = locate_price(&block.primary_text, PRICE_MARKER).ok_or_else(|| {
        ReceiptError::parse(
            Retailer::Norfa,
            &line,
            format!("no price before {:?}", PRICE_MARKER),
        )
    })?;
    let price = printed_full_price(Retailer::Norfa, block, priced.price, DISCOUNT_MARKER, DEPOSIT_SIGN)?;

    let (name, quantity) = match INLINE_WEIGHT.captures(&priced.name) {
        Some(caps) => {
            let weight = parse_amount(&caps[1]).ok_or_else(|| {
                ReceiptError::parse(Retailer::Norfa, &line, format!("invalid weight {:?}", &caps[1]))
            })?;
            let quantity = quantity_from_unit(weight, "kg")
                .map_err(|reason| ReceiptError::parse(Retailer::Norfa, &line, reason))?
                .map(|q| q.rounded(0));
            let start = caps.get(0).map_or(0, |m| m.start());
            (weighed_name(&priced.name[..start]), quantity)
        }
        None => {
            let quantity = static_weight(&priced.name)
                .map_err(|reason| ReceiptError::parse(Retailer::Norfa, &line, reason))?;
            (priced.name, quantity)
        }
    };

    Ok(ParsedProduct {
        name,
        price,
        quantity,
        receipt_line: line,
    })
}

/// Drop the per-kilogram basis and trailing comma left in front of an inline weight.
fn weighed_name(name: &str) -> String {
    let name = ["1kg", "1 kg"]
        .iter()
        .fold(name, |name, basis| name.find(basis).map_or(name, |i| &name[..i]));
    let name = name.trim();
    name.strip_suffix(',').unwrap_or(name).trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::receipt::Quantity;
    use crate::receipt::normalize_lines;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    const RECEIPT: &str = "D1_
UAB NORFOS MAŽMENA
...
Visada laukiame Jūsų, Ačiū
------------------------------------------------
# Kvito numeris 00000 #
Ledai AURUM 100ml su kakaviniu glaistu 0,39 M1
*Salierų stiebai, 1kg 0,466x1,95 0,91 M1
Nuolaida 50% -0,45 EUR
Raudonieji lęšiai SKANĖJA, 500g 1,89 M1
AKCIJŲ NUOLAIDA 0,45 EUR #
******************************************* #
KVITO SUMA 4,23 EUR #
TARPINĖ SUMA 4,23 EUR
------------------------------------------------
SUMA 4,23 EUR
BANKO KORTELE 4,23 EUR
2023-02-21 17:03 KAS#00000
@ LTF NV 0000000 00 00000";

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn parser(text: &str) -> NorfaParser<'_> {
        NorfaParser::new(normalize_lines(text))
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parser(RECEIPT).parse_date().unwrap(),
            NaiveDate::from_ymd_opt(2023, 2, 21).unwrap()
        );
    }

    #[test]
    fn test_parse_date_errors() {
        for lines in [vec![""], vec!["invalid_date", "line1"], vec!["2024-05-2", "line1"]] {
            let err = NorfaParser::new(lines).parse_date().unwrap_err();
            assert!(matches!(err, ReceiptError::InvalidReceipt { .. }));
        }
    }

    #[test]
    fn test_parse_products() {
        let products = parser(RECEIPT).parse_products().unwrap();
        assert_eq!(products.len(), 3);

        assert_eq!(products[0].name, "Ledai AURUM 100ml su kakaviniu glaistu");
        assert_eq!(products[0].price.full, dec("0.39"));
        assert_eq!(products[0].price.paid, dec("0.39"));
        assert_eq!(products[0].quantity, Some(Quantity::milliliters(dec("100"))));
        assert_eq!(products[0].receipt_line, "Ledai AURUM 100ml su kakaviniu glaistu 0,39 M1");

        assert_eq!(products[1].name, "Salierų stiebai");
        assert_eq!(products[1].price.full, dec("0.91"));
        assert_eq!(products[1].price.discount, dec("0.45"));
        assert_eq!(products[1].price.paid, dec("0.46"));
        assert_eq!(products[1].quantity, Some(Quantity::grams(dec("466"))));
        assert_eq!(products[1].receipt_line, "Salierų stiebai, 1kg 0,466x1,95 0,91 M1");

        assert_eq!(products[2].name, "Raudonieji lęšiai SKANĖJA, 500g");
        assert_eq!(products[2].price.paid, dec("1.89"));
        assert_eq!(products[2].quantity, Some(Quantity::grams(dec("500"))));
    }

    #[test]
    fn test_wrapped_line_and_deposit() {
        let text = "UAB NORFOS MAŽMENA
Kvito numeris 1 #
Gazuotas mineralinis vanduo VYTAUTAS,
1,5 l 0,99 M1
Užstatas už pakuotę 0,10 M1
Duona 1,20 M1
SUMA 2,29 EUR #
2024-01-05 10:00 KAS#1
@";
        let products = parser(text).parse_products().unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].name, "Gazuotas mineralinis vanduo VYTAUTAS, 1,5 l");
        assert_eq!(products[0].price.full, dec("1.09"));
        assert_eq!(products[0].quantity, Some(Quantity::milliliters(dec("1500"))));
        assert_eq!(products[1].name, "Duona");
        assert_eq!(products[1].quantity, None);
    }

    #[test]
    fn test_mixed_case_discount_and_units() {
        let text = "UAB NORFOS MAŽMENA
Kvito numeris 1 #
Duona 1,20 M1
Nuolaida 50% -0,60 Eur
Vanduo VICHY 1,5L 0,99 M1
Sūris DŽIUGAS 500G 3,49 M1
SUMA 5,08 EUR #
2024-01-05 10:00 KAS#1
@";
        let products = parser(text).parse_products().unwrap();
        assert_eq!(products.len(), 3);

        assert_eq!(products[0].name, "Duona");
        assert_eq!(products[0].price.discount, dec("0.60"));
        assert_eq!(products[0].price.paid, dec("0.60"));

        assert_eq!(products[1].name, "Vanduo VICHY 1,5L");
        assert_eq!(products[1].quantity, Some(Quantity::milliliters(dec("1500"))));
        assert_eq!(products[2].quantity, Some(Quantity::grams(dec("500"))));
    }

    #[test]
    fn test_oversized_inline_weight_fails() {
        let text = "Kvito numeris 1 #
Bananai, 1kg 80000000000000000000000000x1,95 0,91 M1
#";
        let err = parser(text).parse_products().unwrap_err();
        assert!(matches!(err, ReceiptError::ParseFailure { retailer: Retailer::Norfa, .. }));
    }

    #[test]
    fn test_missing_product_list() {
        let err = parser("UAB NORFOS MAŽMENA\nDuona 1,20 M1").parse_products().unwrap_err();
        assert!(matches!(err, ReceiptError::InvalidReceipt { retailer: Retailer::Norfa, .. }));
    }

    #[test]
    fn test_unpriced_block_fails() {
        let text = "Kvito numeris 1 #\nDuona be kainos\nPienas\n#";
        let err = parser(text).parse_products().unwrap_err();
        assert_eq!(err.offending_line(), Some("Duona be kainos Pienas"));
    }

    #[test]
    fn test_weighed_name() {
        assert_eq!(weighed_name("Salierų stiebai, 1kg "), "Salierų stiebai");
        assert_eq!(weighed_name("Bananai, 1 kg "), "Bananai");
        assert_eq!(weighed_name("Obuoliai "), "Obuoliai");
    }
}

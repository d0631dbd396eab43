//! Maxima (MAXIMA LT, UAB) in-store receipts.

use chrono::NaiveDate;
use tracing::debug;

use crate::error::ReceiptError;
use crate::models::receipt::{ParsedProduct, Retailer};
use crate::receipt::block::{ends_with_marker, DepositSign, UnparsedProductLine};
use crate::receipt::rules::weight_line_quantity;
use crate::receipt::{ReceiptParser, Result};

use super::{class_priced, parse_date_field, printed_full_price};

const PRODUCTS_START: &str = "kvitas";
const PRODUCTS_END: &str = "========================";
const DATE_LINE: &str = "laikas";
const CLASS_MARKER: &str = "A";
const DEPOSIT: &str = "depozitinė";
const DEPOSIT_SIGN: DepositSign = DepositSign::Add;

/// Parser for Maxima receipts.
#[derive(Debug, Clone)]
pub struct MaximaParser<'a> {
    lines: Vec<&'a str>,
}

impl<'a> MaximaParser<'a> {
    pub fn new(lines: Vec<&'a str>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[&'a str] {
        &self.lines
    }
}

impl ReceiptParser for MaximaParser<'_> {
    /// Date is the second field of the last `LAIKAS` line.
    fn parse_date(&self) -> Result<NaiveDate> {
        let line = self
            .lines
            .iter()
            .rev()
            .find(|line| line.to_lowercase().contains(DATE_LINE))
            .ok_or_else(|| ReceiptError::invalid(Retailer::Maxima, "date line not found"))?;

        let field = line.split_whitespace().nth(1).ok_or_else(|| {
            ReceiptError::invalid(Retailer::Maxima, format!("unexpected date line {:?}", line))
        })?;
        parse_date_field(Retailer::Maxima, field)
    }

    fn parse_products(&self) -> Result<Vec<ParsedProduct>> {
        let blocks = assemble(&self.lines)?;
        debug!(retailer = %Retailer::Maxima, blocks = blocks.len(), "assembled product blocks");
        blocks.iter().map(parse_block).collect()
    }

    fn retailer(&self) -> Retailer {
        Retailer::Maxima
    }
}

fn assemble(lines: &[&str]) -> Result<Vec<UnparsedProductLine>> {
    let start = lines
        .iter()
        .position(|line| line.to_lowercase().contains(PRODUCTS_START))
        .ok_or_else(|| ReceiptError::invalid(Retailer::Maxima, "product list start not found"))?;

    Ok(lines[start + 1..]
        .iter()
        .take_while(|line| !line.starts_with(PRODUCTS_END))
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

    if line.contains(DEPOSIT) {
        last.has_deposit = true;
        return;
    }

    let tokens: Vec<&str> = line.split_whitespace().collect();
    if is_weight_line(&tokens) {
        last.set_dynamic_weight(&tokens);
        return;
    }

    if last.continuation && last.discount_text.is_empty() {
        last.push_text(line);
        last.continuation = !ends_with_marker(line, CLASS_MARKER);
    } else if last.continuation {
        last.push_discount(line);
        last.continuation = false;
    } else if line.to_lowercase().contains("nuolaida") {
        last.discount_text = line.to_string();
        last.continuation = !ends_with_marker(line, CLASS_MARKER);
    } else {
        blocks.push(start_block(line));
    }
}

fn start_block(line: &str) -> UnparsedProductLine {
    UnparsedProductLine::start(line, ends_with_marker(line, CLASS_MARKER))
}

/// `<unit price> X <amount> <unit> [<total> <class>]`
fn is_weight_line(tokens: &[&str]) -> bool {
    tokens.len() >= 4 && tokens[1].eq_ignore_ascii_case("x")
}

fn parse_block(block: &UnparsedProductLine) -> Result<ParsedProduct> {
    let (name, price_token) = class_priced(Retailer::Maxima, &block.primary_text, block, CLASS_MARKER)?;
    let price = printed_full_price(Retailer::Maxima, block, &price_token, CLASS_MARKER, DEPOSIT_SIGN)?;
    let quantity = weight_line_quantity(&block.dynamic_weight)
        .map_err(|reason| ReceiptError::parse(Retailer::Maxima, block.receipt_line(), reason))?;

    Ok(ParsedProduct {
        name,
        price,
        quantity,
        receipt_line: block.receipt_line(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::receipt::Quantity;
    use crate::receipt::normalize_lines;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    const RECEIPT: &str = "
MAXIMA LT, UAB
...
PVM mokėtojo kodas LT230335113

Kvitas 198/1582                                #00408751
Čiobreliai SANTA MARIA
  0,99 X 2 vnt.                                   1,98 A
Nuolaida:prieskonių pakuotėms -50%               -1,00 A
Bazilikai SALDVA
  0,65 X 2 vnt.                                   1,30 A
Nuolaida:prieskonių pakuotėms -50%               -0,66 A
Visų grūdo dalių avižiniai dribsniai WELL DONE    1,29 A
Dideli apelsinai, 1-2 d.
  2,69 X 1,422 kg                                 3,83 A
Nuolaida:Dideli apelsinai, 1–2 d.[               -1,43 A
Šv. viščiukų broil. šlaunelių mėsa be antibiotikų WELL
DON                                               3,99 A
Nuolaida:Šv. viščiukų broil. šlaunelių mėsa be an
                                                 -0,70 A
Juodasis šokoladas (72 %) PERGALĖ                 4,99 A
Nuolaida:Juodasis šokoladas (72 %) PERGALĖ[      -2,00 A
Raudonos saldžiosios paprikos, 80-100 mm
  2,99 X 0,300 kg                                 0,90 A
Nuolaida:Raudonos saldžiosios paprikos, 80-100 mm
                                                 -0,45 A
Juodieji pomidorai, nuo 47 mm
  3,99 X 0,408 kg                                 1,63 A
Nuolaida prekei                                  -0,41 A
====================================================== #
LAIKAS             2024-09-12 19:26:07                 #";

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn parser(text: &str) -> MaximaParser<'_> {
        MaximaParser::new(normalize_lines(text))
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parser(RECEIPT).parse_date().unwrap(),
            NaiveDate::from_ymd_opt(2024, 9, 12).unwrap()
        );
    }

    #[test]
    fn test_parse_date_missing() {
        let err = parser("MAXIMA LT, UAB\nKvitas 1").parse_date().unwrap_err();
        assert!(matches!(err, ReceiptError::InvalidReceipt { .. }));
    }

    #[test]
    fn test_parse_products() {
        let products = parser(RECEIPT).parse_products().unwrap();
        let summary: Vec<(&str, String, String, String)> = products
            .iter()
            .map(|p| {
                (
                    p.name.as_str(),
                    p.price.full.to_string(),
                    p.price.discount.to_string(),
                    p.price.paid.to_string(),
                )
            })
            .collect();

        let expected = [
            ("Čiobreliai SANTA MARIA", "1.98", "1.00", "0.98"),
            ("Bazilikai SALDVA", "1.30", "0.66", "0.64"),
            ("Visų grūdo dalių avižiniai dribsniai WELL DONE", "1.29", "0", "1.29"),
            ("Dideli apelsinai, 1-2 d.", "3.83", "1.43", "2.40"),
            ("Šv. viščiukų broil. šlaunelių mėsa be antibiotikų WELL DON", "3.99", "0.70", "3.29"),
            ("Juodasis šokoladas (72 %) PERGALĖ", "4.99", "2.00", "2.99"),
            ("Raudonos saldžiosios paprikos, 80-100 mm", "0.90", "0.45", "0.45"),
            ("Juodieji pomidorai, nuo 47 mm", "1.63", "0.41", "1.22"),
        ];
        assert_eq!(summary.len(), expected.len());
        for (got, want) in summary.iter().zip(expected.iter()) {
            assert_eq!(got.0, want.0);
            assert_eq!((got.1.as_str(), got.2.as_str(), got.3.as_str()), (want.1, want.2, want.3));
        }

        assert_eq!(products[0].quantity, Some(Quantity::pieces(dec("2"))));
        assert_eq!(products[2].quantity, None);
        assert_eq!(products[3].quantity, Some(Quantity::grams(dec("1422"))));
        assert_eq!(products[6].quantity, Some(Quantity::grams(dec("300"))));
    }

    #[test]
    fn test_weight_line_scenario() {
        let text = "MAXIMA LT, UAB
Kvitas 1/1
Raudonėliai SALDVA
  0,65 X 2 vnt.                                   1,30 A
Nuolaida:prieskonių pakuotėms -50%               -0,66 A
========================
LAIKAS 2024-09-12 19:26:07";
        let products = parser(text).parse_products().unwrap();
        assert_eq!(products.len(), 1);
        let product = &products[0];
        assert_eq!(product.name, "Raudonėliai SALDVA");
        assert_eq!(product.price.full, dec("1.30"));
        assert_eq!(product.price.discount, dec("0.66"));
        assert_eq!(product.price.paid, dec("0.64"));
        assert_eq!(product.quantity, Some(Quantity::pieces(dec("2"))));
        assert_eq!(product.receipt_line, "Raudonėliai SALDVA 0,65 X 2 vnt. 1,30 A");
    }

    #[test]
    fn test_deposit_adds_to_full_price() {
        let text = "Kvitas 1/1
Mineralinis vanduo VICHY 1,5 l                    0,89 A
Pakuotės užstatas (depozitinė)                    0,10 A
========================";
        let products = parser(text).parse_products().unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].price.full, dec("0.99"));
        assert_eq!(products[0].quantity, None);
    }

    #[test]
    fn test_malformed_weight_amount_fails() {
        let text = "Kvitas 1/1
Bananai
  1,29 X abc kg                                   1,00 A
========================";
        let err = parser(text).parse_products().unwrap_err();
        assert!(matches!(err, ReceiptError::ParseFailure { retailer: Retailer::Maxima, .. }));
    }

    #[test]
    fn test_oversized_weight_amount_fails() {
        let text = "Kvitas 1/1
Bananai
  1,29 X 80000000000000000000000000 kg           1,00 A
========================";
        let err = parser(text).parse_products().unwrap_err();
        assert!(matches!(err, ReceiptError::ParseFailure { retailer: Retailer::Maxima, .. }));
        assert_eq!(
            err.offending_line(),
            Some("Bananai 1,29 X 80000000000000000000000000 kg 1,00 A")
        );
    }

    #[test]
    fn test_missing_product_list() {
        let err = parser("MAXIMA LT, UAB\nDuona 1,00 A").parse_products().unwrap_err();
        assert!(matches!(err, ReceiptError::InvalidReceipt { .. }));
    }
}

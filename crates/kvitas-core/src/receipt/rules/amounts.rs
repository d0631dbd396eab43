//! Amount extraction for receipt lines.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::TOKEN;

/// Text of a priced line split around its price column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedText<'a> {
    /// Everything except the price token and the trailing marker, trimmed.
    pub name: String,
    /// Raw price token, sign and separators untouched.
    pub price: &'a str,
}

/// Parse a printed amount ("0,91", "-0,45", "€1.01") into a non-negative decimal.
///
/// A leading minus sign and euro symbol are dropped and the first decimal
/// comma becomes a period. Returns `None` for anything that is not a plain
/// decimal number afterwards.
pub fn parse_amount(token: &str) -> Option<Decimal> {
    let unsigned = token.trim().trim_start_matches('-').trim_start_matches('€');
    if unsigned.is_empty()
        || !unsigned
            .chars()
            .all(|c| c.is_ascii_digit() || c == ',' || c == '.')
    {
        return None;
    }

    let normalized = unsigned.replacen(',', ".", 1);
    Decimal::from_str(&normalized).ok()
}

/// Locate the price column of a priced line.
///
/// The price is the token immediately before the last occurrence of
/// `marker` (a tax class letter such as `A`, or a currency such as `EUR`).
/// Text printed after the marker is kept as part of the name.
pub fn locate_price<'a>(text: &'a str, marker: &str) -> Option<PricedText<'a>> {
    locate_price_by(text, |token| token == marker)
}

/// Like [`locate_price`], with `marker` compared ignoring ASCII case.
pub fn locate_price_ignore_case<'a>(text: &'a str, marker: &str) -> Option<PricedText<'a>> {
    locate_price_by(text, |token| token.eq_ignore_ascii_case(marker))
}

fn locate_price_by<'a>(text: &'a str, is_marker: impl Fn(&str) -> bool) -> Option<PricedText<'a>> {
    let tokens: Vec<_> = TOKEN.find_iter(text).collect();
    let marker_idx = tokens.iter().rposition(|t| is_marker(t.as_str()))?;
    if marker_idx == 0 {
        return None;
    }

    let price = tokens[marker_idx - 1];
    let head = text[..price.start()].trim();
    let tail = text[tokens[marker_idx].end()..].trim();
    let name = match (head.is_empty(), tail.is_empty()) {
        (_, true) => head.to_string(),
        (true, false) => tail.to_string(),
        (false, false) => format!("{} {}", head, tail),
    };

    Some(PricedText {
        name,
        price: price.as_str(),
    })
}

/// Parse the amount of a discount line. An empty line means no discount.
///
/// The marker is matched ignoring case ("EUR", "Eur").
pub fn discount_amount(discount_text: &str, marker: &str) -> Result<Decimal, String> {
    if discount_text.trim().is_empty() {
        return Ok(Decimal::ZERO);
    }

    let priced = locate_price_ignore_case(discount_text, marker)
        .ok_or_else(|| format!("discount amount before {:?} not found in {:?}", marker, discount_text))?;
    parse_amount(priced.price)
        .ok_or_else(|| format!("invalid discount amount {:?}", priced.price))
}

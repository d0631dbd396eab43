//! Unit normalization shared by all retailer grammars.

use rust_decimal::Decimal;

use crate::models::receipt::{Quantity, Unit};

use super::amounts::parse_amount;
use super::patterns::STATIC_WEIGHT;

/// Normalized unit and the factor applied to the printed amount.
struct UnitRule {
    unit: Unit,
    scale: i64,
}

fn unit_rule(token: &str) -> Option<UnitRule> {
    let rule = match token.to_lowercase().as_str() {
        "kg" => UnitRule { unit: Unit::Grams, scale: 1000 },
        "g" => UnitRule { unit: Unit::Grams, scale: 1 },
        "l" => UnitRule { unit: Unit::Milliliters, scale: 1000 },
        "ml" => UnitRule { unit: Unit::Milliliters, scale: 1 },
        "vnt." => UnitRule { unit: Unit::Pieces, scale: 1 },
        _ => return None,
    };
    Some(rule)
}

/// Convert a printed amount and unit token into a normalized quantity.
///
/// Unknown unit tokens yield `Ok(None)`. An amount too large to scale is an
/// error.
pub fn quantity_from_unit(amount: Decimal, unit: &str) -> Result<Option<Quantity>, String> {
    let Some(rule) = unit_rule(unit) else {
        return Ok(None);
    };
    amount
        .checked_mul(Decimal::from(rule.scale))
        .map(|scaled| Some(Quantity::new(rule.unit, scaled)))
        .ok_or_else(|| format!("quantity {} {} out of range", amount, unit))
}

/// Quantity from a weight line: `<unit price> X <amount> <unit> [<total> <class>]`.
///
/// Lines with fewer than four tokens carry no quantity. A malformed amount
/// is an error.
pub fn weight_line_quantity<S: AsRef<str>>(tokens: &[S]) -> Result<Option<Quantity>, String> {
    if tokens.len() < 4 {
        return Ok(None);
    }
    let amount_token = tokens[2].as_ref();
    let amount = parse_amount(amount_token)
        .ok_or_else(|| format!("invalid weight line amount {:?}", amount_token))?;
    quantity_from_unit(amount, tokens[3].as_ref())
}

/// Quantity of a `<number><unit>` weight written into a product name.
///
/// The name itself is left untouched by callers.
pub fn static_weight(name: &str) -> Result<Option<Quantity>, String> {
    let compact: String = name.chars().filter(|c| *c != ' ').collect();
    let Some(caps) = STATIC_WEIGHT.captures(&compact) else {
        return Ok(None);
    };
    match parse_amount(&caps[1]) {
        Some(amount) => quantity_from_unit(amount, &caps[2]),
        None => Ok(None),
    }
}

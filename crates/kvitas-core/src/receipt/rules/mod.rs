//! Field extraction rules shared by the retailer grammars.

pub mod amounts;
pub mod dates;
pub mod patterns;
pub mod units;

pub use amounts::{
    discount_amount, locate_price, locate_price_ignore_case, parse_amount, PricedText,
};
pub use dates::parse_iso_date;
pub use units::{quantity_from_unit, static_weight, weight_line_quantity};

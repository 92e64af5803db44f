//! Price quoting for a product with selected options.
//!
//! `total = base_price + Σ(extra_price × quantity)` over selections with a
//! positive quantity. Accumulation happens once, in f64, so display code has
//! a single rounding point.

use serde::Serialize;

#[derive(Debug, Clone, Copy)]
pub struct SelectedOption {
    pub extra_price: f64,
    pub quantity: u32,
}

#[derive(Debug, Serialize)]
pub struct QuoteLine {
    pub option_id: i32,
    pub option_type: String,
    pub option_value: String,
    pub extra_price: f64,
    pub quantity: u32,
    pub subtotal: f64,
}

pub fn quote_total(base_price: f64, selections: &[SelectedOption]) -> f64 {
    selections
        .iter()
        .filter(|s| s.quantity > 0)
        .fold(base_price, |acc, s| {
            acc + s.extra_price * f64::from(s.quantity)
        })
}

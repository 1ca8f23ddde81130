//! Amount extraction from free text.
//!
//! Recognises currency-marked figures such as `₱500`, `PHP 1,000.50` and
//! `500 pesos`. Figures without a currency marker are ignored in free text so
//! dates and reference numbers are not mistaken for payments. Figures above
//! [`MAX_CLAIMED_AMOUNT`] are never taken as an amount.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::domain::foundation::{Money, ValidationError};

/// Largest amount a payment may claim, ₱1,000,000,000.
pub const MAX_CLAIMED_AMOUNT: u64 = 1_000_000_000;

static CURRENCY_AMOUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:₱|\bphp\.?)\s*(?P<pre>[0-9][0-9,]*(?:\.[0-9]+)?)|(?P<post>[0-9][0-9,]*(?:\.[0-9]+)?)\s*(?:pesos?|php)\b",
    )
    .expect("currency amount pattern is valid")
});

static BARE_AMOUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?P<amount>[0-9][0-9,]*(?:\.[0-9]+)?)\s*$")
        .expect("bare amount pattern is valid")
});

/// Finds the first currency-marked amount in `text` within the claim cap.
pub fn extract_amount(text: &str) -> Option<Money> {
    first_currency_figure(text).filter(|amount| within_cap(*amount))
}

/// Parses a client-entered amount. Accepts everything [`extract_amount`]
/// does plus a bare figure such as `1000` or `1,000.50`.
///
/// # Errors
///
/// `payment_amount` is invalid if no figure is found or it exceeds
/// [`MAX_CLAIMED_AMOUNT`].
pub fn parse_claimed_amount(text: &str) -> Result<Money, ValidationError> {
    let amount = first_currency_figure(text)
        .or_else(|| {
            BARE_AMOUNT
                .captures(text)
                .and_then(|caps| caps.name("amount"))
                .and_then(|m| parse_figure(m.as_str()))
        })
        .ok_or_else(|| {
            ValidationError::invalid_format("payment_amount", format!("'{}' is not an amount", text))
        })?;
    if !within_cap(amount) {
        return Err(ValidationError::invalid_format(
            "payment_amount",
            format!("amount cannot exceed {}", MAX_CLAIMED_AMOUNT),
        ));
    }
    Ok(amount)
}

fn first_currency_figure(text: &str) -> Option<Money> {
    CURRENCY_AMOUNT.captures_iter(text).find_map(|caps| {
        caps.name("pre")
            .or_else(|| caps.name("post"))
            .and_then(|m| parse_figure(m.as_str()))
    })
}

fn within_cap(amount: Money) -> bool {
    amount.value() <= Decimal::from(MAX_CLAIMED_AMOUNT)
}

fn parse_figure(figure: &str) -> Option<Money> {
    let cleaned: String = figure.chars().filter(|c| *c != ',').collect();
    Decimal::from_str(&cleaned)
        .ok()
        .and_then(|value| Money::new(value).ok())
}

//! Conversions between amounts, dates and the strings shown to the user.
//!
//! Every function in here is total: bad input degrades to a fixed default
//! instead of returning an error.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

pub const CURRENCY_SYMBOL: &str = "R$";
pub const ZERO_CURRENCY: &str = "R$ 0,00";
pub const INVALID_DATE: &str = "Data inválida";

const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";
const API_DATE_FORMAT: &str = "%Y-%m-%d";

/// Renders `amount` as Brazilian Real, e.g. `R$ 1.234,56` or `-R$ 0,50`.
pub fn format_currency(amount: Decimal) -> String {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    rounded = rounded.abs();
    rounded.rescale(2);

    let plain = rounded.to_string();
    let (integer, fraction) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));
    let sign = if negative { "-" } else { "" };
    format!(
        "{sign}{CURRENCY_SYMBOL} {},{fraction}",
        group_thousands(integer)
    )
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }
    grouped
}

/// Reads an amount back from user or display text. Returns zero if nothing
/// numeric can be found.
pub fn parse_currency(text: &str) -> Decimal {
    let mut cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',')
        .collect();
    if let Some(comma) = cleaned.find(',') {
        cleaned.replace_range(comma..comma + 1, ".");
    }
    leading_number(&cleaned).unwrap_or(Decimal::ZERO)
}

/// Inverse of [format_currency] and [mask_currency].
pub fn get_numeric_value(formatted: &str) -> Decimal {
    parse_currency(formatted)
}

// Parses the longest `digits[.digits]` prefix, ignoring whatever follows.
fn leading_number(text: &str) -> Option<Decimal> {
    let integer_len = text.chars().take_while(char::is_ascii_digit).count();
    let rest = &text[integer_len..];
    let fraction = match rest.strip_prefix('.') {
        Some(after_dot) => {
            let fraction_len = after_dot.chars().take_while(char::is_ascii_digit).count();
            &after_dot[..fraction_len]
        }
        None => "",
    };
    let integer = &text[..integer_len];
    if integer.is_empty() && fraction.is_empty() {
        return None;
    }
    let integer = if integer.is_empty() { "0" } else { integer };
    let fraction = if fraction.is_empty() { "0" } else { fraction };
    Decimal::from_str(&format!("{integer}.{fraction}")).ok()
}

/// Formats a date or timestamp string as `DD/MM/YYYY`, or [INVALID_DATE].
pub fn format_date(text: Option<&str>) -> String {
    match text.map(str::trim).filter(|t| !t.is_empty()).and_then(parse_date) {
        Some(date) => date.format(DISPLAY_DATE_FORMAT).to_string(),
        None => INVALID_DATE.to_string(),
    }
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(text) {
        return Some(timestamp.with_timezone(&Local).date_naive());
    }
    if let Ok(timestamp) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(timestamp.date());
    }
    NaiveDate::parse_from_str(text, API_DATE_FORMAT).ok()
}

pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&Local)
        .format(DISPLAY_DATE_FORMAT)
        .to_string()
}

pub fn format_day(date: NaiveDate) -> String {
    date.format(DISPLAY_DATE_FORMAT).to_string()
}

pub fn format_date_for_api(date: NaiveDate) -> String {
    date.format(API_DATE_FORMAT).to_string()
}

pub fn format_account_number(agency: &str, account_number: &str) -> String {
    format!("{agency} / {account_number}")
}

/// Treats the digits in `text` as a number of cents and renders them as
/// currency. Used to redraw the amount field after each keystroke.
pub fn mask_currency(text: &str) -> String {
    let digits = digits_only(text, usize::MAX);
    if digits.is_empty() {
        return ZERO_CURRENCY.to_string();
    }
    match Decimal::from_str(&digits) {
        Ok(cents) => format_currency(cents / Decimal::ONE_HUNDRED),
        Err(_) => ZERO_CURRENCY.to_string(),
    }
}

/// Drops everything but ASCII digits and keeps at most `max_len` of them.
pub fn digits_only(text: &str, max_len: usize) -> String {
    text.chars()
        .filter(char::is_ascii_digit)
        .take(max_len)
        .collect()
}

/// `FATURA_CARTAO` -> `Fatura Cartao`
pub fn format_category(token: &str) -> String {
    token
        .replace('_', " ")
        .to_lowercase()
        .split(' ')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

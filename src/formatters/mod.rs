// ABOUTME: Display formatting for dashboard statistics
// ABOUTME: Integer counts and currency amounts with thousands separators
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Number formatting
//!
//! Stats compute raw `f64` values; these helpers turn them into the strings the
//! presentation layer shows.
//!
//! ```rust
//! use marketplace_admin::formatters::{format_number, format_price};
//!
//! assert_eq!(format_number(1234567.4), "1,234,567");
//! assert_eq!(format_price(1234.5, "£"), "£1,234.50");
//! ```

/// Round to an integer and group thousands
#[must_use]
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let rounded = format!("{:.0}", value.round());
    if rounded == "-0" {
        return "0".to_owned();
    }
    group_thousands(&rounded)
}

/// Two decimals, grouped thousands, prefixed by `symbol`
#[must_use]
pub fn format_price(value: f64, symbol: &str) -> String {
    if !value.is_finite() {
        return format!("{symbol}{value}");
    }
    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{symbol}{}.{cents}", group_thousands(whole))
}

fn group_thousands(digits: &str) -> String {
    let (sign, digits) = digits
        .strip_prefix('-')
        .map_or(("", digits), |unsigned| ("-", unsigned));

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    grouped.push_str(sign);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

// ABOUTME: Output formatting helpers for the marketplace admin CLI
// ABOUTME: Pretty JSON on stdout for results, error envelopes for rejected mutations
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use marketplace_admin::errors::{AppError, AppResult, ErrorResponse};
use serde::Serialize;
use serde_json::json;

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize>(value: &T) -> AppResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a mutation outcome message with its resulting record
pub fn print_outcome<T: Serialize>(message: &str, record: Option<&T>) -> AppResult<()> {
    print_json(&json!({
        "status": message,
        "data": record,
    }))
}

/// Print a rejected mutation as an error envelope
pub fn print_error(error: AppError) -> AppResult<()> {
    print_json(&ErrorResponse::from(error))
}

// ABOUTME: Settings command for the marketplace admin CLI
// ABOUTME: Prints the effective configuration as flattened key/value rows
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use marketplace_admin::{config::AdminConfig, errors::AppResult, settings::settings_table};

use crate::helpers::display::print_json;

/// Print every effective setting
pub fn show(config: &AdminConfig) -> AppResult<()> {
    print_json(&settings_table(config)?)
}

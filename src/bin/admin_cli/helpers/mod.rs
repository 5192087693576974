// ABOUTME: Helper modules for the marketplace admin CLI
// ABOUTME: Provides JSON output and error reporting utilities
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

pub mod display;

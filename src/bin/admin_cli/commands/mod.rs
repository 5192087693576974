// ABOUTME: Command modules for the marketplace admin CLI
// ABOUTME: Dashboard rendering, category hierarchy management, and settings display
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

pub mod categories;
pub mod dashboard;
pub mod settings;

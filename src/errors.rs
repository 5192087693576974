// ABOUTME: Unified error type with stable error codes and field-addressable context
// ABOUTME: Maps hierarchy, metrics, storage and configuration failures to one AppError
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Back-office errors
//!
//! Every fallible operation in the crate returns [`AppResult`]. Hierarchy
//! rejections carry the name of the form field they concern so the
//! presentation layer can attach the message next to the right input.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Stable, serializable error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    // Validation (3000-3999)
    /// Malformed input or a reference to something that does not exist
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput = 3000,
    /// A required field was missing or blank
    #[serde(rename = "MISSING_REQUIRED_FIELD")]
    MissingRequiredField = 3001,

    // Hierarchy (3500-3599)
    /// Reparenting would make a category its own ancestor
    #[serde(rename = "HIERARCHY_CYCLE")]
    HierarchyCycle = 3500,

    // Resource Management (4000-4999)
    /// The resource still has dependents and cannot be removed
    #[serde(rename = "RESOURCE_IN_USE")]
    ResourceInUse = 4002,

    // Metrics (5500-5599)
    /// A statistic's aggregate query failed
    #[serde(rename = "COMPUTE_FAILED")]
    ComputeFailed = 5500,

    // Configuration (6000-6999)
    /// Configuration error encountered
    #[serde(rename = "CONFIG_ERROR")]
    ConfigError = 6000,
    /// Configuration value could not be parsed
    #[serde(rename = "CONFIG_INVALID")]
    ConfigInvalid = 6002,

    // Internal Errors (9000-9999)
    /// Unexpected internal failure
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError = 9000,
    /// The persistence layer could not be reached or rejected the query
    #[serde(rename = "STORAGE_UNAVAILABLE")]
    StorageUnavailable = 9002,
    /// Data serialization/deserialization failed
    #[serde(rename = "SERIALIZATION_ERROR")]
    SerializationError = 9003,
}

impl ErrorCode {
    /// HTTP status an embedding web layer should answer with
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::InvalidInput | Self::MissingRequiredField => 400,
            Self::HierarchyCycle | Self::ResourceInUse => 409,
            Self::ComputeFailed => 502,
            Self::StorageUnavailable => 503,
            Self::ConfigError
            | Self::ConfigInvalid
            | Self::InternalError
            | Self::SerializationError => 500,
        }
    }

    /// Short description shown before the message
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::InvalidInput => "The provided input is invalid",
            Self::MissingRequiredField => "A required field is missing from the request",
            Self::HierarchyCycle => "The change would create a cycle in the category tree",
            Self::ResourceInUse => "The resource is still in use and cannot be removed",
            Self::ComputeFailed => "A statistic could not be computed",
            Self::ConfigError => "Configuration error encountered",
            Self::ConfigInvalid => "Configuration is invalid",
            Self::InternalError => "An internal error occurred",
            Self::StorageUnavailable => "Storage operation failed",
            Self::SerializationError => "Data serialization/deserialization failed",
        }
    }

    /// Whether the error is a rejected mutation the caller can correct
    #[must_use]
    pub const fn is_field_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput
                | Self::MissingRequiredField
                | Self::HierarchyCycle
                | Self::ResourceInUse
        )
    }
}

/// Where an error points: a form field, a resource, free-form details
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Form field the error is addressed to
    pub field: Option<String>,
    /// Offending resource, e.g. a category id or stat name
    pub resource_id: Option<String>,
    /// Structured extras, `null` when unused
    pub details: serde_json::Value,
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self {
            field: None,
            resource_id: None,
            details: serde_json::Value::Null,
        }
    }
}

/// Error returned by every fallible back-office operation
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Message suitable for display next to the field
    pub message: String,
    /// Additional context
    pub context: ErrorContext,
    /// Underlying cause
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            source: None,
        }
    }

    /// Address the error to a form field
    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.context.field = Some(field.into());
        self
    }

    /// Name the offending resource
    #[must_use]
    pub fn with_resource_id(mut self, resource_id: impl Into<String>) -> Self {
        self.context.resource_id = Some(resource_id.into());
        self
    }

    /// Attach structured extras
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.context.details = details;
        self
    }

    /// Keep the underlying cause
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Field this error is addressed to, if any
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        self.context.field.as_deref()
    }

    /// HTTP status of the error code
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.code.http_status()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

/// Result of a back-office operation
pub type AppResult<T> = Result<T, AppError>;

/// Error envelope handed to the presentation layer
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error payload
    pub error: ErrorResponseDetails,
}

/// Body of an [`ErrorResponse`]
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponseDetails {
    /// Stable error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Field the message belongs next to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Extra structured context
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub details: serde_json::Value,
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        Self {
            error: ErrorResponseDetails {
                code: error.code,
                message: error.message,
                field: error.context.field,
                details: error.context.details,
            },
        }
    }
}

/// Constructors for the errors the crate raises
impl AppError {
    /// Invalid input on a specific field
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message).with_field(field)
    }

    /// Required field missing or blank
    pub fn missing_field(field: impl Into<String>) -> Self {
        let field = field.into();
        Self::new(
            ErrorCode::MissingRequiredField,
            format!("The {field} field is required"),
        )
        .with_field(field)
    }

    /// Reparenting would introduce a cycle
    pub fn cycle(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::HierarchyCycle, message).with_field(field)
    }

    /// Deletion blocked by dependents
    pub fn in_use(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ResourceInUse, message).with_field(field)
    }

    /// Invalid input
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Statistic computation failed
    pub fn compute_failed(stat: impl Into<String>, source: Self) -> Self {
        let stat = stat.into();
        Self::new(
            ErrorCode::ComputeFailed,
            format!("Failed to compute '{stat}': {}", source.message),
        )
        .with_resource_id(stat)
        .with_source(source)
    }

    /// Storage layer failure
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StorageUnavailable, message)
    }

    /// Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// Configuration value could not be parsed
    pub fn invalid_config(key: &str, value: &str, reason: &str) -> Self {
        Self::new(
            ErrorCode::ConfigInvalid,
            format!("{key}={value:?} is invalid: {reason}"),
        )
        .with_resource_id(key)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        Self::storage(error.to_string()).with_source(error)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::new(ErrorCode::SerializationError, error.to_string()).with_source(error)
    }
}

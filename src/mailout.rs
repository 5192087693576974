// ABOUTME: Bulk email to selected marketplace users through an injected mail transport
// ABOUTME: Validates the request, iterates users by username, and reports sent and failed recipients
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::config::MailoutConfig;
use crate::constants::{fields, messages};
use crate::database::UserDirectory;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::models::{User, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::warn;

/// Mailout form submission
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MailoutRequest {
    /// Selected user ids
    pub recipients: Vec<UserId>,
    /// Subject line
    pub subject: String,
    /// Message body
    pub body: String,
}

impl MailoutRequest {
    /// Check required fields and minimum lengths
    ///
    /// # Errors
    ///
    /// - `MissingRequiredField` on `users`, `subject` or `body` when empty
    /// - `InvalidInput` on `subject` or `body` when shorter than the limit
    pub fn validate(&self, limits: &MailoutConfig) -> AppResult<()> {
        if self.recipients.is_empty() {
            return Err(AppError::missing_field(fields::USERS));
        }
        check_length(fields::SUBJECT, &self.subject, limits.subject_min_len)?;
        check_length(fields::BODY, &self.body, limits.body_min_len)
    }
}

fn check_length(field: &str, value: &str, min_len: usize) -> AppResult<()> {
    let length = value.trim().chars().count();
    if length == 0 {
        return Err(AppError::missing_field(field));
    }
    if length < min_len {
        return Err(AppError::validation(
            field,
            format!("The {field} must be at least {min_len} characters"),
        ));
    }
    Ok(())
}

/// Message handed to the transport for one recipient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailMessage {
    /// Subject line
    pub subject: String,
    /// Message body
    pub body: String,
    /// Recipient handle
    pub handle: String,
    /// Recipient address
    pub email: String,
    /// Recipient registration time
    pub joined: DateTime<Utc>,
}

impl MailMessage {
    fn for_user(user: &User, request: &MailoutRequest) -> Self {
        Self {
            subject: request.subject.trim().to_owned(),
            body: request.body.clone(),
            handle: user.username.clone(),
            email: user.email.clone(),
            joined: user.joined,
        }
    }
}

/// Outbound mail transport
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver one message
    async fn send(&self, message: &MailMessage) -> AppResult<()>;
}

/// Outcome of a mailout
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailoutReport {
    /// Messages accepted by the transport
    pub sent: usize,
    /// Recipients whose message the transport rejected
    pub failed: Vec<UserId>,
}

impl MailoutReport {
    /// Status line shown after sending
    #[must_use]
    pub fn status(&self) -> String {
        messages::mailout_sent(self.sent)
    }
}

/// Mailout tool over a user directory and a transport
pub struct Mailout {
    directory: Arc<dyn UserDirectory>,
    mailer: Arc<dyn Mailer>,
    limits: MailoutConfig,
}

impl Mailout {
    /// Create the tool
    #[must_use]
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        mailer: Arc<dyn Mailer>,
        limits: MailoutConfig,
    ) -> Self {
        Self {
            directory,
            mailer,
            limits,
        }
    }

    /// Users selectable as recipients, ordered by username
    ///
    /// # Errors
    ///
    /// Returns `StorageUnavailable` if the directory fails
    pub async fn candidates(&self) -> AppResult<Vec<User>> {
        self.directory.users_by_username().await
    }

    /// Validate and send one message per selected user
    ///
    /// Unknown recipient ids are ignored. A transport failure for one user is
    /// logged and recorded without stopping the rest.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed request, or
    /// `StorageUnavailable` if the directory fails
    pub async fn send(&self, request: &MailoutRequest) -> AppResult<MailoutReport> {
        request.validate(&self.limits)?;

        let selected: HashSet<UserId> = request.recipients.iter().copied().collect();
        let mut report = MailoutReport::default();

        for user in self.directory.users_by_username().await? {
            if !selected.contains(&user.id) {
                continue;
            }

            let message = MailMessage::for_user(&user, request);
            match self.mailer.send(&message).await {
                Ok(()) => report.sent += 1,
                Err(e) => {
                    warn!(user.id = user.id, error = %e, "Mailout delivery failed");
                    report.failed.push(user.id);
                }
            }
        }

        AppLogger::log_mailout(report.sent, report.failed.len());
        Ok(report)
    }
}

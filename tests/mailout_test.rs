// ABOUTME: Integration tests for the bulk mailout tool over the SQLite user directory
// ABOUTME: Uses recording and failing transports to check ordering, filtering and reporting
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use anyhow::Result;
use async_trait::async_trait;
use common::create_test_database;
use marketplace_admin::{
    config::MailoutConfig,
    database::AdminDatabase,
    errors::{AppError, AppResult, ErrorCode},
    mailout::{MailMessage, Mailer, Mailout, MailoutRequest},
    models::UserId,
};
use std::sync::{Arc, Mutex};

/// Transport that records every message and rejects chosen handles
#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<MailMessage>>,
    reject: Vec<&'static str>,
}

impl RecordingMailer {
    fn rejecting(reject: Vec<&'static str>) -> Self {
        Self {
            reject,
            ..Self::default()
        }
    }

    fn handles(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|message| message.handle.clone())
            .collect()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &MailMessage) -> AppResult<()> {
        if self.reject.contains(&message.handle.as_str()) {
            return Err(AppError::internal("mailbox unavailable"));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

async fn seed_users(db: &AdminDatabase) -> Result<Vec<UserId>> {
    let mut ids = Vec::new();
    for (username, joined) in [("zoe", 300), ("adam", 100), ("mia", 200)] {
        ids.push(
            db.insert_user(username, &format!("{username}@example.com"), joined)
                .await?,
        );
    }
    Ok(ids)
}

fn request(recipients: Vec<UserId>) -> MailoutRequest {
    MailoutRequest {
        recipients,
        subject: "  Spring sale  ".to_owned(),
        body: "Everything is half price this week.".to_owned(),
    }
}

#[tokio::test]
async fn test_candidates_ordered_by_username() -> Result<()> {
    let db = create_test_database().await?;
    seed_users(&db).await?;
    let mailout = Mailout::new(
        db,
        Arc::new(RecordingMailer::default()),
        MailoutConfig::default(),
    );

    let names: Vec<String> = mailout
        .candidates()
        .await?
        .into_iter()
        .map(|user| user.username)
        .collect();

    assert_eq!(names, vec!["adam", "mia", "zoe"]);
    Ok(())
}

#[tokio::test]
async fn test_sends_to_selected_users_in_username_order() -> Result<()> {
    let db = create_test_database().await?;
    let ids = seed_users(&db).await?;
    let mailer = Arc::new(RecordingMailer::default());
    let mailout = Mailout::new(db, mailer.clone(), MailoutConfig::default());

    // zoe and mia selected, plus an id nobody has
    let report = mailout.send(&request(vec![ids[0], ids[2], 9_999])).await?;

    assert_eq!(report.sent, 2);
    assert!(report.failed.is_empty());
    assert_eq!(report.status(), "Mailout sent to 2 recipients.");
    assert_eq!(mailer.handles(), vec!["mia", "zoe"]);

    let first = mailer.sent.lock().unwrap()[0].clone();
    assert_eq!(first.subject, "Spring sale");
    assert_eq!(first.email, "mia@example.com");
    assert_eq!(first.joined.timestamp(), 200);
    Ok(())
}

#[tokio::test]
async fn test_transport_failure_does_not_stop_mailout() -> Result<()> {
    let db = create_test_database().await?;
    let ids = seed_users(&db).await?;
    let mailer = Arc::new(RecordingMailer::rejecting(vec!["mia"]));
    let mailout = Mailout::new(db, mailer.clone(), MailoutConfig::default());

    let report = mailout.send(&request(ids.clone())).await?;

    assert_eq!(report.sent, 2);
    assert_eq!(report.failed, vec![ids[2]]);
    assert_eq!(mailer.handles(), vec!["adam", "zoe"]);
    Ok(())
}

#[tokio::test]
async fn test_invalid_request_sends_nothing() -> Result<()> {
    let db = create_test_database().await?;
    let ids = seed_users(&db).await?;
    let mailer = Arc::new(RecordingMailer::default());
    let mailout = Mailout::new(db, mailer.clone(), MailoutConfig::default());

    let empty = mailout.send(&request(Vec::new())).await.unwrap_err();
    assert_eq!(empty.code, ErrorCode::MissingRequiredField);
    assert_eq!(empty.field(), Some("users"));

    let mut short = request(ids);
    short.body = "Hi".to_owned();
    let err = mailout.send(&short).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
    assert_eq!(err.field(), Some("body"));

    assert!(mailer.handles().is_empty());
    Ok(())
}

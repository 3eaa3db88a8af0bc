// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use std::sync::Arc;
use swapq_core::{EngineConfig, ManualClock};
use tempfile::TempDir;

fn context(temp: &TempDir) -> Context {
    Context::open(temp.path(), EngineConfig::default())
        .unwrap()
        .with_clock(Arc::new(ManualClock::new(1_767_225_600_000)))
}

#[tokio::test]
async fn empty_queue_text() {
    let temp = TempDir::new().unwrap();
    let ctx = context(&temp);

    assert_eq!(list(&ctx, OutputFormat::Text).await.unwrap(), "queue is empty");
    assert_eq!(list(&ctx, OutputFormat::Json).await.unwrap(), "[]");
}

#[tokio::test]
async fn added_action_is_listed() {
    let temp = TempDir::new().unwrap();
    let ctx = context(&temp);

    let id = add(&ctx, r#"{"action_type":"create-listing","payload":{"title":"Chair"}}"#, Some(2))
        .await
        .unwrap();

    let text = list(&ctx, OutputFormat::Text).await.unwrap();
    assert!(text.starts_with(&id), "{text}");
    assert!(text.contains("create-listing"));
    assert!(text.contains("retries 0/2"));
    assert!(text.contains("2026-01-01 00:00:00 UTC"));
    assert!(!text.contains("[failed]"));

    let json: serde_json::Value = serde_json::from_str(&list(&ctx, OutputFormat::Json).await.unwrap()).unwrap();
    assert_eq!(json[0]["id"], id.as_str());
    assert_eq!(json[0]["payload"]["title"], "Chair");
}

#[tokio::test]
async fn add_rejects_unknown_action_type() {
    let temp = TempDir::new().unwrap();
    let ctx = context(&temp);

    let err = add(&ctx, r#"{"action_type":"rate-user","payload":{}}"#, None).await.unwrap_err();

    assert!(matches!(err, Error::InvalidAction(_)));
    assert_eq!(list(&ctx, OutputFormat::Text).await.unwrap(), "queue is empty");
}

#[tokio::test]
async fn zero_retry_action_is_marked_failed() {
    let temp = TempDir::new().unwrap();
    let ctx = context(&temp);
    add(&ctx, r#"{"action_type":"send-message","payload":{"conversation_id":"c1","body":"hi"}}"#, Some(0))
        .await
        .unwrap();

    assert!(list(&ctx, OutputFormat::Text).await.unwrap().ends_with("[failed]"));
    assert_eq!(clear_failed(&ctx).await.unwrap(), "removed 1 failed action");
    assert_eq!(retry_failed(&ctx).await.unwrap(), "reset retries on 0 actions");
}

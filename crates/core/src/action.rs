// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Deferred write operations.
//!
//! Every write the client could not (or chose not to) send immediately is an
//! [`Action`]. The set of variants is closed: dispatch in
//! [`crate::handler::dispatch`] matches it exhaustively, so adding a variant
//! without a handler method does not compile.
//!
//! On disk an action is stored flat inside its [`QueuedAction`] envelope:
//!
//! ```json
//! {"id":"1767225600000-9f3a1c2e","action_type":"create-listing",
//!  "payload":{"title":"Chair"},"enqueued_at":1767225600000,
//!  "retry_count":0,"max_retries":3}
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// A listing composed while offline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingDraft {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub image_urls: Vec<String>,
}

impl ListingDraft {
    pub fn new(title: impl Into<String>) -> Self {
        ListingDraft { title: title.into(), description: None, category: None, image_urls: Vec::new() }
    }
}

/// A chat message composed while offline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDraft {
    pub conversation_id: String,
    pub body: String,
}

/// A swap proposal composed while offline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRequestDraft {
    /// Listing the user wants.
    pub listing_id: String,
    /// Listing the user offers in exchange, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offered_listing_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A deferred write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action_type", content = "payload", rename_all = "kebab-case")]
pub enum Action {
    CreateListing(ListingDraft),
    SendMessage(MessageDraft),
    CreateSwapRequest(SwapRequestDraft),
}

impl Action {
    pub fn create_listing(title: impl Into<String>) -> Self {
        Action::CreateListing(ListingDraft::new(title))
    }

    pub fn send_message(conversation_id: impl Into<String>, body: impl Into<String>) -> Self {
        Action::SendMessage(MessageDraft { conversation_id: conversation_id.into(), body: body.into() })
    }

    pub fn create_swap_request(listing_id: impl Into<String>, offered_listing_id: Option<String>) -> Self {
        Action::CreateSwapRequest(SwapRequestDraft {
            listing_id: listing_id.into(),
            offered_listing_id,
            message: None,
        })
    }

    /// The wire tag of this variant.
    pub fn action_type(&self) -> &'static str {
        match self {
            Action::CreateListing(_) => "create-listing",
            Action::SendMessage(_) => "send-message",
            Action::CreateSwapRequest(_) => "create-swap-request",
        }
    }
}

/// A persisted action this build cannot interpret.
///
/// Either the tag is unknown (written by another app version) or the payload
/// does not match the variant. Kept verbatim so it round-trips; draining it
/// always fails and consumes a retry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnrecognizedAction {
    pub action_type: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// What a queue item carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueuedPayload {
    Known(Action),
    Unrecognized(UnrecognizedAction),
}

impl QueuedPayload {
    pub fn action_type(&self) -> &str {
        match self {
            QueuedPayload::Known(action) => action.action_type(),
            QueuedPayload::Unrecognized(raw) => &raw.action_type,
        }
    }
}

impl From<Action> for QueuedPayload {
    fn from(action: Action) -> Self {
        QueuedPayload::Known(action)
    }
}

/// Unique identifier of a queued action.
///
/// Format: `{enqueue_ms}-{8 hex random}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(String);

impl ActionId {
    /// Generates an id for an action enqueued at `now_ms`, re-rolling the random
    /// part while `exists` reports a collision.
    pub fn generate<F>(now_ms: u64, exists: F) -> Self
    where
        F: Fn(&str) -> bool,
    {
        loop {
            let id = format!("{}-{:08x}", now_ms, rand::random::<u32>());
            if !exists(&id) {
                return ActionId(id);
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActionId {
    fn from(s: &str) -> Self {
        ActionId(s.to_string())
    }
}

/// One entry in the action queue.
///
/// Invariant: `retry_count <= max_retries`. An item whose attempt fails while
/// `retry_count == max_retries` is dropped instead of incremented.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedAction {
    pub id: ActionId,
    #[serde(flatten)]
    pub action: QueuedPayload,
    /// Milliseconds since Unix epoch.
    pub enqueued_at: u64,
    pub retry_count: u32,
    pub max_retries: u32,
}

impl QueuedAction {
    pub fn new(id: ActionId, action: Action, enqueued_at: u64, max_retries: u32) -> Self {
        QueuedAction { id, action: action.into(), enqueued_at, retry_count: 0, max_retries }
    }

    /// True once every retry has been spent; the next failure drops the item.
    pub fn is_exhausted(&self) -> bool {
        self.retry_count >= self.max_retries
    }
}

#[cfg(test)]
#[path = "action_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The seam between the queue and the backend client.
//!
//! [`ActionHandler`] has one method per [`Action`] variant. The queue never
//! looks at payloads itself; it hands each item to [`dispatch`], which matches
//! the variant exhaustively.

use std::future::Future;
use std::pin::Pin;

use crate::action::{Action, ListingDraft, MessageDraft, QueuedPayload, SwapRequestDraft};

/// Why a handler invocation failed. Every variant counts as one failed attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandlerError {
    /// The backend call failed (network, HTTP status, validation).
    #[error("remote call failed: {0}")]
    Remote(String),

    /// This client has no backend for the variant yet.
    #[error("action type '{0}' is not supported by this client")]
    Unsupported(&'static str),

    /// The persisted item could not be interpreted as a known action.
    #[error("unrecognized action type '{0}'")]
    UnrecognizedActionType(String),
}

impl HandlerError {
    pub fn remote(err: impl std::fmt::Display) -> Self {
        HandlerError::Remote(err.to_string())
    }
}

/// Result type for handler calls.
pub type HandlerResult = Result<(), HandlerError>;

/// Boxed future returned by handler methods.
pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = HandlerResult> + Send + 'a>>;

/// Backend calls for each action variant.
pub trait ActionHandler: Send + Sync {
    /// Publishes a listing.
    fn create_listing<'a>(&'a self, draft: &'a ListingDraft) -> HandlerFuture<'a>;

    /// Delivers a chat message.
    ///
    /// There is no chat backend yet. Until a product decision lands, the
    /// default reports [`HandlerError::Unsupported`] so a queued message is
    /// surfaced through a `Dropped` event instead of disappearing unnoticed.
    fn send_message<'a>(&'a self, _draft: &'a MessageDraft) -> HandlerFuture<'a> {
        Box::pin(async { Err(HandlerError::Unsupported("send-message")) })
    }

    /// Proposes a swap.
    fn create_swap_request<'a>(&'a self, draft: &'a SwapRequestDraft) -> HandlerFuture<'a>;
}

/// Runs the handler method matching `payload`.
pub async fn dispatch<H: ActionHandler + ?Sized>(handler: &H, payload: &QueuedPayload) -> HandlerResult {
    match payload {
        QueuedPayload::Known(Action::CreateListing(draft)) => handler.create_listing(draft).await,
        QueuedPayload::Known(Action::SendMessage(draft)) => handler.send_message(draft).await,
        QueuedPayload::Known(Action::CreateSwapRequest(draft)) => {
            handler.create_swap_request(draft).await
        }
        QueuedPayload::Unrecognized(raw) => {
            Err(HandlerError::UnrecognizedActionType(raw.action_type.clone()))
        }
    }
}

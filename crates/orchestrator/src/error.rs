// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the control plane, unified at the wire boundary into
//! `orc_core::ApiError`'s stable code taxonomy (§7 of the design).

use orc_core::{ApiError, ErrorCode};
use orc_store::StoreError;
use thiserror::Error;

/// Errors raised while handling a single session frame.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("stale incarnation: expected {expected}, got {got}")]
    StaleIncarnation { expected: u64, got: u64 },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<&SessionError> for ApiError {
    fn from(err: &SessionError) -> Self {
        match err {
            SessionError::Unauthorized => ApiError::new(ErrorCode::Unauthorized, err.to_string()),
            SessionError::Validation(_) => {
                ApiError::new(ErrorCode::ValidationError, err.to_string())
            }
            SessionError::NotFound(_) => ApiError::new(ErrorCode::NotFound, err.to_string()),
            SessionError::Conflict(_) => ApiError::new(ErrorCode::Conflict, err.to_string()),
            SessionError::StaleIncarnation { expected, got } => {
                ApiError::stale_incarnation(*expected, *got)
            }
            SessionError::Store(StoreError::NotFound(msg)) => {
                ApiError::new(ErrorCode::NotFound, msg.clone())
            }
            SessionError::Store(StoreError::Conflict(msg)) => {
                ApiError::new(ErrorCode::Conflict, msg.clone())
            }
            SessionError::Store(_) => ApiError::new(ErrorCode::InternalError, "store error"),
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        ApiError::from(&err)
    }
}

/// Errors raised by the reconciler loop. Never fatal — every variant is
/// logged and skipped, matching §7's "nothing kills the orchestrator at
/// runtime" policy.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    PodStore(#[from] SessionError),

    #[error("no eligible node with spare capacity for service {0}")]
    NoEligibleNode(String),
}

/// Fatal startup errors — the only class of error permitted to abort the
/// process (§7).
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("store unreachable: {0}")]
    StoreUnreachable(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stable error-code taxonomy shared by the wire protocol, the store client,
//! and the admin HTTP surface.
//!
//! Every fallible operation in the core eventually bottoms out in one of
//! these codes so that callers (nodes, admin clients) get a stable string to
//! match on instead of a free-form message.

use serde::{Deserialize, Serialize};

/// A stable, wire-visible error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    Unauthorized,
    Forbidden,
    ValidationError,
    NotFound,
    Conflict,
    StaleIncarnation,
    InternalError,
    SendFailed,
    Timeout,
}

crate::simple_display! {
    ErrorCode {
        Unauthorized => "UNAUTHORIZED",
        Forbidden => "FORBIDDEN",
        ValidationError => "VALIDATION_ERROR",
        NotFound => "NOT_FOUND",
        Conflict => "CONFLICT",
        StaleIncarnation => "STALE_INCARNATION",
        InternalError => "INTERNAL_ERROR",
        SendFailed => "SEND_FAILED",
        Timeout => "TIMEOUT",
    }
}

/// A wire-visible error: a stable code, a human message, and optional
/// field-wise validation details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "std::collections::HashMap::is_empty")]
    pub details: std::collections::HashMap<String, String>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self { code, message: message.into(), details: Default::default() }
    }

    pub fn validation(message: impl Into<String>, field: &str, reason: &str) -> Self {
        let mut details = std::collections::HashMap::new();
        details.insert(field.to_string(), reason.to_string());
        Self { code: ErrorCode::ValidationError, message: message.into(), details }
    }

    pub fn stale_incarnation(expected: u64, got: u64) -> Self {
        Self::new(
            ErrorCode::StaleIncarnation,
            format!("stale incarnation: expected {expected}, got {got}"),
        )
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, what)
    }

    pub fn conflict(what: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, what)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

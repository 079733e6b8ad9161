// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Custom error type that carries a process exit code.
//!
//! Commands return `ExitError` instead of calling `std::process::exit()`
//! directly, allowing `main()` to handle process termination.

use std::fmt;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    /// Maps an admin-API error envelope to an exit code following the
    /// taxonomy's bubble-up policy (§7): auth/validation/not-found/conflict
    /// errors are the caller's fault (64, matching `sysexits.h`'s
    /// `EX_USAGE`), anything else is `EX_SOFTWARE` (70).
    pub fn from_api_error(error: &orc_core::ApiError) -> Self {
        use orc_core::ErrorCode::*;
        let code = match error.code {
            Unauthorized | Forbidden | ValidationError | NotFound | Conflict | StaleIncarnation => 64,
            SendFailed | Timeout | InternalError => 70,
        };
        Self::new(code, format!("{}: {}", error.code, error.message))
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}

impl From<reqwest::Error> for ExitError {
    fn from(e: reqwest::Error) -> Self {
        Self::new(69, format!("could not reach orchestrator: {e}"))
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::client::AdminClient;
use crate::error::ExitError;

/// `orc reconcile trigger`: debounced nudge to run the reconciler loop now
/// instead of waiting for the next tick (§4.5).
pub async fn trigger(client: &AdminClient) -> Result<(), ExitError> {
    client.trigger_reconcile().await?;
    println!("reconcile triggered");
    Ok(())
}

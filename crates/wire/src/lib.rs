// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire protocol for orchestrator communication.
//!
//! Two surfaces:
//! - the node session protocol (`node_protocol`), framed with
//!   [`frame`]'s length-delimited codec over whichever transport carries it
//!   (WebSocket, Unix socket, in-memory channel in tests);
//! - the admin HTTP API DTOs (`admin`), carried as plain JSON bodies.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod admin;
pub mod frame;
pub mod node_protocol;

pub use admin::{
    AddPackVersionRequest, AdminResult, CreatePackRequest, CreateServiceRequest, NodeDetail,
    NodeSummary, PackDetail, PackSummary, PodDetail, PodSummary, ServiceDetail, ServiceSummary,
    UpdateNodeRequest, UpdateServiceRequest,
};
pub use frame::{decode, encode, read_frame, read_message, write_frame, write_message, ProtocolError};
pub use node_protocol::{NodeMessage, OrchestratorMessage, PodRuntimeStatus};

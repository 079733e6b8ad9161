// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! orc-core: shared domain types for the orchestrator — nodes, services,
//! pods, packs, and the taxonomy of errors and resource/scheduling
//! primitives the rest of the workspace builds on.

pub mod macros;

pub mod clock;
pub mod error;
pub mod history;
pub mod id;
pub mod namespace;
pub mod node;
pub mod owner;
pub mod pack;
pub mod pod;
pub mod resource;
pub mod service;
pub mod taint;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, FakeClock, SystemClock};
pub use error::{ApiError, ErrorCode};
pub use history::{PodHistoryAction, PodHistoryEntry};
pub use id::short;
pub use namespace::Namespace;
#[cfg(any(test, feature = "test-support"))]
pub use node::NodeBuilder;
pub use node::{Node, NodeCapabilities, NodeId, NodeStatus, RuntimeKind};
pub use owner::OwnerId;
#[cfg(any(test, feature = "test-support"))]
pub use pack::PackBuilder;
pub use pack::{Pack, PackId, PackMetadata, Visibility};
#[cfg(any(test, feature = "test-support"))]
pub use pod::PodBuilder;
pub use pod::{Incarnation, Pod, PodId, PodStatus, TerminationReason};
pub use resource::ResourceQuantities;
#[cfg(any(test, feature = "test-support"))]
pub use service::ServiceBuilder;
pub use service::{NodeSelector, Service, ServiceId, ServiceKind, ServiceStatus};
pub use taint::{tolerates_all_blocking, Taint, TaintEffect, Toleration};

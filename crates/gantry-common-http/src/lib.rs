// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shared HTTP transport for the Gantry SDK.
//!
//! This crate provides:
//! - A pre-configured HTTP client with consistent User-Agent header
//! - Host selection via health checks and latency probing
//! - A retrying request executor with rate-limit (429) handling
//! - The transport error taxonomy shared by every feature manager

mod client;
mod error;
mod event;
mod executor;
mod hosts;
mod response;

pub use client::{builder, new_client_with_timeout, user_agent};
pub use error::{ClientErrorKind, HttpError, Result};
pub use event::{EventBus, TransportEvent};
pub use executor::{Connection, ConnectionConfig};
pub use hosts::{select_host, HealthProbe, HttpHealthProbe, ProbeError, SelectedHost};
pub use response::{parse_error_message, parse_success_payload, strip_empty, ApiResponse};

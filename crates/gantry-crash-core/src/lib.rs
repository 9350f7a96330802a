// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types and algorithms for the Gantry crash reporting subsystem.
//!
//! This crate is pure data and logic with no I/O:
//! - Breadcrumbs and the fixed-capacity ring buffer that retains them
//! - Stack-trace fingerprinting for grouping duplicate crashes
//! - The token-bucket rate limiter gating report submission
//! - Device info snapshots and the report/session wire DTOs
//!
//! The network-facing pipeline composing these lives in `gantry-crash`.

pub mod breadcrumb;
pub mod device;
pub mod error;
pub mod fingerprint;
pub mod keys;
pub mod limiter;
pub mod report;

pub use breadcrumb::{Breadcrumb, BreadcrumbBuffer, BreadcrumbKind, DEFAULT_BREADCRUMB_CAPACITY};
pub use device::DeviceInfo;
pub use error::{CrashError, Result};
pub use fingerprint::fingerprint;
pub use keys::{CustomKeys, CUSTOM_KEY_CAPACITY};
pub use limiter::ReportRateLimiter;
pub use report::{CrashReport, ReportType, SessionRegistration};

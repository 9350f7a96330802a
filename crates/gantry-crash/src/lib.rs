// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Crash reporting SDK pipeline for Gantry applications.
//!
//! Composes the pure crash-core pieces (breadcrumb ring buffer, fingerprint
//! hasher, report rate limiter) with the shared HTTP transport into a
//! rate-limited, deduplicating report submission pipeline.
//!
//! # Example
//!
//! ```ignore
//! use gantry_common_http::{Connection, ConnectionConfig};
//! use gantry_crash::CrashReporter;
//! use gantry_crash_core::{BreadcrumbKind, ReportType};
//!
//! let config = ConnectionConfig::new(api_key, hosts)?;
//! let connection = Connection::new(config)?;
//! connection.connect().await?;
//!
//! let reporter = CrashReporter::builder()
//!     .connection(connection)
//!     .build()?;
//!
//! reporter.record_breadcrumb(BreadcrumbKind::Navigation, "main_menu").await;
//! reporter.report_non_fatal("save failed", stack_trace).await?;
//! ```

mod client;
mod error;
mod event;

pub use client::{CrashReporter, CrashReporterBuilder};
pub use error::{CrashSdkError, Result};
pub use event::{CrashEvent, DropReason};

// Re-export the core types callers interact with.
pub use gantry_crash_core::{
	Breadcrumb, BreadcrumbKind, CrashReport, DeviceInfo, ReportType, SessionRegistration,
};

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the crash SDK.

use thiserror::Error;

/// Result type alias for crash SDK operations.
pub type Result<T> = std::result::Result<T, CrashSdkError>;

/// Errors that can occur in the crash SDK.
#[derive(Debug, Error)]
pub enum CrashSdkError {
	/// A backend connection is required to build the reporter.
	#[error("a backend connection is required")]
	MissingConnection,

	/// Crash-core validation or capacity error.
	#[error(transparent)]
	Crash(#[from] gantry_crash_core::CrashError),

	/// Transport-layer failure.
	#[error(transparent)]
	Http(#[from] gantry_common_http::HttpError),
}

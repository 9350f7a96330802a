// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for crash reporting.

use thiserror::Error;

/// Result type alias for crash-reporting operations.
pub type Result<T> = std::result::Result<T, CrashError>;

/// Errors that can occur in the crash reporting subsystem.
#[derive(Debug, Error)]
pub enum CrashError {
	/// A required field was empty, checked before any network attempt.
	#[error("validation error: {0}")]
	Validation(String),

	/// The custom-key map is full; existing keys may still be updated.
	#[error("custom key capacity reached, cannot add new key: {0}")]
	CustomKeyLimit(String),

	/// Unknown breadcrumb kind string.
	#[error("invalid breadcrumb kind: {0}")]
	InvalidBreadcrumbKind(String),

	/// Failed to serialize a report payload.
	#[error("serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Observable crash-pipeline notifications.

use std::fmt;

/// Why a crash report was dropped.
///
/// Dropped reports are permanently lost; the pipeline keeps no offline queue
/// and never retries across submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
	/// Rejected by the token-bucket limiter or the session ceiling.
	RateLimited,
	/// The network call failed after the transport's own retry policy.
	Network,
}

impl fmt::Display for DropReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::RateLimited => write!(f, "rate limited"),
			Self::Network => write!(f, "network failure"),
		}
	}
}

/// Observable crash-pipeline state transitions.
#[derive(Debug, Clone)]
pub enum CrashEvent {
	/// A report passed the limiter and was accepted by the backend.
	ReportSubmitted {
		/// Fingerprint of the submitted report.
		fingerprint: String,
	},
	/// A report was dropped without submission or after a failed one.
	ReportDropped {
		/// Why the report was dropped.
		reason: DropReason,
	},
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Token-bucket rate limiting for crash report submission.

use std::time::{Duration, Instant};

/// Tokens available per refill window.
const BUCKET_CAPACITY: u32 = 5;
/// Length of one refill window. Partial windows grant nothing.
const REFILL_INTERVAL: Duration = Duration::from_secs(60);
/// Tokens granted per fully elapsed window.
const TOKENS_PER_INTERVAL: u32 = 5;
/// Hard ceiling on accepted reports per process lifetime. Never resets.
const SESSION_REPORT_LIMIT: u32 = 20;

/// Gates crash-report submission to protect the backend from floods.
///
/// Refills are discrete: tokens are only granted for whole elapsed minutes,
/// capped at the bucket capacity. Independent of the bucket, a session-wide
/// counter caps total accepted reports for the life of the process.
///
/// Not internally synchronized; the pipeline serializes access so that
/// check-then-consume is atomic with respect to concurrent submissions.
#[derive(Debug)]
pub struct ReportRateLimiter {
	tokens: u32,
	session_reports: u32,
	last_refill: Instant,
}

impl ReportRateLimiter {
	/// Creates a full bucket with the refill marker at now.
	pub fn new() -> Self {
		Self::starting_at(Instant::now())
	}

	/// Creates a full bucket with an explicit refill marker, for tests.
	pub fn starting_at(now: Instant) -> Self {
		Self {
			tokens: BUCKET_CAPACITY,
			session_reports: 0,
			last_refill: now,
		}
	}

	/// Attempts to pass one report through the limiter.
	///
	/// Rejection consumes nothing. Acceptance consumes exactly one token and
	/// counts against the session ceiling.
	pub fn try_acquire(&mut self) -> bool {
		self.try_acquire_at(Instant::now())
	}

	/// [`try_acquire`](Self::try_acquire) with an injected clock reading.
	pub fn try_acquire_at(&mut self, now: Instant) -> bool {
		self.refill(now);

		if self.tokens == 0 || self.session_reports >= SESSION_REPORT_LIMIT {
			return false;
		}

		self.tokens -= 1;
		self.session_reports += 1;
		true
	}

	fn refill(&mut self, now: Instant) {
		let elapsed = now.saturating_duration_since(self.last_refill);
		if elapsed < REFILL_INTERVAL {
			return;
		}
		let intervals = (elapsed.as_secs() / REFILL_INTERVAL.as_secs()) as u32;
		self.tokens = self
			.tokens
			.saturating_add(intervals.saturating_mul(TOKENS_PER_INTERVAL))
			.min(BUCKET_CAPACITY);
		self.last_refill = now;
	}

	/// Tokens currently available.
	pub fn tokens(&self) -> u32 {
		self.tokens
	}

	/// Reports accepted since process start.
	pub fn session_reports(&self) -> u32 {
		self.session_reports
	}
}

impl Default for ReportRateLimiter {
	fn default() -> Self {
		Self::new()
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error taxonomy for the Gantry transport layer.
//!
//! Every network-layer failure is converted to a [`HttpError`] at the request
//! executor boundary; raw transport faults never reach feature-level callers.
//! Rate limiting (429) is deliberately absent from the taxonomy: it is retried
//! indefinitely and surfaced only as a transient notification.

use std::fmt;
use thiserror::Error;

/// Result type alias for transport operations.
pub type Result<T> = std::result::Result<T, HttpError>;

/// Classification of a terminal 4xx response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientErrorKind {
	/// 400 Bad Request.
	InvalidRequest,
	/// 401 Unauthorized.
	Unauthorized,
	/// 403 Forbidden.
	Forbidden,
	/// 404 Not Found.
	NotFound,
	/// 409 Conflict ("already exists").
	AlreadyExists,
	/// Any other 4xx.
	Unknown,
}

impl ClientErrorKind {
	/// Maps an HTTP status code to its classification.
	pub fn from_status(status: u16) -> Self {
		match status {
			400 => Self::InvalidRequest,
			401 => Self::Unauthorized,
			403 => Self::Forbidden,
			404 => Self::NotFound,
			409 => Self::AlreadyExists,
			_ => Self::Unknown,
		}
	}
}

impl fmt::Display for ClientErrorKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::InvalidRequest => write!(f, "invalid request"),
			Self::Unauthorized => write!(f, "unauthorized"),
			Self::Forbidden => write!(f, "forbidden"),
			Self::NotFound => write!(f, "not found"),
			Self::AlreadyExists => write!(f, "already exists"),
			Self::Unknown => write!(f, "unknown"),
		}
	}
}

/// Errors that can occur in the transport layer.
#[derive(Debug, Error)]
pub enum HttpError {
	/// Invalid configuration (missing API key, empty host list).
	#[error("configuration error: {0}")]
	Config(String),

	/// No active host; `connect()` has not succeeded.
	#[error("not connected to a backend host")]
	NotConnected,

	/// Transport failure, or retries exhausted on transport failures.
	#[error("network error: {0}")]
	Network(String),

	/// Server returned 5xx and the retry budget is exhausted.
	#[error("server error (status {status}): {message}")]
	Server {
		/// HTTP status code.
		status: u16,
		/// Error message from server.
		message: String,
	},

	/// Terminal 4xx response (other than 429, which is always retried).
	#[error("client error (status {status}, {kind}): {message}")]
	Client {
		/// HTTP status code.
		status: u16,
		/// Status classification.
		kind: ClientErrorKind,
		/// Human-readable message parsed from the response body.
		message: String,
	},
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn status_classification_table() {
		assert_eq!(ClientErrorKind::from_status(400), ClientErrorKind::InvalidRequest);
		assert_eq!(ClientErrorKind::from_status(401), ClientErrorKind::Unauthorized);
		assert_eq!(ClientErrorKind::from_status(403), ClientErrorKind::Forbidden);
		assert_eq!(ClientErrorKind::from_status(404), ClientErrorKind::NotFound);
		assert_eq!(ClientErrorKind::from_status(409), ClientErrorKind::AlreadyExists);
		assert_eq!(ClientErrorKind::from_status(418), ClientErrorKind::Unknown);
		assert_eq!(ClientErrorKind::from_status(422), ClientErrorKind::Unknown);
	}
}

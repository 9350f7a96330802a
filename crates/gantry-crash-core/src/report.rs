// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Wire DTOs for crash reports and session registration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::breadcrumb::Breadcrumb;
use crate::device::DeviceInfo;

/// Kind of crash report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportType {
	Crash,
	NonFatal,
	Anr,
}

impl fmt::Display for ReportType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Crash => write!(f, "CRASH"),
			Self::NonFatal => write!(f, "NON_FATAL"),
			Self::Anr => write!(f, "ANR"),
		}
	}
}

/// One crash report as submitted to the backend.
///
/// Constructed fresh per submission, never mutated afterwards, and discarded
/// once the network call completes; there is no local queue for failed
/// reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrashReport {
	pub session_id: String,
	pub user_id: String,
	#[serde(rename = "type")]
	pub report_type: ReportType,
	pub message: String,
	/// SHA-256 hex digest of the normalized stack trace, 64 chars.
	pub fingerprint: String,
	pub device_info: DeviceInfo,
	/// Chronological (oldest-first) breadcrumb snapshot.
	pub breadcrumbs: Vec<Breadcrumb>,
	pub timestamp: DateTime<Utc>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub stack_trace: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub custom_keys: Option<HashMap<String, String>>,
}

/// Payload for explicit crash-session registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRegistration {
	pub session_id: String,
	pub user_id: String,
	pub device_info: DeviceInfo,
	pub sdk_version: String,
	pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample_report() -> CrashReport {
		CrashReport {
			session_id: "a".repeat(32),
			user_id: "anonymous".to_string(),
			report_type: ReportType::NonFatal,
			message: "boom".to_string(),
			fingerprint: "f".repeat(64),
			device_info: DeviceInfo::capture(),
			breadcrumbs: Vec::new(),
			timestamp: Utc::now(),
			stack_trace: None,
			custom_keys: None,
		}
	}

	#[test]
	fn report_type_uses_screaming_snake_case() {
		assert_eq!(serde_json::to_string(&ReportType::Crash).unwrap(), "\"CRASH\"");
		assert_eq!(
			serde_json::to_string(&ReportType::NonFatal).unwrap(),
			"\"NON_FATAL\""
		);
		assert_eq!(serde_json::to_string(&ReportType::Anr).unwrap(), "\"ANR\"");
	}

	#[test]
	fn empty_optionals_are_omitted_from_the_wire() {
		let json = serde_json::to_value(&sample_report()).unwrap();
		assert!(json.get("stackTrace").is_none());
		assert!(json.get("customKeys").is_none());
		assert_eq!(json["type"], "NON_FATAL");
		assert!(json.get("sessionId").is_some());
	}

	#[test]
	fn present_optionals_are_serialized() {
		let mut report = sample_report();
		report.stack_trace = Some("at main".to_string());
		report.custom_keys = Some(HashMap::from([("k".to_string(), "v".to_string())]));

		let json = serde_json::to_value(&report).unwrap();
		assert_eq!(json["stackTrace"], "at main");
		assert_eq!(json["customKeys"]["k"], "v");
	}
}

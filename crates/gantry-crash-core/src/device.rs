// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Device snapshot captured once at pipeline initialization.

use serde::{Deserialize, Serialize};

/// Device information attached to every crash report and session registration.
///
/// Captured once when the reporter is built and reused verbatim in every
/// payload afterwards. Screen dimensions are present only when the embedding
/// application runs with a display surface; headless processes omit them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
	pub os_name: String,
	pub os_version: String,
	pub model: String,
	pub locale: String,
	pub processor_name: String,
	pub processor_count: u32,
	pub engine_version: String,
	pub renderer: String,
	pub platform: String,
	pub static_memory_mb: u64,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub screen_width: Option<u32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub screen_height: Option<u32>,
}

impl DeviceInfo {
	/// Captures what a plain process can observe about its host.
	///
	/// Fields the process cannot observe on its own (OS version, processor
	/// name, renderer, screen size, memory) are left empty for the embedding
	/// application to fill in before the reporter is built.
	pub fn capture() -> Self {
		Self {
			os_name: std::env::consts::OS.to_string(),
			os_version: String::new(),
			model: std::env::consts::ARCH.to_string(),
			locale: std::env::var("LANG").unwrap_or_default(),
			processor_name: String::new(),
			processor_count: std::thread::available_parallelism()
				.map(|n| n.get() as u32)
				.unwrap_or(1),
			engine_version: String::new(),
			renderer: String::new(),
			platform: std::env::consts::OS.to_string(),
			static_memory_mb: 0,
			screen_width: None,
			screen_height: None,
		}
	}
}

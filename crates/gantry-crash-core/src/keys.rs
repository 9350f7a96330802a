// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bounded map of user-supplied key/value annotations for crash reports.

use std::collections::HashMap;

use crate::error::{CrashError, Result};

/// Maximum number of distinct custom keys.
pub const CUSTOM_KEY_CAPACITY: usize = 10;

/// Persistent custom keys attached to every crash report.
///
/// New keys are rejected once the map is full; existing keys are always
/// updatable.
#[derive(Debug, Clone, Default)]
pub struct CustomKeys {
	entries: HashMap<String, String>,
}

impl CustomKeys {
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts or updates a key, stringifying the value.
	pub fn set(&mut self, key: impl Into<String>, value: impl ToString) -> Result<()> {
		let key = key.into();
		if !self.entries.contains_key(&key) && self.entries.len() >= CUSTOM_KEY_CAPACITY {
			return Err(CrashError::CustomKeyLimit(key));
		}
		self.entries.insert(key, value.to_string());
		Ok(())
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn get(&self, key: &str) -> Option<&str> {
		self.entries.get(key).map(String::as_str)
	}

	/// Merges per-call extras over the persistent keys.
	///
	/// Extras override persistent keys of the same name for this call only;
	/// the persistent store is not mutated and the merge is not bounded by
	/// the capacity.
	pub fn merged_with(&self, extra: &HashMap<String, String>) -> HashMap<String, String> {
		let mut merged = self.entries.clone();
		for (key, value) in extra {
			merged.insert(key.clone(), value.clone());
		}
		merged
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn eleventh_new_key_is_rejected_but_updates_still_work() {
		let mut keys = CustomKeys::new();
		for i in 0..10 {
			keys.set(format!("key{i}"), i).unwrap();
		}

		let result = keys.set("key10", "overflow");
		assert!(matches!(result, Err(CrashError::CustomKeyLimit(_))));
		assert_eq!(keys.len(), 10);

		// Existing keys remain updatable at capacity.
		keys.set("key3", "updated").unwrap();
		assert_eq!(keys.get("key3"), Some("updated"));
	}

	#[test]
	fn values_are_stringified() {
		let mut keys = CustomKeys::new();
		keys.set("retries", 3).unwrap();
		keys.set("beta", true).unwrap();

		assert_eq!(keys.get("retries"), Some("3"));
		assert_eq!(keys.get("beta"), Some("true"));
	}

	#[test]
	fn merge_overrides_without_mutating_persistent_store() {
		let mut keys = CustomKeys::new();
		keys.set("level", "12").unwrap();
		keys.set("mode", "arcade").unwrap();

		let extra = HashMap::from([
			("level".to_string(), "13".to_string()),
			("checkpoint".to_string(), "boss".to_string()),
		]);
		let merged = keys.merged_with(&extra);

		assert_eq!(merged["level"], "13");
		assert_eq!(merged["mode"], "arcade");
		assert_eq!(merged["checkpoint"], "boss");
		// Per-call only: the persistent value is untouched.
		assert_eq!(keys.get("level"), Some("12"));
		assert_eq!(keys.len(), 2);
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Breadcrumb types and the fixed-capacity ring buffer retaining them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CrashError;

/// Breadcrumbs retained before the oldest is overwritten.
pub const DEFAULT_BREADCRUMB_CAPACITY: usize = 50;

/// Category of a breadcrumb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreadcrumbKind {
	Navigation,
	UserAction,
	Log,
	Error,
	State,
}

impl fmt::Display for BreadcrumbKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Navigation => write!(f, "navigation"),
			Self::UserAction => write!(f, "user_action"),
			Self::Log => write!(f, "log"),
			Self::Error => write!(f, "error"),
			Self::State => write!(f, "state"),
		}
	}
}

impl FromStr for BreadcrumbKind {
	type Err = CrashError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"navigation" => Ok(Self::Navigation),
			"user_action" => Ok(Self::UserAction),
			"log" => Ok(Self::Log),
			"error" => Ok(Self::Error),
			"state" => Ok(Self::State),
			_ => Err(CrashError::InvalidBreadcrumbKind(s.to_string())),
		}
	}
}

/// A timestamped contextual event recorded ahead of a crash.
///
/// Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Breadcrumb {
	pub kind: BreadcrumbKind,
	pub message: String,
	pub timestamp: DateTime<Utc>,
}

/// Fixed-capacity ring of the most recent breadcrumbs.
///
/// The cursor wraps modulo the capacity; once more breadcrumbs have been
/// recorded than fit, new writes overwrite the oldest entry. The total
/// counter keeps growing unbounded.
#[derive(Debug)]
pub struct BreadcrumbBuffer {
	slots: Vec<Option<Breadcrumb>>,
	cursor: usize,
	total: u64,
}

impl BreadcrumbBuffer {
	/// Creates a buffer with [`DEFAULT_BREADCRUMB_CAPACITY`] slots.
	pub fn new() -> Self {
		Self::with_capacity(DEFAULT_BREADCRUMB_CAPACITY)
	}

	/// Creates a buffer with a custom capacity.
	pub fn with_capacity(capacity: usize) -> Self {
		assert!(capacity > 0, "breadcrumb buffer capacity must be non-zero");
		Self {
			slots: vec![None; capacity],
			cursor: 0,
			total: 0,
		}
	}

	/// Records a breadcrumb stamped with the current UTC time.
	pub fn record(&mut self, kind: BreadcrumbKind, message: impl Into<String>) {
		self.push(Breadcrumb {
			kind,
			message: message.into(),
			timestamp: Utc::now(),
		});
	}

	/// Writes a pre-built breadcrumb at the cursor.
	pub fn push(&mut self, breadcrumb: Breadcrumb) {
		self.slots[self.cursor] = Some(breadcrumb);
		self.cursor = (self.cursor + 1) % self.slots.len();
		self.total += 1;
	}

	/// Total breadcrumbs ever recorded, including overwritten ones.
	pub fn total_recorded(&self) -> u64 {
		self.total
	}

	/// Live entries currently held.
	pub fn len(&self) -> usize {
		self.total.min(self.slots.len() as u64) as usize
	}

	pub fn is_empty(&self) -> bool {
		self.total == 0
	}

	/// Chronological (oldest-first) copies of the surviving breadcrumbs.
	///
	/// Returned entries are independent clones; mutating them does not affect
	/// the buffer.
	pub fn snapshot(&self) -> Vec<Breadcrumb> {
		let capacity = self.slots.len();
		// Before the first wrap the oldest entry is slot 0; afterwards it is
		// the slot the cursor is about to overwrite.
		let start = if self.total >= capacity as u64 {
			self.cursor
		} else {
			0
		};
		(0..self.len())
			.filter_map(|i| self.slots[(start + i) % capacity].clone())
			.collect()
	}
}

impl Default for BreadcrumbBuffer {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn empty_buffer_snapshots_nothing() {
		let buffer = BreadcrumbBuffer::new();
		assert!(buffer.is_empty());
		assert!(buffer.snapshot().is_empty());
	}

	#[test]
	fn partial_fill_reads_in_insertion_order() {
		let mut buffer = BreadcrumbBuffer::new();
		for i in 0..3 {
			buffer.record(BreadcrumbKind::Log, format!("entry {i}"));
		}

		let snapshot = buffer.snapshot();
		assert_eq!(snapshot.len(), 3);
		assert_eq!(snapshot[0].message, "entry 0");
		assert_eq!(snapshot[2].message, "entry 2");
		assert_eq!(buffer.total_recorded(), 3);
	}

	/// Writing 53 breadcrumbs into a 50-slot buffer yields exactly the last
	/// 50 in chronological order (entries 3..53, oldest first).
	#[test]
	fn wrapped_buffer_keeps_newest_fifty_in_order() {
		let mut buffer = BreadcrumbBuffer::new();
		for i in 0..53 {
			buffer.record(BreadcrumbKind::UserAction, format!("entry {i}"));
		}

		let snapshot = buffer.snapshot();
		assert_eq!(snapshot.len(), 50);
		assert_eq!(snapshot[0].message, "entry 3");
		assert_eq!(snapshot[49].message, "entry 52");
		assert_eq!(buffer.total_recorded(), 53);
	}

	#[test]
	fn exactly_full_buffer_reads_from_slot_zero() {
		let mut buffer = BreadcrumbBuffer::with_capacity(4);
		for i in 0..4 {
			buffer.record(BreadcrumbKind::State, format!("entry {i}"));
		}

		let snapshot = buffer.snapshot();
		assert_eq!(snapshot.len(), 4);
		assert_eq!(snapshot[0].message, "entry 0");
		assert_eq!(snapshot[3].message, "entry 3");
	}

	#[test]
	fn snapshot_entries_are_independent_copies() {
		let mut buffer = BreadcrumbBuffer::new();
		buffer.record(BreadcrumbKind::Navigation, "original");

		let mut snapshot = buffer.snapshot();
		snapshot[0].message = "mutated".to_string();

		assert_eq!(buffer.snapshot()[0].message, "original");
	}

	#[test]
	fn kind_serializes_snake_case() {
		let json = serde_json::to_string(&BreadcrumbKind::UserAction).unwrap();
		assert_eq!(json, "\"user_action\"");
	}

	proptest! {
		#[test]
		fn kind_roundtrip(kind in prop_oneof![
			Just(BreadcrumbKind::Navigation),
			Just(BreadcrumbKind::UserAction),
			Just(BreadcrumbKind::Log),
			Just(BreadcrumbKind::Error),
			Just(BreadcrumbKind::State),
		]) {
			let s = kind.to_string();
			let parsed: BreadcrumbKind = s.parse().unwrap();
			prop_assert_eq!(kind, parsed);
		}

		/// Snapshots always hold min(total, capacity) entries, oldest first.
		#[test]
		fn snapshot_length_and_order(total in 0usize..200, capacity in 1usize..60) {
			let mut buffer = BreadcrumbBuffer::with_capacity(capacity);
			for i in 0..total {
				buffer.record(BreadcrumbKind::Log, format!("{i}"));
			}

			let snapshot = buffer.snapshot();
			prop_assert_eq!(snapshot.len(), total.min(capacity));
			for (offset, crumb) in snapshot.iter().enumerate() {
				let expected = total.saturating_sub(total.min(capacity)) + offset;
				prop_assert_eq!(&crumb.message, &format!("{expected}"));
			}
		}
	}
}

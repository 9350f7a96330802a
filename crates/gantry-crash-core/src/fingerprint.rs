// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Fingerprinting algorithm for grouping duplicate crashes.
//!
//! Two stack traces that differ only in incidental detail (memory addresses,
//! line numbers, resource paths) must hash to the same fingerprint, so frames
//! are normalized before hashing.

use regex::Regex;
use sha2::{Digest, Sha256};
use std::sync::LazyLock;

/// Hashed in place of an absent stack trace so empty input still fingerprints.
const NO_STACK_TRACE: &str = "no_stack_trace";
/// Frames considered when grouping; deeper frames rarely change crash identity.
const MAX_FRAMES: usize = 5;

static MEMORY_ADDRESS: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"0x[0-9a-fA-F]+").unwrap());
static COLON_LINE_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r":\d+").unwrap());
static WORD_LINE_NUMBER: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\bline \d+\b").unwrap());
static SPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" {2,}").unwrap());

/// Computes a stable fingerprint for a stack trace.
///
/// The fingerprint is a lowercase hex SHA-256 digest (64 chars) of the first
/// [`MAX_FRAMES`] normalized non-empty frames, joined by newlines. Empty
/// input hashes the literal `"no_stack_trace"`; input whose every frame
/// normalizes away hashes the raw original text instead, so empty content is
/// never silently hashed.
pub fn fingerprint(stack_trace: &str) -> String {
	if stack_trace.is_empty() {
		return sha256_hex(NO_STACK_TRACE);
	}

	let mut frames = Vec::with_capacity(MAX_FRAMES);
	for line in stack_trace.lines() {
		let normalized = normalize_frame(line);
		if normalized.is_empty() {
			continue;
		}
		frames.push(normalized);
		if frames.len() == MAX_FRAMES {
			break;
		}
	}

	if frames.is_empty() {
		return sha256_hex(stack_trace);
	}

	sha256_hex(&frames.join("\n"))
}

/// Strips the incidental parts of one stack frame.
fn normalize_frame(line: &str) -> String {
	let mut frame = line.trim().to_string();
	for prefix in ["res://", "user://"] {
		frame = frame.replace(prefix, "");
	}
	frame = MEMORY_ADDRESS.replace_all(&frame, "").into_owned();
	frame = COLON_LINE_NUMBER.replace_all(&frame, "").into_owned();
	frame = WORD_LINE_NUMBER.replace_all(&frame, "").into_owned();
	if let Some(rest) = frame.strip_prefix("at ") {
		frame = rest.to_string();
	}
	frame = SPACE_RUN.replace_all(&frame, " ").into_owned();
	frame.trim().to_string()
}

fn sha256_hex(input: &str) -> String {
	let mut hasher = Sha256::new();
	hasher.update(input.as_bytes());
	hex::encode(hasher.finalize())
}

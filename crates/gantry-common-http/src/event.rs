// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Observable transport notifications.
//!
//! Components expose a broadcast subscription rather than callbacks; each
//! named notification fires exactly once per corresponding state transition.

use std::time::Duration;
use tokio::sync::broadcast;

/// Buffered events per subscriber before the oldest is dropped.
const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Observable transport-level state transitions.
#[derive(Debug, Clone)]
pub enum TransportEvent {
	/// A backend host was selected as the active host.
	///
	/// `latency_ms` is the measured minimum probe latency; the single-host
	/// path reports 0 because no latency probing occurs there.
	HostSelected {
		/// The chosen base URL.
		host: String,
		/// Minimum measured round-trip latency in milliseconds.
		latency_ms: f64,
	},
	/// Host selection failed; no active host is set.
	ConnectionFailed {
		/// Why the connection attempt failed.
		message: String,
	},
	/// The backend returned 429; the request will retry after `wait`.
	RateLimited {
		/// Wait honored before the retry (`Retry-After` or the configured delay).
		wait: Duration,
	},
}

/// Fire-and-forget broadcast bus for SDK notifications.
///
/// Emitting never blocks; subscribers that fall behind lose the oldest
/// events, and having no subscribers at all is not an error.
#[derive(Debug, Clone)]
pub struct EventBus<E> {
	tx: broadcast::Sender<E>,
}

impl<E: Clone> EventBus<E> {
	/// Creates a bus with the default per-subscriber buffer.
	pub fn new() -> Self {
		let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
		Self { tx }
	}

	/// Registers a new subscriber. Only events emitted after this call are seen.
	pub fn subscribe(&self) -> broadcast::Receiver<E> {
		self.tx.subscribe()
	}

	/// Emits an event to all current subscribers.
	pub fn emit(&self, event: E) {
		let _ = self.tx.send(event);
	}
}

impl<E: Clone> Default for EventBus<E> {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn subscriber_receives_emitted_event() {
		let bus: EventBus<TransportEvent> = EventBus::new();
		let mut rx = bus.subscribe();

		bus.emit(TransportEvent::ConnectionFailed {
			message: "boom".to_string(),
		});

		match rx.recv().await.unwrap() {
			TransportEvent::ConnectionFailed { message } => assert_eq!(message, "boom"),
			other => panic!("unexpected event: {other:?}"),
		}
	}

	#[tokio::test]
	async fn emit_without_subscribers_does_not_panic() {
		let bus: EventBus<TransportEvent> = EventBus::new();
		bus.emit(TransportEvent::RateLimited {
			wait: Duration::from_secs(1),
		});
	}
}

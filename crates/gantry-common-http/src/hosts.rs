// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Host selection: health checks and latency probing.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::HttpError;

/// Health endpoint exposed by every Gantry backend host.
const HEALTH_PATH: &str = "/actuator/health";
/// Timed probes issued per host when choosing between multiple hosts.
const PROBES_PER_HOST: usize = 3;

/// Why a single probe against a host did not produce a latency measurement.
#[derive(Debug, Error)]
pub enum ProbeError {
	/// Transport failure (connection error, timeout).
	#[error("request failed: {0}")]
	Request(String),

	/// The host answered but did not report itself healthy.
	#[error("unhealthy response (status {0})")]
	Unhealthy(u16),
}

/// A single health probe against one backend host.
///
/// The production implementation issues a real HTTP health check; tests
/// substitute scripted probes.
#[async_trait]
pub trait HealthProbe: Send + Sync {
	/// Probes `host` and returns the round-trip time iff it is healthy.
	async fn probe(&self, host: &str, timeout: Duration)
		-> std::result::Result<Duration, ProbeError>;
}

#[derive(Debug, Deserialize)]
struct HealthBody {
	status: String,
}

/// `GET {host}/actuator/health`, healthy iff 200 with a JSON body whose
/// `status` field is `"UP"`.
pub struct HttpHealthProbe {
	client: Client,
}

impl HttpHealthProbe {
	/// Wraps an existing HTTP client.
	pub fn new(client: Client) -> Self {
		Self { client }
	}
}

#[async_trait]
impl HealthProbe for HttpHealthProbe {
	async fn probe(
		&self,
		host: &str,
		timeout: Duration,
	) -> std::result::Result<Duration, ProbeError> {
		let url = format!("{}{}", host.trim_end_matches('/'), HEALTH_PATH);
		let started = Instant::now();

		let response = self
			.client
			.get(&url)
			.timeout(timeout)
			.send()
			.await
			.map_err(|e| ProbeError::Request(e.to_string()))?;

		let status = response.status().as_u16();
		if status != 200 {
			return Err(ProbeError::Unhealthy(status));
		}

		let body: HealthBody = response
			.json()
			.await
			.map_err(|e| ProbeError::Request(e.to_string()))?;
		if body.status != "UP" {
			return Err(ProbeError::Unhealthy(status));
		}

		Ok(started.elapsed())
	}
}

/// Outcome of host selection: the chosen host and its measured latency.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedHost {
	/// The chosen base URL.
	pub host: String,
	/// Minimum measured round-trip latency in milliseconds.
	///
	/// The single-host path performs no latency probing and reports 0.
	pub latency_ms: f64,
}

/// Selects the active host from the configured list.
///
/// A single host only needs a passing health check. Multiple hosts are each
/// probed [`PROBES_PER_HOST`] times; the host with the strictly lowest minimum
/// successful latency wins, ties keeping the earlier host in configuration
/// order. Hosts with zero successful probes are excluded. Measurements from
/// prior selection attempts are never reused.
pub async fn select_host(
	probe: &dyn HealthProbe,
	hosts: &[String],
	timeout: Duration,
) -> std::result::Result<SelectedHost, HttpError> {
	if hosts.is_empty() {
		return Err(HttpError::Config("no backend hosts configured".to_string()));
	}

	if hosts.len() == 1 {
		let host = &hosts[0];
		return match probe.probe(host, timeout).await {
			Ok(_) => {
				debug!(host = %host, "single host healthy");
				Ok(SelectedHost {
					host: host.clone(),
					latency_ms: 0.0,
				})
			}
			Err(err) => Err(HttpError::Network(format!(
				"health check failed for {host}: {err}"
			))),
		};
	}

	let mut best: Option<SelectedHost> = None;
	for host in hosts {
		let mut fastest: Option<Duration> = None;
		for _ in 0..PROBES_PER_HOST {
			match probe.probe(host, timeout).await {
				Ok(rtt) => {
					fastest = Some(fastest.map_or(rtt, |current: Duration| current.min(rtt)));
				}
				Err(err) => {
					debug!(host = %host, error = %err, "probe failed");
				}
			}
		}

		let Some(rtt) = fastest else {
			warn!(host = %host, "host excluded: no successful probes");
			continue;
		};
		let latency_ms = rtt.as_secs_f64() * 1000.0;
		debug!(host = %host, latency_ms, "host probed");

		// Strictly lower latency wins; ties keep the earlier host.
		if best.as_ref().map_or(true, |b| latency_ms < b.latency_ms) {
			best = Some(SelectedHost {
				host: host.clone(),
				latency_ms,
			});
		}
	}

	best.ok_or_else(|| HttpError::Network("no reachable backend host".to_string()))
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;
	use std::sync::Mutex;

	/// Probe returning pre-scripted results per host, in order.
	struct ScriptedProbe {
		script: Mutex<HashMap<String, Vec<std::result::Result<Duration, ()>>>>,
	}

	impl ScriptedProbe {
		fn new(script: Vec<(&str, Vec<std::result::Result<Duration, ()>>)>) -> Self {
			Self {
				script: Mutex::new(
					script
						.into_iter()
						.map(|(host, results)| (host.to_string(), results))
						.collect(),
				),
			}
		}
	}

	#[async_trait]
	impl HealthProbe for ScriptedProbe {
		async fn probe(
			&self,
			host: &str,
			_timeout: Duration,
		) -> std::result::Result<Duration, ProbeError> {
			let mut script = self.script.lock().unwrap();
			let results = script.get_mut(host).expect("unscripted host");
			assert!(!results.is_empty(), "probe called more often than scripted");
			results
				.remove(0)
				.map_err(|_| ProbeError::Request("unreachable".to_string()))
		}
	}

	fn ms(n: u64) -> std::result::Result<Duration, ()> {
		Ok(Duration::from_millis(n))
	}

	#[tokio::test]
	async fn empty_host_list_is_a_config_error() {
		let probe = ScriptedProbe::new(vec![]);
		let result = select_host(&probe, &[], Duration::from_secs(1)).await;
		assert!(matches!(result, Err(HttpError::Config(_))));
	}

	#[tokio::test]
	async fn single_healthy_host_selected_without_latency() {
		let probe = ScriptedProbe::new(vec![("https://a", vec![ms(42)])]);
		let hosts = vec!["https://a".to_string()];

		let selected = select_host(&probe, &hosts, Duration::from_secs(1))
			.await
			.unwrap();
		assert_eq!(selected.host, "https://a");
		assert_eq!(selected.latency_ms, 0.0);

		// Exactly one health check, no further probing.
		assert!(probe.script.lock().unwrap()["https://a"].is_empty());
	}

	#[tokio::test]
	async fn single_unhealthy_host_fails_selection() {
		let probe = ScriptedProbe::new(vec![("https://a", vec![Err(())])]);
		let hosts = vec!["https://a".to_string()];

		let result = select_host(&probe, &hosts, Duration::from_secs(1)).await;
		assert!(matches!(result, Err(HttpError::Network(_))));
	}

	#[tokio::test]
	async fn lowest_minimum_latency_wins() {
		let probe = ScriptedProbe::new(vec![
			("https://a", vec![ms(80), ms(90), ms(85)]),
			("https://b", vec![ms(60), ms(30), ms(55)]),
			("https://c", vec![Err(()), Err(()), Err(())]),
		]);
		let hosts = vec![
			"https://a".to_string(),
			"https://b".to_string(),
			"https://c".to_string(),
		];

		let selected = select_host(&probe, &hosts, Duration::from_secs(1))
			.await
			.unwrap();
		assert_eq!(selected.host, "https://b");
		assert_eq!(selected.latency_ms, 30.0);
	}

	#[tokio::test]
	async fn tie_keeps_first_host_in_order() {
		let probe = ScriptedProbe::new(vec![
			("https://a", vec![ms(50), ms(50), ms(50)]),
			("https://b", vec![ms(50), ms(50), ms(50)]),
		]);
		let hosts = vec!["https://a".to_string(), "https://b".to_string()];

		let selected = select_host(&probe, &hosts, Duration::from_secs(1))
			.await
			.unwrap();
		assert_eq!(selected.host, "https://a");
	}

	#[tokio::test]
	async fn partial_probe_failures_still_count_successes() {
		let probe = ScriptedProbe::new(vec![
			("https://a", vec![Err(()), ms(20), Err(())]),
			("https://b", vec![ms(40), ms(45), ms(50)]),
		]);
		let hosts = vec!["https://a".to_string(), "https://b".to_string()];

		let selected = select_host(&probe, &hosts, Duration::from_secs(1))
			.await
			.unwrap();
		assert_eq!(selected.host, "https://a");
		assert_eq!(selected.latency_ms, 20.0);
	}

	#[tokio::test]
	async fn all_hosts_unreachable_fails_selection() {
		let probe = ScriptedProbe::new(vec![
			("https://a", vec![Err(()), Err(()), Err(())]),
			("https://b", vec![Err(()), Err(()), Err(())]),
		]);
		let hosts = vec!["https://a".to_string(), "https://b".to_string()];

		let result = select_host(&probe, &hosts, Duration::from_secs(1)).await;
		assert!(matches!(result, Err(HttpError::Network(_))));
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Retrying request executor over the active backend host.
//!
//! Every API call of the SDK flows through [`Connection`]: it holds the active
//! host chosen during connect, applies the retry policy, and converts every
//! outcome into either an [`ApiResponse`] or a terminal [`HttpError`]. Callers
//! never see raw transport faults.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use reqwest::{header, Client, Method};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::{ClientErrorKind, HttpError, Result};
use crate::event::{EventBus, TransportEvent};
use crate::hosts::{select_host, HealthProbe, HttpHealthProbe, SelectedHost};
use crate::response::{parse_error_message, parse_success_payload, strip_empty, ApiResponse};

/// API-key header carried by every request.
const API_KEY_HEADER: &str = "X-API-Key";

/// Default per-attempt request timeout.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// Default number of retries after the first attempt.
const DEFAULT_MAX_RETRY_ATTEMPTS: u32 = 3;
/// Default fixed delay between retries. Not exponential by contract.
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);
/// Longest `Retry-After` wait honored; larger server values are clamped so a
/// misconfigured backend cannot stall or crash the client.
const MAX_RETRY_AFTER_SECS: f64 = 3600.0;

/// Configuration for a backend connection.
///
/// Supplied once at initialization and immutable for the life of the
/// connection.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
	/// API key sent in the `X-API-Key` header of every request.
	pub api_key: String,
	/// Candidate backend base URLs, in configuration order.
	pub hosts: Vec<String>,
	/// Timeout applied to each individual attempt, not the retry sequence.
	pub request_timeout: Duration,
	/// Retries after the first attempt; total attempts = this + 1.
	pub max_retry_attempts: u32,
	/// Fixed delay between retry attempts.
	pub retry_delay: Duration,
}

impl ConnectionConfig {
	/// Validates the API key and host list; other settings take their defaults.
	pub fn new(api_key: impl Into<String>, hosts: Vec<String>) -> Result<Self> {
		let api_key = api_key.into();
		if api_key.trim().is_empty() {
			return Err(HttpError::Config("API key is not set".to_string()));
		}
		if hosts.is_empty() {
			return Err(HttpError::Config("no backend hosts configured".to_string()));
		}
		Ok(Self {
			api_key,
			hosts,
			request_timeout: DEFAULT_REQUEST_TIMEOUT,
			max_retry_attempts: DEFAULT_MAX_RETRY_ATTEMPTS,
			retry_delay: DEFAULT_RETRY_DELAY,
		})
	}

	/// Sets the per-attempt request timeout.
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = timeout;
		self
	}

	/// Sets the number of retries after the first attempt.
	pub fn max_retry_attempts(mut self, retries: u32) -> Self {
		self.max_retry_attempts = retries;
		self
	}

	/// Sets the fixed delay between retries.
	pub fn retry_delay(mut self, delay: Duration) -> Self {
		self.retry_delay = delay;
		self
	}
}

/// Raw outcome of a single HTTP attempt, before classification.
struct RawResponse {
	status: u16,
	body: String,
	retry_after: Option<f64>,
}

struct ConnectionInner {
	config: ConnectionConfig,
	http: Client,
	active_host: RwLock<Option<String>>,
	session_token: RwLock<Option<String>>,
	events: EventBus<TransportEvent>,
}

/// Connection to the Gantry backend: active host plus retrying executor.
///
/// Cheap to clone; all clones share the same active host, session token, and
/// event bus.
#[derive(Clone)]
pub struct Connection {
	inner: Arc<ConnectionInner>,
}

impl Connection {
	/// Creates a disconnected connection; call [`connect`](Self::connect) to
	/// select the active host.
	pub fn new(config: ConnectionConfig) -> Result<Self> {
		let http = crate::client::builder()
			.timeout(config.request_timeout)
			.build()
			.map_err(|e| HttpError::Config(format!("failed to build HTTP client: {e}")))?;

		Ok(Self {
			inner: Arc::new(ConnectionInner {
				config,
				http,
				active_host: RwLock::new(None),
				session_token: RwLock::new(None),
				events: EventBus::new(),
			}),
		})
	}

	/// Selects and stores the active host via live health checks.
	pub async fn connect(&self) -> Result<SelectedHost> {
		let probe = HttpHealthProbe::new(self.inner.http.clone());
		self.connect_with_probe(&probe).await
	}

	/// Host selection with an injected probe.
	///
	/// Reconnection starts from scratch: the previous active host is cleared
	/// and no prior latency measurement is reused.
	pub async fn connect_with_probe(&self, probe: &dyn HealthProbe) -> Result<SelectedHost> {
		*self.inner.active_host.write().await = None;

		match select_host(probe, &self.inner.config.hosts, self.inner.config.request_timeout).await
		{
			Ok(selected) => {
				*self.inner.active_host.write().await = Some(selected.host.clone());
				info!(host = %selected.host, latency_ms = selected.latency_ms, "host selected");
				self.inner.events.emit(TransportEvent::HostSelected {
					host: selected.host.clone(),
					latency_ms: selected.latency_ms,
				});
				Ok(selected)
			}
			Err(err) => {
				warn!(error = %err, "connection failed");
				self.inner.events.emit(TransportEvent::ConnectionFailed {
					message: err.to_string(),
				});
				Err(err)
			}
		}
	}

	/// Clears the active host.
	pub async fn disconnect(&self) {
		*self.inner.active_host.write().await = None;
		debug!("disconnected");
	}

	/// Returns the currently active host, if connected.
	pub async fn active_host(&self) -> Option<String> {
		self.inner.active_host.read().await.clone()
	}

	/// Sets or clears the session-scoped bearer token.
	pub async fn set_session_token(&self, token: Option<String>) {
		*self.inner.session_token.write().await = token;
	}

	/// Subscribes to transport notifications.
	pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<TransportEvent> {
		self.inner.events.subscribe()
	}

	/// Issues a GET request against the active host.
	pub async fn get(&self, path: &str, authenticated: bool) -> Result<ApiResponse> {
		self.request(Method::GET, path, None, authenticated).await
	}

	/// Issues a POST request with an optional JSON body against the active host.
	pub async fn post(
		&self,
		path: &str,
		body: Option<Value>,
		authenticated: bool,
	) -> Result<ApiResponse> {
		self.request(Method::POST, path, body, authenticated).await
	}

	/// Executes one logical JSON request with the full retry policy.
	///
	/// Outgoing bodies are passed through [`strip_empty`]. Transport failures
	/// and 5xx responses share the retry budget; 429 responses wait out the
	/// server's `Retry-After` and never count against it.
	pub async fn request(
		&self,
		method: Method,
		path: &str,
		body: Option<Value>,
		authenticated: bool,
	) -> Result<ApiResponse> {
		let url = self.url_for(path).await?;
		let body = body.map(strip_empty);

		debug!(method = %method, url = %url, "sending request");

		let raw = run_with_retry(&self.inner.config, &self.inner.events, || {
			self.send_json_once(method.clone(), &url, body.as_ref(), authenticated)
		})
		.await?;

		classify(raw)
	}

	/// POSTs a raw binary payload. Single attempt, no transport-retry loop;
	/// terminal/success classification matches JSON requests.
	pub async fn post_binary(
		&self,
		path: &str,
		payload: Bytes,
		authenticated: bool,
	) -> Result<ApiResponse> {
		let url = self.url_for(path).await?;

		let mut request = self
			.inner
			.http
			.post(&url)
			.header(API_KEY_HEADER, &self.inner.config.api_key)
			.header(header::CONTENT_TYPE, "application/octet-stream")
			.body(payload);
		if authenticated {
			if let Some(token) = self.inner.session_token.read().await.as_deref() {
				request = request.bearer_auth(token);
			}
		}

		let response = request
			.send()
			.await
			.map_err(|e| HttpError::Network(e.to_string()))?;
		let status = response.status().as_u16();
		let body = response
			.text()
			.await
			.map_err(|e| HttpError::Network(e.to_string()))?;

		classify(RawResponse {
			status,
			body,
			retry_after: None,
		})
	}

	/// GETs a raw binary payload.
	///
	/// 200 returns the bytes; 204 means "not found, not an error" and returns
	/// `None`; anything ≥ 400 is classified as an error.
	pub async fn get_binary(&self, path: &str, authenticated: bool) -> Result<Option<Bytes>> {
		let url = self.url_for(path).await?;

		let mut request = self
			.inner
			.http
			.get(&url)
			.header(API_KEY_HEADER, &self.inner.config.api_key);
		if authenticated {
			if let Some(token) = self.inner.session_token.read().await.as_deref() {
				request = request.bearer_auth(token);
			}
		}

		let response = request
			.send()
			.await
			.map_err(|e| HttpError::Network(e.to_string()))?;
		let status = response.status().as_u16();

		if status == 204 {
			return Ok(None);
		}
		if status >= 400 {
			let body = response.text().await.unwrap_or_default();
			let message = parse_error_message(status, &body);
			if status >= 500 {
				return Err(HttpError::Server { status, message });
			}
			return Err(HttpError::Client {
				status,
				kind: ClientErrorKind::from_status(status),
				message,
			});
		}

		let bytes = response
			.bytes()
			.await
			.map_err(|e| HttpError::Network(e.to_string()))?;
		Ok(Some(bytes))
	}

	async fn url_for(&self, path: &str) -> Result<String> {
		let host = self
			.inner
			.active_host
			.read()
			.await
			.clone()
			.ok_or(HttpError::NotConnected)?;
		Ok(format!("{}{}", host.trim_end_matches('/'), path))
	}

	async fn send_json_once(
		&self,
		method: Method,
		url: &str,
		body: Option<&Value>,
		authenticated: bool,
	) -> std::result::Result<RawResponse, String> {
		let mut request = self
			.inner
			.http
			.request(method, url)
			.header(API_KEY_HEADER, &self.inner.config.api_key);
		if authenticated {
			if let Some(token) = self.inner.session_token.read().await.as_deref() {
				request = request.bearer_auth(token);
			}
		}
		if let Some(body) = body {
			request = request.json(body);
		}

		let response = request.send().await.map_err(|e| e.to_string())?;
		let status = response.status().as_u16();
		let retry_after = response
			.headers()
			.get(header::RETRY_AFTER)
			.and_then(|v| v.to_str().ok())
			.and_then(|s| s.trim().parse::<f64>().ok())
			.filter(|secs| *secs >= 0.0);
		let body = response.text().await.map_err(|e| e.to_string())?;

		Ok(RawResponse {
			status,
			body,
			retry_after,
		})
	}
}

/// Drives the retry loop for one logical request.
///
/// Generic over the attempt closure so the policy is testable without a live
/// server. Retries are strictly sequential: no attempt starts before the
/// previous attempt's response or timeout is observed.
async fn run_with_retry<F, Fut>(
	config: &ConnectionConfig,
	events: &EventBus<TransportEvent>,
	mut attempt: F,
) -> Result<RawResponse>
where
	F: FnMut() -> Fut,
	Fut: Future<Output = std::result::Result<RawResponse, String>>,
{
	let max_attempts = config.max_retry_attempts.saturating_add(1);
	let mut attempts = 0u32;

	loop {
		match attempt().await {
			Ok(response) if response.status == 429 => {
				// Never counted against the retry budget.
				let wait = response
					.retry_after
					.map(|secs| Duration::from_secs_f64(secs.min(MAX_RETRY_AFTER_SECS)))
					.unwrap_or(config.retry_delay);
				warn!(wait_ms = wait.as_millis() as u64, "rate limited, waiting before retry");
				events.emit(TransportEvent::RateLimited { wait });
				tokio::time::sleep(wait).await;
			}
			Ok(response) if response.status >= 500 => {
				attempts += 1;
				if attempts >= max_attempts {
					let message = parse_error_message(response.status, &response.body);
					warn!(status = response.status, attempts, "server errors exhausted retries");
					return Err(HttpError::Server {
						status: response.status,
						message,
					});
				}
				debug!(status = response.status, attempt = attempts, "server error, retrying");
				tokio::time::sleep(config.retry_delay).await;
			}
			Ok(response) => return Ok(response),
			Err(err) => {
				attempts += 1;
				if attempts >= max_attempts {
					warn!(error = %err, attempts, "transport errors exhausted retries");
					return Err(HttpError::Network(err));
				}
				debug!(error = %err, attempt = attempts, "transport error, retrying");
				tokio::time::sleep(config.retry_delay).await;
			}
		}
	}
}

/// Converts a final raw response into the caller-facing result.
fn classify(response: RawResponse) -> Result<ApiResponse> {
	if response.status >= 500 {
		let message = parse_error_message(response.status, &response.body);
		return Err(HttpError::Server {
			status: response.status,
			message,
		});
	}
	if response.status >= 400 {
		let message = parse_error_message(response.status, &response.body);
		return Err(HttpError::Client {
			status: response.status,
			kind: ClientErrorKind::from_status(response.status),
			message,
		});
	}
	Ok(ApiResponse {
		status: response.status,
		payload: parse_success_payload(&response.body),
	})
}

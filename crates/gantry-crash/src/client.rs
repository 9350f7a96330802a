// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Crash reporting pipeline: rate-limited, fingerprinted report submission.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use gantry_common_http::{Connection, EventBus};
use gantry_crash_core::{
	fingerprint, BreadcrumbBuffer, BreadcrumbKind, CrashError, CrashReport, CustomKeys,
	DeviceInfo, ReportRateLimiter, ReportType, SessionRegistration,
	DEFAULT_BREADCRUMB_CAPACITY,
};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{CrashSdkError, Result};
use crate::event::{CrashEvent, DropReason};

/// SDK version for identification.
const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Report submission endpoint.
const REPORT_PATH: &str = "/api/v1/app/crash-reporting/report";
/// Session registration endpoint.
const SESSION_PATH: &str = "/api/v1/app/crash-reporting/session";

/// User id reported when neither an override nor an authenticated user exists.
const ANONYMOUS_USER: &str = "anonymous";

/// Builder for constructing a [`CrashReporter`].
pub struct CrashReporterBuilder {
	connection: Option<Connection>,
	device_info: Option<DeviceInfo>,
	breadcrumb_capacity: usize,
}

impl CrashReporterBuilder {
	/// Creates a new builder with default settings.
	pub fn new() -> Self {
		Self {
			connection: None,
			device_info: None,
			breadcrumb_capacity: DEFAULT_BREADCRUMB_CAPACITY,
		}
	}

	/// Sets the backend connection all reports are submitted through.
	pub fn connection(mut self, connection: Connection) -> Self {
		self.connection = Some(connection);
		self
	}

	/// Overrides the device snapshot.
	///
	/// Use this to fill in fields the process cannot observe on its own
	/// (renderer, screen size, memory) before the snapshot is frozen.
	pub fn device_info(mut self, device_info: DeviceInfo) -> Self {
		self.device_info = Some(device_info);
		self
	}

	/// Sets the breadcrumb ring-buffer capacity.
	pub fn breadcrumb_capacity(mut self, capacity: usize) -> Self {
		self.breadcrumb_capacity = capacity;
		self
	}

	/// Builds the CrashReporter.
	///
	/// Generates the per-process session id and freezes the device snapshot.
	pub fn build(self) -> Result<CrashReporter> {
		let connection = self.connection.ok_or(CrashSdkError::MissingConnection)?;
		let device_info = self.device_info.unwrap_or_else(DeviceInfo::capture);
		let session_id = Uuid::new_v4().simple().to_string();

		let inner = Arc::new(ReporterInner {
			connection,
			session_id: session_id.clone(),
			device_info,
			breadcrumbs: RwLock::new(BreadcrumbBuffer::with_capacity(self.breadcrumb_capacity)),
			custom_keys: RwLock::new(CustomKeys::new()),
			limiter: Mutex::new(ReportRateLimiter::new()),
			user_override: RwLock::new(None),
			authenticated_user: RwLock::new(None),
			events: EventBus::new(),
		});

		info!(session_id = %session_id, "crash reporter initialized");

		Ok(CrashReporter { inner })
	}
}

impl Default for CrashReporterBuilder {
	fn default() -> Self {
		Self::new()
	}
}

struct ReporterInner {
	connection: Connection,
	session_id: String,
	device_info: DeviceInfo,
	breadcrumbs: RwLock<BreadcrumbBuffer>,
	custom_keys: RwLock<CustomKeys>,
	limiter: Mutex<ReportRateLimiter>,
	user_override: RwLock<Option<String>>,
	authenticated_user: RwLock<Option<String>>,
	events: EventBus<CrashEvent>,
}

/// Rate-limited crash reporting pipeline.
///
/// Cheap to clone; all clones share the same session, breadcrumb buffer,
/// limiter, and event bus. Lives for the process lifetime; the session id is
/// generated once at build and never persisted across restarts.
#[derive(Clone)]
pub struct CrashReporter {
	inner: Arc<ReporterInner>,
}

impl CrashReporter {
	/// Creates a new builder for constructing a CrashReporter.
	pub fn builder() -> CrashReporterBuilder {
		CrashReporterBuilder::new()
	}

	/// The 32-hex-char id of this crash session.
	pub fn session_id(&self) -> &str {
		&self.inner.session_id
	}

	/// The device snapshot frozen at initialization.
	pub fn device_info(&self) -> &DeviceInfo {
		&self.inner.device_info
	}

	/// Subscribes to crash-pipeline notifications.
	pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<CrashEvent> {
		self.inner.events.subscribe()
	}

	/// Records a contextual breadcrumb for subsequent reports.
	pub async fn record_breadcrumb(&self, kind: BreadcrumbKind, message: impl Into<String>) {
		self.inner.breadcrumbs.write().await.record(kind, message);
	}

	/// Sets a persistent custom key attached to every report.
	///
	/// New keys are rejected once the map holds 10 entries; existing keys are
	/// always updatable.
	pub async fn set_custom_key(&self, key: impl Into<String>, value: impl ToString) -> Result<()> {
		self.inner
			.custom_keys
			.write()
			.await
			.set(key, value)
			.map_err(CrashSdkError::Crash)
	}

	/// Forces the reported user id, taking priority over the authenticated user.
	pub async fn set_user_override(&self, user_id: Option<String>) {
		*self.inner.user_override.write().await = user_id;
	}

	/// Sets the currently authenticated user's id, used when no override is set.
	pub async fn set_authenticated_user(&self, user_id: Option<String>) {
		*self.inner.authenticated_user.write().await = user_id;
	}

	/// Submits a crash report.
	pub async fn report_crash(&self, message: &str, stack_trace: &str) -> Result<bool> {
		self.submit(ReportType::Crash, message, stack_trace, HashMap::new())
			.await
	}

	/// Submits a non-fatal error report.
	pub async fn report_non_fatal(&self, message: &str, stack_trace: &str) -> Result<bool> {
		self.submit(ReportType::NonFatal, message, stack_trace, HashMap::new())
			.await
	}

	/// Submits an application-not-responding report.
	pub async fn report_anr(&self, message: &str, stack_trace: &str) -> Result<bool> {
		self.submit(ReportType::Anr, message, stack_trace, HashMap::new())
			.await
	}

	/// Submits one report through the full pipeline.
	///
	/// Returns `Ok(true)` when the backend accepted the report and
	/// `Ok(false)` when it was dropped (rate limited or network failure);
	/// dropped reports are permanently lost. An empty message fails
	/// validation before any other side effect.
	pub async fn submit(
		&self,
		report_type: ReportType,
		message: &str,
		stack_trace: &str,
		extra_keys: HashMap<String, String>,
	) -> Result<bool> {
		if message.trim().is_empty() {
			return Err(CrashError::Validation("report message must not be empty".to_string()).into());
		}

		// Check-then-consume must stay atomic across concurrent submissions.
		if !self.inner.limiter.lock().await.try_acquire() {
			warn!(r#type = %report_type, "crash report dropped: rate limited");
			self.inner.events.emit(CrashEvent::ReportDropped {
				reason: DropReason::RateLimited,
			});
			return Ok(false);
		}

		let report_fingerprint = fingerprint(stack_trace);
		let breadcrumbs = self.inner.breadcrumbs.read().await.snapshot();
		let custom_keys = self.inner.custom_keys.read().await.merged_with(&extra_keys);
		let user_id = self.resolve_user_id().await;

		let report = CrashReport {
			session_id: self.inner.session_id.clone(),
			user_id,
			report_type,
			message: message.to_string(),
			fingerprint: report_fingerprint.clone(),
			device_info: self.inner.device_info.clone(),
			breadcrumbs,
			timestamp: Utc::now(),
			stack_trace: (!stack_trace.is_empty()).then(|| stack_trace.to_string()),
			custom_keys: (!custom_keys.is_empty()).then_some(custom_keys),
		};

		debug!(
			r#type = %report_type,
			fingerprint = %report_fingerprint,
			breadcrumbs = report.breadcrumbs.len(),
			"submitting crash report"
		);

		let body = serde_json::to_value(&report).map_err(CrashError::Serialization)?;
		match self
			.inner
			.connection
			.post(REPORT_PATH, Some(body), true)
			.await
		{
			Ok(_) => {
				info!(fingerprint = %report_fingerprint, "crash report submitted");
				self.inner.events.emit(CrashEvent::ReportSubmitted {
					fingerprint: report_fingerprint,
				});
				Ok(true)
			}
			Err(err) => {
				// No offline queue: a failed report is permanently lost.
				warn!(error = %err, "crash report dropped: submission failed");
				self.inner.events.emit(CrashEvent::ReportDropped {
					reason: DropReason::Network,
				});
				Ok(false)
			}
		}
	}

	/// Registers this crash session with the backend.
	///
	/// Explicit and separate: report submission never triggers registration.
	pub async fn register_session(&self) -> Result<()> {
		let registration = SessionRegistration {
			session_id: self.inner.session_id.clone(),
			user_id: self.resolve_user_id().await,
			device_info: self.inner.device_info.clone(),
			sdk_version: SDK_VERSION.to_string(),
			timestamp: Utc::now(),
		};

		let body = serde_json::to_value(&registration).map_err(CrashError::Serialization)?;
		self.inner
			.connection
			.post(SESSION_PATH, Some(body), true)
			.await?;

		info!(session_id = %self.inner.session_id, "crash session registered");
		Ok(())
	}

	/// Resolves the reporting user id: explicit override, else the
	/// authenticated user, else `"anonymous"`.
	async fn resolve_user_id(&self) -> String {
		if let Some(user_id) = self.inner.user_override.read().await.clone() {
			return user_id;
		}
		if let Some(user_id) = self.inner.authenticated_user.read().await.clone() {
			return user_id;
		}
		ANONYMOUS_USER.to_string()
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Example: Submit a crash report using the gantry-crash SDK.
//!
//! Run with:
//!   cargo run --example report -p gantry-crash

use gantry_common_http::{Connection, ConnectionConfig};
use gantry_crash::{BreadcrumbKind, CrashEvent, CrashReporter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	// Configure from environment or use defaults for testing
	let api_key =
		std::env::var("GANTRY_API_KEY").expect("GANTRY_API_KEY environment variable required");
	let hosts = std::env::var("GANTRY_HOSTS")
		.unwrap_or_else(|_| "https://gantry.example.com".to_string())
		.split(',')
		.map(str::to_string)
		.collect::<Vec<_>>();

	println!("Connecting to backend...");
	println!("  Candidate hosts: {:?}", hosts);

	let connection = Connection::new(ConnectionConfig::new(&api_key, hosts)?)?;
	let selected = connection.connect().await?;
	println!("  Selected host: {} ({}ms)", selected.host, selected.latency_ms);

	// Build the reporter and register the session
	let reporter = CrashReporter::builder().connection(connection).build()?;
	println!("  Session ID: {}", reporter.session_id());
	reporter.register_session().await?;

	// Watch pipeline events
	let mut events = reporter.subscribe();

	// Identify the user and attach some context
	reporter
		.set_authenticated_user(Some("user_example_123".to_string()))
		.await;
	reporter.set_custom_key("build", "0.1.0-example").await?;
	reporter.set_custom_key("scene", "main_menu").await?;

	// Leave a trail of breadcrumbs
	reporter
		.record_breadcrumb(BreadcrumbKind::Navigation, "entered main_menu")
		.await;
	reporter
		.record_breadcrumb(BreadcrumbKind::UserAction, "clicked start")
		.await;
	reporter
		.record_breadcrumb(BreadcrumbKind::Error, "failed to load save file")
		.await;

	// Submit a non-fatal report
	println!("\nSubmitting non-fatal report...");
	let stack_trace = "at load_save (res://save.gd:42)\nat _ready (res://main.gd:0x7f00)";
	let accepted = reporter
		.report_non_fatal("save file corrupted", stack_trace)
		.await?;
	println!("  Accepted: {}", accepted);

	match events.try_recv() {
		Ok(CrashEvent::ReportSubmitted { fingerprint }) => {
			println!("  Fingerprint: {}", fingerprint);
		}
		Ok(CrashEvent::ReportDropped { reason }) => {
			println!("  Dropped: {}", reason);
		}
		Err(_) => {}
	}

	Ok(())
}

//! Submission handling: settings lookup, template resolution, delivery.
//!
//! Every failure is logged and swallowed here. The caller only receives an
//! [`Outcome`], so the form's own response never depends on the remote API.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::Config;
use crate::dispatch::{DispatchConfig, DispatchError, Dispatched, Dispatcher, ResponseSummary};
use crate::form::FormData;
use crate::store::ConfigStore;
use crate::template::{self, TemplateError};

/// A completed form submission.
#[derive(Debug, Clone)]
pub struct SubmissionEvent {
	/// Identifier of the submitted form.
	pub form_id: String,
	/// Posted field values.
	pub data: FormData,
}

impl SubmissionEvent {
	/// Create an event.
	pub fn new(form_id: impl Into<String>, data: FormData) -> Self {
		Self {
			form_id: form_id.into(),
			data,
		}
	}
}

/// What happened to a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
	/// The form has no API URL; nothing was done.
	Skipped,
	/// The stored template is not valid JSON; nothing was sent.
	InvalidTemplate,
	/// The template parsed but could not be resolved; nothing was sent.
	Unresolvable(String),
	/// The request failed.
	Failed(String),
	/// The API answered.
	Delivered(ResponseSummary),
}

impl Outcome {
	/// The line written to the log for this outcome, if any.
	#[must_use]
	pub fn log_line(&self) -> Option<String> {
		match self {
			Self::Skipped => None,
			Self::InvalidTemplate => Some("Invalid JSON template.".to_owned()),
			Self::Unresolvable(message) => Some(format!("Template resolution failed: {message}")),
			Self::Failed(message) => Some(format!("API request failed: {message}")),
			Self::Delivered(summary) => Some(format!("API request successful: {}", summary.body)),
		}
	}
}

/// Forwards submissions of configured forms to their APIs.
#[derive(Debug)]
pub struct Relay<S> {
	store: S,
	dispatcher: Dispatcher,
	config: Config,
}

impl<S: ConfigStore> Relay<S> {
	/// Create a relay with default resolve and HTTP settings.
	///
	/// # Errors
	///
	/// Returns [`DispatchError::Client`] if the HTTP client cannot be built.
	pub fn new(store: S) -> Result<Self, DispatchError> {
		Ok(Self::with_dispatcher(store, Dispatcher::new(&DispatchConfig::default())?))
	}

	/// Create a relay around an existing dispatcher.
	pub fn with_dispatcher(store: S, dispatcher: Dispatcher) -> Self {
		Self {
			store,
			dispatcher,
			config: Config::default(),
		}
	}

	/// Replace the template resolution settings.
	#[must_use]
	pub fn config(mut self, config: Config) -> Self {
		self.config = config;
		self
	}

	/// The settings store.
	pub fn store(&self) -> &S {
		&self.store
	}

	/// Handle one submission and log its outcome.
	///
	/// At most one request is sent. No error escapes.
	pub async fn handle(&self, event: &SubmissionEvent) -> Outcome {
		let outcome = self.process(event).await;
		match &outcome {
			Outcome::Skipped => {}
			Outcome::InvalidTemplate | Outcome::Unresolvable(_) | Outcome::Failed(_) => {
				if let Some(line) = outcome.log_line() {
					tracing::error!(form = %event.form_id, "{line}");
				}
			}
			Outcome::Delivered(summary) => {
				if let Some(line) = outcome.log_line() {
					tracing::info!(form = %event.form_id, status = summary.status, "{line}");
				}
			}
		}
		outcome
	}

	async fn process(&self, event: &SubmissionEvent) -> Outcome {
		let Some(conn) = self.store.connection(&event.form_id) else {
			return Outcome::Skipped;
		};
		if !conn.is_connected() {
			return Outcome::Skipped;
		}

		let body = match template::resolve_template(&conn.template, &event.data, &self.config) {
			Ok(body) => body,
			Err(TemplateError::Parse(_)) => return Outcome::InvalidTemplate,
			Err(TemplateError::Resolve(e)) => return Outcome::Unresolvable(e.to_string()),
		};

		let sent = self
			.dispatcher
			.dispatch(&conn.api_url, conn.http_method(), conn.auth(), &conn.auth_key, &body)
			.await;

		match sent {
			Ok(Dispatched::Sent(summary)) => Outcome::Delivered(summary),
			Ok(Dispatched::Skipped) => Outcome::Skipped,
			Err(e) => Outcome::Failed(e.to_string()),
		}
	}
}

impl<S: ConfigStore + 'static> Relay<S> {
	/// Handle a submission on the tokio runtime, off the caller's path.
	///
	/// Must be called from within a tokio runtime.
	pub fn spawn(self: &Arc<Self>, event: SubmissionEvent) -> JoinHandle<Outcome> {
		let relay = Arc::clone(self);
		tokio::spawn(async move { relay.handle(&event).await })
	}
}

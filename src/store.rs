//! Per-form connection settings.
//!
//! With the `toml` feature a [`MemoryStore`] can be loaded from a file holding
//! one table per form:
//!
//! ```toml
//! [forms.contact]
//! api_url = "https://api.example.com/leads"
//! auth_type = "bearer"
//! auth_key = "token"
//! method = "POST"
//! template = '{"email": "[your-email]"}'
//! ```

use std::collections::HashMap;

use serde::Deserialize;

use crate::dispatch::{AuthType, Method};

/// Connection settings stored for one form. Every field may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
	/// Target URL. Empty means the form is not connected.
	pub api_url: String,
	/// `basic` or `bearer`.
	pub auth_type: String,
	/// Key or token placed in the `Authorization` header.
	pub auth_key: String,
	/// `POST` or `GET`.
	pub method: String,
	/// JSON template text.
	pub template: String,
}

impl ConnectionConfig {
	/// Returns `true` when an API URL is configured.
	#[must_use]
	pub fn is_connected(&self) -> bool {
		!self.api_url.trim().is_empty()
	}

	/// Parsed auth type.
	#[must_use]
	pub fn auth(&self) -> AuthType {
		AuthType::parse(&self.auth_type)
	}

	/// Parsed HTTP method.
	#[must_use]
	pub fn http_method(&self) -> Method {
		Method::parse(&self.method)
	}
}

/// Source of connection settings, keyed by form identifier.
pub trait ConfigStore: Send + Sync {
	/// Settings for `form_id`, if the form has any.
	fn connection(&self, form_id: &str) -> Option<ConnectionConfig>;
}

impl<S: ConfigStore + ?Sized> ConfigStore for std::sync::Arc<S> {
	fn connection(&self, form_id: &str) -> Option<ConnectionConfig> {
		(**self).connection(form_id)
	}
}

/// Store backed by a map held in memory.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemoryStore {
	#[serde(default)]
	forms: HashMap<String, ConnectionConfig>,
}

impl MemoryStore {
	/// Create an empty store.
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Insert or replace the settings of a form.
	pub fn insert(&mut self, form_id: impl Into<String>, config: ConnectionConfig) {
		self.forms.insert(form_id.into(), config);
	}

	/// Number of forms with settings.
	#[must_use]
	pub fn len(&self) -> usize {
		self.forms.len()
	}

	/// Returns `true` if no form has settings.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.forms.is_empty()
	}
}

impl FromIterator<(String, ConnectionConfig)> for MemoryStore {
	fn from_iter<I: IntoIterator<Item = (String, ConnectionConfig)>>(iter: I) -> Self {
		Self {
			forms: iter.into_iter().collect(),
		}
	}
}

impl ConfigStore for MemoryStore {
	fn connection(&self, form_id: &str) -> Option<ConnectionConfig> {
		self.forms.get(form_id).cloned()
	}
}

/// Error raised while loading a settings file.
#[cfg(feature = "toml")]
#[derive(Debug)]
pub enum StoreError {
	/// The file could not be read.
	Io(std::io::Error),
	/// The file is not valid settings TOML.
	Parse(toml::de::Error),
}

#[cfg(feature = "toml")]
impl std::fmt::Display for StoreError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Io(e) => write!(f, "failed to read settings: {e}"),
			Self::Parse(e) => write!(f, "invalid settings: {e}"),
		}
	}
}

#[cfg(feature = "toml")]
impl std::error::Error for StoreError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Self::Io(e) => Some(e),
			Self::Parse(e) => Some(e),
		}
	}
}

#[cfg(feature = "toml")]
impl MemoryStore {
	/// Parse settings from TOML text.
	///
	/// # Errors
	///
	/// Returns [`StoreError::Parse`] if the text is not valid settings TOML.
	pub fn from_toml_str(s: &str) -> Result<Self, StoreError> {
		toml::from_str(s).map_err(StoreError::Parse)
	}

	/// Read settings from a TOML file.
	///
	/// # Errors
	///
	/// Returns [`StoreError::Io`] if the file cannot be read and
	/// [`StoreError::Parse`] if its content is invalid.
	pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, StoreError> {
		let path = path.as_ref();
		let text = std::fs::read_to_string(path).map_err(StoreError::Io)?;
		let store = Self::from_toml_str(&text)?;
		tracing::debug!(path = %path.display(), forms = store.len(), "loaded form settings");
		Ok(store)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_memory_store_lookup() {
		let mut store = MemoryStore::new();
		store.insert(
			"42",
			ConnectionConfig {
				api_url: "https://api.example.com".into(),
				..Default::default()
			},
		);

		assert!(store.connection("42").is_some_and(|c| c.is_connected()));
		assert!(store.connection("7").is_none());
	}

	#[test]
	fn test_shared_store() {
		fn url_of<S: ConfigStore>(store: &S, form_id: &str) -> Option<String> {
			store.connection(form_id).map(|c| c.api_url)
		}

		let store: MemoryStore = [(
			"contact".to_owned(),
			ConnectionConfig {
				api_url: "https://api.example.com".into(),
				..Default::default()
			},
		)]
		.into_iter()
		.collect();

		let shared: std::sync::Arc<dyn ConfigStore> = std::sync::Arc::new(store);
		let other = std::sync::Arc::clone(&shared);

		assert_eq!(url_of(&shared, "contact").as_deref(), Some("https://api.example.com"));
		assert_eq!(url_of(&other, "contact"), url_of(&shared, "contact"));
		assert_eq!(url_of(&other, "missing"), None);
	}

	#[test]
	fn test_connection_parsing() {
		let config = ConnectionConfig {
			api_url: "   ".into(),
			auth_type: "basic".into(),
			method: "GET".into(),
			..Default::default()
		};
		assert!(!config.is_connected());
		assert_eq!(config.auth(), AuthType::Basic);
		assert_eq!(config.http_method(), Method::Get);

		let blank = ConnectionConfig::default();
		assert_eq!(blank.auth(), AuthType::Bearer);
		assert_eq!(blank.http_method(), Method::Post);
	}

	#[cfg(feature = "toml")]
	#[test]
	fn test_from_toml() {
		let store = MemoryStore::from_toml_str(
			r#"
			[forms.contact]
			api_url = "https://api.example.com/leads"
			auth_type = "basic"
			auth_key = "secret"
			template = '{"email": "[your-email]"}'

			[forms.empty]
			"#,
		)
		.unwrap();

		assert_eq!(store.len(), 2);
		let contact = store.connection("contact").unwrap();
		assert_eq!(contact.auth(), AuthType::Basic);
		assert_eq!(contact.method, "");
		assert_eq!(contact.template, r#"{"email": "[your-email]"}"#);
		assert_eq!(store.connection("empty"), Some(ConnectionConfig::default()));
	}

	#[cfg(feature = "toml")]
	#[test]
	fn test_from_toml_invalid() {
		assert!(matches!(MemoryStore::from_toml_str("[forms"), Err(StoreError::Parse(_))));
		assert!(matches!(MemoryStore::load("/nonexistent/forms.toml"), Err(StoreError::Io(_))));
	}
}

/* src/lib.rs */

//!
//! Relay form submissions to an external HTTP API through a JSON template.
//!
//! A site administrator writes a JSON template whose string values embed
//! `[field]` tokens. When a form is submitted, the tokens are replaced with the
//! submitted values and the resulting document is sent to the configured API
//! with a `Basic` or `Bearer` authorization header.
//!
//! ## Features
//!
//! - `toml` (default): load per-form connection settings from a TOML file
//!
//! ## Example
//!
//! ```rust
//! use form_relay::{Config, FormData, template};
//!
//! let mut data = FormData::new();
//! data.insert("name", "Ada");
//! data.insert("topics", vec!["rust", "http"]);
//!
//! let doc = template::resolve_template(
//!     r#"{"contact": "[name]", "tags": "[topics]", "priority": 1}"#,
//!     &data,
//!     &Config::default(),
//! )?;
//!
//! assert_eq!(doc["contact"], "Ada");
//! assert_eq!(doc["tags"], "rust, http");
//! assert_eq!(doc["priority"], 1);
//! # Ok::<(), form_relay::template::TemplateError>(())
//! ```

#![deny(missing_docs)]

pub mod dispatch;
pub mod form;
pub mod json;
pub mod relay;
pub mod store;
pub mod template;

pub use dispatch::{AuthType, DispatchConfig, DispatchError, Dispatched, Dispatcher, Method, ResponseSummary};
pub use form::{FormData, FormTag, SubmittedValue};
pub use relay::{Outcome, Relay, SubmissionEvent};
pub use store::{ConfigStore, ConnectionConfig, MemoryStore};

/// A segment in a value path, used for tracing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
	/// Object key
	Key(String),
	/// Array index
	Index(usize),
}

/// Result of resolving a single string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
	/// The string was transformed to a new value.
	Changed(String),
	/// The string stays as it is.
	Unchanged,
}

impl Resolved {
	/// Create a `Changed` variant.
	#[inline]
	pub fn changed(s: impl Into<String>) -> Self {
		Self::Changed(s.into())
	}

	/// Create an `Unchanged` variant.
	#[inline]
	#[must_use]
	pub const fn unchanged() -> Self {
		Self::Unchanged
	}

	/// Returns `true` if this is `Changed`.
	#[inline]
	#[must_use]
	pub const fn is_changed(&self) -> bool {
		matches!(self, Self::Changed(_))
	}
}

/// Configuration for template resolution.
#[derive(Debug, Clone)]
pub struct Config {
	/// Maximum nesting depth of the template document. Default: 256.
	///
	/// The default sits above `serde_json`'s own parse limit of 128, so any
	/// template that parses also resolves.
	pub max_depth: usize,

	/// Whether placeholders in object keys are substituted too. Default: false.
	pub resolve_keys: bool,

	/// Separator placed between the values of a multi-value field. Default: `", "`.
	pub multi_value_separator: String,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			max_depth: 256,
			resolve_keys: false,
			multi_value_separator: ", ".into(),
		}
	}
}

impl Config {
	/// Create a new config with default values.
	#[inline]
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Set maximum depth.
	#[inline]
	#[must_use]
	pub fn max_depth(mut self, depth: usize) -> Self {
		self.max_depth = depth;
		self
	}

	/// Disable depth limiting.
	///
	/// Only safe for documents whose depth is already bounded, such as values
	/// produced by `serde_json` parsing.
	#[inline]
	#[must_use]
	pub fn unlimited_depth(mut self) -> Self {
		self.max_depth = usize::MAX;
		self
	}

	/// Set whether to substitute placeholders in object keys.
	#[inline]
	#[must_use]
	pub fn resolve_keys(mut self, resolve: bool) -> Self {
		self.resolve_keys = resolve;
		self
	}

	/// Set the separator used to join multi-value fields.
	#[inline]
	#[must_use]
	pub fn multi_value_separator(mut self, separator: impl Into<String>) -> Self {
		self.multi_value_separator = separator.into();
		self
	}
}

/// Error type for the tree walk.
#[derive(Debug)]
pub enum Error<E> {
	/// The resolver returned an error.
	Resolver(E),
	/// Depth limit exceeded.
	DepthExceeded {
		/// The configured limit that was exceeded.
		limit: usize,
	},
}

impl<E: std::fmt::Display> std::fmt::Display for Error<E> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Resolver(e) => write!(f, "resolver error: {e}"),
			Self::DepthExceeded { limit } => write!(f, "depth limit ({limit}) exceeded"),
		}
	}
}

impl<E: std::error::Error + 'static> std::error::Error for Error<E> {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Self::Resolver(e) => Some(e),
			Self::DepthExceeded { .. } => None,
		}
	}
}

impl<E> Error<E> {
	/// Create a resolver error.
	#[inline]
	pub fn resolver(e: E) -> Self {
		Self::Resolver(e)
	}

	/// Create a depth exceeded error.
	#[inline]
	#[must_use]
	pub fn depth_exceeded(limit: usize) -> Self {
		Self::DepthExceeded { limit }
	}
}

/// Trait for string resolvers applied to every string leaf of a document.
///
/// Implementors decide which strings to rewrite ([`Resolved::Changed`]), which
/// to keep ([`Resolved::Unchanged`]) and when to abort ([`Err`]).
///
/// # Example
///
/// ```rust
/// use form_relay::{Resolved, Resolver};
///
/// struct Upper;
///
/// impl Resolver for Upper {
///     type Error = std::convert::Infallible;
///
///     fn resolve(&self, input: &str) -> Result<Resolved, Self::Error> {
///         Ok(Resolved::changed(input.to_uppercase()))
///     }
/// }
/// ```
pub trait Resolver: Send + Sync {
	/// Error type returned by this resolver.
	type Error;

	/// Resolve a string value.
	fn resolve(&self, input: &str) -> Result<Resolved, Self::Error>;
}

impl<F, E> Resolver for F
where
	F: Fn(&str) -> Result<Resolved, E> + Send + Sync,
{
	type Error = E;

	#[inline]
	fn resolve(&self, input: &str) -> Result<Resolved, Self::Error> {
		self(input)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_resolved_changed() {
		let r = Resolved::changed("hello");
		assert!(r.is_changed());
		assert_eq!(r, Resolved::Changed("hello".to_string()));
	}

	#[test]
	fn test_resolved_unchanged() {
		let r = Resolved::unchanged();
		assert!(!r.is_changed());
	}

	#[test]
	fn test_config_default() {
		let config = Config::default();
		assert_eq!(config.max_depth, 256);
		assert!(!config.resolve_keys);
		assert_eq!(config.multi_value_separator, ", ");
	}

	#[test]
	fn test_config_builder() {
		let config = Config::new()
			.max_depth(10)
			.resolve_keys(true)
			.multi_value_separator("|");
		assert_eq!(config.max_depth, 10);
		assert!(config.resolve_keys);
		assert_eq!(config.multi_value_separator, "|");
	}

	#[test]
	fn test_config_unlimited_depth() {
		let config = Config::new().unlimited_depth();
		assert_eq!(config.max_depth, usize::MAX);
	}

	#[test]
	fn test_error_display() {
		let err: Error<&str> = Error::resolver("custom error");
		assert_eq!(err.to_string(), "resolver error: custom error");

		let err: Error<&str> = Error::depth_exceeded(10);
		assert_eq!(err.to_string(), "depth limit (10) exceeded");
	}
}

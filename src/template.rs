//! Placeholder substitution in JSON templates.
//!
//! A template is JSON text whose string values may embed `[field]` tokens.
//! [`resolve_template`] parses it and replaces each token naming a submitted
//! field with that field's value. Tokens for unknown fields are left as they
//! are.

use std::convert::Infallible;

use serde_json::Value;

use crate::form::{FormData, SubmittedValue};
use crate::{Config, Resolved, Resolver, json};

/// Error returned when a template cannot be turned into a document.
#[derive(Debug)]
pub enum TemplateError {
	/// The template is not valid JSON.
	Parse(serde_json::Error),
	/// The parsed document could not be walked.
	Resolve(crate::Error<Infallible>),
}

impl std::fmt::Display for TemplateError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Parse(e) => write!(f, "invalid JSON template: {e}"),
			Self::Resolve(e) => write!(f, "template resolution failed: {e}"),
		}
	}
}

impl std::error::Error for TemplateError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Self::Parse(e) => Some(e),
			Self::Resolve(e) => Some(e),
		}
	}
}

/// Resolver replacing `[field]` tokens with submitted values.
///
/// The input is scanned once from left to right. At each `[`, the submitted
/// names are tried in insertion order and the first literal `[name]` found
/// there is replaced. Text produced by a replacement is never scanned again.
///
/// Multi-value fields also answer `[name-option]` tokens: the option itself
/// when it was selected, the empty string otherwise.
#[derive(Debug, Clone, Copy)]
pub struct Placeholders<'a> {
	data: &'a FormData,
	separator: &'a str,
}

impl<'a> Placeholders<'a> {
	/// Create a resolver over `data`, joining multi-value fields with `separator`.
	#[must_use]
	pub fn new(data: &'a FormData, separator: &'a str) -> Self {
		Self { data, separator }
	}

	/// Substitute tokens in `input`, or `None` when nothing matched.
	#[must_use]
	pub fn substitute(&self, input: &str) -> Option<String> {
		if self.data.is_empty() || !input.contains('[') {
			return None;
		}

		let mut out = String::with_capacity(input.len());
		let mut rest = input;
		let mut changed = false;

		while let Some(open) = rest.find('[') {
			out.push_str(&rest[..open]);
			let at = &rest[open..];
			match self.match_at(at) {
				Some((len, text)) => {
					out.push_str(&text);
					rest = &at[len..];
					changed = true;
				}
				None => {
					out.push('[');
					rest = &at[1..];
				}
			}
		}

		if !changed {
			return None;
		}
		out.push_str(rest);
		Some(out)
	}

	/// Match a token at the start of `s`, which begins with `[`. Returns the
	/// token length and its replacement.
	fn match_at(&self, s: &str) -> Option<(usize, String)> {
		let inner = &s[1..];

		for (name, value) in self.data.iter() {
			let len = name.len() + 2;
			if inner.starts_with(name) && s.as_bytes().get(len - 1) == Some(&b']') {
				return Some((len, value.render(self.separator)));
			}
		}

		for (name, value) in self.data.iter() {
			let SubmittedValue::Multi(selected) = value else {
				continue;
			};
			let Some(tail) = inner.strip_prefix(name).and_then(|t| t.strip_prefix('-')) else {
				continue;
			};
			let Some(close) = tail.find(']') else {
				continue;
			};
			let option = &tail[..close];
			let text = if selected.iter().any(|v| v == option) { option.to_owned() } else { String::new() };
			return Some((name.len() + close + 3, text));
		}

		None
	}
}

impl Resolver for Placeholders<'_> {
	type Error = Infallible;

	fn resolve(&self, input: &str) -> Result<Resolved, Self::Error> {
		Ok(self.substitute(input).map_or(Resolved::Unchanged, Resolved::Changed))
	}
}

/// Parse `template` and substitute placeholders from `data`.
///
/// # Errors
///
/// Returns [`TemplateError::Parse`] when the template is not valid JSON, and
/// [`TemplateError::Resolve`] when it nests deeper than [`Config::max_depth`].
/// No partial document is ever returned.
pub fn resolve_template(template: &str, data: &FormData, config: &Config) -> Result<Value, TemplateError> {
	let doc: Value = serde_json::from_str(template).map_err(TemplateError::Parse)?;
	let placeholders = Placeholders::new(data, &config.multi_value_separator);
	json::resolve(doc, &placeholders, config).map_err(TemplateError::Resolve)
}

/// Distinct `[...]` tokens appearing in raw template text, in order of first use.
#[must_use]
pub fn template_tokens(template: &str) -> Vec<String> {
	let mut tokens: Vec<String> = Vec::new();
	let mut rest = template;

	while let Some(open) = rest.find('[') {
		let after = &rest[open + 1..];
		let Some(close) = after.find(']') else {
			break;
		};
		let name = &after[..close];
		if name.is_empty() || name.chars().any(|c| c.is_whitespace() || matches!(c, '[' | '"' | ',' | '{' | '}')) {
			rest = after;
			continue;
		}
		if !tokens.iter().any(|t| t == name) {
			tokens.push(name.to_owned());
		}
		rest = &after[close + 1..];
	}

	tokens
}

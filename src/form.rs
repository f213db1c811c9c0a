//! Submitted form data and form tag helpers.

use serde::Deserialize;

/// A value posted for one form field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SubmittedValue {
	/// A plain field.
	Single(String),
	/// A multi-value field, such as a checkbox group.
	Multi(Vec<String>),
}

impl SubmittedValue {
	/// Render the value as the text substituted for its placeholder.
	///
	/// Multi-value fields are joined with `separator`; an empty selection
	/// renders as the empty string.
	#[must_use]
	pub fn render(&self, separator: &str) -> String {
		match self {
			Self::Single(s) => s.clone(),
			Self::Multi(values) => values.join(separator),
		}
	}
}

impl From<String> for SubmittedValue {
	fn from(s: String) -> Self {
		Self::Single(s)
	}
}

impl From<&str> for SubmittedValue {
	fn from(s: &str) -> Self {
		Self::Single(s.into())
	}
}

impl From<Vec<String>> for SubmittedValue {
	fn from(values: Vec<String>) -> Self {
		Self::Multi(values)
	}
}

impl From<Vec<&str>> for SubmittedValue {
	fn from(values: Vec<&str>) -> Self {
		Self::Multi(values.into_iter().map(Into::into).collect())
	}
}

/// Ordered mapping from field name to submitted value.
///
/// Iteration follows insertion order. Inserting a name that is already present
/// replaces its value without moving it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
	fields: Vec<(String, SubmittedValue)>,
}

impl FormData {
	/// Create an empty mapping.
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Insert or replace a field.
	pub fn insert(&mut self, name: impl Into<String>, value: impl Into<SubmittedValue>) {
		let name = name.into();
		let value = value.into();
		match self.fields.iter_mut().find(|(n, _)| *n == name) {
			Some((_, slot)) => *slot = value,
			None => self.fields.push((name, value)),
		}
	}

	/// Look up a field by name.
	#[must_use]
	pub fn get(&self, name: &str) -> Option<&SubmittedValue> {
		self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
	}

	/// Iterate over fields in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &SubmittedValue)> {
		self.fields.iter().map(|(n, v)| (n.as_str(), v))
	}

	/// Number of fields.
	#[must_use]
	pub fn len(&self) -> usize {
		self.fields.len()
	}

	/// Returns `true` if no field was submitted.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.fields.is_empty()
	}
}

impl<K, V> FromIterator<(K, V)> for FormData
where
	K: Into<String>,
	V: Into<SubmittedValue>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		let mut data = Self::new();
		for (k, v) in iter {
			data.insert(k, v);
		}
		data
	}
}

/// A tag scanned from a form definition, e.g. `[checkbox* topics "a" "b"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormTag {
	/// Tag type as written, possibly with a trailing `*` required marker.
	pub kind: String,
	/// Field name.
	pub name: String,
	/// Option values, used by choice tags.
	pub values: Vec<String>,
}

impl FormTag {
	/// Create a tag without option values.
	pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
		Self {
			kind: kind.into(),
			name: name.into(),
			values: Vec::new(),
		}
	}

	/// Attach option values.
	#[must_use]
	pub fn with_values<I, S>(mut self, values: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.values = values.into_iter().map(Into::into).collect();
		self
	}

	/// Tag type with the required marker and padding stripped.
	#[must_use]
	pub fn base_kind(&self) -> &str {
		self.kind.trim_matches(|c| c == ' ' || c == '*')
	}
}

/// Keep the tags that produce mail tags: both base kind and name non-empty.
#[must_use]
pub fn mail_tags(tags: &[FormTag]) -> Vec<&FormTag> {
	tags.iter()
		.filter(|t| !t.base_kind().is_empty() && !t.name.is_empty())
		.collect()
}

/// Placeholder tokens offered to the administrator for a form.
///
/// Checkbox tags list one `[name-option]` token per option; every other tag
/// lists `[name]`. Option tokens resolve to the option when it was selected
/// and to the empty string otherwise.
#[must_use]
pub fn placeholder_legend(tags: &[FormTag]) -> Vec<String> {
	let mut legend = Vec::new();
	for tag in mail_tags(tags) {
		if tag.base_kind() == "checkbox" {
			legend.extend(tag.values.iter().map(|v| format!("[{}-{}]", tag.name, v)));
		} else {
			legend.push(format!("[{}]", tag.name));
		}
	}
	legend
}

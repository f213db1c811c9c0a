//! Recursive walk over a JSON [`Value`].
//!
//! The walk consumes the input tree and builds a new one. Strings are handed to
//! a [`Resolver`]; numbers, booleans and null are moved across untouched.

use serde_json::{Map, Value};

use crate::{Config, Error, PathSegment, Resolved, Resolver};

/// Resolve all strings in a JSON [`Value`].
///
/// Object values and array elements are visited recursively. Object keys are
/// only passed to the resolver when [`Config::resolve_keys`] is set.
///
/// # Errors
///
/// Returns an error if:
/// - The resolver returns an error
/// - The depth limit is exceeded
///
/// # Example
///
/// ```rust
/// use form_relay::{json, Config, Resolved};
///
/// let input = serde_json::json!({
///     "message": "hello",
///     "nested": { "value": "world" }
/// });
///
/// let output = json::resolve(
///     input,
///     &|s: &str| Ok::<_, std::convert::Infallible>(Resolved::changed(s.to_uppercase())),
///     &Config::default(),
/// )
/// .unwrap();
///
/// assert_eq!(output["message"], "HELLO");
/// assert_eq!(output["nested"]["value"], "WORLD");
/// ```
pub fn resolve<R>(value: Value, resolver: &R, config: &Config) -> Result<Value, Error<R::Error>>
where
	R: Resolver,
{
	let mut path = Vec::new();
	resolve_recursive(value, resolver, config, 0, &mut path)
}

fn resolve_recursive<R>(
	value: Value,
	resolver: &R,
	config: &Config,
	depth: usize,
	path: &mut Vec<PathSegment>,
) -> Result<Value, Error<R::Error>>
where
	R: Resolver,
{
	if depth >= config.max_depth {
		return Err(Error::depth_exceeded(config.max_depth));
	}

	tracing::trace!(depth, path = ?path, value_type = value_type_name(&value), "resolving");

	match value {
		Value::String(s) => resolve_str(s, resolver),

		Value::Array(arr) => {
			let mut result = Vec::with_capacity(arr.len());
			for (i, item) in arr.into_iter().enumerate() {
				path.push(PathSegment::Index(i));
				let res = resolve_recursive(item, resolver, config, depth + 1, path);
				path.pop();
				result.push(res?);
			}
			Ok(Value::Array(result))
		}

		Value::Object(map) => {
			let mut result = Map::with_capacity(map.len());
			for (key, val) in map {
				path.push(PathSegment::Key(key.clone()));

				let resolved_key = if config.resolve_keys {
					match resolver.resolve(&key) {
						Ok(Resolved::Changed(new_key)) => new_key,
						Ok(Resolved::Unchanged) => key,
						Err(e) => {
							path.pop();
							return Err(Error::resolver(e));
						}
					}
				} else {
					key
				};

				let resolved_val = resolve_recursive(val, resolver, config, depth + 1, path);
				path.pop();
				result.insert(resolved_key, resolved_val?);
			}
			Ok(Value::Object(result))
		}

		other @ (Value::Null | Value::Bool(_) | Value::Number(_)) => Ok(other),
	}
}

fn resolve_str<R>(s: String, resolver: &R) -> Result<Value, Error<R::Error>>
where
	R: Resolver,
{
	match resolver.resolve(&s).map_err(Error::resolver)? {
		Resolved::Changed(new_s) => {
			tracing::trace!(original = %s, resolved = %new_s, "string changed");
			Ok(Value::String(new_s))
		}
		Resolved::Unchanged => Ok(Value::String(s)),
	}
}

fn value_type_name(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "bool",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "array",
		Value::Object(_) => "object",
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::convert::Infallible;

	fn upper(s: &str) -> Result<Resolved, Infallible> {
		Ok(Resolved::changed(s.to_uppercase()))
	}

	#[test]
	fn test_resolve_string() {
		let output = resolve(Value::String("hello".into()), &upper, &Config::default()).unwrap();
		assert_eq!(output, Value::String("HELLO".into()));
	}

	#[test]
	fn test_resolve_unchanged() {
		let output = resolve(
			Value::String("hello".into()),
			&|_: &str| Ok::<_, Infallible>(Resolved::unchanged()),
			&Config::default(),
		)
		.unwrap();
		assert_eq!(output, Value::String("hello".into()));
	}

	#[test]
	fn test_resolve_nested() {
		let input = serde_json::json!({
			"a": "one",
			"b": {
				"c": "two",
				"d": ["three", "four"]
			}
		});

		let output = resolve(input, &upper, &Config::default()).unwrap();

		assert_eq!(output["a"], "ONE");
		assert_eq!(output["b"]["c"], "TWO");
		assert_eq!(output["b"]["d"][0], "THREE");
		assert_eq!(output["b"]["d"][1], "FOUR");
	}

	#[test]
	fn test_depth_limit() {
		let mut value = Value::String("deep".into());
		for _ in 0..32 {
			value = serde_json::json!({ "nested": value });
		}

		let result = resolve(value, &upper, &Config::default().max_depth(32));
		assert!(matches!(result, Err(Error::DepthExceeded { limit: 32 })));
	}

	#[test]
	fn test_keys_untouched_by_default() {
		let input = serde_json::json!({ "key": "value" });
		let output = resolve(input, &upper, &Config::default()).unwrap();
		assert_eq!(output, serde_json::json!({ "key": "VALUE" }));
	}

	#[test]
	fn test_resolve_keys() {
		let input = serde_json::json!({ "[key]": "value" });

		let output = resolve(
			input,
			&|s: &str| Ok::<_, Infallible>(Resolved::changed(s.replace("[key]", "email"))),
			&Config::default().resolve_keys(true),
		)
		.unwrap();

		assert_eq!(output["email"], "value");
	}

	#[test]
	fn test_non_string_unchanged() {
		let input = serde_json::json!({
			"number": 42,
			"bool": true,
			"null": null
		});

		let output = resolve(input.clone(), &upper, &Config::default()).unwrap();
		assert_eq!(output, input);
	}

	#[test]
	fn test_resolver_error() {
		#[derive(Debug)]
		struct MyError;

		let result = resolve(
			serde_json::json!(["ok", "fails"]),
			&|_: &str| Err::<Resolved, _>(MyError),
			&Config::default(),
		);
		assert!(matches!(result, Err(Error::Resolver(MyError))));
	}

	#[test]
	fn test_scalar_top_level() {
		let output = resolve(serde_json::json!(7), &upper, &Config::default()).unwrap();
		assert_eq!(output, serde_json::json!(7));
	}

	#[test]
	fn test_nested_arrays() {
		let input = serde_json::json!([["a", "b"], ["c", "d"]]);
		let output = resolve(input, &upper, &Config::default()).unwrap();
		assert_eq!(output, serde_json::json!([["A", "B"], ["C", "D"]]));
	}

	#[test]
	fn test_object_order_preserved() {
		let input: Value = serde_json::from_str(r#"{"z":"1","a":"2","m":"3"}"#).unwrap();
		let output = resolve(input, &upper, &Config::default()).unwrap();
		let keys: Vec<_> = output.as_object().unwrap().keys().cloned().collect();
		assert_eq!(keys, ["z", "a", "m"]);
	}
}

//! Path pattern compilation and matching.
//!
//! Supports the common path-to-regex grammar:
//! - literal segments match verbatim (case-insensitive, optional trailing slash)
//! - `:name` captures a single path segment
//! - `*` as a segment matches any remaining suffix
//! - `*` alone as the whole pattern matches everything
//!
//! A pre-built [`regex::Regex`] is also accepted as a pattern; it is executed
//! verbatim and its captures are returned positionally, unnamed.

use percent_encoding::percent_decode_str;
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::collections::HashMap;

use crate::error::RouterError;

/// Maximum allowed length for a pattern string in bytes.
const MAX_PATTERN_LENGTH: usize = 1024;

/// Maximum allowed number of path segments in a pattern.
const MAX_PATH_SEGMENTS: usize = 32;

/// Maximum allowed size for a compiled pattern regex (in bytes).
const MAX_REGEX_SIZE: usize = 1 << 20; // 1 MiB

/// A route pattern as registered: a path template or an opaque regex.
#[derive(Debug, Clone)]
pub enum PathSpec {
	/// A path template (`/users/:id`, `*`, ...).
	Pattern(String),
	/// A regular expression used verbatim; captures are positional.
	Regex(Regex),
}

impl PathSpec {
	/// The registered pattern as a display string.
	pub fn as_str(&self) -> &str {
		match self {
			Self::Pattern(p) => p,
			Self::Regex(re) => re.as_str(),
		}
	}
}

impl From<&str> for PathSpec {
	fn from(value: &str) -> Self {
		Self::Pattern(value.to_string())
	}
}

impl From<String> for PathSpec {
	fn from(value: String) -> Self {
		Self::Pattern(value)
	}
}

impl From<Regex> for PathSpec {
	fn from(value: Regex) -> Self {
		Self::Regex(value)
	}
}

/// Parameters extracted from a successful match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RouteParams {
	/// Named captures, URL-decoded. A capture that fails to decode (or never
	/// participated in the match) is `None`, never an error.
	Named(HashMap<String, Option<String>>),
	/// Raw positional captures from an opaque regex pattern, including the
	/// whole match at index 0. Not decoded.
	Captures(Vec<Option<String>>),
}

impl RouteParams {
	/// Convenience accessor for a named parameter value.
	pub fn get(&self, name: &str) -> Option<&str> {
		match self {
			Self::Named(map) => map.get(name).and_then(|v| v.as_deref()),
			Self::Captures(_) => None,
		}
	}
}

/// Outcome of matching a compiled pattern against a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PatternMatch {
	/// Matched, but the pattern declares no captures; no params are published.
	Anonymous,
	/// Matched with extracted parameters.
	Params(RouteParams),
}

impl PatternMatch {
	pub(crate) fn into_params(self) -> Option<RouteParams> {
		match self {
			Self::Anonymous => None,
			Self::Params(params) => Some(params),
		}
	}
}

/// A compiled, immutable matcher for one route pattern.
#[derive(Debug, Clone)]
pub(crate) struct CompiledPattern {
	regex: Regex,
	/// Parameter names in capture order; `None` marks an opaque regex with
	/// positional, unnamed captures.
	keys: Option<Vec<String>>,
}

impl CompiledPattern {
	/// Compiles a registered pattern.
	///
	/// # Errors
	///
	/// Returns [`RouterError::InvalidPath`] for an empty template, one that does
	/// not begin with `/` or `*`, a malformed `:name` segment, or one exceeding
	/// the size limits.
	pub(crate) fn compile(spec: &PathSpec) -> Result<Self, RouterError> {
		let pattern = match spec {
			PathSpec::Regex(re) => {
				return Ok(Self {
					regex: re.clone(),
					keys: None,
				});
			}
			PathSpec::Pattern(p) => p,
		};

		if pattern.is_empty() || !(pattern.starts_with('/') || pattern.starts_with('*')) {
			return Err(RouterError::invalid_path(
				pattern,
				"must begin with '/' or '*'",
			));
		}
		if pattern.len() > MAX_PATTERN_LENGTH {
			return Err(RouterError::invalid_path(
				pattern,
				format!("exceeds maximum length of {} bytes", MAX_PATTERN_LENGTH),
			));
		}
		if pattern.split('/').count() > MAX_PATH_SEGMENTS {
			return Err(RouterError::invalid_path(
				pattern,
				format!("exceeds maximum of {} path segments", MAX_PATH_SEGMENTS),
			));
		}

		let mut keys = Vec::new();
		let mut source = String::from("^");

		if pattern == "*" {
			source.push_str(".*");
		} else {
			for segment in pattern.trim_start_matches('/').split('/') {
				if segment == "*" {
					// Wildcard suffix: anything from here on, slashes included.
					source.push_str("/(?:.*)");
					break;
				} else if let Some(name) = segment.strip_prefix(':') {
					if name.is_empty()
						|| !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
					{
						return Err(RouterError::invalid_path(
							pattern,
							format!("malformed parameter segment ':{}'", name),
						));
					}
					keys.push(name.to_string());
					source.push_str("/([^/]+?)");
				} else if !segment.is_empty() {
					source.push('/');
					source.push_str(&regex::escape(segment));
				}
			}
			source.push_str("/?");
		}
		source.push('$');

		let regex = RegexBuilder::new(&source)
			.case_insensitive(true)
			.size_limit(MAX_REGEX_SIZE)
			.build()
			.map_err(|e| RouterError::invalid_path(pattern, format!("regex error: {}", e)))?;

		Ok(Self {
			regex,
			keys: Some(keys),
		})
	}

	/// Executes the pattern against a path.
	pub(crate) fn matches(&self, path: &str) -> Option<PatternMatch> {
		let captures = self.regex.captures(path)?;

		let keys = match &self.keys {
			None => {
				// Opaque regex: hand back the raw match array.
				let raw = captures
					.iter()
					.map(|group| group.map(|m| m.as_str().to_string()))
					.collect();
				return Some(PatternMatch::Params(RouteParams::Captures(raw)));
			}
			Some(keys) => keys,
		};

		if keys.is_empty() {
			return Some(PatternMatch::Anonymous);
		}

		let mut params = HashMap::with_capacity(keys.len());
		for (index, name) in keys.iter().enumerate() {
			let value = captures
				.get(index + 1)
				.and_then(|m| decode_param(m.as_str()));
			params.insert(name.clone(), value);
		}
		Some(PatternMatch::Params(RouteParams::Named(params)))
	}
}

/// Table-level prefix scoping for nested routers.
#[derive(Debug, Clone)]
pub enum Prefix {
	/// A literal path prefix, stripped verbatim.
	Literal(String),
	/// A regex prefix; the text it matches at the start of the path is stripped.
	Pattern(Regex),
}

impl Prefix {
	/// Strips the prefix from `path`.
	///
	/// Returns `None` when the path does not carry the prefix (in which case no
	/// route in the table may match). A stripped-empty remainder becomes `/`.
	pub(crate) fn strip(&self, path: &str) -> Option<String> {
		let remainder = match self {
			Self::Literal(prefix) => path.strip_prefix(prefix.as_str())?,
			Self::Pattern(re) => {
				let m = re.find(path).filter(|m| m.start() == 0)?;
				&path[m.end()..]
			}
		};
		if remainder.is_empty() {
			Some("/".to_string())
		} else {
			Some(remainder.to_string())
		}
	}
}

impl From<&str> for Prefix {
	fn from(value: &str) -> Self {
		Self::Literal(value.to_string())
	}
}

impl From<String> for Prefix {
	fn from(value: String) -> Self {
		Self::Literal(value)
	}
}

impl From<Regex> for Prefix {
	fn from(value: Regex) -> Self {
		Self::Pattern(value)
	}
}

/// Strictly percent-decodes one captured segment.
///
/// A malformed escape (a `%` not followed by two hex digits) or invalid UTF-8
/// yields `None` rather than an error.
fn decode_param(raw: &str) -> Option<String> {
	let bytes = raw.as_bytes();
	let mut i = 0;
	while i < bytes.len() {
		if bytes[i] == b'%' {
			if i + 2 >= bytes.len()
				|| !bytes[i + 1].is_ascii_hexdigit()
				|| !bytes[i + 2].is_ascii_hexdigit()
			{
				return None;
			}
			i += 3;
		} else {
			i += 1;
		}
	}
	percent_decode_str(raw)
		.decode_utf8()
		.ok()
		.map(|decoded| decoded.into_owned())
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn compile(pattern: &str) -> CompiledPattern {
		CompiledPattern::compile(&PathSpec::from(pattern)).expect("valid pattern")
	}

	fn named(pattern: &str, path: &str) -> HashMap<String, Option<String>> {
		match compile(pattern).matches(path) {
			Some(PatternMatch::Params(RouteParams::Named(map))) => map,
			other => panic!("expected named params, got {:?}", other),
		}
	}

	#[test]
	fn test_literal_pattern() {
		let pattern = compile("/users");
		assert!(matches!(
			pattern.matches("/users"),
			Some(PatternMatch::Anonymous)
		));
		assert!(pattern.matches("/users/42").is_none());
	}

	#[test]
	fn test_trailing_slash_and_case() {
		let pattern = compile("/Users");
		assert!(pattern.matches("/users/").is_some());
		assert!(pattern.matches("/USERS").is_some());
	}

	#[test]
	fn test_root_pattern() {
		let pattern = compile("/");
		assert!(pattern.matches("/").is_some());
		assert!(pattern.matches("/a").is_none());
	}

	#[test]
	fn test_named_param_extraction() {
		let params = named("/hello/:name", "/hello/svelte");
		assert_eq!(params.get("name"), Some(&Some("svelte".to_string())));
	}

	#[test]
	fn test_multiple_params() {
		let params = named("/a/:x/b/:y", "/a/1/b/2");
		assert_eq!(params["x"], Some("1".to_string()));
		assert_eq!(params["y"], Some("2".to_string()));
	}

	#[test]
	fn test_param_is_url_decoded() {
		let params = named("/hello/:name", "/hello/a%20b");
		assert_eq!(params["name"], Some("a b".to_string()));
	}

	#[rstest]
	#[case("/hello/%zz")]
	#[case("/hello/%F")]
	#[case("/hello/%FF")]
	fn test_undecodable_param_is_null(#[case] path: &str) {
		let params = named("/hello/:name", path);
		assert_eq!(params["name"], None);
	}

	#[test]
	fn test_catch_all_matches_everything_without_params() {
		let pattern = compile("*");
		assert!(matches!(
			pattern.matches("/does/not/exist"),
			Some(PatternMatch::Anonymous)
		));
		assert!(pattern.matches("/").is_some());
	}

	#[test]
	fn test_wildcard_suffix() {
		let pattern = compile("/files/*");
		assert!(pattern.matches("/files/a/b/c").is_some());
		assert!(pattern.matches("/other").is_none());
	}

	#[test]
	fn test_opaque_regex_returns_raw_captures() {
		let spec = PathSpec::from(Regex::new(r"^/book/(\d+)$").unwrap());
		let pattern = CompiledPattern::compile(&spec).unwrap();
		match pattern.matches("/book/42") {
			Some(PatternMatch::Params(RouteParams::Captures(raw))) => {
				assert_eq!(raw[0], Some("/book/42".to_string()));
				assert_eq!(raw[1], Some("42".to_string()));
			}
			other => panic!("expected raw captures, got {:?}", other),
		}
	}

	#[rstest]
	#[case("")]
	#[case("users")]
	#[case("hello/:name")]
	fn test_invalid_pattern_rejected(#[case] pattern: &str) {
		let result = CompiledPattern::compile(&PathSpec::from(pattern));
		assert!(matches!(result, Err(RouterError::InvalidPath { .. })));
	}

	#[test]
	fn test_malformed_param_segment_rejected() {
		let result = CompiledPattern::compile(&PathSpec::from("/a/:/b"));
		assert!(matches!(result, Err(RouterError::InvalidPath { .. })));
	}

	#[test]
	fn test_pattern_length_limit() {
		let long = format!("/{}", "a".repeat(MAX_PATTERN_LENGTH + 1));
		let result = CompiledPattern::compile(&PathSpec::from(long));
		assert!(matches!(result, Err(RouterError::InvalidPath { .. })));
	}

	#[test]
	fn test_literal_prefix_strip() {
		let prefix = Prefix::from("/app");
		assert_eq!(prefix.strip("/app/list"), Some("/list".to_string()));
		assert_eq!(prefix.strip("/app"), Some("/".to_string()));
		assert_eq!(prefix.strip("/other"), None);
	}

	#[test]
	fn test_regex_prefix_strip() {
		let prefix = Prefix::from(Regex::new(r"^/(?:en|ja)").unwrap());
		assert_eq!(prefix.strip("/en/list"), Some("/list".to_string()));
		assert_eq!(prefix.strip("/ja"), Some("/".to_string()));
		assert_eq!(prefix.strip("/fr/list"), None);
	}

	#[test]
	fn test_missing_capture_yields_null() {
		// An optional group that does not participate in the match.
		let spec = PathSpec::from("/a/:x");
		let pattern = CompiledPattern::compile(&spec).unwrap();
		// All declared keys participate here; absence is exercised through the
		// opaque-regex path instead.
		assert!(pattern.matches("/a/1").is_some());

		let spec = PathSpec::from(Regex::new(r"^/v/(\d+)?/?$").unwrap());
		let pattern = CompiledPattern::compile(&spec).unwrap();
		match pattern.matches("/v//") {
			Some(PatternMatch::Params(RouteParams::Captures(raw))) => {
				assert_eq!(raw[1], None);
			}
			other => panic!("expected captures, got {:?}", other),
		}
	}
}

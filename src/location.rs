//! Location snapshots.
//!
//! A [`Location`] is an immutable parse of the hash fragment, produced once per
//! hash change. The router shares snapshots as `Arc<Location>` so it can tell by
//! pointer identity whether an in-flight resolution has been superseded.

use std::sync::Arc;

use serde::Serialize;

/// An immutable `{path, querystring}` snapshot of the hash fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
	/// The path portion, always beginning with `/`.
	pub path: String,
	/// The querystring portion, without the leading `?`. Empty when absent.
	pub querystring: String,
}

impl Location {
	/// Parses a hash fragment (or a full href containing one).
	///
	/// Everything after the first `#/` is the location; within it, the first `?`
	/// splits path from querystring. Input without a `#/` marker collapses to `/`.
	pub fn parse(hash: &str) -> Self {
		let location = match hash.find("#/") {
			Some(pos) => &hash[pos + 1..],
			None => "/",
		};

		match location.find('?') {
			Some(qs_pos) => Self {
				path: location[..qs_pos].to_string(),
				querystring: location[qs_pos + 1..].to_string(),
			},
			None => Self {
				path: location.to_string(),
				querystring: String::new(),
			},
		}
	}

	/// Parses into a shared snapshot.
	pub fn parse_arc(hash: &str) -> Arc<Self> {
		Arc::new(Self::parse(hash))
	}
}

impl std::fmt::Display for Location {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		if self.querystring.is_empty() {
			write!(f, "{}", self.path)
		} else {
			write!(f, "{}?{}", self.path, self.querystring)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("#/hello/svelte?quantity=100", "/hello/svelte", "quantity=100")]
	#[case("#/hello/svelte", "/hello/svelte", "")]
	#[case("#/", "/", "")]
	#[case("", "/", "")]
	#[case("#nothash", "/", "")]
	#[case("https://example.com/app#/list?page=2", "/list", "page=2")]
	fn test_parse(#[case] input: &str, #[case] path: &str, #[case] querystring: &str) {
		let loc = Location::parse(input);
		assert_eq!(loc.path, path);
		assert_eq!(loc.querystring, querystring);
	}

	#[test]
	fn test_querystring_excludes_question_mark() {
		let loc = Location::parse("#/a?b=1&c=2");
		assert_eq!(loc.querystring, "b=1&c=2");
	}

	#[test]
	fn test_display_round_trip() {
		assert_eq!(Location::parse("#/a?b=1").to_string(), "/a?b=1");
		assert_eq!(Location::parse("#/a").to_string(), "/a");
	}
}

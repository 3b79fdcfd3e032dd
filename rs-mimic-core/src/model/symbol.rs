use std::fmt;

/// Character used as the START sentinel at the serialization boundary.
pub const START_CHAR: char = '\u{2}';

/// Character used as the END sentinel at the serialization boundary.
pub const END_CHAR: char = '\u{3}';

/// One element of an example string as seen by the chain.
///
/// `Start` and `End` bound every example so the chain learns which characters
/// open and close a word. They never come from user text.
///
/// The derived order (`Start < Char(_) < End`, chars by code point) is the
/// iteration order of every mapping in the chain, which the weighted sampler
/// depends on for reproducibility.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
	Start,
	Char(char),
	End,
}

impl Symbol {
	/// Returns the single character representing this symbol in a serialized chain.
	pub fn as_key(self) -> char {
		match self {
			Symbol::Start => START_CHAR,
			Symbol::Char(c) => c,
			Symbol::End => END_CHAR,
		}
	}

	/// Parses a serialized key back into a symbol.
	///
	/// Returns `None` unless the key is exactly one character.
	pub fn from_key(key: &str) -> Option<Self> {
		let mut chars = key.chars();
		let c = chars.next()?;
		if chars.next().is_some() {
			return None;
		}
		Some(match c {
			START_CHAR => Symbol::Start,
			END_CHAR => Symbol::End,
			c => Symbol::Char(c),
		})
	}

	/// Whether this symbol is one of the two sentinels.
	pub fn is_sentinel(self) -> bool {
		!matches!(self, Symbol::Char(_))
	}
}

impl fmt::Display for Symbol {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Symbol::Start => f.write_str("START"),
			Symbol::Char(c) => write!(f, "{c}"),
			Symbol::End => f.write_str("END"),
		}
	}
}

/// A transition observed in an example: `next` came right after `premise`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Match {
	pub premise: Symbol,
	pub next: Symbol,
}

impl Match {
	pub fn new(premise: Symbol, next: Symbol) -> Self {
		Self { premise, next }
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sentinels_sort_around_chars() {
		assert!(Symbol::Start < Symbol::Char('\0'));
		assert!(Symbol::Char(char::MAX) < Symbol::End);
		assert!(Symbol::Char('a') < Symbol::Char('b'));
	}

	#[test]
	fn keys_round_trip() {
		for symbol in [Symbol::Start, Symbol::End, Symbol::Char('é'), Symbol::Char('^')] {
			let key = symbol.as_key().to_string();
			assert_eq!(Symbol::from_key(&key), Some(symbol));
		}
	}

	#[test]
	fn multi_char_keys_are_rejected() {
		assert_eq!(Symbol::from_key(""), None);
		assert_eq!(Symbol::from_key("ab"), None);
	}
}

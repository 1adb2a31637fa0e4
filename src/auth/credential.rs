//! Bearer credential wrapper that redacts the token in formatted output.

// self
use crate::_prelude::*;

/// Opaque bearer token.
///
/// An empty string means "absent", so [`Credential::new`] refuses to wrap one.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Credential(String);
impl Credential {
	/// Wraps a token, returning `None` when `value` is empty.
	pub fn new(value: impl Into<String>) -> Option<Self> {
		let value = value.into();

		if value.is_empty() { None } else { Some(Self(value)) }
	}

	/// Returns the raw token. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Consumes the wrapper and returns the raw token.
	pub fn into_inner(self) -> String {
		self.0
	}
}
impl AsRef<str> for Credential {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("Credential").field(&"<redacted>").finish()
	}
}
impl Display for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn empty_values_are_absent() {
		assert!(Credential::new("").is_none());
		assert_eq!(Credential::new("tok").map(Credential::into_inner).as_deref(), Some("tok"));
	}

	#[test]
	fn credential_formatters_redact() {
		let credential = Credential::new("super-secret").expect("Non-empty token should wrap.");

		assert_eq!(format!("{credential:?}"), "Credential(\"<redacted>\")");
		assert_eq!(format!("{credential}"), "<redacted>");
		assert_eq!(credential.expose(), "super-secret");
	}
}

//! Environment lookups used by the token and project resolvers.
//!
//! Every read goes through [`EnvSource`] so callers (and tests) can substitute a fixed map
//! for the real process environment. Empty values are reported as unset.

// self
use crate::_prelude::*;

/// Primary API token variable.
pub const DEPOT_TOKEN: &str = "DEPOT_TOKEN";
/// Project identifier variable.
pub const DEPOT_PROJECT_ID: &str = "DEPOT_PROJECT_ID";

/// Read-only view over environment variables.
pub trait EnvSource
where
	Self: Send + Sync,
{
	/// Returns the raw value for `key`, if defined.
	fn raw(&self, key: &str) -> Option<String>;

	/// Returns the value for `key`, treating an empty value as unset.
	fn var(&self, key: &str) -> Option<String> {
		self.raw(key).filter(|value| !value.is_empty())
	}
}

/// [`EnvSource`] backed by the current process environment.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessEnv;
impl EnvSource for ProcessEnv {
	fn raw(&self, key: &str) -> Option<String> {
		std::env::var(key).ok()
	}
}

impl EnvSource for HashMap<String, String> {
	fn raw(&self, key: &str) -> Option<String> {
		self.get(key).cloned()
	}
}

impl EnvSource for BTreeMap<String, String> {
	fn raw(&self, key: &str) -> Option<String> {
		self.get(key).cloned()
	}
}

/// Builds a [`BTreeMap`] environment from key/value pairs.
pub fn from_pairs<I, K, V>(pairs: I) -> BTreeMap<String, String>
where
	I: IntoIterator<Item = (K, V)>,
	K: Into<String>,
	V: Into<String>,
{
	pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn empty_values_read_as_unset() {
		let env = from_pairs([(DEPOT_TOKEN, ""), (DEPOT_PROJECT_ID, "proj")]);

		assert_eq!(env.raw(DEPOT_TOKEN).as_deref(), Some(""));
		assert_eq!(env.var(DEPOT_TOKEN), None);
		assert_eq!(env.var(DEPOT_PROJECT_ID).as_deref(), Some("proj"));
		assert_eq!(env.var("MISSING"), None);
	}
}

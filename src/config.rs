//! Persisted user configuration holding the API token written by `depot login`.
//!
//! This crate only reads the file; tokens are never written back.

// std
use std::{fs, io::ErrorKind};
// self
use crate::{_prelude::*, env::EnvSource, error::ConfigError};

/// Directory (under the XDG config home) holding the user config.
pub const CONFIG_DIR_NAME: &str = "depot";
/// File name of the user config.
pub const CONFIG_FILE_NAME: &str = "depot.yaml";

/// Subset of the user config this crate understands.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
	/// Persisted API token, if the user has logged in.
	#[serde(default)]
	pub api_token: Option<String>,
}
impl UserConfig {
	/// Loads the config at `path`.
	///
	/// A missing file is not an error and yields the default (empty) config.
	pub fn load(path: &Path) -> Result<Self, ConfigError> {
		let raw = match fs::read_to_string(path) {
			Ok(raw) => raw,
			Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
			Err(e) => return Err(user_config_error(path, e)),
		};

		if raw.trim().is_empty() {
			return Ok(Self::default());
		}

		serde_yaml::from_str(&raw).map_err(|e| user_config_error(path, e))
	}

	/// Returns the persisted token, treating an empty value as absent.
	pub fn api_token(&self) -> Option<&str> {
		self.api_token.as_deref().filter(|token| !token.is_empty())
	}
}
impl Debug for UserConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("UserConfig").field("api_token_set", &self.api_token().is_some()).finish()
	}
}

/// Resolves the default user config path: `$XDG_CONFIG_HOME/depot/depot.yaml`, falling back
/// to `$HOME/.config/depot/depot.yaml`.
pub fn default_path(env: &dyn EnvSource) -> Option<PathBuf> {
	let base = env
		.var("XDG_CONFIG_HOME")
		.map(PathBuf::from)
		.or_else(|| env.var("HOME").map(|home| PathBuf::from(home).join(".config")))?;

	Some(base.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

fn user_config_error(path: &Path, e: impl Display) -> ConfigError {
	ConfigError::UserConfig { path: path.to_path_buf(), message: e.to_string() }
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::env;

	#[test]
	fn default_path_prefers_xdg_config_home() {
		let env = env::from_pairs([("XDG_CONFIG_HOME", "/xdg"), ("HOME", "/home/me")]);

		assert_eq!(default_path(&env), Some(PathBuf::from("/xdg/depot/depot.yaml")));

		let env = env::from_pairs([("HOME", "/home/me")]);

		assert_eq!(default_path(&env), Some(PathBuf::from("/home/me/.config/depot/depot.yaml")));
		assert_eq!(default_path(&BTreeMap::<String, String>::new()), None);
	}

	#[test]
	fn load_reads_token_and_tolerates_missing_file() {
		let dir = tempfile::tempdir().expect("Temporary directory should be created.");
		let path = dir.path().join(CONFIG_FILE_NAME);

		assert_eq!(UserConfig::load(&path).expect("Missing file should load.").api_token(), None);

		fs::write(&path, "api_token: from-config\nother: ignored\n")
			.expect("Config fixture should be written.");

		let config = UserConfig::load(&path).expect("Config fixture should parse.");

		assert_eq!(config.api_token(), Some("from-config"));
		assert_eq!(format!("{config:?}"), "UserConfig { api_token_set: true }");
	}

	#[test]
	fn load_reports_malformed_yaml() {
		let dir = tempfile::tempdir().expect("Temporary directory should be created.");
		let path = dir.path().join(CONFIG_FILE_NAME);

		fs::write(&path, "api_token: [unterminated").expect("Config fixture should be written.");

		let err = UserConfig::load(&path).expect_err("Malformed YAML should be rejected.");

		assert!(matches!(err, ConfigError::UserConfig { .. }));
	}
}

//! Per-call context handed to the resolver and identity providers.

// self
use crate::{
	_prelude::*,
	config,
	env::{EnvSource, ProcessEnv},
	obs::{Logger, default_logger},
};

/// Everything a resolution step may consult: environment, logger, and user config path.
///
/// Providers carry no state of their own; whatever they need is read from the context on
/// each call.
#[derive(Clone)]
pub struct Context {
	env: Arc<dyn EnvSource>,
	logger: Arc<dyn Logger>,
	user_config_path: Option<PathBuf>,
}
impl Context {
	/// Creates a context over `env` with the default logger.
	pub fn new(env: Arc<dyn EnvSource>) -> Self {
		Self { env, logger: default_logger(), user_config_path: None }
	}

	/// Creates a context over the process environment.
	pub fn from_env() -> Self {
		Self::new(Arc::new(ProcessEnv))
	}

	/// Replaces the logger.
	pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
		self.logger = logger;

		self
	}

	/// Overrides where the persisted user config is read from.
	pub fn with_user_config_path(mut self, path: impl Into<PathBuf>) -> Self {
		self.user_config_path = Some(path.into());

		self
	}

	/// Environment source.
	pub fn env(&self) -> &dyn EnvSource {
		self.env.as_ref()
	}

	/// Logger.
	pub fn logger(&self) -> &dyn Logger {
		self.logger.as_ref()
	}

	/// Reads a variable, treating empty values as unset.
	pub fn var(&self, key: &str) -> Option<String> {
		self.env.var(key)
	}

	/// User config path: the override, or the XDG default derived from the environment.
	pub fn user_config_path(&self) -> Option<PathBuf> {
		self.user_config_path.clone().or_else(|| config::default_path(self.env()))
	}
}
impl Default for Context {
	fn default() -> Self {
		Self::from_env()
	}
}
impl Debug for Context {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Context").field("user_config_path", &self.user_config_path).finish()
	}
}

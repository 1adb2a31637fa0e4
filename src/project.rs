//! Project identifier discovery.
//!
//! An explicit id wins, then `DEPOT_PROJECT_ID`. Otherwise every input path is mapped to a
//! starting directory and each starting directory is walked upward to the filesystem root
//! looking for `depot.json`, `depot.yml`, or `depot.yaml` (checked in that order at every
//! level). The first file found per starting directory supplies one id.
//!
//! When several inputs resolve to different ids, the id of the *last* config parsed is
//! returned, even if that config carries no id. Conflicts are not rejected; they are only
//! reported through the logger.

// std
use std::{
	fs,
	io::{self, ErrorKind},
	path::Component,
};
// self
use crate::{
	_prelude::*,
	env::{DEPOT_PROJECT_ID, EnvSource, ProcessEnv},
	obs::{Field, Logger, default_logger},
};

/// Recognized config file names, in lookup order.
pub const CONFIG_FILE_NAMES: [&str; 3] = ["depot.json", "depot.yml", "depot.yaml"];
/// Input path standing for stdin; resolves to the current directory.
pub const STDIN_PLACEHOLDER: &str = "-";

/// Project config file contents; only `id` is read.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
	/// Project identifier.
	#[serde(default)]
	pub id: String,
}

/// Per-starting-point failures. The resolver skips the starting point on any of these.
#[derive(Debug, ThisError)]
pub enum ProjectError {
	/// No recognized config file between the start directory and the filesystem root.
	#[error("No project config found from {} up to the filesystem root.", .start.display())]
	NotFound {
		/// Directory the walk started from.
		start: PathBuf,
	},
	/// Config file exists but could not be read.
	#[error("Failed to read project config {}.", .path.display())]
	Io {
		/// Config file path.
		path: PathBuf,
		/// Underlying IO failure.
		#[source]
		source: io::Error,
	},
	/// Config file could not be parsed.
	#[error("Failed to parse project config {}.", .path.display())]
	Parse {
		/// Config file path.
		path: PathBuf,
		/// Underlying YAML failure.
		#[source]
		source: serde_yaml::Error,
	},
}

/// Ids gathered across every starting directory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProjectIds {
	/// Distinct ids.
	pub unique: BTreeSet<String>,
	/// Id of the last config parsed, even when that id is empty.
	pub last: Option<String>,
}
impl ProjectIds {
	/// Whether different inputs named different projects.
	pub fn is_ambiguous(&self) -> bool {
		self.unique.len() > 1
	}
}

/// Resolves the project a build targets.
#[derive(Clone)]
pub struct ProjectResolver {
	env: Arc<dyn EnvSource>,
	logger: Arc<dyn Logger>,
	current_dir: Option<PathBuf>,
}
impl ProjectResolver {
	/// Creates a resolver over `env`.
	pub fn new(env: Arc<dyn EnvSource>) -> Self {
		Self { env, logger: default_logger(), current_dir: None }
	}

	/// Creates a resolver over the process environment.
	pub fn from_env() -> Self {
		Self::new(Arc::new(ProcessEnv))
	}

	/// Replaces the logger.
	pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
		self.logger = logger;

		self
	}

	/// Uses `dir` instead of the process working directory for relative inputs and stdin.
	pub fn with_current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
		self.current_dir = Some(dir.into());

		self
	}

	/// Returns the project id, or an empty string when none can be determined.
	pub fn resolve<P>(&self, explicit: &str, files: &[P]) -> String
	where
		P: AsRef<Path>,
	{
		if !explicit.is_empty() {
			return explicit.to_owned();
		}
		if let Some(id) = self.env.var(DEPOT_PROJECT_ID) {
			return id;
		}

		self.collect(files).last.unwrap_or_default()
	}

	/// Scans every starting directory derived from `files` and gathers the ids found.
	pub fn collect<P>(&self, files: &[P]) -> ProjectIds
	where
		P: AsRef<Path>,
	{
		let mut ids = ProjectIds::default();
		let cwd = match self.current_dir() {
			Ok(cwd) => cwd,
			Err(e) => {
				self.logger.debug("Cannot determine working directory", &[Field::new(
					"error", &e,
				)]);

				return ids;
			},
		};

		for dir in working_directories(files, &cwd) {
			match read_config(&dir) {
				Ok((config, _)) => {
					ids.unique.insert(config.id.clone());
					ids.last = Some(config.id);
				},
				Err(ProjectError::NotFound { .. }) => {},
				Err(e) => {
					self.logger.debug("Skipping unreadable project config", &[Field::new(
						"error", &e,
					)]);
				},
			}
		}

		if ids.is_ambiguous() {
			let unique = ids.unique.iter().cloned().collect::<Vec<_>>().join(",");
			let chosen = ids.last.clone().unwrap_or_default();

			self.logger.debug("Multiple project ids found; using the last one", &[
				Field::new("ids", &unique),
				Field::new("chosen", &chosen),
			]);
		}

		ids
	}

	fn current_dir(&self) -> io::Result<PathBuf> {
		match &self.current_dir {
			Some(dir) => Ok(dir.clone()),
			None => std::env::current_dir(),
		}
	}
}
impl Default for ProjectResolver {
	fn default() -> Self {
		Self::from_env()
	}
}
impl Debug for ProjectResolver {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ProjectResolver").field("current_dir", &self.current_dir).finish()
	}
}

/// Resolves the project id against the process environment and working directory.
pub fn resolve_project_id<P>(explicit: &str, files: &[P]) -> String
where
	P: AsRef<Path>,
{
	ProjectResolver::from_env().resolve(explicit, files)
}

/// Maps input paths to absolute starting directories.
///
/// No inputs, the stdin placeholder, and empty paths map to `cwd`. Existing directories are
/// used as-is; anything else maps to its parent directory.
pub fn working_directories<P>(files: &[P], cwd: &Path) -> Vec<PathBuf>
where
	P: AsRef<Path>,
{
	if files.is_empty() {
		return vec![normalize(cwd)];
	}

	files
		.iter()
		.map(|file| {
			let file = file.as_ref();

			if file.as_os_str().is_empty() || file == Path::new(STDIN_PLACEHOLDER) {
				return normalize(cwd);
			}

			let path = normalize(&cwd.join(file));

			if path.is_dir() {
				path
			} else {
				path.parent().map(Path::to_path_buf).unwrap_or(path)
			}
		})
		.collect()
}

/// Walks from `start` to the filesystem root and returns the first recognized config file.
pub fn find_config_file_up(start: &Path) -> Result<PathBuf, ProjectError> {
	for dir in start.ancestors() {
		for name in CONFIG_FILE_NAMES {
			let candidate = dir.join(name);

			if fs::metadata(&candidate).is_ok() {
				return Ok(candidate);
			}
		}
	}

	Err(ProjectError::NotFound { start: start.to_path_buf() })
}

/// Finds and parses the config governing `dir`, returning it with its path.
pub fn read_config(dir: &Path) -> Result<(ProjectConfig, PathBuf), ProjectError> {
	let path = find_config_file_up(dir)?;
	let raw = fs::read_to_string(&path).map_err(|source| match source.kind() {
		ErrorKind::NotFound => ProjectError::NotFound { start: dir.to_path_buf() },
		_ => ProjectError::Io { path: path.clone(), source },
	})?;

	// An empty file is a config without an id.
	if raw.trim().is_empty() {
		return Ok((ProjectConfig::default(), path));
	}

	let config = serde_yaml::from_str(&raw)
		.map_err(|source| ProjectError::Parse { path: path.clone(), source })?;

	Ok((config, path))
}

fn normalize(path: &Path) -> PathBuf {
	let mut out = PathBuf::new();

	for component in path.components() {
		match component {
			Component::CurDir => {},
			Component::ParentDir => {
				out.pop();
			},
			other => out.push(other),
		}
	}

	out
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn normalize_removes_dot_segments() {
		assert_eq!(normalize(Path::new("/repo/./sub/../other")), PathBuf::from("/repo/other"));
		assert_eq!(normalize(Path::new("/../..")), PathBuf::from("/"));
	}

	#[test]
	fn working_directories_default_to_cwd() {
		let cwd = Path::new("/work");

		assert_eq!(working_directories::<&str>(&[], cwd), [PathBuf::from("/work")]);
		assert_eq!(working_directories(&["-", ""], cwd), [
			PathBuf::from("/work"),
			PathBuf::from("/work")
		]);
		assert_eq!(working_directories(&["sub/Dockerfile", "/abs/Dockerfile"], cwd), [
			PathBuf::from("/work/sub"),
			PathBuf::from("/abs")
		]);
	}

	#[test]
	fn config_files_are_checked_in_fixed_order() {
		let root = tempfile::tempdir().expect("Temporary directory should be created.");

		fs::write(root.path().join("depot.yaml"), "id: from-yaml\n")
			.expect("Fixture should be written.");
		fs::write(root.path().join("depot.json"), r#"{"id": "from-json"}"#)
			.expect("Fixture should be written.");

		let (config, path) = read_config(root.path()).expect("Config should be found.");

		assert_eq!(config.id, "from-json");
		assert_eq!(path, root.path().join("depot.json"));
	}

	#[test]
	fn nearest_ancestor_wins() {
		let root = tempfile::tempdir().expect("Temporary directory should be created.");
		let nested = root.path().join("a/b/c");

		fs::create_dir_all(&nested).expect("Nested directories should be created.");
		fs::write(root.path().join("depot.yml"), "id: outer\n").expect("Fixture should be written.");
		fs::write(root.path().join("a/depot.yml"), "id: inner\n").expect("Fixture should be written.");

		let (config, _) = read_config(&nested).expect("Config should be found.");

		assert_eq!(config.id, "inner");
	}

	#[test]
	fn empty_config_file_has_empty_id() {
		let root = tempfile::tempdir().expect("Temporary directory should be created.");

		fs::write(root.path().join("depot.yaml"), "\n").expect("Fixture should be written.");

		let (config, _) = read_config(root.path()).expect("Empty config should parse.");

		assert_eq!(config, ProjectConfig::default());
	}

	#[test]
	fn malformed_config_is_a_parse_error() {
		let root = tempfile::tempdir().expect("Temporary directory should be created.");

		fs::write(root.path().join("depot.json"), "id: [").expect("Fixture should be written.");

		let err = read_config(root.path()).expect_err("Malformed config should fail.");

		assert!(matches!(err, ProjectError::Parse { .. }));
	}
}

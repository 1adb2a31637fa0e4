//! Crate-level error types shared by the resolver, providers, and request pipeline.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Every credential source was consulted and none produced a token.
	#[error("No token found.")]
	NoTokenFound,
	/// An identity provider failed after its platform signals were present.
	#[error(transparent)]
	Provider(#[from] ProviderError),
	/// Transport failure (DNS, TCP, TLS, timeouts).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// API call failed at the request or response layer.
	#[error(transparent)]
	Api(#[from] ApiError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
}

/// Failures raised by a single identity provider.
///
/// The token resolver swallows these after logging them; they only surface when a
/// provider is invoked directly.
#[derive(Debug, ThisError)]
pub enum ProviderError {
	/// Identity endpoint answered with a non-success status.
	#[error("{provider} identity request failed with status: {status}.")]
	Status {
		/// Provider name.
		provider: &'static str,
		/// Status line, e.g. `403 Forbidden`.
		status: String,
	},
	/// Identity endpoint returned a body that does not match the expected shape.
	#[error("{provider} returned a malformed identity response.")]
	Malformed {
		/// Provider name.
		provider: &'static str,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Identity endpoint URL could not be constructed.
	#[error("{provider} identity endpoint is invalid.")]
	InvalidEndpoint {
		/// Provider name.
		provider: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// HTTP client for the identity request could not be built.
	#[error("{provider} identity client could not be constructed.")]
	Config {
		/// Provider name.
		provider: &'static str,
		/// Construction failure.
		#[source]
		source: ConfigError,
	},
	/// Network failure while talking to the identity endpoint.
	#[error("{provider} identity request failed.")]
	Transport {
		/// Provider name.
		provider: &'static str,
		/// Transport failure.
		#[source]
		source: TransportError,
	},
}
impl ProviderError {
	/// Wraps a transport failure with the provider's name.
	pub fn transport(provider: &'static str, source: impl Into<TransportError>) -> Self {
		Self::Transport { provider, source: source.into() }
	}

	/// Name of the provider that produced the failure.
	pub fn provider(&self) -> &'static str {
		match self {
			Self::Status { provider, .. }
			| Self::Malformed { provider, .. }
			| Self::InvalidEndpoint { provider, .. }
			| Self::Config { provider, .. }
			| Self::Transport { provider, .. } => provider,
		}
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling {url}.")]
	Network {
		/// Target URL, when known.
		url: String,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred during transport.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(url: impl Into<String>, src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { url: url.into(), source: Box::new(src) }
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		let url = e.url().map(|u| u.as_str().to_owned()).unwrap_or_default();

		Self::network(url, e)
	}
}

/// Request pipeline failures that are not transport-related.
#[derive(Debug, ThisError)]
pub enum ApiError {
	/// Request payload could not be serialized; no network call was made.
	#[error("Failed to encode the request payload.")]
	Encode(#[source] serde_json::Error),
	/// Server answered with `{"ok": false, "error": ...}`.
	#[error("{message}")]
	Envelope {
		/// Server-provided error message.
		message: String,
	},
	/// Response body did not match the expected shape.
	#[error("Failed to decode response body: {body}")]
	Decode {
		/// Raw response body text.
		body: String,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}

/// Configuration and request construction failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Request URL cannot be parsed.
	#[error("Request URL `{url}` is invalid.")]
	InvalidUrl {
		/// Offending URL text.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// User config file exists but could not be read or parsed.
	#[error("User config {} could not be loaded: {message}.", .path.display())]
	UserConfig {
		/// Config file path.
		path: PathBuf,
		/// Human-readable failure.
		message: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

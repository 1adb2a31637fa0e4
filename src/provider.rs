//! CI identity providers and the ordered registry the token resolver consults.
//!
//! Each provider detects its CI platform from the environment carried by
//! [`Context`]. When the platform's signals are absent the provider answers `Ok(None)`;
//! errors are reserved for genuine failures after the signals were present. Providers keep
//! no state between calls and never retry.

pub mod actions_public;
pub mod buildkite;
pub mod circleci;
pub mod github;

pub use actions_public::ActionsPublicProvider;
pub use buildkite::BuildkiteProvider;
pub use circleci::CircleCiProvider;
pub use github::GitHubProvider;

// self
use crate::{
	_prelude::*,
	auth::{Context, Credential},
	error::ProviderError,
	transport::{HttpClient, RawResponse},
};

/// Audience requested for every identity token, scoping it to the Depot API.
pub const AUDIENCE: &str = "https://depot.dev";

/// Future returned by [`IdentityProvider::retrieve_token`].
pub type ProviderFuture<'a> =
	Pin<Box<dyn Future<Output = Result<Option<Credential>, ProviderError>> + 'a + Send>>;

/// Platform-specific strategy for obtaining a Depot credential from a CI identity.
pub trait IdentityProvider
where
	Self: Send + Sync,
{
	/// Stable name used in diagnostics.
	fn name(&self) -> &'static str;

	/// Fetches a credential.
	///
	/// Returns `Ok(None)` when the current environment is not this provider's platform.
	fn retrieve_token<'a>(&'a self, ctx: &'a Context) -> ProviderFuture<'a>;
}

/// Immutable, ordered list of identity providers; the first success wins.
#[derive(Clone)]
pub struct ProviderRegistry(Arc<[Arc<dyn IdentityProvider>]>);
impl ProviderRegistry {
	/// Creates a registry preserving the iteration order of `providers`.
	pub fn new(providers: impl IntoIterator<Item = Arc<dyn IdentityProvider>>) -> Self {
		Self(providers.into_iter().collect())
	}

	/// Built-in providers in resolution order: github, circleci, buildkite, actions-public.
	pub fn builtin() -> Self {
		Self::new([
			Arc::new(GitHubProvider::new()) as Arc<dyn IdentityProvider>,
			Arc::new(CircleCiProvider::new()),
			Arc::new(BuildkiteProvider::new()),
			Arc::new(ActionsPublicProvider::default()),
		])
	}

	/// Iterates providers in declared order.
	pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn IdentityProvider>> {
		self.0.iter()
	}

	/// Provider names in declared order.
	pub fn names(&self) -> Vec<&'static str> {
		self.iter().map(|p| p.name()).collect()
	}

	/// Number of providers.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Whether the registry has no providers.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl Debug for ProviderRegistry {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("ProviderRegistry").field(&self.names()).finish()
	}
}

static REGISTRY: LazyLock<ProviderRegistry> = LazyLock::new(ProviderRegistry::builtin);

/// Process-wide registry of built-in providers, constructed on first use.
pub fn registry() -> &'static ProviderRegistry {
	&REGISTRY
}

fn short_lived_client(provider: &'static str) -> Result<HttpClient, ProviderError> {
	HttpClient::short_lived().map_err(|source| ProviderError::Config { provider, source })
}

fn parse_endpoint(provider: &'static str, raw: &str) -> Result<Url, ProviderError> {
	Url::parse(raw).map_err(|source| ProviderError::InvalidEndpoint { provider, source })
}

fn decode_success<T>(provider: &'static str, response: &RawResponse) -> Result<T, ProviderError>
where
	T: DeserializeOwned,
{
	if !response.is_success() {
		return Err(ProviderError::Status { provider, status: response.status_line() });
	}

	response.json().map_err(|source| ProviderError::Malformed { provider, source })
}

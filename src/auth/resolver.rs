//! Ordered credential fallback chain.
//!
//! Sources are consulted in a fixed order and the first non-empty token wins:
//!
//! 1. the explicit token passed by the caller,
//! 2. the `DEPOT_TOKEN` environment variable,
//! 3. the `api_token` key of the persisted user config,
//! 4. each identity provider of the [`ProviderRegistry`], strictly in declared order.
//!
//! A failing provider is logged at debug level and skipped; it never aborts the chain.

// self
use crate::{
	_prelude::*,
	auth::{Context, Credential},
	config::UserConfig,
	env::DEPOT_TOKEN,
	obs::{Field, OpKind, observe},
	provider::{ProviderRegistry, registry},
};

/// Where a resolved credential came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenSource {
	/// Supplied by the caller.
	Explicit,
	/// Read from `DEPOT_TOKEN`.
	Environment,
	/// Read from the persisted user config.
	UserConfig,
	/// Issued by the named identity provider.
	Provider(&'static str),
}
impl Display for TokenSource {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Explicit => f.write_str("explicit"),
			Self::Environment => f.write_str("environment"),
			Self::UserConfig => f.write_str("user-config"),
			Self::Provider(name) => write!(f, "provider:{name}"),
		}
	}
}

/// Applies the credential fallback chain against a provider registry.
#[derive(Clone, Debug)]
pub struct TokenResolver {
	registry: ProviderRegistry,
}
impl TokenResolver {
	/// Creates a resolver that consults `registry` after the local sources.
	pub fn new(registry: ProviderRegistry) -> Self {
		Self { registry }
	}

	/// Registry consulted by the final fallback step.
	pub fn registry(&self) -> &ProviderRegistry {
		&self.registry
	}

	/// Resolves a credential, failing with [`Error::NoTokenFound`] when every source is empty.
	pub async fn resolve(&self, ctx: &Context, explicit: &str) -> Result<Credential> {
		self.resolve_with_source(ctx, explicit).await.map(|(credential, _)| credential)
	}

	/// Same as [`TokenResolver::resolve`] but also reports which source won.
	pub async fn resolve_with_source(
		&self,
		ctx: &Context,
		explicit: &str,
	) -> Result<(Credential, TokenSource)> {
		observe(OpKind::TokenResolution, "resolve", async move {
			self.first_available(ctx, explicit).await.ok_or(Error::NoTokenFound)
		})
		.await
	}

	async fn first_available(
		&self,
		ctx: &Context,
		explicit: &str,
	) -> Option<(Credential, TokenSource)> {
		if let Some(credential) = Credential::new(explicit) {
			return Some((credential, TokenSource::Explicit));
		}
		if let Some(credential) = ctx.var(DEPOT_TOKEN).and_then(Credential::new) {
			return Some((credential, TokenSource::Environment));
		}
		if let Some(credential) = from_user_config(ctx) {
			return Some((credential, TokenSource::UserConfig));
		}

		self.from_providers(ctx).await
	}

	async fn from_providers(&self, ctx: &Context) -> Option<(Credential, TokenSource)> {
		for provider in self.registry.iter() {
			let name = provider.name();

			ctx.logger().debug("Trying OIDC provider", &[Field::new("provider", &name)]);

			match observe(OpKind::ProviderAttempt, name, provider.retrieve_token(ctx)).await {
				Ok(Some(credential)) => return Some((credential, TokenSource::Provider(name))),
				Ok(None) => {},
				Err(e) => {
					ctx.logger().debug("OIDC provider failed", &[
						Field::new("provider", &name),
						Field::new("error", &e),
					]);
				},
			}
		}

		None
	}
}
impl Default for TokenResolver {
	fn default() -> Self {
		Self::new(registry().clone())
	}
}

/// Resolves a credential with the process-wide provider registry.
pub async fn resolve_token(ctx: &Context, explicit: &str) -> Result<Credential> {
	TokenResolver::default().resolve(ctx, explicit).await
}

fn from_user_config(ctx: &Context) -> Option<Credential> {
	let path = ctx.user_config_path()?;

	match UserConfig::load(&path) {
		Ok(config) => config.api_token().and_then(Credential::new),
		Err(e) => {
			ctx.logger().debug("Ignoring unreadable user config", &[Field::new("error", &e)]);

			None
		},
	}
}

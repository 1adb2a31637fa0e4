//! CircleCI OIDC provider.
//!
//! CircleCI mints a job-scoped identity token for every job and injects it into the job
//! environment, so no network round trip is needed here.
//!
//! That token is forwarded as-is. Its audience is the CircleCI organization id, not
//! [`AUDIENCE`](crate::provider::AUDIENCE), so the Depot API must be configured to trust
//! tokens carrying CircleCI's audience.

// self
use crate::{
	_prelude::*,
	auth::{Context, Credential},
	provider::{IdentityProvider, ProviderFuture},
};

/// Identity token carrying the v2 claim set.
pub const TOKEN_V2_VAR: &str = "CIRCLE_OIDC_TOKEN_V2";
/// Identity token carrying the v1 claim set.
pub const TOKEN_VAR: &str = "CIRCLE_OIDC_TOKEN";

/// Reads the identity token CircleCI issued for the current job.
#[derive(Clone, Copy, Debug, Default)]
pub struct CircleCiProvider;
impl CircleCiProvider {
	/// Provider name.
	pub const NAME: &'static str = "circleci";

	/// Creates the provider.
	pub fn new() -> Self {
		Self
	}
}
impl IdentityProvider for CircleCiProvider {
	fn name(&self) -> &'static str {
		Self::NAME
	}

	fn retrieve_token<'a>(&'a self, ctx: &'a Context) -> ProviderFuture<'a> {
		Box::pin(async move {
			Ok(ctx.var(TOKEN_V2_VAR).or_else(|| ctx.var(TOKEN_VAR)).and_then(Credential::new))
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::env;

	async fn retrieve(pairs: &[(&str, &str)]) -> Option<String> {
		let ctx = Context::new(Arc::new(env::from_pairs(pairs.iter().copied())));

		CircleCiProvider::new()
			.retrieve_token(&ctx)
			.await
			.expect("CircleCI provider never fails.")
			.map(Credential::into_inner)
	}

	#[tokio::test]
	async fn prefers_v2_token() {
		assert_eq!(
			retrieve(&[(TOKEN_V2_VAR, "v2"), (TOKEN_VAR, "v1")]).await.as_deref(),
			Some("v2")
		);
		assert_eq!(retrieve(&[(TOKEN_V2_VAR, ""), (TOKEN_VAR, "v1")]).await.as_deref(), Some("v1"));
	}

	#[tokio::test]
	async fn absent_outside_circleci() {
		assert_eq!(retrieve(&[]).await, None);
	}
}

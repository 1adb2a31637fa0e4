//! GitHub Actions OIDC provider.

// crates.io
use reqwest::header::AUTHORIZATION;
// self
use crate::{
	_prelude::*,
	auth::{Context, Credential},
	error::ProviderError,
	provider::{
		AUDIENCE, IdentityProvider, ProviderFuture, decode_success, parse_endpoint,
		short_lived_client,
	},
};

/// Bearer token GitHub exposes to jobs granted `id-token: write`.
pub const REQUEST_TOKEN_VAR: &str = "ACTIONS_ID_TOKEN_REQUEST_TOKEN";
/// Identity token endpoint GitHub exposes to jobs granted `id-token: write`.
pub const REQUEST_URL_VAR: &str = "ACTIONS_ID_TOKEN_REQUEST_URL";

#[derive(Deserialize)]
struct IdTokenResponse {
	value: String,
}

/// Requests an identity token from the GitHub Actions runtime.
#[derive(Clone, Copy, Debug, Default)]
pub struct GitHubProvider;
impl GitHubProvider {
	/// Provider name.
	pub const NAME: &'static str = "github";

	/// Creates the provider.
	pub fn new() -> Self {
		Self
	}

	async fn fetch(&self, ctx: &Context) -> Result<Option<Credential>, ProviderError> {
		let Some(request_token) = ctx.var(REQUEST_TOKEN_VAR) else {
			return Ok(None);
		};
		let Some(request_url) = ctx.var(REQUEST_URL_VAR) else {
			return Ok(None);
		};
		let mut url = parse_endpoint(Self::NAME, &request_url)?;

		url.query_pairs_mut().append_pair("audience", AUDIENCE);

		let client = short_lived_client(Self::NAME)?;
		let request = client.get(url).header(AUTHORIZATION, format!("bearer {request_token}"));
		let response = client
			.send(request)
			.await
			.map_err(|e| ProviderError::transport(Self::NAME, e))?;
		let payload: IdTokenResponse = decode_success(Self::NAME, &response)?;

		Ok(Credential::new(payload.value))
	}
}
impl IdentityProvider for GitHubProvider {
	fn name(&self) -> &'static str {
		Self::NAME
	}

	fn retrieve_token<'a>(&'a self, ctx: &'a Context) -> ProviderFuture<'a> {
		Box::pin(self.fetch(ctx))
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::env;

	#[tokio::test]
	async fn missing_request_variables_mean_not_github() {
		let provider = GitHubProvider::new();

		for pairs in [
			vec![],
			vec![(REQUEST_TOKEN_VAR, "request-token")],
			vec![(REQUEST_URL_VAR, "https://example.com/token?api-version=2.0")],
			vec![(REQUEST_TOKEN_VAR, ""), (REQUEST_URL_VAR, "https://example.com")],
		] {
			let ctx = Context::new(Arc::new(env::from_pairs(pairs)));
			let token = provider
				.retrieve_token(&ctx)
				.await
				.expect("Absent platform signals should not be an error.");

			assert!(token.is_none());
		}
	}

	#[tokio::test]
	async fn malformed_request_url_is_an_error() {
		let ctx = Context::new(Arc::new(env::from_pairs([
			(REQUEST_TOKEN_VAR, "request-token"),
			(REQUEST_URL_VAR, "not a url"),
		])));
		let err = GitHubProvider::new()
			.retrieve_token(&ctx)
			.await
			.expect_err("Unparseable request URL should fail.");

		assert!(matches!(err, ProviderError::InvalidEndpoint { provider: "github", .. }));
	}
}

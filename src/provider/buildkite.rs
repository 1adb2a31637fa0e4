//! Buildkite agent OIDC provider.

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

/// Agent session token available to Buildkite jobs.
pub const AGENT_TOKEN_VAR: &str = "BUILDKITE_AGENT_ACCESS_TOKEN";
/// Agent API endpoint override.
pub const AGENT_ENDPOINT_VAR: &str = "BUILDKITE_AGENT_ENDPOINT";
/// Current job identifier.
pub const JOB_ID_VAR: &str = "BUILDKITE_JOB_ID";
/// Agent API endpoint used when [`AGENT_ENDPOINT_VAR`] is unset.
pub const DEFAULT_AGENT_ENDPOINT: &str = "https://agent.buildkite.com/v3";

#[derive(Serialize)]
struct OidcTokenRequest<'a> {
	audience: &'a str,
}

#[derive(Deserialize)]
struct OidcTokenResponse {
	token: String,
}

/// Asks the Buildkite agent API for a job-scoped identity token.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuildkiteProvider;
impl BuildkiteProvider {
	/// Provider name.
	pub const NAME: &'static str = "buildkite";

	/// Creates the provider.
	pub fn new() -> Self {
		Self
	}

	async fn fetch(&self, ctx: &Context) -> Result<Option<Credential>, ProviderError> {
		let (Some(agent_token), Some(job_id)) = (ctx.var(AGENT_TOKEN_VAR), ctx.var(JOB_ID_VAR))
		else {
			return Ok(None);
		};
		let endpoint =
			ctx.var(AGENT_ENDPOINT_VAR).unwrap_or_else(|| DEFAULT_AGENT_ENDPOINT.to_owned());
		let url = token_url(&endpoint, &job_id)?;
		let client = short_lived_client(Self::NAME)?;
		let request = client
			.post(url)
			.header(AUTHORIZATION, format!("Token {agent_token}"))
			.json(&OidcTokenRequest { audience: AUDIENCE });
		let response = client
			.send(request)
			.await
			.map_err(|e| ProviderError::transport(Self::NAME, e))?;
		let payload: OidcTokenResponse = decode_success(Self::NAME, &response)?;

		Ok(Credential::new(payload.token))
	}
}

// The job id is a single percent-encoded segment.
fn token_url(endpoint: &str, job_id: &str) -> Result<Url, ProviderError> {
	let mut target = parse_endpoint(BuildkiteProvider::NAME, endpoint)?;

	target
		.path_segments_mut()
		.map_err(|_| ProviderError::InvalidEndpoint {
			provider: BuildkiteProvider::NAME,
			source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
		})?
		.pop_if_empty()
		.extend(["jobs", job_id, "oidc", "tokens"]);

	Ok(target)
}

impl IdentityProvider for BuildkiteProvider {
	fn name(&self) -> &'static str {
		Self::NAME
	}

	fn retrieve_token<'a>(&'a self, ctx: &'a Context) -> ProviderFuture<'a> {
		Box::pin(self.fetch(ctx))
	}
}

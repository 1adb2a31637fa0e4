//! Identity exchange for public GitHub Actions runs.
//!
//! Workflows triggered from forks cannot request GitHub identity tokens. For those runs the
//! Depot exchange service issues a claim for the run and trades it for a Depot credential
//! scoped to [`AUDIENCE`](crate::provider::AUDIENCE).

// self
use crate::{
	_prelude::*,
	auth::{Context, Credential},
	error::ProviderError,
	obs::Field,
	provider::{
		AUDIENCE, IdentityProvider, ProviderFuture, decode_success, parse_endpoint,
		short_lived_client,
	},
};

/// Exchange service used when no endpoint override is configured.
pub const DEFAULT_ENDPOINT: &str = "https://actions-public-oidc.depot.dev";

#[derive(Serialize)]
struct ClaimRequest<'a> {
	aud: &'a str,
	#[serde(rename = "eventName")]
	event_name: String,
	repo: String,
	#[serde(rename = "runID")]
	run_id: String,
	attempt: String,
}

#[derive(Deserialize)]
struct ClaimResponse {
	#[serde(rename = "claimID")]
	claim_id: String,
	#[serde(rename = "challengeCode")]
	challenge_code: String,
	#[serde(rename = "exchangeURL")]
	exchange_url: String,
}

#[derive(Serialize)]
struct ExchangeRequest<'a> {
	#[serde(rename = "claimID")]
	claim_id: &'a str,
	#[serde(rename = "challengeCode")]
	challenge_code: &'a str,
}

#[derive(Deserialize)]
struct ExchangeResponse {
	token: String,
}

/// Trades a public GitHub Actions run identity for a Depot credential.
#[derive(Clone, Debug)]
pub struct ActionsPublicProvider {
	endpoint: String,
	audience: String,
}
impl ActionsPublicProvider {
	/// Provider name.
	pub const NAME: &'static str = "actions-public";

	/// Points the provider at a different exchange service.
	pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
		self.endpoint = endpoint.into();

		self
	}

	/// Exchange service base URL.
	pub fn endpoint(&self) -> &str {
		&self.endpoint
	}

	async fn fetch(&self, ctx: &Context) -> Result<Option<Credential>, ProviderError> {
		if ctx.var("GITHUB_ACTIONS").as_deref() != Some("true") {
			return Ok(None);
		}

		let (Some(event_name), Some(repo), Some(run_id)) =
			(ctx.var("GITHUB_EVENT_NAME"), ctx.var("GITHUB_REPOSITORY"), ctx.var("GITHUB_RUN_ID"))
		else {
			return Ok(None);
		};
		let attempt = ctx.var("GITHUB_RUN_ATTEMPT").unwrap_or_else(|| "1".to_owned());
		let client = short_lived_client(Self::NAME)?;
		let claim_url =
			parse_endpoint(Self::NAME, &format!("{}/claim", self.endpoint.trim_end_matches('/')))?;
		let claim_request =
			ClaimRequest { aud: &self.audience, event_name, repo, run_id, attempt };
		let response = client
			.send(client.post(claim_url).json(&claim_request))
			.await
			.map_err(|e| ProviderError::transport(Self::NAME, e))?;
		let claim: ClaimResponse = decode_success(Self::NAME, &response)?;

		ctx.logger()
			.debug("Claimed public Actions identity", &[Field::new("claim_id", &claim.claim_id)]);

		let exchange_url = parse_endpoint(Self::NAME, &claim.exchange_url)?;
		let exchange_request = ExchangeRequest {
			claim_id: &claim.claim_id,
			challenge_code: &claim.challenge_code,
		};
		let response = client
			.send(client.post(exchange_url).json(&exchange_request))
			.await
			.map_err(|e| ProviderError::transport(Self::NAME, e))?;
		let exchanged: ExchangeResponse = decode_success(Self::NAME, &response)?;

		Ok(Credential::new(exchanged.token))
	}
}
impl Default for ActionsPublicProvider {
	fn default() -> Self {
		Self { endpoint: DEFAULT_ENDPOINT.to_owned(), audience: AUDIENCE.to_owned() }
	}
}
impl IdentityProvider for ActionsPublicProvider {
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
	async fn requires_a_github_actions_run() {
		let provider = ActionsPublicProvider::default().with_endpoint("http://127.0.0.1:9");

		for pairs in [
			vec![("GITHUB_EVENT_NAME", "pull_request"), ("GITHUB_REPOSITORY", "o/r")],
			vec![("GITHUB_ACTIONS", "true"), ("GITHUB_REPOSITORY", "o/r")],
			vec![("GITHUB_ACTIONS", "false"), ("GITHUB_RUN_ID", "1")],
		] {
			let ctx = Context::new(Arc::new(env::from_pairs(pairs)));
			let token = provider
				.retrieve_token(&ctx)
				.await
				.expect("Missing run variables should not be an error.");

			assert!(token.is_none());
		}
	}

	#[test]
	fn default_endpoint_is_depot_exchange() {
		assert_eq!(ActionsPublicProvider::default().endpoint(), DEFAULT_ENDPOINT);
	}
}

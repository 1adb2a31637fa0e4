//! Shared reqwest transport for identity providers and the request pipeline.
//!
//! Each operation builds a short-lived [`HttpClient`]; nothing here pools connections
//! across calls, retries, or follows a custom redirect policy. Responses are read into a
//! [`RawResponse`] exactly once so callers can decode the same bytes more than once.

// std
use std::ops::Deref;
// crates.io
use reqwest::{RequestBuilder, StatusCode, header::HeaderMap};
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
};

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[derive(Clone, Debug, Default)]
pub struct HttpClient(pub ReqwestClient);
impl HttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a fresh client for a single operation.
	pub fn short_lived() -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().build().map_err(ConfigError::http_client_build)?;

		Ok(Self(client))
	}

	/// Dispatches `request` and reads the full body before returning.
	pub async fn send(&self, request: RequestBuilder) -> Result<RawResponse, TransportError> {
		let response = request.send().await?;
		let status = response.status();
		let headers = response.headers().to_owned();
		let body = response.bytes().await?.to_vec();

		Ok(RawResponse { status, headers, body })
	}
}
impl AsRef<ReqwestClient> for HttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
impl Deref for HttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

/// Fully buffered HTTP response.
#[derive(Clone, Debug)]
pub struct RawResponse {
	/// Response status.
	pub status: StatusCode,
	/// Response headers.
	pub headers: HeaderMap,
	/// Response body bytes.
	pub body: Vec<u8>,
}
impl RawResponse {
	/// Whether the status is 2xx.
	pub fn is_success(&self) -> bool {
		self.status.is_success()
	}

	/// Status rendered as `<code> <reason>`, e.g. `403 Forbidden`.
	pub fn status_line(&self) -> String {
		self.status.to_string()
	}

	/// Body decoded as UTF-8, replacing invalid sequences.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}

	/// Decodes the body as JSON, reporting the failing path on mismatch.
	pub fn json<T>(&self) -> Result<T, serde_path_to_error::Error<serde_json::Error>>
	where
		T: DeserializeOwned,
	{
		decode_json(&self.body)
	}
}

/// Decodes `bytes` as JSON into `T`, reporting the failing path on mismatch.
pub fn decode_json<T>(bytes: &[u8]) -> Result<T, serde_path_to_error::Error<serde_json::Error>>
where
	T: DeserializeOwned,
{
	let mut de = serde_json::Deserializer::from_slice(bytes);

	serde_path_to_error::deserialize(&mut de)
}

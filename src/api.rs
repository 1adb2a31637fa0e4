//! Authenticated JSON request pipeline for the Depot API.
//!
//! A call serializes the payload, attaches `Content-Type`, the bearer token when present,
//! and the client identifier headers, then reads the response body once. Decoding is two
//! passes over that buffer: the body is first read as an [`ErrorEnvelope`], and only if it
//! does not report `ok: false` is it decoded into the caller's response type.

// crates.io
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue};
// self
use crate::{
	_prelude::*,
	error::{ApiError, ConfigError},
	interceptor,
	obs::{OpKind, observe},
	transport::{self, HttpClient},
};

/// Use as the `payload` argument for calls without a request body.
pub const NO_PAYLOAD: Option<&()> = None;

/// Server-side failure wrapper, `{"ok": false, "error": "..."}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
	/// Success flag; absent on bodies that are not envelopes.
	#[serde(default)]
	pub ok: Option<bool>,
	/// Server-provided failure message.
	#[serde(default)]
	pub error: Option<String>,
}
impl ErrorEnvelope {
	/// Whether this envelope signals a request-level failure.
	pub fn is_failure(&self) -> bool {
		self.ok == Some(false)
	}
}

/// Executes authenticated JSON calls.
#[derive(Clone, Debug, Default)]
pub struct ApiClient {
	http: HttpClient,
}
impl ApiClient {
	/// Creates a client over an existing transport.
	pub fn new(http: HttpClient) -> Self {
		Self { http }
	}

	/// Sends `payload` (if any) to `url` and decodes the response as `R`.
	///
	/// An empty `token` sends no `Authorization` header.
	pub async fn request<R, P>(
		&self,
		method: Method,
		url: &str,
		token: &str,
		payload: Option<&P>,
	) -> Result<R>
	where
		R: DeserializeOwned,
		P: ?Sized + Serialize,
	{
		observe(OpKind::ApiRequest, "request", self.execute(method, url, token, payload)).await
	}

	async fn execute<R, P>(
		&self,
		method: Method,
		url: &str,
		token: &str,
		payload: Option<&P>,
	) -> Result<R>
	where
		R: DeserializeOwned,
		P: ?Sized + Serialize,
	{
		let body = payload.map(serde_json::to_vec).transpose().map_err(ApiError::Encode)?;
		let url = Url::parse(url)
			.map_err(|source| ConfigError::InvalidUrl { url: url.to_owned(), source })?;
		let identity = interceptor::client_headers().map_err(ConfigError::http_client_build)?;
		let mut request = self
			.http
			.request(method, url)
			.header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
			.headers(identity);

		if !token.is_empty() {
			request = request.header(AUTHORIZATION, format!("Bearer {token}"));
		}
		if let Some(body) = body {
			request = request.body(body);
		}

		let response = self.http.send(request).await?;

		decode_response(&response.body)
	}
}

/// Sends a single call over a short-lived client.
pub async fn request<R, P>(method: Method, url: &str, token: &str, payload: Option<&P>) -> Result<R>
where
	R: DeserializeOwned,
	P: ?Sized + Serialize,
{
	ApiClient::new(HttpClient::short_lived()?).request(method, url, token, payload).await
}

/// Applies the envelope-then-typed decode policy to an already buffered body.
pub fn decode_response<R>(body: &[u8]) -> Result<R>
where
	R: DeserializeOwned,
{
	if let Some(envelope) =
		serde_json::from_slice::<ErrorEnvelope>(body).ok().filter(ErrorEnvelope::is_failure)
	{
		return Err(ApiError::Envelope { message: envelope.error.unwrap_or_default() }.into());
	}

	transport::decode_json(body).map_err(|source| {
		ApiError::Decode { body: String::from_utf8_lossy(body).into_owned(), source }.into()
	})
}

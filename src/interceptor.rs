//! Client identifier and the outbound header interceptor.
//!
//! The identifier has the shape `<crate>/<os>/<arch>` and is computed once per process.
//! [`UserAgentInterceptor`] stamps it on unary requests before dispatch and on client
//! streams right after they are opened. Server-side streaming handlers are inbound and pass
//! through untouched.

// crates.io
use http::{
	HeaderMap, HeaderName, HeaderValue,
	header::{InvalidHeaderValue, USER_AGENT},
};
// self
use crate::_prelude::*;

/// Product-specific copy of the client identifier sent on API calls.
pub const DEPOT_USER_AGENT: HeaderName = HeaderName::from_static("depot-user-agent");

static AGENT: LazyLock<String> = LazyLock::new(|| {
	format!("{}/{}/{}", env!("CARGO_PKG_NAME"), std::env::consts::OS, std::env::consts::ARCH)
});

/// Returns this client's identifier, e.g. `depot-client/linux/x86_64`.
pub fn user_agent() -> &'static str {
	&AGENT
}

/// Returns the client identifier as a header value.
pub fn user_agent_value() -> Result<HeaderValue, InvalidHeaderValue> {
	HeaderValue::from_str(user_agent())
}

/// Headers identifying this client on direct API calls: `User-Agent` and `Depot-User-Agent`.
pub fn client_headers() -> Result<HeaderMap, InvalidHeaderValue> {
	let value = user_agent_value()?;
	let mut headers = HeaderMap::with_capacity(2);

	headers.insert(USER_AGENT, value.clone());
	headers.insert(DEPOT_USER_AGENT, value);

	Ok(headers)
}

/// Outgoing request whose headers may be edited before dispatch.
pub trait OutboundRequest {
	/// Mutable access to the request headers.
	fn headers_mut(&mut self) -> &mut HeaderMap;
}
impl<B> OutboundRequest for http::Request<B> {
	fn headers_mut(&mut self) -> &mut HeaderMap {
		http::Request::headers_mut(self)
	}
}
impl OutboundRequest for reqwest::Request {
	fn headers_mut(&mut self) -> &mut HeaderMap {
		reqwest::Request::headers_mut(self)
	}
}
impl OutboundRequest for HeaderMap {
	fn headers_mut(&mut self) -> &mut HeaderMap {
		self
	}
}

/// Client side of an opened stream.
pub trait StreamingClientConn {
	/// Mutable access to the headers sent when the stream starts.
	fn request_headers_mut(&mut self) -> &mut HeaderMap;
}

/// Shape of a streaming call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StreamType {
	/// Client sends many messages, server answers once.
	Client,
	/// Client sends once, server answers with many messages.
	Server,
	/// Both sides stream.
	Bidi,
}

/// Describes the streaming procedure being opened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamSpec {
	/// Fully qualified procedure, e.g. `/depot.build.v1.BuildService/GetBuildKitConnection`.
	pub procedure: String,
	/// Stream shape.
	pub stream_type: StreamType,
}

/// Sets `User-Agent` on every outbound unary call and client stream.
#[derive(Clone, Debug)]
pub struct UserAgentInterceptor {
	agent: HeaderValue,
}
impl UserAgentInterceptor {
	/// Creates an interceptor carrying this process' identifier.
	pub fn new() -> Result<Self, InvalidHeaderValue> {
		Ok(Self { agent: user_agent_value()? })
	}

	/// Creates an interceptor carrying a custom identifier.
	pub fn with_agent(agent: HeaderValue) -> Self {
		Self { agent }
	}

	/// Identifier this interceptor stamps.
	pub fn agent(&self) -> &HeaderValue {
		&self.agent
	}

	/// Wraps a unary call so the header is set before `next` runs.
	pub fn wrap_unary<Req, Fut, F>(&self, next: F) -> impl Fn(Req) -> Fut
	where
		Req: OutboundRequest,
		F: Fn(Req) -> Fut,
	{
		let agent = self.agent.clone();

		move |mut request: Req| {
			request.headers_mut().insert(USER_AGENT, agent.clone());

			next(request)
		}
	}

	/// Wraps a stream opener so the header is set on every connection it returns.
	pub fn wrap_streaming_client<Conn, F>(&self, next: F) -> impl Fn(&StreamSpec) -> Conn
	where
		Conn: StreamingClientConn,
		F: Fn(&StreamSpec) -> Conn,
	{
		let agent = self.agent.clone();

		move |spec: &StreamSpec| {
			let mut conn = next(spec);

			conn.request_headers_mut().insert(USER_AGENT, agent.clone());

			conn
		}
	}

	/// Inbound streams are not touched.
	pub fn wrap_streaming_handler<F>(&self, next: F) -> F {
		next
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	struct FakeConn {
		headers: HeaderMap,
		procedure: String,
	}
	impl StreamingClientConn for FakeConn {
		fn request_headers_mut(&mut self) -> &mut HeaderMap {
			&mut self.headers
		}
	}

	#[test]
	fn user_agent_is_stable_and_platform_derived() {
		let expected = format!(
			"{}/{}/{}",
			env!("CARGO_PKG_NAME"),
			std::env::consts::OS,
			std::env::consts::ARCH
		);

		assert_eq!(user_agent(), expected);
		assert!(std::ptr::eq(user_agent(), user_agent()));
	}

	#[test]
	fn client_headers_carry_identifier_twice() {
		let headers = client_headers().expect("Identifier should be a valid header value.");

		assert_eq!(headers.get(USER_AGENT).and_then(|v| v.to_str().ok()), Some(user_agent()));
		assert_eq!(
			headers.get("Depot-User-Agent").and_then(|v| v.to_str().ok()),
			Some(user_agent())
		);
	}

	#[tokio::test]
	async fn unary_calls_see_header_before_dispatch() {
		let interceptor = UserAgentInterceptor::new().expect("Identifier should be valid.");
		let call = interceptor.wrap_unary(|request: http::Request<()>| async move {
			request.headers().get(USER_AGENT).cloned()
		});
		let seen = call(http::Request::new(())).await;

		assert_eq!(seen.as_ref(), Some(interceptor.agent()));
	}

	#[test]
	fn unary_wrapper_overwrites_existing_agent() {
		let interceptor = UserAgentInterceptor::with_agent(HeaderValue::from_static("custom/1"));
		let call = interceptor.wrap_unary(|request: reqwest::Request| {
			std::future::ready(request.headers().get_all(USER_AGENT).iter().count())
		});
		let mut request = reqwest::Request::new(
			Method::GET,
			Url::parse("https://api.depot.dev/").expect("Fixture URL should parse."),
		);

		request.headers_mut().insert(USER_AGENT, HeaderValue::from_static("other/0"));

		let count = call(request).into_inner();

		assert_eq!(count, 1);
	}

	#[test]
	fn streaming_client_connections_are_stamped() {
		let interceptor = UserAgentInterceptor::with_agent(HeaderValue::from_static("custom/1"));
		let open = interceptor.wrap_streaming_client(|spec: &StreamSpec| FakeConn {
			headers: HeaderMap::new(),
			procedure: spec.procedure.clone(),
		});
		let conn = open(&StreamSpec {
			procedure: "/depot.build.v1.BuildService/GetBuildKitConnection".into(),
			stream_type: StreamType::Bidi,
		});

		assert_eq!(conn.headers.get(USER_AGENT), Some(&HeaderValue::from_static("custom/1")));
		assert!(conn.procedure.ends_with("GetBuildKitConnection"));
	}

	#[test]
	fn streaming_handlers_pass_through() {
		let interceptor = UserAgentInterceptor::with_agent(HeaderValue::from_static("custom/1"));
		let handler = interceptor.wrap_streaming_handler(|mut headers: HeaderMap| {
			headers.remove(USER_AGENT);

			headers
		});
		let mut inbound = HeaderMap::new();

		inbound.insert(USER_AGENT, HeaderValue::from_static("remote/2"));

		assert!(handler(inbound).get(USER_AGENT).is_none());
	}
}

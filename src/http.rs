//! Transport primitives used by the OAuth 2.0 collaborator.
//!
//! The module exposes [`ProviderHttpClient`] alongside [`ResponseMetadata`] and
//! [`ResponseMetadataSlot`] so downstream crates can plug in custom HTTP clients while the
//! collaborator keeps classifying failures with consistent metadata. Implementations call
//! [`ResponseMetadataSlot::take`] before dispatching a request and
//! [`ResponseMetadataSlot::store`] once an HTTP status or retry hint is known.

// std
use std::ops::Deref;
// crates.io
use oauth2::{
	AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse, http::HeaderMap as OAuthHeaderMap,
};
#[cfg(feature = "reqwest")] use reqwest::header::{HeaderMap, RETRY_AFTER};
#[cfg(feature = "reqwest")] use time::format_description::well_known::Rfc2822;
// self
use crate::_prelude::*;

/// Abstraction over HTTP transports able to reach the Deezer token and API endpoints while
/// publishing response metadata to the collaborator.
///
/// Implementations must be `Send + Sync + 'static` so a single transport can back every
/// strategy instance, and the handles they return must own whatever state the request needs
/// so the request futures stay `Send`.
pub trait ProviderHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// [`AsyncHttpClient`] handle tied to a [`ResponseMetadataSlot`].
	type Handle: for<'c> AsyncHttpClient<
			'c,
			Error = HttpClientError<Self::TransportError>,
			Future: 'c + Send,
		>
		+ 'static
		+ Send
		+ Sync;

	/// Builds an [`AsyncHttpClient`] handle that records outcomes in `slot`.
	///
	/// # Metadata Contract
	///
	/// - Call [`ResponseMetadataSlot::take`] before submitting the HTTP request.
	/// - Once a response (successful or not) is available, save its status with
	///   [`ResponseMetadataSlot::store`].
	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle;
}

/// Captures metadata from the most recent HTTP response for downstream error mapping.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadata {
	/// HTTP status code returned by the provider, if available.
	pub status: Option<u16>,
	/// Retry-After hint expressed as a relative duration.
	pub retry_after: Option<Duration>,
}

/// Thread-safe slot for sharing [`ResponseMetadata`] between transport and error layers.
///
/// The collaborator creates a fresh slot for each request, so concurrent calls never observe
/// each other's metadata.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadataSlot(Arc<Mutex<Option<ResponseMetadata>>>);
impl ResponseMetadataSlot {
	/// Stores new metadata for the current request.
	pub fn store(&self, meta: ResponseMetadata) {
		*self.0.lock() = Some(meta);
	}

	/// Returns the captured metadata, if any, consuming it from the slot.
	pub fn take(&self) -> Option<ResponseMetadata> {
		self.0.lock().take()
	}
}

/// [`AsyncHttpClient`] adapter that stamps the configured custom headers onto each request.
///
/// Headers already present on the request win, so OAuth-mandated headers are never replaced.
pub(crate) struct WithHeaders<H> {
	inner: H,
	headers: OAuthHeaderMap,
}
impl<H> WithHeaders<H> {
	pub(crate) fn new(inner: H, headers: OAuthHeaderMap) -> Self {
		Self { inner, headers }
	}
}
impl<'c, H> AsyncHttpClient<'c> for WithHeaders<H>
where
	H: AsyncHttpClient<'c>,
{
	type Error = H::Error;
	type Future = H::Future;

	fn call(&'c self, mut request: HttpRequest) -> Self::Future {
		for (name, value) in &self.headers {
			if !request.headers().contains_key(name) {
				request.headers_mut().insert(name.clone(), value.clone());
			}
		}

		self.inner.call(request)
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Token requests should not follow redirects; configure any custom [`ReqwestClient`] the same
/// way before handing it to the collaborator.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ProviderHttpClient for ReqwestHttpClient {
	type Handle = InstrumentedHandle;
	type TransportError = ReqwestError;

	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle {
		InstrumentedHandle::new(self.0.clone(), slot)
	}
}

#[cfg(feature = "reqwest")]
struct InstrumentedHttpClient {
	client: ReqwestClient,
	slot: ResponseMetadataSlot,
}

/// Handle returned by [`ReqwestHttpClient`] that records response metadata.
#[cfg(feature = "reqwest")]
#[derive(Clone)]
pub struct InstrumentedHandle(Arc<InstrumentedHttpClient>);
#[cfg(feature = "reqwest")]
impl InstrumentedHandle {
	fn new(client: ReqwestClient, slot: ResponseMetadataSlot) -> Self {
		Self(Arc::new(InstrumentedHttpClient { client, slot }))
	}
}
#[cfg(feature = "reqwest")]
impl<'c> AsyncHttpClient<'c> for InstrumentedHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let client = Arc::clone(&self.0);

		Box::pin(async move {
			client.slot.take();

			let response = client
				.client
				.execute(request.try_into().map_err(Box::new)?)
				.await
				.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let retry_after = parse_retry_after(&headers);

			client.slot.store(ResponseMetadata { status: Some(status.as_u16()), retry_after });

			let mut response_new =
				HttpResponse::new(response.bytes().await.map_err(Box::new)?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}

#[cfg(feature = "reqwest")]
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX)));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}

#[cfg(test)]
mod tests {
	// crates.io
	use oauth2::http::{HeaderValue, Method, Request, Response, StatusCode};
	// self
	use super::*;

	struct EchoHeaders;
	impl<'c> AsyncHttpClient<'c> for EchoHeaders {
		type Error = HttpClientError<std::io::Error>;
		type Future = Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send>>;

		fn call(&'c self, request: HttpRequest) -> Self::Future {
			Box::pin(async move {
				let mut response = Response::new(Vec::new());

				*response.status_mut() = StatusCode::OK;
				*response.headers_mut() = request.headers().clone();

				Ok(response)
			})
		}
	}

	#[tokio::test]
	async fn custom_headers_never_replace_request_headers() {
		let mut headers = OAuthHeaderMap::new();

		headers.insert("x-app", HeaderValue::from_static("deezer-demo"));
		headers.insert("accept", HeaderValue::from_static("text/plain"));

		let request = Request::builder()
			.method(Method::GET)
			.uri("https://api.deezer.com/user/me")
			.header("accept", "application/json")
			.body(Vec::new())
			.expect("Request fixture should build.");
		let transport = WithHeaders::new(EchoHeaders, headers);
		let response = transport
			.call(request)
			.await
			.expect("Echo transport should not fail.");

		assert_eq!(response.headers().get("x-app").map(|v| v.as_bytes()), Some(&b"deezer-demo"[..]));
		assert_eq!(
			response.headers().get("accept").map(|v| v.as_bytes()),
			Some(&b"application/json"[..])
		);
	}

	#[test]
	fn metadata_slot_take_clears_previous_value() {
		let slot = ResponseMetadataSlot::default();

		slot.store(ResponseMetadata { status: Some(200), retry_after: None });

		assert_eq!(slot.take().and_then(|meta| meta.status), Some(200));
		assert!(slot.take().is_none());
	}

	#[cfg(feature = "reqwest")]
	#[test]
	fn retry_after_accepts_delta_seconds() {
		let mut headers = HeaderMap::new();

		headers.insert(RETRY_AFTER, "12".parse().expect("Header value fixture should parse."));

		assert_eq!(parse_retry_after(&headers), Some(Duration::seconds(12)));
	}
}

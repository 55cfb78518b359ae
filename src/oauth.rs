//! OAuth 2.0 collaborator: authorization URL, code exchange, and token-authenticated GET.
//!
//! The Deezer strategy only configures this layer. Protocol mechanics are delegated to the
//! `oauth2` crate, and every request goes through a [`ProviderHttpClient`] handle so the
//! transport stays pluggable.

pub use oauth2;

// crates.io
use oauth2::{
	AccessToken, AsyncHttpClient, AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret,
	EndpointNotSet, EndpointSet, HttpClientError, RedirectUrl, RefreshToken, RequestTokenError,
	Scope, StandardRevocableToken, TokenResponse, TokenUrl,
	basic::{
		BasicErrorResponse, BasicRequestTokenError, BasicRevocationErrorResponse,
		BasicTokenIntrospectionResponse, BasicTokenType,
	},
	http::{
		HeaderMap as OAuthHeaderMap, HeaderName, HeaderValue, Method, Request,
		header::{ACCEPT, AUTHORIZATION},
	},
};
use serde::{Deserializer, de::Error as _};
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::{TokenGrant, TokenSecret},
	error::{ConfigError, TokenError, TransportError},
	http::{ProviderHttpClient, ResponseMetadata, ResponseMetadataSlot, WithHeaders},
	provider::{ACCESS_TOKEN_PARAM, AccessTokenPlacement, StrategyConfig},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

type ConfiguredClient = oauth2::Client<
	BasicErrorResponse,
	ProviderTokenResponse,
	BasicTokenIntrospectionResponse,
	StandardRevocableToken,
	BasicRevocationErrorResponse,
	EndpointSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointSet,
>;

/// Boxed `Send` future returned by [`OAuth2Client`] operations.
pub type OAuthFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a + Send>>;

#[cfg(feature = "reqwest")]
/// Collaborator specialized for the crate's default reqwest transport stack.
pub type ReqwestOAuth2 = BasicOAuth2<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// OAuth 2.0 capability the strategy is composed with.
///
/// Implementations hold no per-call state, so one instance can serve concurrent logins.
pub trait OAuth2Client: Send + Sync {
	/// Builds the URL the user agent is redirected to.
	fn authorize_url(
		&self,
		scope: &[String],
		state: &str,
		callback_url: Option<&str>,
	) -> Result<Url>;

	/// Exchanges an authorization code for tokens.
	fn exchange_code<'a>(
		&'a self,
		code: &'a str,
		callback_url: Option<&'a str>,
	) -> OAuthFuture<'a, Result<TokenGrant>>;

	/// Performs a GET against `url` authenticated with `access_token`.
	///
	/// Non-2xx responses are reported as [`TransportError::Status`].
	fn get<'a>(
		&'a self,
		url: &'a str,
		access_token: &'a TokenSecret,
	) -> OAuthFuture<'a, Result<ProviderResponse, TransportError>>;
}

/// Successful response of [`OAuth2Client::get`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response body decoded as UTF-8 (lossily).
	pub body: String,
}

/// Maps HTTP transport failures into [`TransportError`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport.
	fn map_transport_error(
		&self,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> TransportError;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> TransportError {
		match err {
			HttpClientError::Reqwest(inner) => map_reqwest_error(meta, *inner),
			HttpClientError::Http(inner) => TransportError::Request { message: inner.to_string() },
			HttpClientError::Io(inner) => TransportError::Io(inner),
			HttpClientError::Other(message) => TransportError::Request { message },
			_ => TransportError::Request { message: "unrecognized HTTP client failure".into() },
		}
	}
}

/// [`OAuth2Client`] backed by the `oauth2` crate and a pluggable HTTP transport.
pub struct BasicOAuth2<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	config: Arc<StrategyConfig>,
	http_client: Arc<C>,
	error_mapper: Arc<M>,
}
impl<C, M> BasicOAuth2<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a collaborator that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		config: impl Into<Arc<StrategyConfig>>,
		http_client: impl Into<Arc<C>>,
		error_mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			config: config.into(),
			http_client: http_client.into(),
			error_mapper: error_mapper.into(),
		}
	}

	/// Configuration this collaborator was built from.
	pub fn config(&self) -> &StrategyConfig {
		&self.config
	}

	fn build_client(&self, callback_url: Option<&str>) -> Result<ConfiguredClient> {
		let config = self.config.as_ref();

		if config.client_id.is_empty() {
			return Err(ConfigError::MissingClientId.into());
		}

		let auth_url = AuthUrl::new(config.authorization_url.clone())
			.map_err(|source| ConfigError::InvalidEndpoint { field: "authorization", source })?;
		let token_url = TokenUrl::new(config.token_url.clone())
			.map_err(|source| ConfigError::InvalidEndpoint { field: "token", source })?;
		let mut client: ConfiguredClient = oauth2::Client::new(ClientId::new(config.client_id.clone()))
			.set_auth_uri(auth_url)
			.set_token_uri(token_url)
			.set_auth_type(AuthType::RequestBody);

		if let Some(secret) = config.client_secret.as_ref() {
			client = client.set_client_secret(ClientSecret::new(secret.clone()));
		}
		if let Some(callback) = callback_url {
			let redirect_url = RedirectUrl::new(callback.to_owned())
				.map_err(|source| ConfigError::InvalidEndpoint { field: "callback", source })?;

			client = client.set_redirect_uri(redirect_url);
		}

		Ok(client)
	}

	fn custom_headers(&self) -> Result<OAuthHeaderMap, ConfigError> {
		let mut headers = OAuthHeaderMap::new();

		for (name, value) in &self.config.custom_headers {
			let invalid = || ConfigError::InvalidHeader { name: name.clone() };
			let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
			let header_value = HeaderValue::from_str(value).map_err(|_| invalid())?;

			headers.insert(header_name, header_value);
		}

		Ok(headers)
	}

	fn map_token_error(
		&self,
		meta: Option<ResponseMetadata>,
		err: BasicRequestTokenError<HttpClientError<C::TransportError>>,
	) -> Error {
		let status = meta.as_ref().and_then(|value| value.status);

		match err {
			RequestTokenError::ServerResponse(response) => TokenError::Rejected {
				error: response.error().as_ref().to_owned(),
				description: response.error_description().cloned(),
				status,
			}
			.into(),
			RequestTokenError::Request(error) =>
				self.error_mapper.map_transport_error(meta.as_ref(), error).into(),
			RequestTokenError::Parse(source, _body) => TokenError::Parse { source, status }.into(),
			RequestTokenError::Other(message) => TokenError::Unexpected { message, status }.into(),
		}
	}
}
#[cfg(feature = "reqwest")]
impl BasicOAuth2<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a collaborator that provisions its own reqwest transport.
	pub fn new(config: impl Into<Arc<StrategyConfig>>) -> Self {
		Self::with_http_client(
			config,
			ReqwestHttpClient::default(),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}
}
impl<C, M> OAuth2Client for BasicOAuth2<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn authorize_url(
		&self,
		scope: &[String],
		state: &str,
		callback_url: Option<&str>,
	) -> Result<Url> {
		let config = self.config.as_ref();

		if config.client_id.is_empty() {
			return Err(ConfigError::MissingClientId.into());
		}

		let mut url = Url::parse(&config.authorization_url)
			.map_err(|source| ConfigError::InvalidEndpoint { field: "authorization", source })?;

		if let Some(callback) = callback_url {
			Url::parse(callback)
				.map_err(|source| ConfigError::InvalidEndpoint { field: "callback", source })?;
		}

		let mut pairs = url.query_pairs_mut();

		pairs.append_pair("response_type", "code");
		pairs.append_pair("client_id", &config.client_id);

		if let Some(callback) = callback_url {
			pairs.append_pair("redirect_uri", callback);
		}
		if let Some(scope_value) = config.format_scope(scope) {
			pairs.append_pair("scope", &scope_value);
		}

		pairs.append_pair("state", state);

		drop(pairs);

		Ok(url)
	}

	fn exchange_code<'a>(
		&'a self,
		code: &'a str,
		callback_url: Option<&'a str>,
	) -> OAuthFuture<'a, Result<TokenGrant>> {
		Box::pin(async move {
			let client = self.build_client(callback_url)?;
			let headers = self.custom_headers()?;
			let meta = ResponseMetadataSlot::default();
			let handle = self.http_client.with_metadata(meta.clone());
			let transport = WithHeaders::new(handle, headers);
			let mut request = client.exchange_code(AuthorizationCode::new(code.to_owned()));

			for (key, value) in &self.config.token_params {
				request = request.add_extra_param(key.clone(), value.clone());
			}

			let response = request
				.request_async(&transport)
				.await
				.map_err(|err| self.map_token_error(meta.take(), err))?;

			Ok(grant_from_response(&response))
		})
	}

	fn get<'a>(
		&'a self,
		url: &'a str,
		access_token: &'a TokenSecret,
	) -> OAuthFuture<'a, Result<ProviderResponse, TransportError>> {
		Box::pin(async move {
			let request_failed = |message: String| TransportError::Request { message };
			let headers = self.custom_headers().map_err(|err| request_failed(err.to_string()))?;
			let mut target = Url::parse(url).map_err(|err| request_failed(err.to_string()))?;
			let mut builder = Request::builder().method(Method::GET).header(ACCEPT, "application/json");

			match self.config.access_token_placement {
				AccessTokenPlacement::Query => {
					target.query_pairs_mut().append_pair(ACCESS_TOKEN_PARAM, access_token.expose());
				},
				AccessTokenPlacement::AuthorizationHeader => {
					builder = builder
						.header(AUTHORIZATION, format!("Bearer {}", access_token.expose()));
				},
			}

			let request = builder
				.uri(target.as_str())
				.body(Vec::new())
				.map_err(|err| request_failed(err.to_string()))?;
			let meta = ResponseMetadataSlot::default();
			let handle = self.http_client.with_metadata(meta.clone());
			let transport = WithHeaders::new(handle, headers);
			let response = transport
				.call(request)
				.await
				.map_err(|err| self.error_mapper.map_transport_error(meta.take().as_ref(), err))?;
			let status = response.status();
			let body = String::from_utf8_lossy(response.body()).into_owned();

			if !status.is_success() {
				return Err(TransportError::Status {
					status: status.as_u16(),
					body,
					retry_after: meta.take().and_then(|value| value.retry_after),
				});
			}

			Ok(ProviderResponse { status: status.as_u16(), body })
		})
	}
}
impl<C, M> Debug for BasicOAuth2<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("BasicOAuth2").field("config", &self.config).finish()
	}
}

/// Token endpoint payload, tolerant of Deezer's shape (`expires` instead of `expires_in`,
/// sometimes as a string, and no `token_type`).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct ProviderTokenResponse {
	access_token: AccessToken,
	#[serde(default = "bearer")]
	token_type: BasicTokenType,
	#[serde(default, alias = "expires_in", deserialize_with = "lenient_seconds")]
	expires: Option<u64>,
	#[serde(default)]
	refresh_token: Option<RefreshToken>,
	#[serde(skip)]
	scopes: Option<Vec<Scope>>,
}
impl TokenResponse for ProviderTokenResponse {
	type TokenType = BasicTokenType;

	fn access_token(&self) -> &AccessToken {
		&self.access_token
	}

	fn token_type(&self) -> &Self::TokenType {
		&self.token_type
	}

	fn expires_in(&self) -> Option<std::time::Duration> {
		self.expires.filter(|secs| *secs > 0).map(std::time::Duration::from_secs)
	}

	fn refresh_token(&self) -> Option<&RefreshToken> {
		self.refresh_token.as_ref()
	}

	fn scopes(&self) -> Option<&Vec<Scope>> {
		self.scopes.as_ref()
	}
}

fn bearer() -> BasicTokenType {
	BasicTokenType::Bearer
}

fn lenient_seconds<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
	D: Deserializer<'de>,
{
	match Option::<Value>::deserialize(deserializer)? {
		None | Some(Value::Null) => Ok(None),
		Some(Value::Number(number)) => number
			.as_u64()
			.map(Some)
			.ok_or_else(|| D::Error::custom("expires must be a non-negative integer")),
		Some(Value::String(text)) => text.trim().parse::<u64>().map(Some).map_err(D::Error::custom),
		Some(other) => Err(D::Error::custom(format!("unexpected expires value: {other}"))),
	}
}

fn grant_from_response(response: &ProviderTokenResponse) -> TokenGrant {
	let mut grant = TokenGrant::new(response.access_token().secret().as_str());

	if let Some(refresh) = response.refresh_token() {
		grant = grant.with_refresh_token(refresh.secret().as_str());
	}
	if let Some(lifetime) = response.expires_in() {
		let secs = i64::try_from(lifetime.as_secs()).unwrap_or(i64::MAX);

		grant = grant.with_expires_in(Duration::seconds(secs));
	}

	grant
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(meta: Option<&ResponseMetadata>, err: ReqwestError) -> TransportError {
	if err.is_timeout() {
		return TransportError::Timeout {
			status: meta
				.and_then(|value| value.status)
				.or_else(|| err.status().map(|code| code.as_u16())),
		};
	}

	TransportError::from(err)
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// self
	use super::*;
	use crate::{_preludet::build_reqwest_test_oauth2 as collaborator, provider::StrategyOptions};

	#[test]
	fn authorize_url_carries_client_scope_and_state() {
		let oauth2 = collaborator(StrategyOptions::new().client_id("123-456-789"));
		let url = oauth2
			.authorize_url(
				&["basic_access".into(), "email".into()],
				"state-1",
				Some("https://www.example.net/auth/deezer/callback"),
			)
			.expect("Authorize URL should build.");
		let pairs: HashMap<_, _> = url.query_pairs().into_owned().collect();

		assert_eq!(url.host_str(), Some("connect.deezer.com"));
		assert_eq!(url.path(), "/oauth/auth.php");
		assert_eq!(pairs.get("response_type").map(String::as_str), Some("code"));
		assert_eq!(pairs.get("client_id").map(String::as_str), Some("123-456-789"));
		assert_eq!(
			pairs.get("redirect_uri").map(String::as_str),
			Some("https://www.example.net/auth/deezer/callback")
		);
		assert_eq!(pairs.get("scope").map(String::as_str), Some("basic_access,email"));
		assert_eq!(pairs.get("state").map(String::as_str), Some("state-1"));
	}

	#[test]
	fn authorize_url_omits_empty_scope_and_callback() {
		let oauth2 = collaborator(StrategyOptions::new().client_id("123"));
		let url = oauth2.authorize_url(&[], "s", None).expect("Authorize URL should build.");
		let pairs: HashMap<_, _> = url.query_pairs().into_owned().collect();

		assert!(!pairs.contains_key("scope"));
		assert!(!pairs.contains_key("redirect_uri"));
	}

	#[test]
	fn configuration_problems_surface_on_use() {
		let oauth2 = collaborator(StrategyOptions::new());
		let err = oauth2.authorize_url(&[], "s", None).expect_err("Empty client id must fail.");

		assert!(matches!(err, Error::Config(ConfigError::MissingClientId)));

		let oauth2 = collaborator(StrategyOptions::new().client_id("123"));
		let err = oauth2
			.authorize_url(&[], "s", Some("not a url"))
			.expect_err("Malformed callback must fail.");

		assert!(matches!(err, Error::Config(ConfigError::InvalidEndpoint { field: "callback", .. })));

		let oauth2 = collaborator(StrategyOptions::new().client_id("123").token_url("::"));

		assert!(matches!(
			oauth2.build_client(None),
			Err(Error::Config(ConfigError::InvalidEndpoint { field: "token", .. }))
		));

		let oauth2 =
			collaborator(StrategyOptions::new().client_id("123").custom_header("bad header", "x"));

		assert!(matches!(oauth2.custom_headers(), Err(ConfigError::InvalidHeader { .. })));
	}

	#[test]
	fn token_response_accepts_deezer_shape() {
		let response: ProviderTokenResponse =
			serde_json::from_str(r#"{"access_token":"frXYZ","expires":"3600"}"#)
				.expect("Deezer token payload should deserialize.");

		assert_eq!(response.access_token().secret(), "frXYZ");
		assert_eq!(response.token_type(), &BasicTokenType::Bearer);
		assert_eq!(response.expires_in(), Some(std::time::Duration::from_secs(3600)));

		let offline: ProviderTokenResponse =
			serde_json::from_str(r#"{"access_token":"frXYZ","expires":0}"#)
				.expect("Offline token payload should deserialize.");

		assert_eq!(offline.expires_in(), None);
		assert_eq!(grant_from_response(&offline).expires_in, None);
	}
}

//! Strategy options (caller input) and the resolved, immutable [`StrategyConfig`].

// self
use crate::_prelude::*;

/// Deezer authorization endpoint used when the caller does not override it.
pub const DEFAULT_AUTHORIZATION_URL: &str = "https://connect.deezer.com/oauth/auth.php";
/// Deezer token endpoint used when the caller does not override it.
pub const DEFAULT_TOKEN_URL: &str = "https://connect.deezer.com/oauth/access_token.php";
/// Separator Deezer expects between requested permissions.
pub const DEFAULT_SCOPE_SEPARATOR: &str = ",";
/// Query parameter carrying the access token on authenticated GETs.
pub const ACCESS_TOKEN_PARAM: &str = "access_token";

/// Where the collaborator puts the access token on authenticated GET requests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessTokenPlacement {
	/// `?access_token=<token>` query parameter (RFC 6750 section 2.3).
	#[default]
	Query,
	/// `Authorization: Bearer <token>` header.
	AuthorizationHeader,
}

/// Unvalidated strategy options as supplied by the host application.
///
/// Every field is optional; [`StrategyConfig::from_options`] fills in Deezer defaults. The
/// serde representation accepts the camelCase keys hosts usually keep in their config files
/// (`clientID`, `callbackURL`, `scopeSeparator`, ...).
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StrategyOptions {
	/// Deezer application id.
	#[serde(alias = "clientID")]
	pub client_id: Option<String>,
	/// Deezer application secret.
	pub client_secret: Option<String>,
	/// URL Deezer redirects to after the user grants access.
	#[serde(alias = "callbackURL")]
	pub callback_url: Option<String>,
	/// Authorization endpoint override.
	#[serde(alias = "authorizationURL")]
	pub authorization_url: Option<String>,
	/// Token endpoint override.
	#[serde(alias = "tokenURL")]
	pub token_url: Option<String>,
	/// Separator used to join requested permissions.
	pub scope_separator: Option<String>,
	/// Headers added to every request the collaborator sends.
	pub custom_headers: Option<BTreeMap<String, String>>,
	/// Permissions requested during authorization.
	pub scope: Option<Vec<String>>,
	/// Extra form parameters appended to the token request, merged over `output=json`.
	pub token_params: Option<BTreeMap<String, String>>,
	/// Access token placement for authenticated GETs.
	pub access_token_placement: Option<AccessTokenPlacement>,
}
impl StrategyOptions {
	/// Creates empty options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the client id.
	pub fn client_id(mut self, value: impl Into<String>) -> Self {
		self.client_id = Some(value.into());

		self
	}

	/// Sets the client secret.
	pub fn client_secret(mut self, value: impl Into<String>) -> Self {
		self.client_secret = Some(value.into());

		self
	}

	/// Sets the callback URL.
	pub fn callback_url(mut self, value: impl Into<String>) -> Self {
		self.callback_url = Some(value.into());

		self
	}

	/// Overrides the authorization endpoint.
	pub fn authorization_url(mut self, value: impl Into<String>) -> Self {
		self.authorization_url = Some(value.into());

		self
	}

	/// Overrides the token endpoint.
	pub fn token_url(mut self, value: impl Into<String>) -> Self {
		self.token_url = Some(value.into());

		self
	}

	/// Overrides the scope separator.
	pub fn scope_separator(mut self, value: impl Into<String>) -> Self {
		self.scope_separator = Some(value.into());

		self
	}

	/// Adds a custom header.
	pub fn custom_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.custom_headers.get_or_insert_with(BTreeMap::new).insert(name.into(), value.into());

		self
	}

	/// Sets the requested permissions.
	pub fn scope<I, S>(mut self, scope: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.scope = Some(scope.into_iter().map(Into::into).collect());

		self
	}

	/// Adds an extra token request parameter.
	pub fn token_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.token_params.get_or_insert_with(BTreeMap::new).insert(key.into(), value.into());

		self
	}

	/// Chooses how the access token travels on authenticated GETs.
	pub fn access_token_placement(mut self, placement: AccessTokenPlacement) -> Self {
		self.access_token_placement = Some(placement);

		self
	}
}
impl Debug for StrategyOptions {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("StrategyOptions")
			.field("client_id", &self.client_id)
			.field("client_secret_set", &self.client_secret.is_some())
			.field("callback_url", &self.callback_url)
			.field("authorization_url", &self.authorization_url)
			.field("token_url", &self.token_url)
			.field("scope_separator", &self.scope_separator)
			.field("custom_headers", &self.custom_headers)
			.field("scope", &self.scope)
			.field("token_params", &self.token_params)
			.field("access_token_placement", &self.access_token_placement)
			.finish()
	}
}

/// Resolved strategy configuration, immutable once built.
///
/// Nothing is validated here. URLs, headers, and the client id are checked by the OAuth 2.0
/// collaborator when it first uses them.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyConfig {
	/// Deezer application id (may be empty; the collaborator rejects it on use).
	pub client_id: String,
	/// Deezer application secret.
	pub client_secret: Option<String>,
	/// Default callback URL.
	pub callback_url: Option<String>,
	/// Authorization endpoint.
	pub authorization_url: String,
	/// Token endpoint.
	pub token_url: String,
	/// Separator used to join requested permissions.
	pub scope_separator: String,
	/// Headers added to every collaborator request.
	pub custom_headers: BTreeMap<String, String>,
	/// Default permissions requested during authorization.
	pub scope: Vec<String>,
	/// Extra token request parameters.
	pub token_params: BTreeMap<String, String>,
	/// Access token placement for authenticated GETs.
	pub access_token_placement: AccessTokenPlacement,
}
impl StrategyConfig {
	/// Applies Deezer defaults to every field the caller left unset.
	///
	/// Empty strings count as unset; explicit values are never overwritten.
	pub fn from_options(options: StrategyOptions) -> Self {
		let StrategyOptions {
			client_id,
			client_secret,
			callback_url,
			authorization_url,
			token_url,
			scope_separator,
			custom_headers,
			scope,
			token_params,
			access_token_placement,
		} = options;

		Self {
			client_id: client_id.unwrap_or_default(),
			client_secret: set(client_secret),
			callback_url: set(callback_url),
			authorization_url: set(authorization_url)
				.unwrap_or_else(|| DEFAULT_AUTHORIZATION_URL.into()),
			token_url: set(token_url).unwrap_or_else(|| DEFAULT_TOKEN_URL.into()),
			scope_separator: set(scope_separator)
				.unwrap_or_else(|| DEFAULT_SCOPE_SEPARATOR.into()),
			custom_headers: custom_headers.unwrap_or_default(),
			scope: scope.unwrap_or_default(),
			token_params: default_token_params()
				.into_iter()
				.chain(token_params.into_iter().flatten())
				.collect(),
			access_token_placement: access_token_placement.unwrap_or_default(),
		}
	}

	/// Joins `scope` with the configured separator, or `None` when nothing was requested.
	pub fn format_scope(&self, scope: &[String]) -> Option<String> {
		let mut values = scope.iter().map(String::as_str).filter(|value| !value.is_empty());
		let first = values.next()?;
		let mut buf = first.to_owned();

		for value in values {
			buf.push_str(&self.scope_separator);
			buf.push_str(value);
		}

		Some(buf)
	}
}
impl Default for StrategyConfig {
	fn default() -> Self {
		Self::from_options(StrategyOptions::default())
	}
}
impl From<StrategyOptions> for StrategyConfig {
	fn from(options: StrategyOptions) -> Self {
		Self::from_options(options)
	}
}
impl Debug for StrategyConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("StrategyConfig")
			.field("client_id", &self.client_id)
			.field("client_secret_set", &self.client_secret.is_some())
			.field("callback_url", &self.callback_url)
			.field("authorization_url", &self.authorization_url)
			.field("token_url", &self.token_url)
			.field("scope_separator", &self.scope_separator)
			.field("custom_headers", &self.custom_headers)
			.field("scope", &self.scope)
			.field("token_params", &self.token_params)
			.field("access_token_placement", &self.access_token_placement)
			.finish()
	}
}

fn set(value: Option<String>) -> Option<String> {
	value.filter(|value| !value.is_empty())
}

// Deezer answers the token endpoint with a query string unless JSON is requested.
fn default_token_params() -> BTreeMap<String, String> {
	BTreeMap::from([("output".to_owned(), "json".to_owned())])
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn unset_fields_resolve_to_defaults() {
		let config = StrategyConfig::from_options(StrategyOptions::default());

		assert_eq!(config.client_id, "");
		assert_eq!(config.client_secret, None);
		assert_eq!(config.callback_url, None);
		assert_eq!(config.authorization_url, DEFAULT_AUTHORIZATION_URL);
		assert_eq!(config.token_url, DEFAULT_TOKEN_URL);
		assert_eq!(config.scope_separator, ",");
		assert!(config.custom_headers.is_empty());
		assert!(config.scope.is_empty());
		assert_eq!(config.token_params.get("output").map(String::as_str), Some("json"));
		assert_eq!(config.access_token_placement, AccessTokenPlacement::Query);
	}

	#[test]
	fn token_params_merge_over_the_json_default() {
		let config = StrategyConfig::from_options(StrategyOptions::new().token_param("lang", "fr"));

		assert_eq!(config.token_params.get("output").map(String::as_str), Some("json"));
		assert_eq!(config.token_params.get("lang").map(String::as_str), Some("fr"));

		let config =
			StrategyConfig::from_options(StrategyOptions::new().token_param("output", "xml"));

		assert_eq!(config.token_params.get("output").map(String::as_str), Some("xml"));
	}

	#[test]
	fn explicit_fields_are_never_overwritten() {
		let options = StrategyOptions::new()
			.client_id("123")
			.client_secret("shhh")
			.callback_url("https://www.example.net/auth/deezer/callback")
			.authorization_url("https://auth.example.com/authorize")
			.token_url("https://auth.example.com/token")
			.scope_separator(" ")
			.custom_header("x-trace", "on");
		let config = StrategyConfig::from_options(options);

		assert_eq!(config.client_id, "123");
		assert_eq!(config.client_secret.as_deref(), Some("shhh"));
		assert_eq!(
			config.callback_url.as_deref(),
			Some("https://www.example.net/auth/deezer/callback")
		);
		assert_eq!(config.authorization_url, "https://auth.example.com/authorize");
		assert_eq!(config.token_url, "https://auth.example.com/token");
		assert_eq!(config.scope_separator, " ");
		assert_eq!(config.custom_headers.get("x-trace").map(String::as_str), Some("on"));
	}

	#[test]
	fn empty_strings_count_as_unset() {
		let options =
			StrategyOptions::new().authorization_url("").token_url("").scope_separator("");
		let config = StrategyConfig::from_options(options);

		assert_eq!(config.authorization_url, DEFAULT_AUTHORIZATION_URL);
		assert_eq!(config.token_url, DEFAULT_TOKEN_URL);
		assert_eq!(config.scope_separator, DEFAULT_SCOPE_SEPARATOR);
	}

	#[test]
	fn options_deserialize_from_camel_case_keys() {
		let options: StrategyOptions = serde_json::from_str(
			r#"{
				"clientID": "123-456-789",
				"clientSecret": "shhh-its-a-secret",
				"callbackURL": "https://www.example.net/auth/deezer/callback",
				"customHeaders": { "user-agent": "deezer-demo" },
				"scope": ["basic_access", "email"],
				"accessTokenPlacement": "authorization_header"
			}"#,
		)
		.expect("Options fixture should deserialize.");
		let config = StrategyConfig::from(options);

		assert_eq!(config.client_id, "123-456-789");
		assert_eq!(config.client_secret.as_deref(), Some("shhh-its-a-secret"));
		assert_eq!(config.authorization_url, DEFAULT_AUTHORIZATION_URL);
		assert_eq!(config.custom_headers.get("user-agent").map(String::as_str), Some("deezer-demo"));
		assert_eq!(config.format_scope(&config.scope), Some("basic_access,email".into()));
		assert_eq!(config.access_token_placement, AccessTokenPlacement::AuthorizationHeader);
	}

	#[test]
	fn scope_formatting_skips_empty_entries() {
		let config = StrategyConfig::default();

		assert_eq!(config.format_scope(&[]), None);
		assert_eq!(config.format_scope(&["".into()]), None);
		assert_eq!(
			config.format_scope(&["basic_access".into(), "".into(), "offline_access".into()]),
			Some("basic_access,offline_access".into())
		);
	}

	#[test]
	fn debug_output_hides_the_client_secret() {
		let config = StrategyConfig::from_options(StrategyOptions::new().client_secret("shhh"));
		let rendered = format!("{config:?}");

		assert!(!rendered.contains("shhh"));
		assert!(rendered.contains("client_secret_set: true"));
	}
}

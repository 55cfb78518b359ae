//! The Deezer strategy, the host-facing [`Strategy`] trait, and the name-keyed registry.
//!
//! [`DeezerStrategy`] is a composition of an immutable [`StrategyConfig`], a shared
//! [`OAuth2Client`] capability, and the host's [`Verify`] callback. The strategy contributes
//! the provider defaults and the profile normalization; everything protocol-related stays in
//! the collaborator.

// self
use crate::{
	_prelude::*,
	auth::{TokenGrant, TokenSecret},
	error::{BoxError, ProfileError},
	oauth::OAuth2Client,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::{Profile, StrategyConfig},
};
#[cfg(feature = "reqwest")] use crate::oauth::BasicOAuth2;

/// Strategy name registered with the host framework.
pub const NAME: &str = "deezer";
/// Deezer endpoint describing the user the access token belongs to.
pub const PROFILE_URL: &str = "https://api.deezer.com/user/me";

/// Boxed `Send` future resolving to a normalized profile.
pub type ProfileFuture<'a> =
	Pin<Box<dyn Future<Output = Result<Profile, ProfileError>> + 'a + Send>>;
/// Boxed `Send` future returned by [`Verify::verify`].
pub type VerifyFuture<'a, U> =
	Pin<Box<dyn Future<Output = Result<Option<U>, BoxError>> + 'a + Send>>;

/// Authentication strategy as seen by a host framework.
pub trait Strategy: Send + Sync {
	/// Name the strategy is registered under.
	fn name(&self) -> &str;

	/// Fetches and normalizes the profile of the user owning `access_token`.
	///
	/// Resolves exactly once, with either a profile or an error.
	fn user_profile<'a>(&'a self, access_token: &'a TokenSecret) -> ProfileFuture<'a>;
}

/// Host callback mapping a token grant and profile to an application user.
///
/// `Ok(Some(user))` accepts the login, `Ok(None)` rejects it, and `Err` aborts it. Any
/// `Fn(TokenGrant, Profile) -> impl Future<Output = Result<Option<U>, BoxError>>` closure
/// implements this trait.
pub trait Verify: Send + Sync {
	/// Application user type.
	type User: Send;

	/// Resolves the user for a completed authorization.
	fn verify(&self, grant: TokenGrant, profile: Profile) -> VerifyFuture<'_, Self::User>;
}
impl<F, Fut, U> Verify for F
where
	F: Send + Sync + Fn(TokenGrant, Profile) -> Fut,
	Fut: 'static + Send + Future<Output = Result<Option<U>, BoxError>>,
	U: Send,
{
	type User = U;

	fn verify(&self, grant: TokenGrant, profile: Profile) -> VerifyFuture<'_, Self::User> {
		Box::pin(self(grant, profile))
	}
}

/// Deezer OAuth 2.0 strategy.
pub struct DeezerStrategy<V> {
	config: Arc<StrategyConfig>,
	oauth2: Arc<dyn OAuth2Client>,
	pub(crate) verify: V,
}
impl<V> DeezerStrategy<V> {
	/// Composes a strategy from options, an existing OAuth 2.0 collaborator, and a verify
	/// callback.
	///
	/// Deezer defaults are applied to the options; no validation happens here.
	pub fn with_oauth2_client(
		options: impl Into<StrategyConfig>,
		oauth2: Arc<dyn OAuth2Client>,
		verify: V,
	) -> Self {
		Self { config: Arc::new(options.into()), oauth2, verify }
	}

	/// Always [`NAME`].
	pub fn name(&self) -> &'static str {
		NAME
	}

	/// Resolved configuration.
	pub fn config(&self) -> &StrategyConfig {
		&self.config
	}

	/// OAuth 2.0 collaborator backing this strategy.
	pub fn oauth2(&self) -> &dyn OAuth2Client {
		self.oauth2.as_ref()
	}

	/// Performs one authenticated GET against [`PROFILE_URL`] and normalizes the response.
	pub async fn fetch_profile(&self, access_token: &TokenSecret) -> Result<Profile, ProfileError> {
		const KIND: FlowKind = FlowKind::Profile;

		let span = FlowSpan::new(KIND, "fetch_profile");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async {
				let response = self
					.oauth2
					.get(PROFILE_URL, access_token)
					.await
					.map_err(|source| ProfileError::FetchFailed { source })?;

				Profile::from_body(response.body)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}
#[cfg(feature = "reqwest")]
impl<V> DeezerStrategy<V> {
	/// Creates a strategy backed by the default reqwest collaborator.
	pub fn new(options: impl Into<StrategyConfig>, verify: V) -> Self {
		let config = Arc::new(options.into());
		let oauth2: Arc<dyn OAuth2Client> = Arc::new(BasicOAuth2::new(config.clone()));

		Self { config, oauth2, verify }
	}
}
impl<V> Strategy for DeezerStrategy<V>
where
	V: Verify,
{
	fn name(&self) -> &str {
		NAME
	}

	fn user_profile<'a>(&'a self, access_token: &'a TokenSecret) -> ProfileFuture<'a> {
		Box::pin(self.fetch_profile(access_token))
	}
}
impl<V> Debug for DeezerStrategy<V> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("DeezerStrategy")
			.field("name", &NAME)
			.field("config", &self.config)
			.finish()
	}
}

/// Host-side registry mapping strategy names to strategies.
#[derive(Clone, Default)]
pub struct StrategyRegistry {
	strategies: HashMap<String, Arc<dyn Strategy>>,
}
impl StrategyRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `strategy` under its own name, returning any strategy it replaced.
	pub fn register(&mut self, strategy: Arc<dyn Strategy>) -> Option<Arc<dyn Strategy>> {
		let name = strategy.name().to_owned();

		self.strategies.insert(name, strategy)
	}

	/// Registers `strategy` under an explicit name, returning any strategy it replaced.
	pub fn register_as(
		&mut self,
		name: impl Into<String>,
		strategy: Arc<dyn Strategy>,
	) -> Option<Arc<dyn Strategy>> {
		self.strategies.insert(name.into(), strategy)
	}

	/// Looks up a strategy by name.
	pub fn get(&self, name: &str) -> Option<Arc<dyn Strategy>> {
		self.strategies.get(name).cloned()
	}

	/// Removes a strategy by name.
	pub fn unregister(&mut self, name: &str) -> Option<Arc<dyn Strategy>> {
		self.strategies.remove(name)
	}

	/// Registered names in no particular order.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.strategies.keys().map(String::as_str)
	}
}
impl Debug for StrategyRegistry {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("StrategyRegistry").field("names", &self.strategies.keys()).finish()
	}
}

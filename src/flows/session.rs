//! Authorization start: random `state`, authorize URL, and the session the host keeps.

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{
	_prelude::*,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::DeezerStrategy,
};

const STATE_LEN: usize = 32;

/// Authorization handshake returned by [`DeezerStrategy::start_authorization`].
///
/// The host persists it (keyed by `state`) until the provider redirects back.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationSession {
	/// Opaque value that must round-trip through the redirect.
	pub state: String,
	/// Permissions requested.
	pub scope: Vec<String>,
	/// Callback URL sent to the authorization endpoint, if any.
	pub callback_url: Option<String>,
	/// URL the user agent should be sent to.
	pub authorize_url: Url,
}
impl AuthorizationSession {
	/// Validates the `state` parameter returned with the callback.
	pub fn validate_state(&self, returned_state: &str) -> Result<()> {
		if !self.state.is_empty() && returned_state == self.state {
			Ok(())
		} else {
			Err(Error::StateMismatch)
		}
	}
}

impl<V> DeezerStrategy<V> {
	/// Starts an authorization with the configured scope and callback URL.
	pub fn start_authorization(&self) -> Result<AuthorizationSession> {
		let config = self.config();

		self.start_authorization_with(config.scope.clone(), config.callback_url.clone())
	}

	/// Starts an authorization with a per-request scope and callback URL.
	pub fn start_authorization_with(
		&self,
		scope: Vec<String>,
		callback_url: Option<String>,
	) -> Result<AuthorizationSession> {
		const KIND: FlowKind = FlowKind::Authorization;

		let _guard = FlowSpan::new(KIND, "start_authorization").entered();

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let state = random_state();
		let result = self
			.oauth2()
			.authorize_url(&scope, &state, callback_url.as_deref())
			.map(|authorize_url| AuthorizationSession { state, scope, callback_url, authorize_url });

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}

fn random_state() -> String {
	rand::rng().sample_iter(Alphanumeric).take(STATE_LEN).map(char::from).collect()
}

//! Callback handling: denial detection, state check, code exchange, profile, and verify.

// self
use crate::{
	_prelude::*,
	flows::AuthorizationSession,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::{DeezerStrategy, Verify},
};

/// Query parameters Deezer appends to the callback URL.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallbackParams {
	/// Authorization code.
	pub code: Option<String>,
	/// Echoed `state`.
	pub state: Option<String>,
	/// OAuth error code.
	pub error: Option<String>,
	/// Deezer-specific denial reason (`user_denied`).
	pub error_reason: Option<String>,
	/// Human readable error.
	pub error_description: Option<String>,
}
impl CallbackParams {
	/// Extracts the parameters from a callback URL.
	pub fn from_url(url: &Url) -> Self {
		let mut params = Self::default();

		for (key, value) in url.query_pairs() {
			let slot = match key.as_ref() {
				"code" => &mut params.code,
				"state" => &mut params.state,
				"error" => &mut params.error,
				"error_reason" => &mut params.error_reason,
				"error_description" => &mut params.error_description,
				_ => continue,
			};

			*slot = Some(value.into_owned());
		}

		params
	}

	/// Reason to report when the user declined the authorization.
	fn denial(&self) -> Option<String> {
		let denied = self.error.as_deref() == Some("access_denied")
			|| self.error_reason.as_deref() == Some("user_denied");

		denied.then(|| {
			self.error_description.clone().unwrap_or_else(|| "User denied access.".into())
		})
	}
}

/// Terminal result of a completed callback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthOutcome<U> {
	/// Verify callback accepted the profile.
	Success(U),
	/// The user declined, or the verify callback rejected the profile.
	Fail {
		/// Reason suitable for showing to the user.
		reason: String,
	},
}
impl<U> AuthOutcome<U> {
	/// Returns the user on success.
	pub fn user(self) -> Option<U> {
		match self {
			Self::Success(user) => Some(user),
			Self::Fail { .. } => None,
		}
	}
}

impl<V> DeezerStrategy<V>
where
	V: Verify,
{
	/// Completes an authorization from the callback parameters.
	///
	/// Denials become [`AuthOutcome::Fail`]. Other provider errors, a state mismatch, a missing
	/// code, and any exchange, profile, or verify failure are returned as errors.
	pub async fn complete_authorization(
		&self,
		session: AuthorizationSession,
		params: CallbackParams,
	) -> Result<AuthOutcome<V::User>> {
		const KIND: FlowKind = FlowKind::Callback;

		let span = FlowSpan::new(KIND, "complete_authorization");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				if let Some(reason) = params.denial() {
					return Ok(AuthOutcome::Fail { reason });
				}
				if let Some(error) = params.error {
					return Err(Error::Authorization {
						error,
						description: params.error_description,
					});
				}

				session.validate_state(params.state.as_deref().unwrap_or_default())?;

				let code = params.code.filter(|code| !code.is_empty()).ok_or(Error::MissingCode)?;
				let grant =
					self.oauth2().exchange_code(&code, session.callback_url.as_deref()).await?;
				let profile = self.fetch_profile(&grant.access_token).await?;

				match self.verify.verify(grant, profile).await {
					Ok(Some(user)) => Ok(AuthOutcome::Success(user)),
					Ok(None) => Ok(AuthOutcome::Fail {
						reason: "Verify callback rejected the profile.".into(),
					}),
					Err(source) => Err(Error::Verify { source }),
				}
			})
			.await;

		match &result {
			Ok(AuthOutcome::Success(_)) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			_ => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}

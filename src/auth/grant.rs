//! Tokens handed back by the authorization-code exchange.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Result of a successful authorization-code exchange.
///
/// Nothing here is persisted; the grant is passed to the host verify callback and dropped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenGrant {
	/// Access token used for API calls.
	pub access_token: TokenSecret,
	/// Refresh token, when the provider issued one.
	pub refresh_token: Option<TokenSecret>,
	/// Lifetime reported by the provider; `None` for tokens that do not expire.
	pub expires_in: Option<Duration>,
	/// Instant the grant was received.
	pub issued_at: OffsetDateTime,
}
impl TokenGrant {
	/// Creates a non-expiring grant issued now.
	pub fn new(access_token: impl Into<TokenSecret>) -> Self {
		Self {
			access_token: access_token.into(),
			refresh_token: None,
			expires_in: None,
			issued_at: OffsetDateTime::now_utc(),
		}
	}

	/// Attaches a refresh token.
	pub fn with_refresh_token(mut self, refresh_token: impl Into<TokenSecret>) -> Self {
		self.refresh_token = Some(refresh_token.into());

		self
	}

	/// Sets the token lifetime. Non-positive durations mean the token never expires.
	pub fn with_expires_in(mut self, expires_in: Duration) -> Self {
		self.expires_in = expires_in.is_positive().then_some(expires_in);

		self
	}

	/// Absolute expiry instant, if the token expires.
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		self.expires_in.and_then(|lifetime| self.issued_at.checked_add(lifetime))
	}

	/// Returns `true` when the grant has expired at `instant`.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at().is_some_and(|expires_at| instant >= expires_at)
	}
}

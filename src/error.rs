//! Strategy-level error types shared across the collaborator, the profile normalizer, and the
//! authentication lifecycle.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Boxed error used for transport causes and host verify callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem surfaced when the collaborator used it.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure while calling the token endpoint.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Token endpoint rejected or garbled the exchange.
	#[error(transparent)]
	Token(#[from] TokenError),
	/// Profile fetch or normalization failed.
	#[error(transparent)]
	Profile(#[from] ProfileError),

	/// Callback `state` did not match the authorization session.
	#[error("Unable to verify authorization request state.")]
	StateMismatch,
	/// Callback carried neither an authorization code nor an error.
	#[error("Authorization callback is missing the code parameter.")]
	MissingCode,
	/// Provider redirected back with an error other than a user denial.
	#[error("Provider returned an authorization error: {error}.")]
	Authorization {
		/// Provider-supplied `error` value.
		error: String,
		/// Provider-supplied `error_description`, when present.
		description: Option<String>,
	},
	/// Host verify callback failed.
	#[error("Verify callback failed.")]
	Verify {
		/// Error raised by the host application.
		#[source]
		source: BoxError,
	},
}

/// Configuration failures raised once the collaborator uses the strategy config.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Client identifier is empty.
	#[error("OAuth 2.0 strategy requires a client id.")]
	MissingClientId,
	/// A configured endpoint or callback URL cannot be parsed.
	#[error("The {field} URL is invalid.")]
	InvalidEndpoint {
		/// Config field holding the URL.
		field: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A custom header name or value is not valid HTTP.
	#[error("Custom header `{name}` is invalid.")]
	InvalidHeader {
		/// Offending header name.
		name: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures reported by the collaborator (network, IO, HTTP status).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the provider.")]
	Io(#[from] std::io::Error),
	/// Request timed out inside the transport.
	#[error("Request timed out while calling the provider.")]
	Timeout {
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Request could not be built or the client failed in an unclassified way.
	#[error("HTTP client error occurred while calling the provider: {message}.")]
	Request {
		/// Client-supplied message.
		message: String,
	},
	/// Provider answered with a non-success HTTP status.
	#[error("Provider responded with HTTP {status}.")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Response body, kept for diagnostics.
		body: String,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// HTTP status attached to the failure, if any.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Timeout { status } => *status,
			Self::Status { status, .. } => Some(*status),
			_ => None,
		}
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Token endpoint failures during the authorization-code exchange.
#[derive(Debug, ThisError)]
pub enum TokenError {
	/// Provider answered with an OAuth error response.
	#[error("Token endpoint returned an OAuth error: {error}.")]
	Rejected {
		/// OAuth `error` code.
		error: String,
		/// OAuth `error_description`, when present.
		description: Option<String>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint responded with malformed JSON.
	#[error("Token endpoint returned malformed JSON.")]
	Parse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint returned something the OAuth client could not classify.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	Unexpected {
		/// Client-supplied message.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}

/// The two failure kinds raised by the profile normalizer.
#[derive(Debug, ThisError)]
pub enum ProfileError {
	/// The authenticated GET against the profile endpoint failed.
	#[error("Failed to fetch user profile.")]
	FetchFailed {
		/// Collaborator failure.
		#[source]
		source: TransportError,
	},
	/// The profile endpoint answered with a body that is not JSON.
	#[error("Failed to parse user profile.")]
	ParseFailed {
		/// JSON syntax failure.
		#[source]
		source: serde_json::Error,
	},
}

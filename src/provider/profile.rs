//! Normalized user profile built from the Deezer `user/me` response.

// crates.io
use serde_json::Value;
// self
use crate::{_prelude::*, error::ProfileError};

/// Provider label stamped on every normalized profile.
pub const PROVIDER: &str = "deezer";
/// Picture size variants, in the order they appear in [`Profile::photos`].
pub const PHOTO_SIZES: [&str; 3] = ["small", "medium", "big"];

/// Provider-agnostic user identity produced from one profile response.
///
/// `name`, `firstname`, `lastname`, and `email` are kept only when they are JSON strings; any
/// other value becomes `None` and stays readable through [`Profile::json`]. A missing `picture`
/// is treated as empty, so the photos read `?size=small` and so on.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
	/// Always [`PROVIDER`].
	pub provider: String,
	/// Deezer user id exactly as sent (a number in practice, `null` when absent).
	pub id: Value,
	/// Full name.
	pub display_name: Option<String>,
	/// Structured name.
	pub name: ProfileName,
	/// Exactly one entry; its value is `None` when the provider omitted the email.
	pub emails: Vec<ProfileEmail>,
	/// Exactly three entries, one per [`PHOTO_SIZES`] variant.
	pub photos: Vec<ProfilePhoto>,
	/// Original response body.
	#[serde(rename = "_raw")]
	pub raw: String,
	/// Parsed response body.
	#[serde(rename = "_json")]
	pub json: Value,
}
impl Profile {
	/// Parses a profile response body and maps it into a [`Profile`].
	///
	/// Fields are not validated: anything missing or not a string propagates as `None`.
	pub fn from_body(body: impl Into<String>) -> Result<Self, ProfileError> {
		let raw = body.into();
		let json = serde_json::from_str::<Value>(&raw)
			.map_err(|source| ProfileError::ParseFailed { source })?;

		Ok(Self::from_json(raw, json))
	}

	/// Maps an already parsed response into a [`Profile`].
	pub fn from_json(raw: String, json: Value) -> Self {
		let text = |field: &str| json.get(field).and_then(Value::as_str).map(str::to_owned);
		let picture = text("picture").unwrap_or_default();
		let photos = PHOTO_SIZES
			.iter()
			.map(|size| ProfilePhoto { value: format!("{picture}?size={size}") })
			.collect();

		Self {
			provider: PROVIDER.into(),
			id: json.get("id").cloned().unwrap_or(Value::Null),
			display_name: text("name"),
			name: ProfileName { family_name: text("lastname"), given_name: text("firstname") },
			emails: vec![ProfileEmail { value: text("email") }],
			photos,
			raw,
			json,
		}
	}

	/// The single email entry, if the provider sent one.
	pub fn email(&self) -> Option<&str> {
		self.emails.first().and_then(|email| email.value.as_deref())
	}
}

/// Structured name split into family and given parts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileName {
	/// Last name.
	pub family_name: Option<String>,
	/// First name.
	pub given_name: Option<String>,
}

/// Email entry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileEmail {
	/// Address, `None` when omitted by the provider.
	pub value: Option<String>,
}

/// Picture URL for one size variant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilePhoto {
	/// `<picture>?size=<variant>`.
	pub value: String,
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	const JANE: &str = r#"{"id": 42, "name": "Jane Doe", "firstname": "Jane", "lastname": "Doe", "email": "jane@example.com", "picture": "https://x/p.jpg"}"#;

	#[test]
	fn maps_a_complete_response() {
		let profile = Profile::from_body(JANE).expect("Jane fixture should parse.");

		assert_eq!(profile.provider, "deezer");
		assert_eq!(profile.id, json!(42));
		assert_eq!(profile.display_name.as_deref(), Some("Jane Doe"));
		assert_eq!(profile.name.family_name.as_deref(), Some("Doe"));
		assert_eq!(profile.name.given_name.as_deref(), Some("Jane"));
		assert_eq!(profile.email(), Some("jane@example.com"));
		assert_eq!(
			profile.photos.iter().map(|photo| photo.value.as_str()).collect::<Vec<_>>(),
			[
				"https://x/p.jpg?size=small",
				"https://x/p.jpg?size=medium",
				"https://x/p.jpg?size=big"
			]
		);
		assert_eq!(profile.raw, JANE);
		assert_eq!(profile.json["email"], json!("jane@example.com"));
	}

	#[test]
	fn missing_fields_propagate_as_empty_values() {
		let profile = Profile::from_body("{}").expect("Empty object should parse.");

		assert_eq!(profile.id, Value::Null);
		assert_eq!(profile.display_name, None);
		assert_eq!(profile.name, ProfileName::default());
		assert_eq!(profile.emails, vec![ProfileEmail { value: None }]);
		assert_eq!(
			profile.photos.iter().map(|photo| photo.value.as_str()).collect::<Vec<_>>(),
			["?size=small", "?size=medium", "?size=big"]
		);
	}

	#[test]
	fn provider_error_payload_passes_through() {
		let body = r#"{"error":{"type":"OAuthException","message":"Invalid OAuth access token.","code":300}}"#;
		let profile = Profile::from_body(body).expect("Error payload is still valid JSON.");

		assert_eq!(profile.id, Value::Null);
		assert_eq!(profile.photos.len(), 3);
		assert_eq!(profile.json["error"]["code"], json!(300));
	}

	#[test]
	fn non_string_fields_are_dropped_but_kept_in_json() {
		let body = r#"{"id": 7, "name": 12345, "email": false, "picture": null}"#;
		let profile = Profile::from_body(body).expect("Odd field types are still valid JSON.");

		assert_eq!(profile.display_name, None);
		assert_eq!(profile.email(), None);
		assert_eq!(profile.json["name"], json!(12345));
		assert_eq!(profile.photos[1].value, "?size=medium");
	}

	#[test]
	fn non_json_body_is_a_parse_failure() {
		let err = Profile::from_body("not json").expect_err("Plain text must not parse.");

		assert!(matches!(err, ProfileError::ParseFailed { .. }));
	}

	#[test]
	fn serializes_with_normalized_keys() {
		let profile = Profile::from_body(JANE).expect("Jane fixture should parse.");
		let value = serde_json::to_value(&profile).expect("Profile should serialize.");

		assert_eq!(value["displayName"], json!("Jane Doe"));
		assert_eq!(value["name"], json!({ "familyName": "Doe", "givenName": "Jane" }));
		assert_eq!(value["emails"], json!([{ "value": "jane@example.com" }]));
		assert_eq!(value["_raw"], json!(JANE));
		assert_eq!(value["_json"]["id"], json!(42));
	}
}

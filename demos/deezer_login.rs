//! Sends a user to Deezer and, given the URL Deezer redirected back to, finishes the login.
//!
//! ```sh
//! DEEZER_APP_ID=... DEEZER_SECRET=... cargo run --example deezer_login
//! DEEZER_APP_ID=... DEEZER_SECRET=... cargo run --example deezer_login -- '<callback url>' '<state>'
//! ```

// std
use std::env;
// crates.io
use color_eyre::{Result, eyre::eyre};
use url::Url;
// self
use oauth2_deezer::{
	auth::TokenGrant,
	error::BoxError,
	flows::{AuthOutcome, AuthorizationSession, CallbackParams},
	provider::{DeezerStrategy, Profile, StrategyOptions},
};

const CALLBACK_URL: &str = "http://localhost:3000/auth/deezer/callback";

async fn verify(grant: TokenGrant, profile: Profile) -> Result<Option<String>, BoxError> {
	println!("Access token expires at {:?}.", grant.expires_at());

	// A profile without a display name is rejected and ends as `AuthOutcome::Fail`.
	Ok(profile.display_name)
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let options = StrategyOptions::new()
		.client_id(env::var("DEEZER_APP_ID")?)
		.client_secret(env::var("DEEZER_SECRET")?)
		.callback_url(CALLBACK_URL)
		.scope(["basic_access", "email"]);
	let strategy = DeezerStrategy::new(options, verify);
	let mut args = env::args().skip(1);
	let Some(callback) = args.next() else {
		let session = strategy.start_authorization()?;

		println!("Send your user to {}.", session.authorize_url);
		println!("Then rerun with the callback URL and state `{}`.", session.state);

		return Ok(());
	};
	let state = args.next().ok_or_else(|| eyre!("The state printed by the first run is required."))?;
	// Restore the state the host would have persisted between the two requests.
	let session = AuthorizationSession { state, ..strategy.start_authorization()? };
	let params = CallbackParams::from_url(&Url::parse(&callback)?);

	match strategy.complete_authorization(session, params).await? {
		AuthOutcome::Success(name) => println!("Logged in as {name}."),
		AuthOutcome::Fail { reason } => println!("Login failed: {reason}"),
	}

	Ok(())
}

//! Authorization-code lifecycle built on top of the strategy and its OAuth 2.0 collaborator.
//!
//! [`DeezerStrategy::start_authorization`] produces an [`AuthorizationSession`] the host keeps
//! until Deezer redirects back; [`DeezerStrategy::complete_authorization`] checks the callback,
//! exchanges the code, fetches the profile, and hands both to the host verify callback.

pub mod callback;
pub mod session;

pub use callback::*;
pub use session::*;

//! Token models handed to the verify callback.

pub mod grant;
pub mod secret;

pub use grant::*;
pub use secret::*;

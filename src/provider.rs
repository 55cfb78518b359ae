//! Deezer provider: configuration defaults, profile normalization, and the strategy itself.
//!
//! `config` resolves [`StrategyOptions`] into an immutable [`StrategyConfig`], `profile` maps
//! the `user/me` response into a [`Profile`], and `strategy` composes both with the OAuth 2.0
//! collaborator into [`DeezerStrategy`].

pub mod config;
pub mod profile;
pub mod strategy;

pub use config::*;
pub use profile::*;
pub use strategy::*;

//! Translation gateway for travel content.
//!
//! Text goes through validation, an in-memory cache and a hosted inference
//! API, with cold-start waits and graceful fallback to the original text.

pub mod batch;
pub mod cache;
pub mod config;
pub mod error;
pub mod executor;
pub mod gateway;
pub mod i18n;
pub mod pipeline;
pub mod retry;
pub mod router;
pub mod security;
pub mod server;

pub use config::Config;
pub use error::{TranslationError, ValidationError};
pub use gateway::TranslationGateway;

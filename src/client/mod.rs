//! # Raindrop.io HTTP Client
//!
//! This module provides an HTTP client for the Raindrop.io REST API, handling
//! the OAuth2 authorization-code flow and the collection, raindrop and tag
//! endpoints.
//!
//! ## Modules
//!
//! - [`auth`] - OAuth2 authorization URL, code exchange and token refresh
//! - [`client`] - Main HTTP client implementation with all API methods
//! - [`config`] - Client configuration and environment loading
//! - [`error`] - Error type shared by every operation
//! - [`html`] - `<title>` extraction used when bookmarking a bare link
//! - [`http`] - Request construction, response parsing and cancellation
//! - [`types`] - Type definitions for API requests and responses
//!
//! ## Quick Start
//!
//! ```no_run
//! use raindrop_client::client::{ClientConfig, RaindropClient};
//!
//! # async fn example() -> raindrop_client::client::Result<()> {
//! let client = RaindropClient::new(ClientConfig::new(
//!     "client-id",
//!     "client-secret",
//!     "http://localhost:8080/oauth/callback",
//! ))?;
//!
//! println!("Authorize at {}", client.authorization_url());
//!
//! // ... receive the code on the redirect URI ...
//! let credential = client.exchange_code("code-from-redirect", None).await?;
//!
//! let collections = client
//!     .get_root_collections(&credential.access_token, None)
//!     .await?;
//! println!("Found {} collections", collections.items.len());
//! # Ok(())
//! # }
//! ```

pub mod auth;
#[allow(clippy::module_inception)]
pub mod client;
pub mod config;
pub mod error;
pub mod html;
pub mod http;
pub mod types;

pub use auth::RaindropAuth;
pub use client::{RaindropClient, ALL_COLLECTIONS, TITLE_PLACEHOLDER};
pub use config::ClientConfig;
pub use error::{RaindropError, Result};
pub use http::RequestContext;
pub use types::*;

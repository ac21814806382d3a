//! # Raindrop.io Client Library
//!
//! This library provides a client for the Raindrop.io bookmarking API. It
//! consists of two main components:
//!
//! ## Client Module
//!
//! The [`client`] module provides the HTTP client: the OAuth2
//! authorization-code flow plus collections, raindrops (bookmarks) and tags.
//!
//! ## Server Module
//!
//! The [`server`] module implements the handler for the OAuth redirect, which
//! receives the authorization code after the user approves the app.
//!
//! ## Quick Start
//!
//! ```no_run
//! use raindrop_client::{ClientConfig, RaindropClient};
//!
//! let client = RaindropClient::new(ClientConfig::new(
//!     "client-id",
//!     "client-secret",
//!     "http://localhost:8080/oauth/callback",
//! ))
//! .expect("valid configuration");
//!
//! println!("Open {} to authorize", client.authorization_url());
//! ```

pub mod client;
pub mod server;

pub use client::{ClientConfig, RaindropClient, RaindropError, RequestContext};

//! OAuth2 authorization-code flow for Raindrop.io.
//!
//! This module builds the authorization URL, exchanges the code delivered to the
//! redirect URI for an access token, and refreshes expired tokens. Nothing is
//! cached here: every exchange returns the [`Credential`] to the caller, who
//! stores it and passes it to the resource calls.

use reqwest::{Client, Method, StatusCode, Url};

use crate::client::{
    config::ClientConfig,
    error::{RaindropError, Result},
    http::{self, Endpoint, RequestContext},
    types::{AccessTokenRequest, AccessTokenResponse, Credential, RefreshTokenRequest},
};

pub const AUTHORIZE_ENDPOINT: &str = "/oauth/authorize";
pub const ACCESS_TOKEN_ENDPOINT: &str = "/oauth/access_token";

/// # Raindrop.io Authentication Handler
///
/// Drives the three steps of the authorization-code flow:
///
/// 1. [`authorization_url`](Self::authorization_url) - where to send the user
/// 2. the redirect back to the app, handled by
///    [`AuthorizationRedirect::into_code`](crate::client::AuthorizationRedirect::into_code)
///    or the [`server`](crate::server) module
/// 3. [`exchange_code`](Self::exchange_code) - trade the code for a token
///
/// [`refresh`](Self::refresh) trades a refresh token for a new credential.
/// Token requests are sent without an `Authorization` header.
#[derive(Debug, Clone)]
pub struct RaindropAuth {
    /// Base URL of the OAuth host
    auth_url: Url,
    /// HTTP client shared with the resource calls
    client: Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    authorization_grant_type: String,
    refresh_grant_type: String,
}

impl RaindropAuth {
    pub fn new(config: &ClientConfig, client: Client) -> Result<Self> {
        Ok(Self {
            auth_url: http::parse_base(&config.auth_host)?,
            client,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            authorization_grant_type: config.authorization_grant_type.clone(),
            refresh_grant_type: config.refresh_grant_type.clone(),
        })
    }

    /// URL the user opens to authorize the app. No network call is made.
    pub fn authorization_url(&self) -> Url {
        let mut url = http::join_path(&self.auth_url, AUTHORIZE_ENDPOINT);
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri);
        url
    }

    /// Exchange the authorization code from the redirect for an access token.
    pub async fn exchange_code(
        &self,
        code: &str,
        ctx: Option<&RequestContext>,
    ) -> Result<Credential> {
        tracing::info!("Exchanging authorization code for an access token");

        let body = AccessTokenRequest {
            code,
            client_id: &self.client_id,
            client_secret: &self.client_secret,
            redirect_uri: &self.redirect_uri,
            grant_type: &self.authorization_grant_type,
        };

        self.request_token(&body, ctx).await
    }

    /// Trade a refresh token for a new credential.
    pub async fn refresh(
        &self,
        refresh_token: &str,
        ctx: Option<&RequestContext>,
    ) -> Result<Credential> {
        tracing::info!("Refreshing access token");

        let body = RefreshTokenRequest {
            client_id: &self.client_id,
            client_secret: &self.client_secret,
            grant_type: &self.refresh_grant_type,
            refresh_token,
        };

        self.request_token(&body, ctx).await
    }

    async fn request_token<B>(&self, body: &B, ctx: Option<&RequestContext>) -> Result<Credential>
    where
        B: serde::Serialize,
    {
        let request = http::build_request(
            &self.client,
            Method::POST,
            Endpoint::new(&self.auth_url, ACCESS_TOKEN_ENDPOINT),
            Some(body),
            None,
            ctx,
        )?;
        tracing::debug!("Making token request to: {}", request.url());

        let response: AccessTokenResponse =
            http::round_trip(&self.client, request, StatusCode::OK, ctx).await?;

        match response.into_credential() {
            Ok(credential) => {
                tracing::info!("Token exchange successful");
                tracing::debug!("Received token: {}", credential.token_preview());
                Ok(credential)
            }
            Err(e) => {
                if let RaindropError::TokenExchange { message } = &e {
                    tracing::error!("Token exchange rejected by Raindrop.io: {}", message);
                }
                Err(e)
            }
        }
    }
}

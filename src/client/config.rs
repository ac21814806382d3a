//! Client configuration.
//!
//! The configuration is built once at startup and handed to
//! [`RaindropClient::new`](crate::client::RaindropClient::new), which keeps it
//! read-only for the rest of its life.

use std::env;
use std::time::Duration;

use crate::client::error::{RaindropError, Result};

/// Raindrop.io API host
pub const API_HOST: &str = "https://api.raindrop.io";
/// Raindrop.io OAuth host
pub const AUTH_HOST: &str = "https://raindrop.io";

/// Transport timeout applied to every request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Grant type sent with an authorization-code exchange
pub const AUTHORIZATION_CODE_GRANT: &str = "authorization_code";
/// Grant type sent with a refresh-token exchange
pub const REFRESH_TOKEN_GRANT: &str = "refresh_token";

/// OAuth application credentials plus the service endpoints.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// OAuth2 client ID from the Raindrop.io app console
    pub client_id: String,
    /// OAuth2 client secret
    pub client_secret: String,
    /// Redirect URI registered for the app
    pub redirect_uri: String,
    /// Base URL for REST calls
    pub api_host: String,
    /// Base URL for OAuth calls
    pub auth_host: String,
    /// Transport timeout
    pub timeout: Duration,
    /// `grant_type` for the code exchange
    pub authorization_grant_type: String,
    /// `grant_type` for the refresh exchange
    pub refresh_grant_type: String,
}

impl ClientConfig {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            api_host: API_HOST.to_string(),
            auth_host: AUTH_HOST.to_string(),
            timeout: DEFAULT_TIMEOUT,
            authorization_grant_type: AUTHORIZATION_CODE_GRANT.to_string(),
            refresh_grant_type: REFRESH_TOKEN_GRANT.to_string(),
        }
    }

    /// Load the configuration from `RAINDROP_*` environment variables.
    ///
    /// `RAINDROP_CLIENT_ID`, `RAINDROP_CLIENT_SECRET` and `RAINDROP_REDIRECT_URI`
    /// are required. `RAINDROP_API_HOST`, `RAINDROP_AUTH_HOST`,
    /// `RAINDROP_TIMEOUT_SECS` and `RAINDROP_REFRESH_GRANT_TYPE` override the
    /// defaults when set.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::new(
            required_var("RAINDROP_CLIENT_ID")?,
            required_var("RAINDROP_CLIENT_SECRET")?,
            required_var("RAINDROP_REDIRECT_URI")?,
        );

        if let Ok(host) = env::var("RAINDROP_API_HOST") {
            config = config.with_api_host(host);
        }
        if let Ok(host) = env::var("RAINDROP_AUTH_HOST") {
            config = config.with_auth_host(host);
        }
        if let Ok(secs) = env::var("RAINDROP_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|_| {
                RaindropError::Config(format!("RAINDROP_TIMEOUT_SECS is not a number: {}", secs))
            })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Ok(grant) = env::var("RAINDROP_REFRESH_GRANT_TYPE") {
            config = config.with_refresh_grant_type(grant);
        }

        Ok(config)
    }

    pub fn with_api_host(mut self, host: impl Into<String>) -> Self {
        self.api_host = host.into();
        self
    }

    pub fn with_auth_host(mut self, host: impl Into<String>) -> Self {
        self.auth_host = host.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_authorization_grant_type(mut self, grant_type: impl Into<String>) -> Self {
        self.authorization_grant_type = grant_type.into();
        self
    }

    /// Some deployments expect the authorization-code literal here as well.
    pub fn with_refresh_grant_type(mut self, grant_type: impl Into<String>) -> Self {
        self.refresh_grant_type = grant_type.into();
        self
    }
}

fn required_var(name: &str) -> Result<String> {
    env::var(name)
        .ok()
        .filter(|value| !value.is_empty())
        .ok_or_else(|| RaindropError::Config(format!("{} is not set", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test so no other test races on the process environment
    #[test]
    fn from_env_reads_required_and_optional_vars() {
        env::remove_var("RAINDROP_CLIENT_ID");
        assert!(matches!(
            ClientConfig::from_env(),
            Err(RaindropError::Config(_))
        ));

        env::set_var("RAINDROP_CLIENT_ID", "id");
        env::set_var("RAINDROP_CLIENT_SECRET", "secret");
        env::set_var("RAINDROP_REDIRECT_URI", "http://localhost:8080/cb");
        env::set_var("RAINDROP_TIMEOUT_SECS", "12");
        env::set_var("RAINDROP_API_HOST", "http://127.0.0.1:9000");

        let config = ClientConfig::from_env().unwrap();
        assert_eq!(config.client_id, "id");
        assert_eq!(config.redirect_uri, "http://localhost:8080/cb");
        assert_eq!(config.timeout, Duration::from_secs(12));
        assert_eq!(config.api_host, "http://127.0.0.1:9000");
        assert_eq!(config.auth_host, AUTH_HOST);
        assert_eq!(config.refresh_grant_type, REFRESH_TOKEN_GRANT);

        env::set_var("RAINDROP_TIMEOUT_SECS", "soon");
        assert!(ClientConfig::from_env().is_err());

        for name in [
            "RAINDROP_CLIENT_ID",
            "RAINDROP_CLIENT_SECRET",
            "RAINDROP_REDIRECT_URI",
            "RAINDROP_TIMEOUT_SECS",
            "RAINDROP_API_HOST",
        ] {
            env::remove_var(name);
        }
    }
}

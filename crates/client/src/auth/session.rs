// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Login and logout.

use std::sync::Arc;

use tracing::{info, warn};

use ferry_core::{ClockSource, CredentialPair};

use crate::http::{HttpClient, RequestConfig};

use super::{AuthError, AuthResult, TokenResponse, TokenStore};

/// Establishes and tears down the authenticated session.
pub struct Session {
    client: Arc<HttpClient>,
    tokens: Arc<TokenStore>,
    clock: Arc<dyn ClockSource>,
    login_endpoint: String,
    logout_endpoint: String,
}

impl Session {
    pub fn new(
        client: Arc<HttpClient>,
        tokens: Arc<TokenStore>,
        clock: Arc<dyn ClockSource>,
        login_endpoint: impl Into<String>,
        logout_endpoint: impl Into<String>,
    ) -> Self {
        Session {
            client,
            tokens,
            clock,
            login_endpoint: login_endpoint.into(),
            logout_endpoint: logout_endpoint.into(),
        }
    }

    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    /// Posts `credentials` to the login endpoint and stores the returned pair.
    ///
    /// # Errors
    ///
    /// [`AuthError::Rejected`] for a non-2xx answer; [`AuthError::Http`] when
    /// the call fails or the body lacks either token.
    pub async fn login(&self, credentials: &serde_json::Value) -> AuthResult<CredentialPair> {
        let config = RequestConfig::post(&self.login_endpoint).json(credentials)?.skip_auth();
        let response = self.client.execute(config).await?;

        if !response.is_success() {
            warn!(status = response.status, "login rejected");
            return Err(AuthError::Rejected { status: response.status });
        }

        let tokens: TokenResponse = response.json()?;
        let pair = tokens.into_pair(None, self.clock.now()).ok_or_else(|| {
            crate::http::HttpError::Decode("login response missing refresh token".to_string())
        })?;

        self.tokens.save(pair.clone())?;
        info!("logged in");
        Ok(pair)
    }

    /// Notifies the server (best effort) and clears the local session.
    pub async fn logout(&self) -> AuthResult<()> {
        if self.tokens.is_authenticated() {
            match self.client.execute(RequestConfig::post(&self.logout_endpoint)).await {
                Ok(response) if !response.is_success() => {
                    warn!(status = response.status, "logout call was not accepted");
                }
                Ok(_) => {}
                Err(e) => warn!("logout call failed: {}", e),
            }
        }

        self.tokens.clear()?;
        info!("logged out");
        Ok(())
    }
}

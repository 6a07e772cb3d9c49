// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Authenticated session lifecycle.
//!
//! - [`TokenStore`] owns the credential pair and the single-flight refresh.
//! - [`Session`] drives login and logout against the reserved endpoints.

mod session;
mod token_store;

use serde::Deserialize;

use ferry_core::CredentialPair;

use crate::http::HttpError;

pub use session::Session;
pub use token_store::TokenStore;

/// Error type for authentication operations.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// There is no credential pair to use or refresh.
    #[error("not logged in\n  hint: run 'ferry login' first")]
    NoSession,

    /// The refresh call failed; the session has been cleared.
    #[error("session refresh failed: {0}\n  hint: log in again")]
    RefreshFailed(String),

    /// The login endpoint refused the credentials.
    #[error("authentication rejected with status {status}")]
    Rejected { status: u16 },

    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("credential storage error: {0}")]
    Store(#[from] ferry_core::Error),
}

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Body returned by the login and refresh endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    #[serde(alias = "accessToken")]
    access_token: String,
    #[serde(default, alias = "refreshToken")]
    refresh_token: Option<String>,
}

impl TokenResponse {
    /// Builds a pair, keeping `previous_refresh` when the server did not
    /// rotate the refresh token.
    pub(crate) fn into_pair(
        self,
        previous_refresh: Option<&str>,
        issued_at: chrono::DateTime<chrono::Utc>,
    ) -> Option<CredentialPair> {
        let refresh_token = self.refresh_token.or_else(|| previous_refresh.map(str::to_string))?;
        Some(CredentialPair::new(self.access_token, refresh_token, issued_at))
    }
}

//! REST calls used to set up a match: accounts, tokens and match lobby.

use papercricket_core::MatchStatus;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

const DEFAULT_ERROR_MESSAGE: &str = "An API error occurred";

/// Access and refresh tokens returned by login.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserProfile {
    pub id: u64,
    pub username: String,
}

/// A match as listed by the create and join endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MatchSummary {
    pub id: u64,
    pub match_code: String,
    pub status: MatchStatus,
    pub overs: u32,
    pub wickets: u32,
    pub player1: UserProfile,
    #[serde(default)]
    pub player2: Option<UserProfile>,
}

#[derive(Serialize)]
struct Login<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct CreateMatch {
    overs: u32,
    wickets: u32,
}

#[derive(Serialize)]
struct JoinMatch<'a> {
    match_code: &'a str,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Client for the match-setup REST API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let response = self
            .http
            .post(self.endpoint("/auth/register/"))
            .json(&Login { username, password })
            .send()
            .await?;
        check(response).await?;
        tracing::info!("Registered {}", username);
        Ok(())
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair, ApiError> {
        let response = self
            .http
            .post(self.endpoint("/auth/login/"))
            .json(&Login { username, password })
            .send()
            .await?;
        decode(response).await
    }

    pub async fn current_user(&self, token: &str) -> Result<UserProfile, ApiError> {
        let response = self
            .http
            .get(self.endpoint("/auth/user/"))
            .bearer_auth(token)
            .send()
            .await?;
        decode(response).await
    }

    pub async fn create_match(
        &self,
        token: &str,
        overs: u32,
        wickets: u32,
    ) -> Result<MatchSummary, ApiError> {
        validate_match_settings(overs, wickets)?;
        let response = self
            .http
            .post(self.endpoint("/matches/create/"))
            .bearer_auth(token)
            .json(&CreateMatch { overs, wickets })
            .send()
            .await?;
        let summary: MatchSummary = decode(response).await?;
        tracing::info!("Created match {}", summary.match_code);
        Ok(summary)
    }

    pub async fn join_match(&self, token: &str, match_code: &str) -> Result<MatchSummary, ApiError> {
        let match_code = normalize_match_code(match_code);
        if match_code.is_empty() || match_code.len() > 10 {
            return Err(ApiError::InvalidInput(format!(
                "match code must be 1-10 characters, got {:?}",
                match_code
            )));
        }
        let response = self
            .http
            .post(self.endpoint("/matches/join/"))
            .bearer_auth(token)
            .json(&JoinMatch {
                match_code: &match_code,
            })
            .send()
            .await?;
        let summary: MatchSummary = decode(response).await?;
        tracing::info!("Joined match {}", summary.match_code);
        Ok(summary)
    }
}

/// Match codes are issued in upper case; accept them typed in any case.
pub fn normalize_match_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// Overs 1-50 and wickets 1-10, as the server accepts.
pub fn validate_match_settings(overs: u32, wickets: u32) -> Result<(), ApiError> {
    if !(1..=50).contains(&overs) {
        return Err(ApiError::InvalidInput(format!(
            "overs must be between 1 and 50, got {}",
            overs
        )));
    }
    if !(1..=10).contains(&wickets) {
        return Err(ApiError::InvalidInput(format!(
            "wickets must be between 1 and 10, got {}",
            wickets
        )));
    }
    Ok(())
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    Ok(check(response).await?.json().await?)
}

/// Turn a non-2xx response into [`ApiError::Rejected`].
async fn check(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .json::<serde_json::Value>()
            .await
            .unwrap_or(serde_json::Value::Null);
        let message = error_message(&body);
        tracing::warn!("API request rejected ({}): {}", status, message);
        return Err(ApiError::Rejected {
            status: status.as_u16(),
            message,
        });
    }
    Ok(response)
}

/// Pull the human-readable message out of an error body.
fn error_message(body: &serde_json::Value) -> String {
    ["detail", "error"]
        .iter()
        .find_map(|key| body.get(key).and_then(|v| v.as_str()))
        .unwrap_or(DEFAULT_ERROR_MESSAGE)
        .to_string()
}

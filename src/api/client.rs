// Allow dead code: client surface methods exercised only by tests
#![allow(dead_code)]

//! API client for communicating with the conference-catalog REST service.
//!
//! This module provides the `ApiClient` struct for making authenticated
//! requests: login/signup, the admin check, and conference and user-account
//! CRUD. A bearer token is attached to every request once one is set.

use reqwest::{header, Client};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::auth::Credentials;
use crate::models::{Conference, Role, UserAccount};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Default base URL for the catalog service.
/// Deployments override this via config or CONFDECK_API_URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:4555";

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct IsAdminResponse {
    #[serde(rename = "isAdmin", default)]
    is_admin: bool,
}

#[derive(Debug, Serialize)]
struct SignupRequest<'a> {
    id: &'a str,
    password: &'a str,
    #[serde(rename = "type")]
    account_type: &'a str,
}

#[derive(Debug, Serialize)]
struct ChangeTypeRequest {
    #[serde(rename = "newType")]
    new_type: Role,
}

#[derive(Debug, Serialize)]
struct ChangePasswordRequest<'a> {
    #[serde(rename = "oldPassword")]
    old_password: &'a str,
    password: &'a str,
}

/// Extract the bearer token from a login response body.
///
/// The catalog service has answered login with three different shapes across
/// deployments: `{"Token": "..."}`, `{"token": "..."}`, and a bare string
/// body. Compatibility shim; the shapes are tried in that order.
fn extract_token(body: &str) -> Option<String> {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        let token = value
            .get("Token")
            .and_then(|t| t.as_str())
            .or_else(|| value.get("token").and_then(|t| t.as_str()))
            .or_else(|| value.as_str());
        return token
            .map(str::to_string)
            .filter(|t| !t.is_empty());
    }
    // Not JSON: some proxies hand the token back as raw text
    let raw = body.trim();
    (!raw.is_empty()).then(|| raw.to_string())
}

/// API client for the conference-catalog service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client against the given base URL
    pub fn new(base_url: String) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url,
            token: None,
        })
    }

    /// Set the bearer token for authenticated requests
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    /// Drop the bearer token; subsequent requests go out unauthenticated
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn auth_headers(&self) -> Result<header::HeaderMap, ApiError> {
        let mut headers = header::HeaderMap::new();
        if let Some(ref token) = self.token {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|e| ApiError::InvalidResponse(format!("Invalid token: {}", e)))?,
            );
        }
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        let response = self
            .client
            .get(&url)
            .headers(self.auth_headers()?)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("{}: {}", url, e)))
    }

    /// POST a JSON body, ignoring whatever confirmation the server returns
    async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url(path))
            .headers(self.auth_headers()?)
            .json(body)
            .send()
            .await?;

        Self::check_response(response).await?;
        Ok(())
    }

    /// PATCH a JSON body, ignoring whatever confirmation the server returns
    async fn patch<B: Serialize>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        let response = self
            .client
            .patch(self.url(path))
            .headers(self.auth_headers()?)
            .json(body)
            .send()
            .await?;

        Self::check_response(response).await?;
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(self.url(path))
            .headers(self.auth_headers()?)
            .send()
            .await?;

        Self::check_response(response).await?;
        Ok(())
    }

    // ===== Authentication =====

    /// Authenticate and return the bearer token.
    /// The token is NOT set on the client; the session manager owns that.
    pub async fn login(&self, credentials: &Credentials) -> Result<String, ApiError> {
        let response = self
            .client
            .post(self.url("/login"))
            .json(credentials)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let body = response.text().await?;

        extract_token(&body).ok_or_else(|| {
            ApiError::InvalidResponse("No token in login response".to_string())
        })
    }

    /// Create a new regular account
    pub async fn signup(&self, credentials: &Credentials) -> Result<(), ApiError> {
        self.post(
            "/signup",
            &SignupRequest {
                id: &credentials.id,
                password: &credentials.password,
                account_type: "user",
            },
        )
        .await
    }

    /// Ask the service whether the current token belongs to an admin account.
    /// Also serves as the token-validity probe during startup.
    pub async fn is_admin(&self) -> Result<bool, ApiError> {
        let response: IsAdminResponse = self.get("/isadmin").await?;
        debug!(is_admin = response.is_admin, "Admin check completed");
        Ok(response.is_admin)
    }

    // ===== Conferences =====

    pub async fn fetch_conferences(&self) -> Result<Vec<Conference>, ApiError> {
        self.get("/conferences").await
    }

    pub async fn fetch_conference(&self, id: &str) -> Result<Conference, ApiError> {
        self.get(&format!("/conference/{}", id)).await
    }

    pub async fn create_conference(&self, conference: &Conference) -> Result<(), ApiError> {
        self.post("/conference", conference).await
    }

    pub async fn update_conference(&self, id: &str, conference: &Conference) -> Result<(), ApiError> {
        self.patch(&format!("/conference/{}", id), conference).await
    }

    pub async fn delete_conference(&self, id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/conference/{}", id)).await
    }

    // ===== User accounts =====

    pub async fn fetch_users(&self) -> Result<Vec<UserAccount>, ApiError> {
        self.get("/users").await
    }

    pub async fn delete_user(&self, id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/user/{}", id)).await
    }

    pub async fn change_user_type(&self, id: &str, new_type: Role) -> Result<(), ApiError> {
        self.patch(
            &format!("/usertype/{}", id),
            &ChangeTypeRequest { new_type },
        )
        .await
    }

    /// Promote an account to admin (one-way; demotion is not exposed)
    pub async fn promote_to_admin(&self, id: &str) -> Result<(), ApiError> {
        self.change_user_type(id, Role::Admin).await
    }

    pub async fn change_password(&self, old_password: &str, password: &str) -> Result<(), ApiError> {
        self.patch(
            "/userpassword",
            &ChangePasswordRequest {
                old_password,
                password,
            },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_token_capitalized_field() {
        assert_eq!(
            extract_token(r#"{"Token": "abc123"}"#).as_deref(),
            Some("abc123")
        );
    }

    #[test]
    fn test_extract_token_lowercase_field() {
        assert_eq!(
            extract_token(r#"{"token": "abc123"}"#).as_deref(),
            Some("abc123")
        );
    }

    #[test]
    fn test_extract_token_prefers_capitalized() {
        // Both present: the historical capitalized field wins
        assert_eq!(
            extract_token(r#"{"Token": "first", "token": "second"}"#).as_deref(),
            Some("first")
        );
    }

    #[test]
    fn test_extract_token_bare_string_body() {
        assert_eq!(extract_token(r#""abc123""#).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_extract_token_raw_text_body() {
        assert_eq!(extract_token("abc123\n").as_deref(), Some("abc123"));
    }

    #[test]
    fn test_extract_token_rejects_empty() {
        assert_eq!(extract_token(""), None);
        assert_eq!(extract_token(r#"{"Token": ""}"#), None);
        assert_eq!(extract_token(r#"{"status": "ok"}"#), None);
    }

    #[test]
    fn test_signup_request_shape() {
        let body = serde_json::to_value(SignupRequest {
            id: "alice",
            password: "p",
            account_type: "user",
        })
        .unwrap();
        assert_eq!(body["type"], "user");
        assert_eq!(body["id"], "alice");
    }

    #[test]
    fn test_change_type_request_shape() {
        let body = serde_json::to_value(ChangeTypeRequest {
            new_type: Role::Admin,
        })
        .unwrap();
        assert_eq!(body["newType"], "admin");
    }

    #[test]
    fn test_change_password_request_shape() {
        let body = serde_json::to_value(ChangePasswordRequest {
            old_password: "old",
            password: "new",
        })
        .unwrap();
        assert_eq!(body["oldPassword"], "old");
        assert_eq!(body["password"], "new");
    }
}

//! User service: login, signup, session lifecycle and account recovery

use std::fmt;

use reach_auth::Role;
use reach_common::{ApiResponse, Service};
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::{ApiClient, RequestOptions};
use crate::error::ClientError;
use crate::events::AuthEvent;
use crate::tokens::{IssuedTokens, TokenManager};

pub const LOGIN_PATH: &str = "/api/v1/auth/login";
pub const SIGNUP_PATH: &str = "/api/v1/auth/signup";
pub const LOGOUT_PATH: &str = "/api/v1/auth/logout";
pub const REFRESH_PATH: &str = "/api/v1/auth/refresh";
pub const PROFILE_PATH: &str = "/api/v1/auth/profile";
pub const VERIFY_EMAIL_PATH: &str = "/api/v1/auth/verify-email";
pub const FORGOT_PASSWORD_PATH: &str = "/api/v1/auth/forgot-password";
pub const RESET_PASSWORD_PATH: &str = "/api/v1/auth/reset-password";

#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub role: Role,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("full_name", &self.full_name)
            .field("role", &self.role)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Outcome of a login or signup
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AuthSession {
    #[serde(default, alias = "token")]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

/// Typed access to the user service auth endpoints
#[derive(Debug, Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub fn new(tokens: TokenManager) -> Self {
        Self {
            client: ApiClient::new(Service::User, tokens),
        }
    }

    pub fn tokens(&self) -> &TokenManager {
        self.client.tokens()
    }

    async fn anonymous_post<B>(&self, endpoint: &str, body: &B) -> Result<ApiResponse<Value>, ClientError>
    where
        B: Serialize + ?Sized,
    {
        let options = RequestOptions::new(Method::POST)
            .with_body(serde_json::to_value(body)?)
            .anonymous();
        self.client.request(endpoint, options).await
    }

    /// Exchange credentials for tokens and persist them
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthSession, ClientError> {
        let response = self.anonymous_post(LOGIN_PATH, credentials).await?;
        let data = response.into_data().unwrap_or(Value::Null);

        let issued = IssuedTokens::from_body(&data).ok_or_else(|| {
            ClientError::Authentication("Login response did not contain a token".to_string())
        })?;
        self.tokens().store_issued(&issued);

        tracing::info!(email = %credentials.email, "Logged in");

        Ok(session_from(data, issued))
    }

    /// Create an account. Tokens are stored when the server signs the user in
    /// immediately; otherwise the session carries only the profile.
    pub async fn signup(&self, registration: &Registration) -> Result<AuthSession, ClientError> {
        let response = self.anonymous_post(SIGNUP_PATH, registration).await?;
        let data = response.into_data().unwrap_or(Value::Null);

        match IssuedTokens::from_body(&data) {
            Some(issued) => {
                self.tokens().store_issued(&issued);
                tracing::info!(email = %registration.email, role = %registration.role, "Signed up and logged in");
                Ok(session_from(data, issued))
            }
            None => {
                tracing::info!(email = %registration.email, role = %registration.role, "Signed up, verification pending");
                Ok(AuthSession {
                    user: parse_user(&data),
                    ..AuthSession::default()
                })
            }
        }
    }

    /// End the session. The server call is best effort; local tokens are
    /// always cleared and `LoggedOut` is always emitted.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let mut options = RequestOptions::new(Method::POST).anonymous();
        if let Some(token) = self.tokens().get_token() {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", token)) {
                options = options.with_header(AUTHORIZATION, value);
            }
        }

        if let Err(e) = self.client.request::<Value>(LOGOUT_PATH, options).await {
            tracing::warn!(error = %e, "Logout request failed, clearing local session anyway");
        }

        self.tokens().clear_token();
        self.tokens().events().emit(AuthEvent::LoggedOut);
        tracing::info!("Logged out");

        Ok(())
    }

    pub async fn refresh(&self) -> Result<String, ClientError> {
        self.tokens().refresh_token().await
    }

    pub async fn profile(&self) -> Result<UserProfile, ClientError> {
        let response = self.client.get::<UserProfile>(PROFILE_PATH).await?;
        response
            .into_data()
            .ok_or_else(|| ClientError::Serialization("Profile response had no data".to_string()))
    }

    pub async fn verify_email(&self, token: &str) -> Result<ApiResponse<Value>, ClientError> {
        let options = RequestOptions::new(Method::GET)
            .with_query("token", token)
            .anonymous();
        self.client.request(VERIFY_EMAIL_PATH, options).await
    }

    pub async fn forgot_password(&self, email: &str) -> Result<ApiResponse<Value>, ClientError> {
        self.anonymous_post(FORGOT_PASSWORD_PATH, &serde_json::json!({ "email": email }))
            .await
    }

    pub async fn reset_password(
        &self,
        token: &str,
        password: &str,
    ) -> Result<ApiResponse<Value>, ClientError> {
        self.anonymous_post(
            RESET_PASSWORD_PATH,
            &serde_json::json!({ "token": token, "password": password }),
        )
        .await
    }
}

fn parse_user(data: &Value) -> Option<UserProfile> {
    data.get("user")
        .cloned()
        .and_then(|user| serde_json::from_value(user).ok())
}

fn session_from(data: Value, issued: IssuedTokens) -> AuthSession {
    AuthSession {
        access_token: Some(issued.access_token),
        refresh_token: issued.refresh_token,
        user: parse_user(&data),
    }
}

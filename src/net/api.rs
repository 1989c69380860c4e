//! Backend seam for session operations.
//!
//! The auth gateway only talks to the backend through [`AuthBackend`], so
//! tests can script responses without a network. [`super::http::HttpBackend`]
//! is the production implementation.

use super::types::{ApiError, ApiResponse, LoginData, LoginRequest, RegisterRequest, User};

pub const ME_PATH: &str = "/api/users/me";
pub const LOGIN_PATH: &str = "/api/auth/login";
pub const REGISTER_PATH: &str = "/api/users/register";

/// Provider-neutral async trait for the session endpoints. Enables mocking in tests.
///
/// Implementations return the decoded envelope even when it reports a logical
/// failure; `Err` is reserved for transport and decode problems.
#[async_trait::async_trait]
pub trait AuthBackend: Send + Sync {
    /// `GET /api/users/me` authenticated with `token`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails or the body is malformed.
    async fn current_user(&self, token: &str) -> Result<ApiResponse<User>, ApiError>;

    /// `POST /api/auth/login`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails or the body is malformed.
    async fn login(&self, request: &LoginRequest) -> Result<ApiResponse<LoginData>, ApiError>;

    /// `POST /api/users/register`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails or the body is malformed.
    async fn register(&self, request: &RegisterRequest) -> Result<ApiResponse<serde_json::Value>, ApiError>;
}

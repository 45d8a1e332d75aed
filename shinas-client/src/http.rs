//! HTTP client for network-based API calls

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use shared::client::{LoginRequest, LoginResponse, RegisterRequest, UpdateUserRequest};
use shared::models::{BookingRequest, User};

use crate::{ClientConfig, ClientError, ClientResult};

/// Booking search parameters; empty/whitespace values are dropped.
#[derive(Debug, Clone, Default)]
pub struct SearchParams {
    pub reference: Option<String>,
    pub passport: Option<String>,
    pub id_number: Option<String>,
}

impl SearchParams {
    fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        for (key, value) in [
            ("reference", &self.reference),
            ("passport", &self.passport),
            ("id_number", &self.id_number),
        ] {
            if let Some(v) = value {
                let trimmed = v.trim();
                if !trimmed.is_empty() {
                    query.push((key, trimmed.to_string()));
                }
            }
        }
        query
    }
}

/// HTTP client for making network requests to the hosted API
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        }
    }

    /// Set the bearer token
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    /// Clear the bearer token
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Get the current token
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Build authorization header value
    fn auth_header(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let mut req = self.client.get(self.url(path));

        if let Some(auth) = self.auth_header() {
            req = req.header(reqwest::header::AUTHORIZATION, auth);
        }

        let resp = req.send().await.map_err(send_error)?;
        Self::handle_response(resp).await
    }

    async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ClientResult<T> {
        let mut req = self.client.get(self.url(path)).query(query);

        if let Some(auth) = self.auth_header() {
            req = req.header(reqwest::header::AUTHORIZATION, auth);
        }

        let resp = req.send().await.map_err(send_error)?;
        Self::handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let mut req = self.client.post(self.url(path)).json(body);

        if let Some(auth) = self.auth_header() {
            req = req.header(reqwest::header::AUTHORIZATION, auth);
        }

        let resp = req.send().await.map_err(send_error)?;
        Self::handle_response(resp).await
    }

    async fn patch<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let mut req = self.client.patch(self.url(path)).json(body);

        if let Some(auth) = self.auth_header() {
            req = req.header(reqwest::header::AUTHORIZATION, auth);
        }

        let resp = req.send().await.map_err(send_error)?;
        Self::handle_response(resp).await
    }

    /// DELETE returns no body on success (204)
    async fn delete(&self, path: &str) -> ClientResult<()> {
        let mut req = self.client.delete(self.url(path));

        if let Some(auth) = self.auth_header() {
            req = req.header(reqwest::header::AUTHORIZATION, auth);
        }

        let resp = req.send().await.map_err(send_error)?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(status_error(status, text));
        }
        Ok(())
    }

    /// Handle the HTTP response
    async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> ClientResult<T> {
        let status = resp.status();

        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(status_error(status, text));
        }

        resp.json().await.map_err(Into::into)
    }

    // ========== Auth API ==========

    /// Register a new account
    pub async fn register(&self, req: &RegisterRequest) -> ClientResult<User> {
        self.post("/auth/register/", req).await
    }

    /// Login with username and password
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<LoginResponse> {
        let req = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        self.post("/auth/login/", &req).await
    }

    /// Get the user record behind the current bearer token
    pub async fn me(&self) -> ClientResult<User> {
        self.get("/auth/me/").await
    }

    /// List all users (admin)
    pub async fn list_users(&self) -> ClientResult<Vec<User>> {
        self.get("/auth/users/").await
    }

    /// Update a user record (admin, or the user themselves)
    pub async fn update_user(&self, id: &str, req: &UpdateUserRequest) -> ClientResult<User> {
        self.patch(&format!("/auth/users/{}/", id), req).await
    }

    /// Delete a user record (admin)
    pub async fn delete_user(&self, id: &str) -> ClientResult<()> {
        self.delete(&format!("/auth/users/{}/", id)).await
    }

    // ========== Bookings API ==========

    /// Create a booking; the server assigns reference and timestamp
    pub async fn create_booking(&self, booking: &BookingRequest) -> ClientResult<BookingRequest> {
        self.post("/bookings/", booking).await
    }

    /// Search bookings by reference, passport or id number
    pub async fn search_bookings(&self, params: &SearchParams) -> ClientResult<Vec<BookingRequest>> {
        self.get_with_query("/bookings/search", &params.to_query())
            .await
    }

    /// Fetch one booking by its reference
    pub async fn get_booking(&self, reference: &str) -> ClientResult<BookingRequest> {
        self.get(&format!("/bookings/{}/", reference)).await
    }
}

/// Classify a send-phase failure: nothing reached the server, so no
/// status code exists.
fn send_error(e: reqwest::Error) -> ClientError {
    tracing::debug!(error = %e, "request transport failure");
    ClientError::Unreachable(e.to_string())
}

/// Map an HTTP status to the matching error variant.
fn status_error(status: StatusCode, text: String) -> ClientError {
    match status {
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
        StatusCode::FORBIDDEN => ClientError::Forbidden(text),
        StatusCode::NOT_FOUND => ClientError::NotFound(text),
        StatusCode::BAD_REQUEST => ClientError::Validation(text),
        StatusCode::CONFLICT => ClientError::Conflict(text),
        _ => ClientError::Internal(text),
    }
}

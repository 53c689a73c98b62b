//! Async API client: build, authorize, execute, parse.
//!
//! # Design
//! `ApiClient` composes the stateless `BookClient` with two injected
//! capabilities: a `Transport` that performs the round-trip and a
//! `CredentialProvider` that is consulted before every request. Callers never
//! pass the token explicitly; whatever the provider holds at send time is
//! attached as `authorization: Bearer <token>`, and nothing is attached when
//! it holds nothing.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::client::BookClient;
use crate::config::ClientConfig;
use crate::error::{ApiError, TransportError};
use crate::http::{HttpRequest, HttpResponse};
use crate::token::CredentialProvider;
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{
    AuthToken, Book, BookId, BookInput, BookMutation, LoginRequest, RegisterRequest, UserProfile,
};

#[derive(Clone)]
pub struct ApiClient {
    requests: BookClient,
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialProvider>,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            requests: BookClient::new(base_url),
            transport,
            credentials,
        }
    }

    /// Client over a `ReqwestTransport` built from `config`.
    pub fn from_config(
        config: &ClientConfig,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self, TransportError> {
        let transport = ReqwestTransport::new(config)?;
        Ok(Self::new(&config.base_url, Arc::new(transport), credentials))
    }

    pub fn base_url(&self) -> &str {
        self.requests.base_url()
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<AuthToken, ApiError> {
        let request = self.requests.build_login(&LoginRequest::new(username, password))?;
        let response = self.send(request).await?;
        self.requests.parse_login(response)
    }

    pub async fn register(
        &self,
        username: &str,
        password: &str,
        email: &str,
        name: Option<&str>,
    ) -> Result<Value, ApiError> {
        let input = RegisterRequest::new(username, password, email, name);
        let request = self.requests.build_register(&input)?;
        let response = self.send(request).await?;
        self.requests.parse_register(response)
    }

    pub async fn fetch_user_profile(&self) -> Result<UserProfile, ApiError> {
        let response = self.send(self.requests.build_fetch_user_profile()).await?;
        self.requests.parse_user_profile(response)
    }

    pub async fn get_all_books(&self) -> Result<Vec<Book>, ApiError> {
        let response = self.send(self.requests.build_get_all_books()).await?;
        self.requests.parse_get_all_books(response)
    }

    pub async fn get_book_by_id(&self, id: &BookId) -> Result<Book, ApiError> {
        let response = self.send(self.requests.build_get_book(id)).await?;
        self.requests.parse_get_book(response)
    }

    pub async fn create_book(&self, input: &BookInput) -> Result<BookMutation, ApiError> {
        let request = self.requests.build_create_book(input)?;
        let response = self.send(request).await?;
        self.requests.parse_create_book(response)
    }

    pub async fn update_book(&self, id: &BookId, input: &BookInput) -> Result<BookMutation, ApiError> {
        let request = self.requests.build_update_book(id, input)?;
        let response = self.send(request).await?;
        self.requests.parse_update_book(response)
    }

    pub async fn delete_book(&self, id: &BookId) -> Result<Value, ApiError> {
        let response = self.send(self.requests.build_delete_book(id)).await?;
        self.requests.parse_delete_book(response)
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let token = self.credentials.bearer_token().await?;
        let request = request.authorize(token.as_deref());
        let method = request.method.as_str();
        let url = request.path.clone();
        debug!(method, %url, authenticated = token.is_some(), "sending request");

        let response = self.transport.execute(request).await.map_err(|e| {
            warn!(method, %url, error = %e, "request failed without a response");
            ApiError::Network
        })?;
        debug!(method, %url, status = response.status, "response received");
        Ok(response)
    }
}

use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use storydesk_api_types::{
    ForgotPasswordRequest, ItemResponse, LoginRequest, LoginResponse, MessageResponse,
    RegisterRequest, ResetPasswordRequest, User,
};

use super::client::{ApiClient, Auth};
use crate::application::repos::{AuthGateway, RepoError};

/// The `/api/users/*` endpoints.
pub struct HttpAuthGateway {
    client: ApiClient,
}

impl HttpAuthGateway {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    async fn post<B, T>(&self, endpoint: &str, body: &B) -> Result<T, RepoError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body).map_err(|e| RepoError::Decode(e.to_string()))?;
        Ok(self
            .client
            .request(
                Auth::Anonymous,
                Method::POST,
                &["api", "users", endpoint],
                None,
                Some(body),
            )
            .await?)
    }
}

#[async_trait]
impl AuthGateway for HttpAuthGateway {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, RepoError> {
        let response: ItemResponse<LoginResponse> = self.post("login", request).await?;
        Ok(response.into_inner())
    }

    async fn register(&self, request: &RegisterRequest) -> Result<MessageResponse, RepoError> {
        let response: Option<MessageResponse> = self.post("register", request).await?;
        Ok(response.unwrap_or_default())
    }

    async fn forgot_password(
        &self,
        request: &ForgotPasswordRequest,
    ) -> Result<MessageResponse, RepoError> {
        let response: Option<MessageResponse> = self.post("forgot-password", request).await?;
        Ok(response.unwrap_or_default())
    }

    async fn reset_password(
        &self,
        request: &ResetPasswordRequest,
    ) -> Result<MessageResponse, RepoError> {
        let response: Option<MessageResponse> = self.post("reset-password", request).await?;
        Ok(response.unwrap_or_default())
    }

    async fn account(&self) -> Result<User, RepoError> {
        let user: ItemResponse<User> = self
            .client
            .request(
                Auth::Session,
                Method::GET,
                &["api", "users", "account"],
                None,
                None,
            )
            .await?;
        Ok(user.into_inner())
    }
}

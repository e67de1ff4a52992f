//! Sign-in, sign-out and account management.

use std::sync::Arc;

use storydesk_api_types::{
    ForgotPasswordRequest, LoginRequest, MessageResponse, RegisterRequest, ResetPasswordRequest,
    User,
};
use tracing::info;

use crate::{
    application::{
        error::AppError,
        repos::{AuthGateway, RepoError},
        session::{Session, SessionStore},
    },
    domain::validation::ensure_non_empty,
};

pub struct AuthService {
    gateway: Arc<dyn AuthGateway>,
    session: Arc<dyn SessionStore>,
}

impl AuthService {
    pub fn new(gateway: Arc<dyn AuthGateway>, session: Arc<dyn SessionStore>) -> Self {
        Self { gateway, session }
    }

    /// Exchange credentials for a token and persist it.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AppError> {
        ensure_non_empty(email, "email")?;
        ensure_non_empty(password, "password")?;

        let response = self
            .gateway
            .login(&LoginRequest {
                email: email.trim().to_string(),
                password: password.to_string(),
            })
            .await?;
        if response.token.trim().is_empty() {
            return Err(RepoError::Decode("login response carried no token".into()).into());
        }

        let email = response
            .user
            .map(|user| user.email)
            .filter(|email| !email.is_empty())
            .unwrap_or_else(|| email.trim().to_string());
        let session = Session::new(response.token, Some(email));
        self.session.save(&session).await?;
        info!(email = session.email.as_deref(), "signed in");
        Ok(session)
    }

    /// Forget the stored token. Signing out twice is not an error.
    pub async fn logout(&self) -> Result<(), AppError> {
        self.session.clear().await?;
        info!("signed out");
        Ok(())
    }

    pub async fn current(&self) -> Result<Option<Session>, AppError> {
        Ok(self.session.load().await?)
    }

    pub async fn account(&self) -> Result<User, AppError> {
        Ok(self.gateway.account().await?)
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<MessageResponse, AppError> {
        ensure_non_empty(&request.first_name, "first_name")?;
        ensure_non_empty(&request.last_name, "last_name")?;
        ensure_non_empty(&request.email, "email")?;
        ensure_non_empty(&request.password, "password")?;
        Ok(self.gateway.register(&request).await?)
    }

    pub async fn forgot_password(&self, email: &str) -> Result<MessageResponse, AppError> {
        ensure_non_empty(email, "email")?;
        Ok(self
            .gateway
            .forgot_password(&ForgotPasswordRequest {
                email: email.trim().to_string(),
            })
            .await?)
    }

    pub async fn reset_password(
        &self,
        token: &str,
        password: &str,
    ) -> Result<MessageResponse, AppError> {
        ensure_non_empty(token, "token")?;
        ensure_non_empty(password, "password")?;
        Ok(self
            .gateway
            .reset_password(&ResetPasswordRequest {
                token: token.to_string(),
                password: password.to_string(),
            })
            .await?)
    }
}

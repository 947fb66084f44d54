use crate::{
    api::ApiClient,
    error::{ClientError, Result},
};
use animalia_common::model::{
    auth::{
        MessageResponse, RefreshRequest, RefreshResponse, SignInRequest, SignInResponse,
        SignUpRequest, SignUpResponse, VerifyEmailRequest,
    },
    user::UserProfile,
};
use reqwest::Method;

impl ApiClient {
    pub async fn sign_in(&self, request: &SignInRequest) -> Result<SignInResponse> {
        let path = "auth/signin";
        self.send(path, self.request(Method::POST, path).json(request))
            .await
    }

    pub async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpResponse> {
        let path = "auth/signup";
        self.send(path, self.request(Method::POST, path).json(request))
            .await
    }

    /// Confirms the address with the emailed code. An in-band `{error}` body counts as a failure.
    pub async fn verify_email(&self, request: &VerifyEmailRequest) -> Result<String> {
        let path = "auth/verify-email";
        let response: MessageResponse = self
            .send(path, self.request(Method::POST, path).json(request))
            .await?;

        response.into_result().map_err(ClientError::Rejected)
    }

    pub async fn me(&self) -> Result<UserProfile> {
        let path = "auth/me";
        self.send(path, self.request(Method::GET, path)).await
    }

    pub async fn refresh(&self, request: &RefreshRequest) -> Result<RefreshResponse> {
        let path = "auth/refresh";
        self.send(path, self.request(Method::POST, path).json(request))
            .await
    }

    pub async fn sign_out(&self) -> Result<()> {
        let path = "auth/signout";
        self.send_ignoring_body(path, self.request(Method::POST, path))
            .await
    }
}

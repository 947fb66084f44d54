use crate::{model::user::UserProfile, util::NonEmptyString};
use base64::{DecodeError, Engine, prelude::BASE64_URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};
use thiserror::Error;
use time::{OffsetDateTime, error::ComponentRange};

#[derive(Debug, Error)]
pub enum TokenClaimsError {
    #[error("Not enough parts separated by '.'")]
    NotEnoughParts,
    #[error("Decoding base64 failed: {0}")]
    Decode(#[from] DecodeError),
    #[error("Claims were not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Expiry claim out of range: {0}")]
    Expiry(#[from] ComponentRange),
}

/// An opaque credential issued by the auth endpoints. Never printed.
#[derive(Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(NonEmptyString);

#[derive(Deserialize)]
struct Claims {
    exp: Option<i64>,
}

impl Token {
    #[must_use]
    pub fn new(token: NonEmptyString) -> Self {
        Self(token)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.get()
    }

    /// Reads the `exp` claim when the token is a JWT. The signature is not checked.
    pub fn expires_at(&self) -> Result<Option<OffsetDateTime>, TokenClaimsError> {
        let mut parts = self.as_str().splitn(3, '.');

        let _header = parts.next().ok_or(TokenClaimsError::NotEnoughParts)?;
        let payload = parts.next().ok_or(TokenClaimsError::NotEnoughParts)?;
        parts.next().ok_or(TokenClaimsError::NotEnoughParts)?;

        let claims: Claims = serde_json::from_slice(&BASE64_URL_SAFE_NO_PAD.decode(payload)?)?;

        Ok(claims
            .exp
            .map(OffsetDateTime::from_unix_timestamp)
            .transpose()?)
    }
}

impl Debug for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Token").field(&"[redacted]").finish()
    }
}

/// Everything the client persists between launches.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTokens {
    pub access_token: Token,
    pub id_token: Token,
    pub refresh_token: Token,
}

#[derive(Clone, Eq, PartialEq, Hash, Serialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

impl Debug for SignInRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignInRequest")
            .field("email", &self.email)
            .field("password", &"[redacted]")
            .finish()
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    pub message: String,
    pub user: UserProfile,
    pub access_token: Token,
    pub id_token: Token,
    pub refresh_token: Token,
}

impl SignInResponse {
    #[must_use]
    pub fn tokens(&self) -> SessionTokens {
        SessionTokens {
            access_token: self.access_token.clone(),
            id_token: self.id_token.clone(),
            refresh_token: self.refresh_token.clone(),
        }
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Serialize)]
pub struct SignUpRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl Debug for SignUpRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignUpRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[redacted]")
            .finish()
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
pub struct SignUpResponse {
    pub message: String,
    pub user: crate::model::user::UserBase,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize)]
pub struct VerifyEmailRequest {
    pub email: String,
    pub code: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Token,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: Token,
    pub id_token: Token,
}

/// Acknowledgement body of the mutation endpoints, which report failures in-band as `{error}`.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
#[serde(untagged)]
pub enum MessageResponse {
    Error { error: String },
    Message { message: String },
}

impl MessageResponse {
    pub fn into_result(self) -> Result<String, String> {
        match self {
            MessageResponse::Message { message } => Ok(message),
            MessageResponse::Error { error } => Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        model::auth::{MessageResponse, SessionTokens, Token},
        util::NonEmptyString,
    };
    use base64::{Engine, prelude::BASE64_URL_SAFE_NO_PAD};
    use time::OffsetDateTime;

    fn jwt(payload: &str) -> Token {
        let header = BASE64_URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256"}"#);
        let payload = BASE64_URL_SAFE_NO_PAD.encode(payload);
        Token::new(NonEmptyString::new_unchecked(format!("{header}.{payload}.sig")))
    }

    #[test]
    fn reads_expiry_claim() {
        let token = jwt(r#"{"sub":"abc","exp":1767225600}"#);
        assert_eq!(
            token.expires_at().unwrap(),
            Some(OffsetDateTime::from_unix_timestamp(1_767_225_600).unwrap())
        );

        assert_eq!(jwt(r#"{"sub":"abc"}"#).expires_at().unwrap(), None);
    }

    #[test]
    fn opaque_tokens_have_no_claims() {
        let token = Token::new(NonEmptyString::new_unchecked("opaque"));
        assert!(token.expires_at().is_err());
    }

    #[test]
    fn tokens_are_redacted() {
        let token = Token::new(NonEmptyString::new_unchecked("secret-value"));
        let tokens = SessionTokens {
            access_token: token.clone(),
            id_token: token.clone(),
            refresh_token: token,
        };
        assert!(!format!("{tokens:?}").contains("secret-value"));
    }

    #[test]
    fn empty_tokens_are_rejected() {
        let json = r#"{"accessToken":"","idToken":"a","refreshToken":"b"}"#;
        assert!(serde_json::from_str::<SessionTokens>(json).is_err());
    }

    #[test]
    fn message_response_variants() {
        let ok: MessageResponse = serde_json::from_str(r#"{"message":"done"}"#).unwrap();
        assert_eq!(ok.into_result(), Ok("done".to_owned()));

        let err: MessageResponse = serde_json::from_str(r#"{"error":"nope"}"#).unwrap();
        assert_eq!(err.into_result(), Err("nope".to_owned()));
    }
}

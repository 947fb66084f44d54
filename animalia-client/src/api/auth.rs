use animalia_common::model::auth::{SessionTokens, Token};
use std::sync::{PoisonError, RwLock};

/// Supplies the bearer token for outgoing requests. Returning `None` sends the request
/// anonymously.
pub trait TokenSource: Send + Sync + 'static {
    fn access_token(&self) -> Option<Token>;
}

/// Anonymous requests only.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct NoAuth;

impl TokenSource for NoAuth {
    fn access_token(&self) -> Option<Token> {
        None
    }
}

/// The tokens of the signed-in session, shared between the session and the API client.
#[derive(Debug, Default)]
pub struct TokenCell {
    tokens: RwLock<Option<SessionTokens>>,
}

impl TokenCell {
    #[must_use]
    pub fn get(&self) -> Option<SessionTokens> {
        self.tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set(&self, tokens: Option<SessionTokens>) {
        *self.tokens.write().unwrap_or_else(PoisonError::into_inner) = tokens;
    }
}

impl TokenSource for TokenCell {
    fn access_token(&self) -> Option<Token> {
        self.tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|tokens| tokens.access_token.clone())
    }
}

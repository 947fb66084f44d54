use crate::{
    api::{ApiClient, TokenCell},
    error::{ClientError, Result},
    queries::{Queries, QueryKey},
    token_store::TokenStore,
};
use animalia_common::model::{
    Id,
    auth::{
        RefreshRequest, SessionTokens, SignInRequest, SignUpRequest, SignUpResponse,
        VerifyEmailRequest,
    },
    user::{UserMarker, UserProfile},
};
use std::{fmt::Debug, sync::Arc};
use time::OffsetDateTime;
use tracing::{debug, info, warn};

/// The signed-in account: its tokens, their persistence, and the cached current user.
#[derive(Clone)]
pub struct Session {
    api: ApiClient,
    store: Arc<dyn TokenStore>,
    tokens: Arc<TokenCell>,
    queries: Arc<Queries>,
}

impl Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("signed_in", &self.is_signed_in())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// `tokens` must be the token source `api` authenticates with.
    #[must_use]
    pub fn new(
        api: ApiClient,
        store: Arc<dyn TokenStore>,
        tokens: Arc<TokenCell>,
        queries: Arc<Queries>,
    ) -> Self {
        Self {
            api,
            store,
            tokens,
            queries,
        }
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.tokens.get().is_some()
    }

    #[must_use]
    pub fn tokens(&self) -> Option<SessionTokens> {
        self.tokens.get()
    }

    /// Picks up the tokens stored by a previous run.
    pub async fn restore(&self) -> Result<bool> {
        let tokens = self.store.load().await?;
        let restored = tokens.is_some();
        self.tokens.set(tokens);
        debug!(restored, "Restored session");
        Ok(restored)
    }

    /// Signs in and seeds the current user. Any failure wipes the stored tokens.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<UserProfile> {
        let request = SignInRequest {
            email: email.to_owned(),
            password: password.to_owned(),
        };

        let response = match self.api.sign_in(&request).await {
            Ok(response) => response,
            Err(e) => {
                self.forget().await;
                return Err(e);
            }
        };

        let tokens = response.tokens();
        if let Err(e) = self.store.save(&tokens).await {
            self.forget().await;
            return Err(e.into());
        }

        self.queries.clear();
        self.tokens.set(Some(tokens));
        self.queries
            .users
            .set(QueryKey::CurrentUser, response.user.clone());
        info!(user_id = %response.user.id(), "Signed in");

        Ok(response.user)
    }

    pub async fn sign_up(&self, name: &str, email: &str, password: &str) -> Result<SignUpResponse> {
        let request = SignUpRequest {
            name: name.to_owned(),
            email: email.to_owned(),
            password: password.to_owned(),
        };
        self.api.sign_up(&request).await
    }

    pub async fn verify_email(&self, email: &str, code: &str) -> Result<String> {
        let request = VerifyEmailRequest {
            email: email.to_owned(),
            code: code.to_owned(),
        };
        self.api.verify_email(&request).await
    }

    /// The signed-in user, fetched from `auth/me` unless a fresh copy is cached.
    pub async fn current_user(&self) -> Result<UserProfile> {
        if !self.is_signed_in() {
            return Err(ClientError::NotSignedIn);
        }

        let key = QueryKey::CurrentUser;
        if !self.queries.users.is_stale(&key)
            && let Some(user) = self.queries.users.get(&key)
        {
            return Ok(user);
        }

        let ticket = self.queries.users.begin_fetch(key.clone());
        let user = self.api.me().await?;
        self.queries.users.commit_replace(&ticket, key, user.clone());
        Ok(user)
    }

    pub async fn current_user_id(&self) -> Result<Id<UserMarker>> {
        self.current_user().await.map(|user| user.id())
    }

    /// Whether the access token's `exp` claim lies before `now`. Tokens without a readable
    /// expiry are assumed valid and left for the server to judge.
    #[must_use]
    pub fn access_token_expired(&self, now: OffsetDateTime) -> bool {
        let Some(tokens) = self.tokens.get() else {
            return false;
        };

        match tokens.access_token.expires_at() {
            Ok(Some(expires_at)) => expires_at <= now,
            Ok(None) => false,
            Err(e) => {
                debug!(error = %e, "Access token has no readable expiry");
                false
            }
        }
    }

    /// Trades the refresh token for a new access and id token. The refresh token is kept.
    pub async fn refresh(&self) -> Result<()> {
        let tokens = self.tokens.get().ok_or(ClientError::NotSignedIn)?;
        let response = self
            .api
            .refresh(&RefreshRequest {
                refresh_token: tokens.refresh_token.clone(),
            })
            .await?;

        let tokens = SessionTokens {
            access_token: response.access_token,
            id_token: response.id_token,
            refresh_token: tokens.refresh_token,
        };
        self.store.save(&tokens).await?;
        self.tokens.set(Some(tokens));
        debug!("Refreshed access token");

        Ok(())
    }

    /// Signs out on the server. Local tokens are dropped whether or not that succeeds, since a
    /// failing sign-out usually means the session is already gone; the error is still returned.
    pub async fn sign_out(&self) -> Result<()> {
        let result = if self.is_signed_in() {
            self.api.sign_out().await
        } else {
            Ok(())
        };

        self.forget().await;
        match &result {
            Ok(()) => info!("Signed out"),
            Err(e) => warn!(error = %e, "Sign-out request failed, tokens cleared anyway"),
        }

        result
    }

    async fn forget(&self) {
        if let Err(e) = self.store.clear().await {
            warn!(error = %e, "Failed to clear stored tokens");
        }
        self.tokens.set(None);
        self.queries.clear();
    }
}

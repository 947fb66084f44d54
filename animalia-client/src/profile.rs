use crate::{
    api::{ApiClient, ProfileUpdate},
    error::Result,
    queries::{Queries, QueryKey},
    session::Session,
};
use animalia_common::model::user::UserProfile;
use std::sync::Arc;
use tracing::info;

/// Other users' profiles and the follow button.
///
/// Follow changes are not optimistic: the cached profile is only updated once the server agrees.
#[derive(Clone, Debug)]
pub struct Profiles {
    api: ApiClient,
    session: Session,
    queries: Arc<Queries>,
}

impl Profiles {
    #[must_use]
    pub fn new(api: ApiClient, session: Session, queries: Arc<Queries>) -> Self {
        Self {
            api,
            session,
            queries,
        }
    }

    pub async fn profile(&self, email: &str) -> Result<UserProfile> {
        let key = QueryKey::UserProfile(email.to_owned());
        if !self.queries.users.is_stale(&key)
            && let Some(profile) = self.queries.users.get(&key)
        {
            return Ok(profile);
        }

        let ticket = self.queries.users.begin_fetch(key.clone());
        let profile = self.api.user_by_email(email).await?;
        self.queries.users.commit_replace(&ticket, key, profile.clone());
        Ok(profile)
    }

    pub async fn is_me(&self, profile: &UserProfile) -> Result<bool> {
        Ok(self.session.current_user_id().await? == profile.id())
    }

    pub async fn is_following(&self, profile: &UserProfile) -> Result<bool> {
        let me = self.session.current_user_id().await?;
        Ok(profile.is_followed_by(me))
    }

    pub async fn follow(&self, profile: &UserProfile) -> Result<()> {
        let me = self.session.current_user().await?;
        self.api.follow(profile.id(), me.id()).await?;
        info!(user_id = %profile.id(), "Followed");

        self.queries
            .users
            .update(&QueryKey::UserProfile(profile.base.email.clone()), |cached| {
                cached.add_follower(me.base.clone());
            });
        self.queries.users.invalidate(&QueryKey::CurrentUser);
        Ok(())
    }

    pub async fn unfollow(&self, profile: &UserProfile) -> Result<()> {
        let me = self.session.current_user_id().await?;
        self.api.unfollow(profile.id(), me).await?;
        info!(user_id = %profile.id(), "Unfollowed");

        self.queries
            .users
            .update(&QueryKey::UserProfile(profile.base.email.clone()), |cached| {
                cached.remove_follower(me);
            });
        self.queries.users.invalidate(&QueryKey::CurrentUser);
        Ok(())
    }

    /// Follows or unfollows depending on the current state. Returns whether the user now follows.
    pub async fn toggle_follow(&self, profile: &UserProfile) -> Result<bool> {
        if self.is_following(profile).await? {
            self.unfollow(profile).await?;
            Ok(false)
        } else {
            self.follow(profile).await?;
            Ok(true)
        }
    }

    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<()> {
        let me = self.session.current_user().await?;
        self.api.update_user(me.id(), update).await?;
        info!(user_id = %me.id(), "Updated profile");

        self.queries.users.invalidate(&QueryKey::CurrentUser);
        self.queries
            .users
            .invalidate(&QueryKey::UserProfile(me.base.email));
        Ok(())
    }
}

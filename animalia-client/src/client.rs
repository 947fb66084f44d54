use crate::{
    api::{ApiClient, TokenCell},
    config::ClientConfig,
    like::{LikeToggle, PendingLikes},
    overlay::ModalStack,
    pets::Pets,
    posts::Posts,
    profile::Profiles,
    queries::Queries,
    session::Session,
    timeline::Timeline,
    token_store::{FileTokenStore, TokenStore},
};
use animalia_common::model::{Id, post::PostMarker, user::UserMarker};
use std::sync::Arc;

/// Entry point to everything the app renders from. Cheap to clone; clones share state.
#[derive(Clone, Debug)]
pub struct AnimaliaClient {
    api: ApiClient,
    session: Session,
    queries: Arc<Queries>,
    pending_likes: PendingLikes,
    overlays: ModalStack,
    page_size: u32,
}

impl AnimaliaClient {
    /// A client persisting its tokens at the configured token path.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_store(config, Arc::new(FileTokenStore::new(&config.token_path)))
    }

    #[must_use]
    pub fn with_store(config: &ClientConfig, store: Arc<dyn TokenStore>) -> Self {
        let tokens = Arc::new(TokenCell::default());
        let api = ApiClient::new(config.api_url.clone(), tokens.clone());
        let queries = Arc::new(Queries::new());
        let session = Session::new(api.clone(), store, tokens, queries.clone());

        Self {
            api,
            session,
            queries,
            pending_likes: PendingLikes::default(),
            overlays: ModalStack::new(),
            page_size: config.page_size,
        }
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn queries(&self) -> &Queries {
        &self.queries
    }

    #[must_use]
    pub fn overlays(&self) -> &ModalStack {
        &self.overlays
    }

    #[must_use]
    pub fn timeline(&self) -> Timeline {
        Timeline::new(
            self.api.clone(),
            self.session.clone(),
            self.queries.clone(),
            self.page_size,
        )
    }

    /// The like button of `post_id` for `user_id`, normally the already-loaded current user.
    #[must_use]
    pub fn like_toggle(&self, post_id: Id<PostMarker>, user_id: Id<UserMarker>) -> LikeToggle {
        LikeToggle::new(
            self.api.clone(),
            self.queries.clone(),
            self.pending_likes.clone(),
            post_id,
            user_id,
        )
    }

    #[must_use]
    pub fn is_like_pending(&self, post_id: Id<PostMarker>) -> bool {
        self.pending_likes.is_pending(post_id)
    }

    #[must_use]
    pub fn profiles(&self) -> Profiles {
        Profiles::new(self.api.clone(), self.session.clone(), self.queries.clone())
    }

    #[must_use]
    pub fn posts(&self) -> Posts {
        Posts::new(self.api.clone(), self.session.clone(), self.queries.clone())
    }

    #[must_use]
    pub fn pets(&self) -> Pets {
        Pets::new(self.api.clone(), self.session.clone(), self.queries.clone())
    }
}

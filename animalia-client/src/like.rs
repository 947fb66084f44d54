use crate::{
    api::ApiClient,
    error::Result,
    queries::{Queries, QueryKey},
};
use animalia_common::model::{Id, post::PostMarker, user::UserMarker};
use std::{
    collections::HashSet,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use tracing::{debug, warn};

/// Posts with a like or unlike request in flight, shared by every toggle of one client.
#[derive(Clone, Debug, Default)]
pub struct PendingLikes {
    posts: Arc<Mutex<HashSet<Id<PostMarker>>>>,
}

/// Marks a post pending until dropped.
struct PendingGuard {
    pending: PendingLikes,
    post_id: Id<PostMarker>,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.pending.lock().remove(&self.post_id);
    }
}

impl PendingLikes {
    fn lock(&self) -> MutexGuard<'_, HashSet<Id<PostMarker>>> {
        self.posts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn try_begin(&self, post_id: Id<PostMarker>) -> Option<PendingGuard> {
        self.lock().insert(post_id).then(|| PendingGuard {
            pending: self.clone(),
            post_id,
        })
    }

    #[must_use]
    pub fn is_pending(&self, post_id: Id<PostMarker>) -> bool {
        self.lock().contains(&post_id)
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub enum LikeOutcome {
    /// The request went through and the timeline was updated.
    Applied,
    /// Another request for the same post was still pending; nothing was done.
    Suppressed,
}

/// The like button of one post, as seen by one user.
///
/// Changes are applied to the cached timeline before the server confirms them and rolled back
/// if the request fails. Either way the timeline is invalidated once the request settles.
#[derive(Clone, Debug)]
pub struct LikeToggle {
    api: ApiClient,
    queries: Arc<Queries>,
    pending: PendingLikes,
    post_id: Id<PostMarker>,
    user_id: Id<UserMarker>,
}

impl LikeToggle {
    #[must_use]
    pub fn new(
        api: ApiClient,
        queries: Arc<Queries>,
        pending: PendingLikes,
        post_id: Id<PostMarker>,
        user_id: Id<UserMarker>,
    ) -> Self {
        Self {
            api,
            queries,
            pending,
            post_id,
            user_id,
        }
    }

    #[must_use]
    pub fn post_id(&self) -> Id<PostMarker> {
        self.post_id
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_pending(self.post_id)
    }

    /// Whether the user likes the post, going by the cached timeline.
    #[must_use]
    pub fn is_liked(&self) -> Option<bool> {
        self.queries
            .timeline
            .get(&QueryKey::Timeline)
            .and_then(|data| {
                data.pages()
                    .iter()
                    .flat_map(|page| &page.posts)
                    .find(|post| post.id == self.post_id)
                    .map(|post| post.is_liked_by(self.user_id))
            })
    }

    pub async fn toggle(&self) -> Result<LikeOutcome> {
        let liked = self.is_liked().unwrap_or(false);
        self.set_liked(!liked).await
    }

    /// Everything up to the request happens synchronously, so the cache reflects the change as
    /// soon as this future is first polled.
    pub async fn set_liked(&self, liked: bool) -> Result<LikeOutcome> {
        let Some(_pending) = self.pending.try_begin(self.post_id) else {
            debug!(post_id = %self.post_id, liked, "Like request already pending, ignoring");
            return Ok(LikeOutcome::Suppressed);
        };

        let timeline = &self.queries.timeline;
        let key = QueryKey::Timeline;

        timeline.cancel_fetches(&key);
        let snapshot = timeline.snapshot(&key);
        timeline.update(&key, |data| {
            for post in data
                .pages_mut()
                .flat_map(|page| page.posts.iter_mut())
                .filter(|post| post.id == self.post_id)
            {
                // The liked flag follows the requested state, unlike the mobile app, which
                // also marked unliked posts as liked until the next fetch.
                post.apply_optimistic_like(liked);
            }
        });

        let result = if liked {
            self.api.like(self.user_id, self.post_id).await
        } else {
            self.api.unlike(self.user_id, self.post_id).await
        };

        if let Err(e) = &result {
            warn!(post_id = %self.post_id, liked, error = %e, "Like request failed, rolling back");
            timeline.restore(key.clone(), snapshot);
        }
        timeline.invalidate(&key);

        result.map(|()| LikeOutcome::Applied)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        error::ClientError,
        like::LikeOutcome,
        queries::QueryKey,
        test_support::{self, page, profile, user_base},
    };
    use animalia_cache::InfiniteData;
    use animalia_common::model::post::PostsPage;
    use crate::token_store::MemoryTokenStore;
    use axum::{
        Json, Router,
        extract::Query,
        http::StatusCode,
        routing::{delete, get, post},
    };
    use std::{
        collections::HashMap,
        sync::{
            Arc,
            atomic::{AtomicBool, Ordering},
        },
    };
    use tokio::sync::Notify;

    fn seed(client: &crate::client::AnimaliaClient, pages: Vec<PostsPage>) {
        let mut data = InfiniteData::new();
        for page in pages {
            let cursor = data.pages().last().and_then(PostsPage::last_id);
            data.push_page(cursor, page);
        }
        client.queries().timeline.set(QueryKey::Timeline, data);
    }

    fn likes_of(client: &crate::client::AnimaliaClient, index: usize) -> u32 {
        let data = client.queries().timeline.get(&QueryKey::Timeline).unwrap();
        data.pages()
            .iter()
            .flat_map(|page| &page.posts)
            .nth(index)
            .unwrap()
            .likes_count
    }

    #[tokio::test]
    async fn like_applies_optimistically_and_invalidates() {
        let me = profile(user_base("mike"));
        let author = user_base("author");
        let mut first = page(&author, 1);
        first.posts[0].likes_count = 5;
        let post_id = first.posts[0].id;

        let user_id = me.id();
        let router = Router::new().route(
            "/likes/new",
            post(move |Query(query): Query<HashMap<String, String>>| async move {
                assert_eq!(query.get("userId"), Some(&user_id.to_string()));
                assert_eq!(query.get("postId"), Some(&post_id.to_string()));
                StatusCode::OK
            }),
        );
        let (client, _) = test_support::signed_in(router, &me).await;
        seed(&client, vec![first]);

        let toggle = client.like_toggle(post_id, me.id());
        assert_eq!(toggle.is_liked(), Some(false));
        assert_eq!(toggle.set_liked(true).await.unwrap(), LikeOutcome::Applied);

        assert_eq!(likes_of(&client, 0), 6);
        assert_eq!(toggle.is_liked(), Some(true));
        assert!(client.queries().timeline.is_stale(&QueryKey::Timeline));
        assert!(!toggle.is_pending());
    }

    #[tokio::test]
    async fn failure_rolls_back_to_snapshot() {
        let me = profile(user_base("mike"));
        let author = user_base("author");
        let mut first = page(&author, 2);
        first.posts[1].likes_count = 5;
        let post_id = first.posts[1].id;

        let gate = Arc::new(Notify::new());
        let server_gate = gate.clone();
        let router = Router::new().route(
            "/likes/new",
            post(move || {
                let gate = server_gate.clone();
                async move {
                    gate.notified().await;
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }),
        );
        let (client, _) = test_support::signed_in(router, &me).await;
        seed(&client, vec![first]);

        let toggle = client.like_toggle(post_id, me.id());
        let request = tokio::spawn({
            let toggle = toggle.clone();
            async move { toggle.set_liked(true).await }
        });

        while !toggle.is_pending() || likes_of(&client, 1) != 6 {
            tokio::task::yield_now().await;
        }
        assert_eq!(likes_of(&client, 1), 6);

        gate.notify_one();
        let result = request.await.unwrap();
        assert!(matches!(result, Err(ClientError::Status { .. })));
        assert_eq!(likes_of(&client, 1), 5);
        assert_eq!(likes_of(&client, 0), 0);
        assert!(client.queries().timeline.is_stale(&QueryKey::Timeline));
        assert!(!toggle.is_pending());
    }

    #[tokio::test]
    async fn second_request_while_pending_is_suppressed() {
        let me = profile(user_base("mike"));
        let author = user_base("author");
        let mut first = page(&author, 1);
        first.posts[0].likes_count = 5;
        let post_id = first.posts[0].id;

        let gate = Arc::new(Notify::new());
        let server_gate = gate.clone();
        let hit = Arc::new(AtomicBool::new(false));
        let unliked = hit.clone();
        let router = Router::new()
            .route(
                "/likes/new",
                post(move || {
                    let gate = server_gate.clone();
                    async move {
                        gate.notified().await;
                        StatusCode::OK
                    }
                }),
            )
            .route(
                "/likes/delete",
                delete(move || {
                    unliked.store(true, Ordering::SeqCst);
                    async { StatusCode::OK }
                }),
            );
        let (client, _) = test_support::signed_in(router, &me).await;
        seed(&client, vec![first]);

        let request = tokio::spawn({
            let toggle = client.like_toggle(post_id, me.id());
            async move { toggle.set_liked(true).await }
        });
        while !client.is_like_pending(post_id) {
            tokio::task::yield_now().await;
        }

        let other_view = client.like_toggle(post_id, me.id());
        assert_eq!(other_view.set_liked(false).await.unwrap(), LikeOutcome::Suppressed);
        assert_eq!(likes_of(&client, 0), 6);
        assert_eq!(other_view.is_liked(), Some(true));
        assert_eq!(other_view.set_liked(true).await.unwrap(), LikeOutcome::Suppressed);
        assert_eq!(likes_of(&client, 0), 6);

        gate.notify_one();
        assert_eq!(request.await.unwrap().unwrap(), LikeOutcome::Applied);
        assert_eq!(likes_of(&client, 0), 6);
        assert!(!client.is_like_pending(post_id));
        assert!(!hit.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn optimistic_update_does_not_wait_for_current_user() {
        let me = profile(user_base("mike"));
        let author = user_base("author");
        let mut first = page(&author, 1);
        first.posts[0].likes_count = 5;
        let post_id = first.posts[0].id;

        let gate = Arc::new(Notify::new());
        let like_gate = gate.clone();
        let me_gate = Arc::new(Notify::new());
        let me_served = me.clone();
        let router = Router::new()
            .route(
                "/auth/me",
                get(move || {
                    let gate = me_gate.clone();
                    let me = me_served.clone();
                    async move {
                        gate.notified().await;
                        Json(me)
                    }
                }),
            )
            .route(
                "/likes/new",
                post(move || {
                    let gate = like_gate.clone();
                    async move {
                        gate.notified().await;
                        StatusCode::OK
                    }
                }),
            );
        let store = Arc::new(MemoryTokenStore::with_tokens(test_support::tokens()));
        let client = test_support::client(router, store).await;
        assert!(client.session().restore().await.unwrap());
        seed(&client, vec![first]);

        let toggle = client.like_toggle(post_id, me.id());
        let request = tokio::spawn({
            let toggle = toggle.clone();
            async move { toggle.set_liked(true).await }
        });
        while !toggle.is_pending() {
            tokio::task::yield_now().await;
        }
        assert_eq!(likes_of(&client, 0), 6);
        assert_eq!(toggle.is_liked(), Some(true));

        gate.notify_one();
        assert_eq!(request.await.unwrap().unwrap(), LikeOutcome::Applied);
        assert_eq!(likes_of(&client, 0), 6);
    }

    #[tokio::test]
    async fn unlike_decrements_and_clears_flag() {
        let me = profile(user_base("mike"));
        let author = user_base("author");
        let mut first = page(&author, 1);
        first.posts[0].likes_count = 1;
        let post_id = first.posts[0].id;

        let router = Router::new().route("/likes/delete", delete(|| async { StatusCode::OK }));
        let (client, _) = test_support::signed_in(router, &me).await;
        seed(&client, vec![first]);

        let toggle = client.like_toggle(post_id, me.id());
        assert_eq!(toggle.set_liked(false).await.unwrap(), LikeOutcome::Applied);
        assert_eq!(likes_of(&client, 0), 0);
        assert_eq!(toggle.is_liked(), Some(false));

        assert_eq!(toggle.set_liked(false).await.unwrap(), LikeOutcome::Applied);
        assert_eq!(likes_of(&client, 0), 0);
    }

    #[tokio::test]
    async fn like_cancels_timeline_fetch() {
        let me = profile(user_base("mike"));
        let author = user_base("author");
        let first = page(&author, 1);
        let post_id = first.posts[0].id;

        let router = Router::new().route("/likes/new", post(|| async { StatusCode::OK }));
        let (client, _) = test_support::signed_in(router, &me).await;
        seed(&client, vec![first]);

        let ticket = client.queries().timeline.begin_fetch(QueryKey::Timeline);
        client.like_toggle(post_id, me.id()).set_liked(true).await.unwrap();
        assert!(ticket.is_cancelled());
    }
}

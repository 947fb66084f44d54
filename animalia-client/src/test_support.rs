use crate::{
    client::AnimaliaClient,
    config::ClientConfig,
    token_store::{MemoryTokenStore, TokenStore},
};
use animalia_common::{
    model::{
        Id,
        auth::{SessionTokens, Token},
        daily_task::{DailyTask, DailyTaskBase, TaskType},
        post::{Post, PostsPage},
        user::{UserBase, UserProfile},
    },
    util::NonEmptyString,
};
use axum::{Json, Router, routing::get};
use std::sync::Arc;
use time::OffsetDateTime;

/// Serves `router` on an ephemeral local port and returns its base URL.
pub(crate) async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
    format!("http://{addr}/")
}

pub(crate) async fn client(router: Router, store: Arc<dyn TokenStore>) -> AnimaliaClient {
    let base_url = serve(router).await;
    let config = ClientConfig::new(&base_url).unwrap();
    AnimaliaClient::with_store(&config, store)
}

/// A client whose stored session belongs to `me`, served by `router` plus `auth/me`.
pub(crate) async fn signed_in(
    router: Router,
    me: &UserProfile,
) -> (AnimaliaClient, Arc<MemoryTokenStore>) {
    let me = me.clone();
    let router = router.route("/auth/me", get(move || async move { Json(me) }));
    let store = Arc::new(MemoryTokenStore::with_tokens(tokens()));
    let client = client(router, store.clone()).await;
    assert!(client.session().restore().await.unwrap());
    (client, store)
}

pub(crate) fn tokens() -> SessionTokens {
    let token = |value: &str| Token::new(NonEmptyString::new_unchecked(value));
    SessionTokens {
        access_token: token("access"),
        id_token: token("id"),
        refresh_token: token("refresh"),
    }
}

pub(crate) fn user_base(name: &str) -> UserBase {
    UserBase {
        id: Id::new_random(),
        email: format!("{name}@example.com"),
        name: name.to_owned(),
        bio: String::new(),
        icon_image_url: None,
    }
}

pub(crate) fn profile(base: UserBase) -> UserProfile {
    UserProfile {
        base,
        followers: Vec::new(),
        follows: Vec::new(),
        followers_count: 0,
        follows_count: 0,
        posts: Vec::new(),
        pets: Vec::new(),
        daily_task: DailyTask {
            base: DailyTaskBase {
                id: Id::new_random(),
                created_at: OffsetDateTime::UNIX_EPOCH,
                task_type: TaskType::Eating,
            },
            post: None,
        },
    }
}

pub(crate) fn post(author: &UserBase, likes_count: u32) -> Post {
    Post {
        id: Id::new_random(),
        caption: "nap time".to_owned(),
        image_url: NonEmptyString::new_unchecked("https://cdn.example/p.jpg"),
        user: author.clone(),
        comments: Vec::new(),
        comments_count: 0,
        likes: Vec::new(),
        likes_count,
        created_at: OffsetDateTime::UNIX_EPOCH,
        daily_task: None,
        liked_by_current_user: None,
    }
}

pub(crate) fn page(author: &UserBase, len: usize) -> PostsPage {
    PostsPage {
        posts: (0..len).map(|_| post(author, 0)).collect(),
    }
}

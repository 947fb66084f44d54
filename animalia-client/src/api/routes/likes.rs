use crate::{api::ApiClient, error::Result};
use animalia_common::model::{Id, post::PostMarker, user::UserMarker};
use reqwest::Method;

impl ApiClient {
    pub async fn like(&self, user_id: Id<UserMarker>, post_id: Id<PostMarker>) -> Result<()> {
        self.like_request(Method::POST, "likes/new", user_id, post_id)
            .await
    }

    pub async fn unlike(&self, user_id: Id<UserMarker>, post_id: Id<PostMarker>) -> Result<()> {
        self.like_request(Method::DELETE, "likes/delete", user_id, post_id)
            .await
    }

    async fn like_request(
        &self,
        method: Method,
        path: &str,
        user_id: Id<UserMarker>,
        post_id: Id<PostMarker>,
    ) -> Result<()> {
        let builder = self.request(method, path).query(&[
            ("userId", user_id.to_string()),
            ("postId", post_id.to_string()),
        ]);
        self.send_ignoring_body(path, builder).await
    }
}

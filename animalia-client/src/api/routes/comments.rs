use crate::{api::ApiClient, error::Result};
use animalia_common::{
    model::{
        Id,
        comment::{Comment, CommentMarker, CommentResponse},
        post::PostMarker,
        user::UserMarker,
    },
    util::NonEmptyString,
};
use reqwest::{Method, multipart::Form};

impl ApiClient {
    pub async fn create_comment(
        &self,
        user_id: Id<UserMarker>,
        post_id: Id<PostMarker>,
        content: NonEmptyString,
    ) -> Result<Comment> {
        let path = "comments";
        let form = Form::new()
            .text("content", content.into_inner())
            .text("userId", user_id.to_string())
            .text("postId", post_id.to_string());

        let response: CommentResponse = self
            .send(path, self.request(Method::POST, path).multipart(form))
            .await?;
        Ok(response.comment)
    }

    pub async fn delete_comment(&self, comment_id: Id<CommentMarker>) -> Result<()> {
        let path = "comments";
        let builder = self
            .request(Method::DELETE, path)
            .query(&[("commentId", comment_id.to_string())]);
        self.send_ignoring_body(path, builder).await
    }
}

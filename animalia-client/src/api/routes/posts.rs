use crate::{api::ApiClient, error::Result, upload::ImageUpload};
use animalia_common::model::{
    Id,
    post::{CreatePost, PostMarker, PostsPage, TimelineRequest},
    user::UserMarker,
};
use reqwest::{Method, multipart::Form};

impl ApiClient {
    pub async fn timeline(&self, request: &TimelineRequest) -> Result<PostsPage> {
        let path = "posts/timeline";
        self.send(path, self.request(Method::POST, path).json(request))
            .await
    }

    pub async fn create_post(
        &self,
        user_id: Id<UserMarker>,
        post: CreatePost,
        image: ImageUpload,
    ) -> Result<()> {
        let path = "posts";
        let image = image.into_part()?;

        let mut form = Form::new()
            .part("image", image)
            .text("caption", post.caption)
            .text("userId", user_id.to_string());
        if let Some(daily_task_id) = post.daily_task_id {
            form = form.text("dailyTaskId", daily_task_id.to_string());
        }

        self.send_ignoring_body(path, self.request(Method::POST, path).multipart(form))
            .await
    }

    pub async fn delete_post(&self, post_id: Id<PostMarker>) -> Result<()> {
        let path = "posts/delete";
        let builder = self
            .request(Method::DELETE, path)
            .query(&[("id", post_id.to_string())]);
        self.send_ignoring_body(path, builder).await
    }
}

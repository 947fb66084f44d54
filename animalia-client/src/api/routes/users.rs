use crate::{api::ApiClient, error::Result, upload::ImageUpload};
use animalia_common::model::{
    Id,
    user::{UserMarker, UserProfile, UserProfileResponse},
};
use reqwest::{Method, multipart::Form};

/// Profile fields the user can edit. The icon is only replaced when an image is given.
#[derive(Debug)]
pub struct ProfileUpdate {
    pub name: String,
    pub bio: String,
    pub image: Option<ImageUpload>,
}

impl ApiClient {
    pub async fn user_by_email(&self, email: &str) -> Result<UserProfile> {
        let path = "users";
        let builder = self.request(Method::GET, path).query(&[("email", email)]);
        let response: UserProfileResponse = self.send(path, builder).await?;
        Ok(response.user)
    }

    pub async fn follow(&self, to_id: Id<UserMarker>, from_id: Id<UserMarker>) -> Result<()> {
        self.follow_request(Method::POST, "users/follow", to_id, from_id)
            .await
    }

    pub async fn unfollow(&self, to_id: Id<UserMarker>, from_id: Id<UserMarker>) -> Result<()> {
        self.follow_request(Method::DELETE, "users/unfollow", to_id, from_id)
            .await
    }

    async fn follow_request(
        &self,
        method: Method,
        path: &str,
        to_id: Id<UserMarker>,
        from_id: Id<UserMarker>,
    ) -> Result<()> {
        let builder = self.request(method, path).query(&[
            ("toId", to_id.to_string()),
            ("fromId", from_id.to_string()),
        ]);
        self.send_ignoring_body(path, builder).await
    }

    pub async fn update_user(&self, user_id: Id<UserMarker>, update: ProfileUpdate) -> Result<()> {
        let path = "users/update";
        let mut form = Form::new()
            .text("name", update.name)
            .text("bio", update.bio);
        if let Some(image) = update.image {
            form = form.part("image", image.into_part()?);
        }

        let builder = self
            .request(Method::PUT, path)
            .query(&[("id", user_id.to_string())])
            .multipart(form);
        self.send_ignoring_body(path, builder).await
    }
}

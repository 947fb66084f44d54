use crate::{
    api::ApiClient,
    error::{ClientError, Result},
    queries::{Queries, QueryKey},
    session::Session,
    upload::ImageUpload,
};
use animalia_common::{
    model::{
        Id,
        comment::{Comment, CommentMarker},
        post::{CreatePost, PostMarker},
    },
    util::NonEmptyString,
};
use std::sync::Arc;
use tracing::info;

/// Creating and deleting posts and comments.
#[derive(Clone, Debug)]
pub struct Posts {
    api: ApiClient,
    session: Session,
    queries: Arc<Queries>,
}

impl Posts {
    #[must_use]
    pub fn new(api: ApiClient, session: Session, queries: Arc<Queries>) -> Self {
        Self {
            api,
            session,
            queries,
        }
    }

    pub async fn create_post(&self, post: CreatePost, image: ImageUpload) -> Result<()> {
        let user_id = self.session.current_user_id().await?;
        self.api.create_post(user_id, post, image).await?;
        info!(%user_id, "Created post");

        self.queries.users.invalidate(&QueryKey::CurrentUser);
        Ok(())
    }

    pub async fn delete_post(&self, post_id: Id<PostMarker>) -> Result<()> {
        self.api.delete_post(post_id).await?;
        info!(%post_id, "Deleted post");

        self.queries.users.invalidate(&QueryKey::CurrentUser);
        self.queries.timeline.invalidate(&QueryKey::Timeline);
        Ok(())
    }

    /// Posts a comment. Content that is blank after trimming is rejected without a request.
    pub async fn create_comment(&self, post_id: Id<PostMarker>, content: &str) -> Result<Comment> {
        let content =
            NonEmptyString::new(content.trim().to_owned()).ok_or(ClientError::EmptyComment)?;
        let user_id = self.session.current_user_id().await?;

        let comment = self.api.create_comment(user_id, post_id, content).await?;
        info!(%post_id, comment_id = %comment.id, "Commented");

        self.queries.timeline.invalidate(&QueryKey::Timeline);
        Ok(comment)
    }

    pub async fn delete_comment(&self, comment_id: Id<CommentMarker>) -> Result<()> {
        self.api.delete_comment(comment_id).await?;
        info!(%comment_id, "Deleted comment");

        self.queries.timeline.invalidate(&QueryKey::Timeline);
        Ok(())
    }
}

use crate::{
    model::{
        Id,
        comment::Comment,
        daily_task::{DailyTaskBase, DailyTaskMarker},
        like::Like,
        user::{UserBase, UserMarker},
    },
    util::NonEmptyString,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct PostMarker;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Id<PostMarker>,
    pub caption: String,
    pub image_url: NonEmptyString,
    pub user: UserBase,
    pub comments: Vec<Comment>,
    pub comments_count: u32,
    pub likes: Vec<Like>,
    pub likes_count: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default)]
    pub daily_task: Option<DailyTaskBase>,
    /// Client-side override written by optimistic like updates; never sent by the server.
    #[serde(default, skip_serializing)]
    pub liked_by_current_user: Option<bool>,
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Deserialize, Serialize)]
pub struct PostBase {
    pub id: Id<PostMarker>,
}

/// One page of the timeline, in server order.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
pub struct PostsPage {
    pub posts: Vec<Post>,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct TimelineRequest {
    pub user_id: Id<UserMarker>,
    pub limit: u32,
    pub cursor: Option<Id<PostMarker>>,
}

/// Fields sent when creating a post. The image travels alongside as a multipart part.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct CreatePost {
    pub caption: String,
    pub daily_task_id: Option<Id<DailyTaskMarker>>,
}

impl Post {
    /// Whether `user_id` likes this post, preferring an optimistic override over the like records.
    #[must_use]
    pub fn is_liked_by(&self, user_id: Id<UserMarker>) -> bool {
        self.liked_by_current_user
            .unwrap_or_else(|| self.likes.iter().any(|like| like.user.id == user_id))
    }

    pub fn apply_optimistic_like(&mut self, liked: bool) {
        if liked {
            self.likes_count += 1;
        } else {
            self.likes_count = self.likes_count.saturating_sub(1);
        }
        self.liked_by_current_user = Some(liked);
    }
}

impl PostsPage {
    #[must_use]
    pub fn last_id(&self) -> Option<Id<PostMarker>> {
        self.posts.last().map(|post| post.id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.posts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{
        Id,
        post::{Post, PostsPage, TimelineRequest},
        user::UserMarker,
    };

    const LIKER: &str = "7a6b1f50-0000-4000-8000-000000000001";

    fn post_json(likes: &str, likes_count: u32) -> String {
        format!(
            r#"{{
                "id": "0b0f6a52-4a1e-4c36-9d44-6c1f0c1a3e11",
                "caption": "nap time",
                "imageUrl": "https://cdn.example/p/1.jpg",
                "user": {{
                    "id": "7a6b1f50-0000-4000-8000-000000000002",
                    "email": "owner@example.com",
                    "name": "owner",
                    "bio": "",
                    "iconImageUrl": null
                }},
                "comments": [],
                "commentsCount": 0,
                "likes": {likes},
                "likesCount": {likes_count},
                "createdAt": "2025-03-01T12:00:00.123456Z",
                "dailyTask": null
            }}"#
        )
    }

    #[test]
    fn liked_state_comes_from_like_records() {
        let likes = format!(
            r#"[{{
                "id": "like-1",
                "user": {{
                    "id": "{LIKER}",
                    "email": "liker@example.com",
                    "name": "liker",
                    "bio": "hi",
                    "iconImageUrl": "https://cdn.example/u.png"
                }},
                "createdAt": "2025-03-01T12:05:00Z"
            }}]"#
        );
        let post: Post = serde_json::from_str(&post_json(&likes, 1)).unwrap();
        let liker: Id<UserMarker> = LIKER.parse().unwrap();

        assert!(post.is_liked_by(liker));
        assert!(!post.is_liked_by(Id::new_random()));
        assert_eq!(post.liked_by_current_user, None);
    }

    #[test]
    fn optimistic_override_wins_and_count_saturates() {
        let mut post: Post = serde_json::from_str(&post_json("[]", 0)).unwrap();
        let me = Id::new_random();

        post.apply_optimistic_like(true);
        assert_eq!(post.likes_count, 1);
        assert!(post.is_liked_by(me));

        post.apply_optimistic_like(false);
        post.apply_optimistic_like(false);
        assert_eq!(post.likes_count, 0);
        assert!(!post.is_liked_by(me));
    }

    #[test]
    fn override_is_not_serialized() {
        let mut post: Post = serde_json::from_str(&post_json("[]", 0)).unwrap();
        post.apply_optimistic_like(true);

        let json = serde_json::to_value(&post).unwrap();
        assert!(json.get("likedByCurrentUser").is_none());
    }

    #[test]
    fn first_timeline_request_sends_null_cursor() {
        let request = TimelineRequest {
            user_id: Id::new_random(),
            limit: 10,
            cursor: None,
        };
        let json = serde_json::to_value(request).unwrap();
        assert!(json["cursor"].is_null());
        assert_eq!(json["limit"], 10);
        assert!(json.get("user_id").is_some());
    }

    #[test]
    fn page_last_id() {
        assert_eq!(PostsPage::default().last_id(), None);

        let post: Post = serde_json::from_str(&post_json("[]", 0)).unwrap();
        let page = PostsPage {
            posts: vec![post.clone()],
        };
        assert_eq!(page.last_id(), Some(post.id));
    }
}

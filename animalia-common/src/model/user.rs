use crate::model::{Id, daily_task::DailyTask, pet::Pet, post::Post};
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct UserMarker;

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBase {
    pub id: Id<UserMarker>,
    pub email: String,
    pub name: String,
    pub bio: String,
    #[serde(default)]
    pub icon_image_url: Option<String>,
}

/// A user together with their social graph, posts, pets and today's task.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(flatten)]
    pub base: UserBase,
    pub followers: Vec<UserBase>,
    pub follows: Vec<UserBase>,
    pub followers_count: u32,
    pub follows_count: u32,
    pub posts: Vec<Post>,
    pub pets: Vec<Pet>,
    pub daily_task: DailyTask,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct UserProfileResponse {
    pub user: UserProfile,
}

impl UserProfile {
    #[must_use]
    pub fn id(&self) -> Id<UserMarker> {
        self.base.id
    }

    #[must_use]
    pub fn is_followed_by(&self, user_id: Id<UserMarker>) -> bool {
        self.followers.iter().any(|follower| follower.id == user_id)
    }

    /// Records `follower` as following this user. Already-present followers are left alone.
    pub fn add_follower(&mut self, follower: UserBase) {
        if self.is_followed_by(follower.id) {
            return;
        }
        self.followers.push(follower);
        self.followers_count += 1;
    }

    pub fn remove_follower(&mut self, follower_id: Id<UserMarker>) {
        let before = self.followers.len();
        self.followers.retain(|follower| follower.id != follower_id);
        if self.followers.len() != before {
            self.followers_count = self.followers_count.saturating_sub(1);
        }
    }
}

use crate::model::{Id, post::PostBase};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use time::OffsetDateTime;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct DailyTaskMarker;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Eating,
    Sleeping,
    Playing,
}

impl Display for TaskType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TaskType::Eating => "eating",
            TaskType::Sleeping => "sleeping",
            TaskType::Playing => "playing",
        })
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTaskBase {
    pub id: Id<DailyTaskMarker>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(rename = "type")]
    pub task_type: TaskType,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct DailyTask {
    #[serde(flatten)]
    pub base: DailyTaskBase,
    #[serde(default)]
    pub post: Option<PostBase>,
}

impl DailyTask {
    /// A daily task counts as done once a post has been submitted for it.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.post.is_some()
    }
}

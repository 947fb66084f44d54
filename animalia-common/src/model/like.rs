use crate::model::user::UserBase;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub id: String,
    pub user: UserBase,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

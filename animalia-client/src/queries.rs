use animalia_cache::{InfiniteData, QueryCache};
use animalia_common::model::{
    Id,
    pet::Pet,
    post::PostsPage,
    user::{UserMarker, UserProfile},
};

/// Identity of a cached query result.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub enum QueryKey {
    Timeline,
    CurrentUser,
    /// Another user's profile, looked up by email.
    UserProfile(String),
    Pets(Id<UserMarker>),
}

/// Every query cache of one client, grouped by value type.
#[derive(Default)]
pub struct Queries {
    pub timeline: QueryCache<QueryKey, InfiniteData<PostsPage>>,
    pub users: QueryCache<QueryKey, UserProfile>,
    pub pets: QueryCache<QueryKey, Vec<Pet>>,
}

impl Queries {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops everything, cancelling fetches in flight. Used when the session changes hands.
    pub fn clear(&self) {
        self.timeline.clear();
        self.users.clear();
        self.pets.clear();
    }
}

impl std::fmt::Debug for Queries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Queries").finish_non_exhaustive()
    }
}

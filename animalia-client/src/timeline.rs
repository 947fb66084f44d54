use crate::{
    api::ApiClient,
    error::Result,
    queries::{Queries, QueryKey},
    session::Session,
};
use animalia_cache::{InfiniteData, NextPage};
use animalia_common::model::post::{Post, PostsPage, TimelineRequest};
use std::sync::Arc;
use tracing::debug;

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub enum FetchOutcome {
    Page(PostsPage),
    /// The last page was short; nothing was requested.
    Exhausted,
    /// The fetch was cancelled while in flight and its result dropped.
    Cancelled,
    /// The pages changed underneath the fetch (e.g. a refresh), so the result no longer fit.
    Discarded,
}

/// The home feed, fetched page by page with the last post id of each page as the next cursor.
#[derive(Clone, Debug)]
pub struct Timeline {
    api: ApiClient,
    session: Session,
    queries: Arc<Queries>,
    page_size: u32,
}

impl Timeline {
    #[must_use]
    pub fn new(api: ApiClient, session: Session, queries: Arc<Queries>, page_size: u32) -> Self {
        Self {
            api,
            session,
            queries,
            page_size,
        }
    }

    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    fn limit(&self) -> usize {
        usize::try_from(self.page_size).unwrap_or(usize::MAX)
    }

    fn data(&self) -> InfiniteData<PostsPage> {
        self.queries
            .timeline
            .get(&QueryKey::Timeline)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn pages(&self) -> Vec<PostsPage> {
        self.data().into_pages()
    }

    /// All loaded posts in server order, stale or not.
    #[must_use]
    pub fn posts(&self) -> Vec<Post> {
        self.data()
            .into_pages()
            .into_iter()
            .flat_map(|page| page.posts)
            .collect()
    }

    #[must_use]
    pub fn has_next_page(&self) -> bool {
        self.data().has_next_page(self.limit())
    }

    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.queries.timeline.is_stale(&QueryKey::Timeline)
    }

    /// Loads the page after the last one loaded, or the first page if there is none.
    pub async fn fetch_next_page(&self) -> Result<FetchOutcome> {
        let user_id = self.session.current_user_id().await?;
        let key = QueryKey::Timeline;
        let data = self.data();
        let limit = self.limit();

        let cursor = match data.next_page(limit) {
            NextPage::First => None,
            NextPage::After(cursor) => Some(cursor),
            NextPage::Exhausted => {
                debug!(pages = data.page_count(), "Timeline exhausted");
                return Ok(FetchOutcome::Exhausted);
            }
        };

        let ticket = self.queries.timeline.begin_fetch(key.clone());
        let request = TimelineRequest {
            user_id,
            limit: self.page_size,
            cursor,
        };

        let page = tokio::select! {
            biased;
            () = ticket.cancelled() => {
                debug!(?cursor, "Timeline fetch cancelled");
                return Ok(FetchOutcome::Cancelled);
            }
            page = self.api.timeline(&request) => page?,
        };

        let mut discarded = false;
        let committed = self.queries.timeline.commit_update(&ticket, key, |current| {
            let mut current = current.unwrap_or_default();
            if current.page_count() == data.page_count()
                && current.next_page(limit) == data.next_page(limit)
            {
                current.push_page(cursor, page.clone());
            } else {
                discarded = true;
            }
            current
        });

        if !committed {
            debug!(?cursor, "Timeline fetch cancelled");
            return Ok(FetchOutcome::Cancelled);
        }
        if discarded {
            debug!(?cursor, "Timeline changed during fetch, dropping page");
            return Ok(FetchOutcome::Discarded);
        }

        debug!(?cursor, posts = page.len(), "Fetched timeline page");
        Ok(FetchOutcome::Page(page))
    }

    /// Throws away every loaded page and starts over from a null cursor.
    pub async fn refresh(&self) -> Result<FetchOutcome> {
        let key = QueryKey::Timeline;
        self.queries.timeline.cancel_fetches(&key);
        self.queries.timeline.invalidate(&key);
        self.queries.timeline.remove(&key);
        self.fetch_next_page().await
    }

    /// Re-fetches as many pages as are loaded, if the timeline was invalidated, and swaps them
    /// in at once. Returns whether new pages were stored.
    pub async fn revalidate(&self) -> Result<bool> {
        let key = QueryKey::Timeline;
        if !self.is_stale() {
            return Ok(false);
        }

        let user_id = self.session.current_user_id().await?;
        let limit = self.limit();
        let wanted = self.data().page_count().max(1);
        let ticket = self.queries.timeline.begin_fetch(key.clone());

        let mut fresh = InfiniteData::new();
        while fresh.page_count() < wanted {
            let cursor = match fresh.next_page(limit) {
                NextPage::First => None,
                NextPage::After(cursor) => Some(cursor),
                NextPage::Exhausted => break,
            };
            let request = TimelineRequest {
                user_id,
                limit: self.page_size,
                cursor,
            };

            let page = tokio::select! {
                biased;
                () = ticket.cancelled() => return Ok(false),
                page = self.api.timeline(&request) => page?,
            };
            fresh.push_page(cursor, page);
        }

        let pages = fresh.page_count();
        let committed = self.queries.timeline.commit_replace(&ticket, key, fresh);
        debug!(pages, committed, "Revalidated timeline");
        Ok(committed)
    }
}

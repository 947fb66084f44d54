use animalia_common::model::{
    Id,
    post::{PostMarker, PostsPage},
};
use derive_where::derive_where;

/// A page of results that can point at the page after it.
pub trait Page {
    type Cursor: Clone;

    fn item_count(&self) -> usize;

    /// The cursor to request the following page with, taken from the last item.
    fn next_cursor(&self) -> Option<Self::Cursor>;
}

impl Page for PostsPage {
    type Cursor = Id<PostMarker>;

    fn item_count(&self) -> usize {
        self.len()
    }

    fn next_cursor(&self) -> Option<Self::Cursor> {
        self.last_id()
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub enum NextPage<C> {
    /// Nothing loaded yet: request with a null cursor.
    First,
    After(C),
    /// The last page came back short; there is nothing more to load.
    Exhausted,
}

/// Pages of a cursor-paginated query, in the order they were loaded.
///
/// Each page is stored together with the cursor it was requested with (`None` for the first).
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
#[derive_where(Default)]
pub struct InfiniteData<P: Page> {
    pages: Vec<P>,
    page_params: Vec<Option<P::Cursor>>,
}

impl<P: Page> InfiniteData<P> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn pages(&self) -> &[P] {
        &self.pages
    }

    #[must_use]
    pub fn page_params(&self) -> &[Option<P::Cursor>] {
        &self.page_params
    }

    pub fn pages_mut(&mut self) -> impl Iterator<Item = &mut P> {
        self.pages.iter_mut()
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn push_page(&mut self, param: Option<P::Cursor>, page: P) {
        self.pages.push(page);
        self.page_params.push(param);
    }

    /// Decides what to request next given the page size the pages were fetched with.
    #[must_use]
    pub fn next_page(&self, limit: usize) -> NextPage<P::Cursor> {
        let Some(last) = self.pages.last() else {
            return NextPage::First;
        };
        if last.item_count() < limit {
            return NextPage::Exhausted;
        }
        last.next_cursor()
            .map_or(NextPage::Exhausted, NextPage::After)
    }

    #[must_use]
    pub fn has_next_page(&self, limit: usize) -> bool {
        !matches!(self.next_page(limit), NextPage::Exhausted)
    }

    pub fn into_pages(self) -> Vec<P> {
        self.pages
    }
}

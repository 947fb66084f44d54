pub mod entry;
pub mod pages;
pub mod query;

pub use entry::{EntryInfo, EntryState, Snapshot};
pub use pages::{InfiniteData, NextPage, Page};
pub use query::{FetchTicket, QueryCache};

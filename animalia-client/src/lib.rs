pub mod alert;
pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod like;
pub mod overlay;
pub mod pets;
pub mod posts;
pub mod profile;
pub mod queries;
pub mod session;
pub mod timeline;
pub mod token_store;
pub mod upload;

#[cfg(test)]
mod test_support;

pub use client::AnimaliaClient;
pub use config::ClientConfig;
pub use error::{ClientError, Result};

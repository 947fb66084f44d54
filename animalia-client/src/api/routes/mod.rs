mod auth;
mod comments;
mod likes;
mod pets;
mod posts;
pub(crate) mod users;

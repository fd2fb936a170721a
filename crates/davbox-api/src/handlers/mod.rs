pub mod delete;
pub mod link;
pub mod list;
pub mod session;
pub mod upload;

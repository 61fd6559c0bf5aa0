//! Upstream API client

pub mod openleg;
pub mod types;

pub use openleg::OpenlegClient;
pub use types::{Envelope, ItemList, UpdateToken};

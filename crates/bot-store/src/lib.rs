//! JSON-backed persistent store for the self-bot.
//!
//! Holds a counter, a free-form data bag, the alias map and two user
//! lists. The whole file is rewritten on every mutation.

mod error;
mod store;
mod types;

pub use error::StoreError;
pub use store::{write_json_atomic, JsonStore};
pub use types::*;

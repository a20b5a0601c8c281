//! SQLite backend for the quizdeck store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. The uniqueness constraint
//! on `(session_id, question_id)` lives here and is what makes concurrent
//! duplicate submissions race safely.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

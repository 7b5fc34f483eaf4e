//! SQLite backend for the entity store.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;

//! Helpers for tests that need a real database, plus (in unit tests) a mock store.
#[cfg(test)]
pub mod mocks;
pub mod prepare_env;

pub use prepare_env::{create_database, prepare_test_env, random_db_path, run_migrations};

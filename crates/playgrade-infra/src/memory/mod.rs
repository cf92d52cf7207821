//! In-memory storage for running without Postgres.

mod store;

pub use store::InMemoryStore;

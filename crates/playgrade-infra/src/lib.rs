//! # Play Grade Infrastructure
//!
//! Concrete implementations of the ports defined in `playgrade-core`:
//! Postgres repositories, an in-memory fallback, JWT + Argon2 auth and
//! local image storage.
//!
//! ## Feature Flags
//!
//! - `postgres` (default) - PostgreSQL repositories via SeaORM
//! - `minimal` - No database driver, in-memory repositories only

pub mod auth;
pub mod memory;
pub mod storage;

#[cfg(feature = "postgres")]
pub mod database;

pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
pub use memory::InMemoryStore;
pub use storage::LocalImageStore;

//! # Play Grade Core
//!
//! The domain layer of the Play Grade backend.
//! Entities, validation rules, feed filtering and the ports that the
//! infrastructure crate implements. No database or HTTP dependencies live here.

pub mod domain;
pub mod error;
pub mod ports;

pub use error::{DomainError, RepoError};

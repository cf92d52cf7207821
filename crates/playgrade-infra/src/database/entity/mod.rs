//! SeaORM entities, one module per table.

pub mod follow;
pub mod like;
pub mod post;
pub mod reply;
pub mod user;

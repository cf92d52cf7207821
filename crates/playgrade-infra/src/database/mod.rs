//! PostgreSQL persistence via SeaORM.

mod connections;
mod postgres_base;
mod postgres_repo;

pub mod entity;

pub use connections::{DatabaseConfig, connect};
pub use sea_orm::DbConn;
pub use postgres_base::PostgresBaseRepository;
pub use postgres_repo::{
    PostgresFollowRepository, PostgresLikeRepository, PostgresPostRepository,
    PostgresReplyRepository, PostgresUserRepository,
};

#[cfg(test)]
mod tests;

//! Database migrations.
//!
//! Schema for users, posts, replies, likes and follows.

use sea_orm_migration::prelude::*;

pub use sea_orm_migration::MigratorTrait;

mod m20250101_000001_create_users_table;
mod m20250101_000002_create_posts_table;
mod m20250101_000003_create_replies_table;
mod m20250101_000004_create_likes_table;
mod m20250101_000005_create_follows_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_users_table::Migration),
            Box::new(m20250101_000002_create_posts_table::Migration),
            Box::new(m20250101_000003_create_replies_table::Migration),
            Box::new(m20250101_000004_create_likes_table::Migration),
            Box::new(m20250101_000005_create_follows_table::Migration),
        ]
    }
}

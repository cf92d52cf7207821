//! Create posts table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Posts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Posts::PostId)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Posts::PosterId).integer().not_null())
                    .col(ColumnDef::new(Posts::Title).string_len(100).not_null())
                    .col(ColumnDef::new(Posts::Body).string_len(300).not_null())
                    .col(
                        ColumnDef::new(Posts::Category)
                            .string_len(1)
                            .not_null()
                            .check(Expr::col(Posts::Category).is_in(["G", "F", "M"])),
                    )
                    .col(ColumnDef::new(Posts::ImageUrl).string_len(255))
                    .col(
                        ColumnDef::new(Posts::LikeCount)
                            .integer()
                            .not_null()
                            .default(0)
                            .check(Expr::col(Posts::LikeCount).gte(0)),
                    )
                    .col(
                        ColumnDef::new(Posts::ReplyCount)
                            .integer()
                            .not_null()
                            .default(0)
                            .check(Expr::col(Posts::ReplyCount).gte(0)),
                    )
                    .col(
                        ColumnDef::new(Posts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_posts_poster")
                            .from(Posts::Table, Posts::PosterId)
                            .to(Users::Table, Users::UserId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: created_at (default feed order and age filter)
        manager
            .create_index(
                Index::create()
                    .name("idx_posts_created_at")
                    .table(Posts::Table)
                    .col(Posts::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Index: poster_id (profile pages and followed feed)
        manager
            .create_index(
                Index::create()
                    .name("idx_posts_poster_id")
                    .table(Posts::Table)
                    .col(Posts::PosterId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Posts::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Posts {
    Table,
    PostId,
    PosterId,
    Title,
    Body,
    Category,
    ImageUrl,
    LikeCount,
    ReplyCount,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    UserId,
}

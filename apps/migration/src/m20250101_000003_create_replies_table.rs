//! Create replies table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Replies::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Replies::ReplyId)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Replies::PostId).integer().not_null())
                    .col(ColumnDef::new(Replies::ReplierId).integer().not_null())
                    .col(ColumnDef::new(Replies::Body).string_len(300).not_null())
                    .col(ColumnDef::new(Replies::ImageUrl).string_len(255))
                    .col(
                        ColumnDef::new(Replies::LikeCount)
                            .integer()
                            .not_null()
                            .default(0)
                            .check(Expr::col(Replies::LikeCount).gte(0)),
                    )
                    .col(
                        ColumnDef::new(Replies::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_replies_post")
                            .from(Replies::Table, Replies::PostId)
                            .to(Posts::Table, Posts::PostId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_replies_replier")
                            .from(Replies::Table, Replies::ReplierId)
                            .to(Users::Table, Users::UserId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_replies_post_id")
                    .table(Replies::Table)
                    .col(Replies::PostId)
                    .col(Replies::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Replies::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Replies {
    Table,
    ReplyId,
    PostId,
    ReplierId,
    Body,
    ImageUrl,
    LikeCount,
    CreatedAt,
}

#[derive(Iden)]
enum Posts {
    Table,
    PostId,
}

#[derive(Iden)]
enum Users {
    Table,
    UserId,
}

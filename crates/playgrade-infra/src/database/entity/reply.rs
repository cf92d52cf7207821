//! Reply entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "replies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub reply_id: i32,
    pub post_id: i32,
    pub replier_id: i32,
    pub body: String,
    pub image_url: Option<String>,
    pub like_count: i32,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::post::Entity",
        from = "Column::PostId",
        to = "super::post::Column::PostId",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Post,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ReplierId",
        to = "super::user::Column::UserId",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for playgrade_core::domain::Reply {
    fn from(model: Model) -> Self {
        Self {
            id: model.reply_id,
            post_id: model.post_id,
            replier_id: model.replier_id,
            body: model.body,
            image_url: model.image_url,
            like_count: model.like_count,
            created_at: model.created_at.into(),
        }
    }
}

impl From<playgrade_core::domain::NewReply> for ActiveModel {
    fn from(reply: playgrade_core::domain::NewReply) -> Self {
        Self {
            post_id: Set(reply.post_id),
            replier_id: Set(reply.replier_id),
            body: Set(reply.body),
            image_url: Set(reply.image_url),
            ..Default::default()
        }
    }
}

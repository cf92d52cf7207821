//! Like entity for SeaORM. Exactly one of `post_id` / `reply_id` is set.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use playgrade_core::domain::LikeTarget;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "likes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub like_id: i32,
    pub user_id: i32,
    pub post_id: Option<i32>,
    pub reply_id: Option<i32>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Column holding the id of the given target kind.
pub fn target_column(target: LikeTarget) -> Column {
    match target {
        LikeTarget::Post(_) => Column::PostId,
        LikeTarget::Reply(_) => Column::ReplyId,
    }
}

pub fn new_like(user_id: i32, target: LikeTarget) -> ActiveModel {
    let (post_id, reply_id) = match target {
        LikeTarget::Post(id) => (Some(id), None),
        LikeTarget::Reply(id) => (None, Some(id)),
    };

    ActiveModel {
        user_id: Set(user_id),
        post_id: Set(post_id),
        reply_id: Set(reply_id),
        ..Default::default()
    }
}

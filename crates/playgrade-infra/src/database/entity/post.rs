//! Post entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use playgrade_core::domain::Category;

/// Single-letter category code as stored in `posts.category`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(1))")]
pub enum CategoryCode {
    #[sea_orm(string_value = "G")]
    Games,
    #[sea_orm(string_value = "F")]
    FilmTv,
    #[sea_orm(string_value = "M")]
    Music,
}

impl From<Category> for CategoryCode {
    fn from(category: Category) -> Self {
        match category {
            Category::Games => CategoryCode::Games,
            Category::FilmTv => CategoryCode::FilmTv,
            Category::Music => CategoryCode::Music,
        }
    }
}

impl From<CategoryCode> for Category {
    fn from(code: CategoryCode) -> Self {
        match code {
            CategoryCode::Games => Category::Games,
            CategoryCode::FilmTv => Category::FilmTv,
            CategoryCode::Music => Category::Music,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub post_id: i32,
    pub poster_id: i32,
    pub title: String,
    pub body: String,
    pub category: CategoryCode,
    pub image_url: Option<String>,
    pub like_count: i32,
    pub reply_count: i32,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::PosterId",
        to = "super::user::Column::UserId",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(has_many = "super::reply::Entity")]
    Reply,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::reply::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reply.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain Post.
impl From<Model> for playgrade_core::domain::Post {
    fn from(model: Model) -> Self {
        Self {
            id: model.post_id,
            poster_id: model.poster_id,
            title: model.title,
            body: model.body,
            category: model.category.into(),
            image_url: model.image_url,
            like_count: model.like_count,
            reply_count: model.reply_count,
            created_at: model.created_at.into(),
        }
    }
}

/// Insert model for a new post; id, counters and timestamp come from the database.
impl From<playgrade_core::domain::NewPost> for ActiveModel {
    fn from(post: playgrade_core::domain::NewPost) -> Self {
        Self {
            poster_id: Set(post.poster_id),
            title: Set(post.title),
            body: Set(post.body),
            category: Set(post.category.into()),
            image_url: Set(post.image_url),
            ..Default::default()
        }
    }
}

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    #[sea_orm(string_value = "scratch")]
    Scratch,
    #[sea_orm(string_value = "wheel")]
    Wheel,
    #[sea_orm(string_value = "flip")]
    Flip,
}

impl std::fmt::Display for GameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameKind::Scratch => write!(f, "scratch"),
            GameKind::Wheel => write!(f, "wheel"),
            GameKind::Flip => write!(f, "flip"),
        }
    }
}

/// 小游戏配置实体
/// 说明:
/// - max_plays: 每个用户可玩的最大次数
/// - starts_at / ends_at: 可选的开放时间窗口 (NULL 表示不限)
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "games")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub kind: GameKind,
    pub max_plays: i32,
    pub is_active: bool,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model {
    /// 是否在 `now` 时刻开放 (启用且处于时间窗口内)
    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        if !self.is_active {
            return false;
        }
        if self.starts_at.is_some_and(|s| now < s) {
            return false;
        }
        if self.ends_at.is_some_and(|e| now >= e) {
            return false;
        }
        true
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::game_outcomes::Entity")]
    Outcomes,
}

impl Related<super::game_outcomes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Outcomes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

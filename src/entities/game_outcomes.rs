use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 奖项类型 (显式区分中奖/未中奖, 不依赖 label 文本)
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    #[sea_orm(string_value = "win")]
    Win,
    #[sea_orm(string_value = "lose")]
    Lose,
}

impl std::fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutcomeKind::Win => write!(f, "win"),
            OutcomeKind::Lose => write!(f, "lose"),
        }
    }
}

/// 游戏奖项实体
/// - position: 奖项顺序 (抽取时按此顺序累加概率, 0 号为回落默认项)
/// - weight: 概率百分点 (0..=100)
/// - coupon_id: 奖励优惠券 (NULL 表示未中奖)
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "game_outcomes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub game_id: i64,
    pub position: i32,
    pub label: String,
    pub kind: OutcomeKind,
    pub coupon_id: Option<i64>,
    pub weight: i32,
    pub created_at: Option<DateTime<Utc>>,
}

impl Model {
    pub fn is_win(&self) -> bool {
        self.kind == OutcomeKind::Win
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::games::Entity",
        from = "Column::GameId",
        to = "super::games::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Game,
}

impl Related<super::games::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Game.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

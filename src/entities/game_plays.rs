use super::GameKind;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 游戏流水实体
/// 说明:
/// - 每次通过限次校验的游戏产生一条记录, 写入后不再修改
/// - outcome_label 冗余存储方便历史查询 (即使奖项后续修改仍可回溯)
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "game_plays")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub game_id: i64,
    pub game_kind: GameKind,
    /// 奖项ID (指向 game_outcomes.id)
    pub outcome_id: i64,
    pub outcome_label: String,
    pub won: bool,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

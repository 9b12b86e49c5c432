use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{GameKind, OutcomeKind, game_entity, game_outcome_entity};
use crate::error::{AppError, AppResult};
use crate::utils::{Weighted, validate_weights};

/// 奖项配置 (按数组顺序保存为 position)
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct OutcomeInput {
    /// 展示文案，不参与中奖判断
    pub label: String,
    pub kind: OutcomeKind,
    /// 中奖奖项必须关联优惠券，未中奖奖项不可关联
    pub coupon_id: Option<i64>,
    /// 概率百分点 (0..=100)
    pub weight: i32,
}

impl Weighted for OutcomeInput {
    fn weight(&self) -> i32 {
        self.weight
    }
}

/// 校验奖项列表: 非空、权重合法、win <=> coupon_id
pub fn validate_outcomes(outcomes: &[OutcomeInput]) -> AppResult<()> {
    if outcomes.is_empty() {
        return Err(AppError::ValidationError(
            "A game needs at least one outcome".into(),
        ));
    }
    validate_weights(outcomes).map_err(AppError::ValidationError)?;

    for (idx, o) in outcomes.iter().enumerate() {
        if o.label.trim().is_empty() {
            return Err(AppError::ValidationError(format!(
                "Outcome #{idx} has an empty label"
            )));
        }
        match (o.kind, o.coupon_id) {
            (OutcomeKind::Win, None) => {
                return Err(AppError::ValidationError(format!(
                    "Winning outcome #{idx} must reference a coupon"
                )));
            }
            (OutcomeKind::Lose, Some(_)) => {
                return Err(AppError::ValidationError(format!(
                    "Losing outcome #{idx} must not reference a coupon"
                )));
            }
            _ => {}
        }
    }
    Ok(())
}

/// 创建游戏请求 (管理员)
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CreateGameRequest {
    pub name: String,
    pub kind: GameKind,
    /// 每个用户最多可玩次数 (>= 1)
    pub max_plays: i32,
    pub is_active: Option<bool>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub outcomes: Vec<OutcomeInput>,
}

impl CreateGameRequest {
    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::ValidationError("Game name is required".into()));
        }
        if self.max_plays < 1 {
            return Err(AppError::ValidationError(
                "max_plays must be at least 1".into(),
            ));
        }
        if let (Some(s), Some(e)) = (self.starts_at, self.ends_at)
            && s >= e
        {
            return Err(AppError::ValidationError(
                "starts_at must be before ends_at".into(),
            ));
        }
        validate_outcomes(&self.outcomes)
    }
}

/// 替换奖项列表请求
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ReplaceOutcomesRequest {
    pub outcomes: Vec<OutcomeInput>,
}

/// 启用 / 停用游戏
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct UpdateGameStatusRequest {
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OutcomeResponse {
    pub id: i64,
    pub position: i32,
    pub label: String,
    pub kind: OutcomeKind,
    pub coupon_id: Option<i64>,
    pub weight: i32,
}

impl From<game_outcome_entity::Model> for OutcomeResponse {
    fn from(m: game_outcome_entity::Model) -> Self {
        OutcomeResponse {
            id: m.id,
            position: m.position,
            label: m.label,
            kind: m.kind,
            coupon_id: m.coupon_id,
            weight: m.weight,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GameResponse {
    pub id: i64,
    pub name: String,
    pub kind: GameKind,
    pub max_plays: i32,
    pub is_active: bool,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub outcomes: Vec<OutcomeResponse>,
}

impl GameResponse {
    pub fn new(game: game_entity::Model, outcomes: Vec<game_outcome_entity::Model>) -> Self {
        GameResponse {
            id: game.id,
            name: game.name,
            kind: game.kind,
            max_plays: game.max_plays,
            is_active: game.is_active,
            starts_at: game.starts_at,
            ends_at: game.ends_at,
            outcomes: outcomes.into_iter().map(Into::into).collect(),
        }
    }
}

/// 用户在某个游戏上的次数状态
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlayStatusResponse {
    pub game_id: i64,
    pub plays_used: i64,
    pub max_plays: i32,
    pub remaining_plays: i64,
    pub can_play: bool,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{DiscountType, GameKind, OutcomeKind, game_play_entity};

/// 单次游戏的状态流转
///
/// `Idle -> Gated -> Drawing -> Resolved(Win|Lose) -> Closed`，
/// 限次校验失败时 `Gated -> Closed`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    Idle,
    Gated,
    Drawing,
    Resolved(OutcomeKind),
    Closed,
}

impl PlayState {
    pub fn can_transition_to(&self, next: PlayState) -> bool {
        matches!(
            (self, next),
            (PlayState::Idle, PlayState::Gated)
                | (PlayState::Gated, PlayState::Drawing)
                | (PlayState::Gated, PlayState::Closed)
                | (PlayState::Drawing, PlayState::Resolved(_))
                | (PlayState::Resolved(_), PlayState::Closed)
        )
    }

    pub fn is_terminal(&self) -> bool {
        *self == PlayState::Closed
    }
}

impl std::fmt::Display for PlayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayState::Idle => write!(f, "idle"),
            PlayState::Gated => write!(f, "gated"),
            PlayState::Drawing => write!(f, "drawing"),
            PlayState::Resolved(kind) => write!(f, "resolved({kind})"),
            PlayState::Closed => write!(f, "closed"),
        }
    }
}

/// 中奖后发给用户的优惠信息
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RewardSummary {
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: i64,
    pub expires_at: DateTime<Utc>,
}

/// 本次抽中的奖项
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlayedOutcome {
    pub id: i64,
    pub label: String,
    pub kind: OutcomeKind,
}

/// 游戏 (Play) 响应
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlayResponse {
    pub play_id: i64,
    pub won: bool,
    pub outcome: PlayedOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward: Option<RewardSummary>,
    pub remaining_plays: i64,
}

/// 游戏记录查询参数
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct PlayRecordQuery {
    /// 页码 (默认 1)
    pub page: Option<u32>,
    /// 每页数量 (默认 20)
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlayRecordResponse {
    pub id: i64,
    pub game_id: i64,
    pub game_kind: GameKind,
    pub outcome_id: i64,
    /// 奖项文案 (历史快照)
    pub outcome_label: String,
    pub won: bool,
    pub created_at: DateTime<Utc>,
}

impl From<game_play_entity::Model> for PlayRecordResponse {
    fn from(m: game_play_entity::Model) -> Self {
        PlayRecordResponse {
            id: m.id,
            game_id: m.game_id,
            game_kind: m.game_kind,
            outcome_id: m.outcome_id,
            outcome_label: m.outcome_label,
            won: m.won,
            created_at: m.created_at.unwrap_or_else(Utc::now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        let path = [
            PlayState::Idle,
            PlayState::Gated,
            PlayState::Drawing,
            PlayState::Resolved(OutcomeKind::Win),
            PlayState::Closed,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
        assert!(PlayState::Closed.is_terminal());
    }

    #[test]
    fn test_gate_rejection_closes() {
        assert!(PlayState::Gated.can_transition_to(PlayState::Closed));
    }

    #[test]
    fn test_no_redraw_or_skipping() {
        assert!(!PlayState::Idle.can_transition_to(PlayState::Drawing));
        assert!(!PlayState::Resolved(OutcomeKind::Lose).can_transition_to(PlayState::Drawing));
        assert!(!PlayState::Closed.can_transition_to(PlayState::Idle));
        assert!(!PlayState::Drawing.can_transition_to(PlayState::Closed));
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{DiscountType, coupon_entity, issued_reward_entity};

/// 奖励查询参数
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct RewardQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// 用户已获得的奖励
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IssuedRewardResponse {
    pub id: i64,
    pub coupon_id: i64,
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: i64,
    pub source: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub is_used: bool,
    pub is_expired: bool,
}

impl IssuedRewardResponse {
    pub fn new(reward: issued_reward_entity::Model, coupon: coupon_entity::Model) -> Self {
        let is_expired = reward.is_expired_at(Utc::now());
        IssuedRewardResponse {
            id: reward.id,
            coupon_id: reward.coupon_id,
            code: coupon.code,
            discount_type: coupon.discount_type,
            discount_value: coupon.discount_value,
            source: reward.source,
            issued_at: reward.issued_at,
            expires_at: reward.expires_at,
            is_used: reward.is_used,
            is_expired,
        }
    }
}


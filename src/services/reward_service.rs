use crate::entities::{
    coupon_entity as coupons, game_outcome_entity as outcomes, issued_reward_entity as rewards,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    IssuedRewardPageResponse, IssuedRewardResponse, PaginatedResponse, PaginationParams,
    RewardQuery,
};
use chrono::{Duration, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use std::collections::HashMap;

/// 奖励有效期 (天)
pub const REWARD_VALIDITY_DAYS: i64 = 30;

/// 发放结果
#[derive(Debug, Clone, PartialEq)]
pub enum RewardIssuance {
    /// 新发放
    Issued(rewards::Model),
    /// 该用户已持有同一优惠券，返回已有记录
    AlreadyIssued(rewards::Model),
    /// 未中奖，无需发放
    NoOp,
}

impl RewardIssuance {
    pub fn reward(&self) -> Option<&rewards::Model> {
        match self {
            RewardIssuance::Issued(r) | RewardIssuance::AlreadyIssued(r) => Some(r),
            RewardIssuance::NoOp => None,
        }
    }
}

#[derive(Clone)]
pub struct RewardService {
    pool: DatabaseConnection,
}

impl RewardService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 为中奖奖项发放优惠券，(user_id, coupon_id) 幂等。
    ///
    /// 可在外部事务中调用，以便与游戏流水一起提交或回滚。
    pub async fn issue_reward<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: i64,
        outcome: &outcomes::Model,
        source: &str,
    ) -> AppResult<RewardIssuance> {
        let coupon_id = match outcome.coupon_id {
            Some(id) if outcome.is_win() => id,
            _ => return Ok(RewardIssuance::NoOp),
        };

        if let Some(existing) = find_reward(conn, user_id, coupon_id).await? {
            return Ok(RewardIssuance::AlreadyIssued(existing));
        }

        let now = Utc::now();
        let inserted = rewards::Entity::insert(rewards::ActiveModel {
            user_id: Set(user_id),
            coupon_id: Set(coupon_id),
            source: Set(source.to_string()),
            issued_at: Set(now),
            expires_at: Set(now + Duration::days(REWARD_VALIDITY_DAYS)),
            is_used: Set(false),
            used_at: Set(None),
            ..Default::default()
        })
        .on_conflict(
            OnConflict::columns([rewards::Column::UserId, rewards::Column::CouponId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

        let reward = find_reward(conn, user_id, coupon_id)
            .await?
            .ok_or_else(|| AppError::InternalError("Issued reward not found after insert".into()))?;

        if inserted == 0 {
            // 并发请求已先一步插入
            Ok(RewardIssuance::AlreadyIssued(reward))
        } else {
            log::info!("Reward issued: user={user_id} coupon={coupon_id} source={source}");
            Ok(RewardIssuance::Issued(reward))
        }
    }

    /// 分页获取用户奖励（按发放时间倒序）
    pub async fn list_rewards(
        &self,
        user_id: i64,
        query: &RewardQuery,
    ) -> AppResult<IssuedRewardPageResponse> {
        let params = PaginationParams::new(query.page, query.per_page);

        let base_query = rewards::Entity::find().filter(rewards::Column::UserId.eq(user_id));
        let total = base_query.clone().count(&self.pool).await? as i64;

        let items = base_query
            .order_by(rewards::Column::IssuedAt, Order::Desc)
            .order_by(rewards::Column::Id, Order::Desc)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(&self.pool)
            .await?;

        let coupon_ids: Vec<i64> = items.iter().map(|r| r.coupon_id).collect();
        let coupon_map: HashMap<i64, coupons::Model> = coupons::Entity::find()
            .filter(coupons::Column::Id.is_in(coupon_ids))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        let mut data = Vec::with_capacity(items.len());
        for reward in items {
            let coupon = coupon_map.get(&reward.coupon_id).cloned().ok_or_else(|| {
                AppError::NotFound(format!("Coupon {} not found", reward.coupon_id))
            })?;
            data.push(IssuedRewardResponse::new(reward, coupon));
        }

        Ok(PaginatedResponse::new(
            data,
            params.get_page(),
            params.get_page_size(),
            total,
        ))
    }
}

async fn find_reward<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
    coupon_id: i64,
) -> AppResult<Option<rewards::Model>> {
    Ok(rewards::Entity::find()
        .filter(rewards::Column::UserId.eq(user_id))
        .filter(rewards::Column::CouponId.eq(coupon_id))
        .one(conn)
        .await?)
}

use crate::config::GamesConfig;
use crate::entities::{coupon_entity as coupons, game_play_entity as plays};
use crate::error::{AppError, AppResult};
use crate::models::{
    PaginatedResponse, PaginationParams, PlayRecordPageResponse, PlayRecordQuery,
    PlayRecordResponse, PlayResponse, PlayState, PlayStatusResponse, PlayedOutcome,
    RewardSummary,
};
use crate::services::{GameService, PlayLimitService, RewardService, count_plays};
use crate::utils::draw;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

/// 单次游戏的状态跟踪
struct PlayFlow {
    user_id: i64,
    game_id: i64,
    state: PlayState,
}

impl PlayFlow {
    fn new(user_id: i64, game_id: i64) -> Self {
        Self {
            user_id,
            game_id,
            state: PlayState::Idle,
        }
    }

    fn advance(&mut self, next: PlayState) -> AppResult<()> {
        if self.state.is_terminal() || !self.state.can_transition_to(next) {
            return Err(AppError::InternalError(format!(
                "Invalid play transition {} -> {next}",
                self.state
            )));
        }
        log::debug!(
            "play user={} game={}: {} -> {next}",
            self.user_id,
            self.game_id,
            self.state
        );
        self.state = next;
        Ok(())
    }
}

#[derive(Clone)]
pub struct PlayService {
    pool: DatabaseConnection,
    game_service: GameService,
    reward_service: RewardService,
    play_limit: PlayLimitService,
    settings: GamesConfig,
}

impl PlayService {
    pub fn new(
        pool: DatabaseConnection,
        game_service: GameService,
        reward_service: RewardService,
        settings: GamesConfig,
    ) -> Self {
        let play_limit = PlayLimitService::new(pool.clone());
        if !settings.enforce_play_limit {
            log::warn!("Play limit enforcement is disabled");
        }
        Self {
            pool,
            game_service,
            reward_service,
            play_limit,
            settings,
        }
    }

    /// 玩一次游戏
    pub async fn play(&self, user_id: i64, game_id: i64) -> AppResult<PlayResponse> {
        let mut rng = StdRng::from_entropy();
        self.play_with_rng(user_id, game_id, &mut rng).await
    }

    /// 玩一次游戏 (可注入随机源)
    ///
    /// 流程:
    /// 1. 读取游戏及奖项，校验存在且开放
    /// 2. 事务内原子占用一次次数 (失败即 MaxPlaysReached)
    /// 3. 抽取奖项 (只抽一次，失败不重抽)
    /// 4. 写游戏流水；中奖则幂等发放优惠券
    /// 5. 提交事务；任何一步失败整体回滚，视为本次未发生
    pub async fn play_with_rng<R: Rng + ?Sized>(
        &self,
        user_id: i64,
        game_id: i64,
        rng: &mut R,
    ) -> AppResult<PlayResponse> {
        let mut flow = PlayFlow::new(user_id, game_id);
        let (game, outcome_list) = self.game_service.playable_game(game_id, Utc::now()).await?;

        let txn = self.pool.begin().await?;

        flow.advance(PlayState::Gated)?;
        match self
            .play_limit
            .consume_play(&txn, user_id, &game, self.settings.enforce_play_limit)
            .await
        {
            Ok(()) => {}
            Err(AppError::MaxPlaysReached) => {
                flow.advance(PlayState::Closed)?;
                log::info!("Max plays reached: user={user_id} game={game_id}");
                return Err(AppError::MaxPlaysReached);
            }
            Err(e) => return Err(e),
        }

        flow.advance(PlayState::Drawing)?;
        let outcome = draw(&outcome_list, rng)
            .cloned()
            .ok_or(AppError::GameInactive(game_id))?;

        let record = plays::ActiveModel {
            user_id: Set(user_id),
            game_id: Set(game.id),
            game_kind: Set(game.kind),
            outcome_id: Set(outcome.id),
            outcome_label: Set(outcome.label.clone()),
            won: Set(outcome.is_win()),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        flow.advance(PlayState::Resolved(outcome.kind))?;
        let plays_used = count_plays(&txn, user_id, game.id).await?;

        let source = format!("{}_game", game.kind);
        let issuance = self
            .reward_service
            .issue_reward(&txn, user_id, &outcome, &source)
            .await?;

        let reward = match issuance.reward() {
            Some(issued) => {
                let coupon = coupons::Entity::find_by_id(issued.coupon_id)
                    .one(&txn)
                    .await?
                    .ok_or_else(|| {
                        AppError::NotFound(format!("Coupon {} not found", issued.coupon_id))
                    })?;
                Some(RewardSummary {
                    code: coupon.code,
                    discount_type: coupon.discount_type,
                    discount_value: coupon.discount_value,
                    expires_at: issued.expires_at,
                })
            }
            None => None,
        };

        txn.commit().await?;
        flow.advance(PlayState::Closed)?;

        Ok(PlayResponse {
            play_id: record.id,
            won: outcome.is_win(),
            outcome: PlayedOutcome {
                id: outcome.id,
                label: outcome.label,
                kind: outcome.kind,
            },
            reward,
            remaining_plays: (i64::from(game.max_plays) - plays_used).max(0),
        })
    }

    /// 用户在某个游戏上的次数状态
    pub async fn status(&self, user_id: i64, game_id: i64) -> AppResult<PlayStatusResponse> {
        let game = self.game_service.find_game(game_id).await?;
        let plays_used = self.play_limit.plays_used(user_id, game_id).await?;
        let under_limit = !self.settings.enforce_play_limit
            || self
                .play_limit
                .can_play(user_id, game_id, game.max_plays)
                .await?;

        Ok(PlayStatusResponse {
            game_id,
            plays_used,
            max_plays: game.max_plays,
            remaining_plays: (i64::from(game.max_plays) - plays_used).max(0),
            can_play: under_limit && game.is_open_at(Utc::now()),
        })
    }

    /// 分页获取用户在某个游戏上的记录（倒序）
    pub async fn list_plays(
        &self,
        user_id: i64,
        game_id: i64,
        query: &PlayRecordQuery,
    ) -> AppResult<PlayRecordPageResponse> {
        let params = PaginationParams::new(query.page, query.per_page);

        let base_query = plays::Entity::find()
            .filter(plays::Column::UserId.eq(user_id))
            .filter(plays::Column::GameId.eq(game_id));

        let total = base_query.clone().count(&self.pool).await? as i64;

        let items = base_query
            .order_by(plays::Column::CreatedAt, Order::Desc)
            .order_by(plays::Column::Id, Order::Desc)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(&self.pool)
            .await?;

        let items: Vec<PlayRecordResponse> = items.into_iter().map(Into::into).collect();

        Ok(PaginatedResponse::new(
            items,
            params.get_page(),
            params.get_page_size(),
            total,
        ))
    }
}

use crate::entities::{
    coupon_entity as coupons, game_entity as games, game_outcome_entity as outcomes,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    CreateGameRequest, GameResponse, OutcomeInput, ReplaceOutcomesRequest, validate_outcomes,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::collections::{HashMap, HashSet};

/// 小游戏配置 (管理员维护，玩家只读)
#[derive(Clone)]
pub struct GameService {
    pool: DatabaseConnection,
}

impl GameService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn create_game(&self, req: CreateGameRequest) -> AppResult<GameResponse> {
        req.validate()?;

        let txn = self.pool.begin().await?;
        ensure_coupons_exist(&txn, &req.outcomes).await?;

        let now = Utc::now();
        let game = games::ActiveModel {
            name: Set(req.name.trim().to_string()),
            kind: Set(req.kind),
            max_plays: Set(req.max_plays),
            is_active: Set(req.is_active.unwrap_or(true)),
            starts_at: Set(req.starts_at),
            ends_at: Set(req.ends_at),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        insert_outcomes(&txn, game.id, &req.outcomes, now).await?;
        let saved = load_outcomes(&txn, game.id).await?;
        txn.commit().await?;

        log::info!(
            "Game created: id={} kind={} outcomes={}",
            game.id,
            game.kind,
            saved.len()
        );
        Ok(GameResponse::new(game, saved))
    }

    /// 所有游戏 (管理员)
    pub async fn list_games(&self) -> AppResult<Vec<GameResponse>> {
        let list = games::Entity::find()
            .order_by_asc(games::Column::Id)
            .all(&self.pool)
            .await?;
        self.with_outcomes(list).await
    }

    /// 当前开放的游戏 (玩家)
    pub async fn list_open_games(&self) -> AppResult<Vec<GameResponse>> {
        let now = Utc::now();
        let list: Vec<games::Model> = games::Entity::find()
            .filter(games::Column::IsActive.eq(true))
            .order_by_asc(games::Column::Id)
            .all(&self.pool)
            .await?
            .into_iter()
            .filter(|g| g.is_open_at(now))
            .collect();
        self.with_outcomes(list).await
    }

    pub async fn get_game(&self, game_id: i64) -> AppResult<GameResponse> {
        let game = self.find_game(game_id).await?;
        let list = load_outcomes(&self.pool, game_id).await?;
        Ok(GameResponse::new(game, list))
    }

    /// 玩家视角: 不存在 -> GameNotFound，未开放 -> GameInactive
    pub async fn get_open_game(&self, game_id: i64) -> AppResult<GameResponse> {
        let (game, list) = self.playable_game(game_id, Utc::now()).await?;
        Ok(GameResponse::new(game, list))
    }

    pub async fn find_game(&self, game_id: i64) -> AppResult<games::Model> {
        games::Entity::find_by_id(game_id)
            .one(&self.pool)
            .await?
            .ok_or(AppError::GameNotFound(game_id))
    }

    /// 读取可玩的游戏及奖项。
    ///
    /// 未启用、不在时间窗口内、没有奖项或中奖优惠券已停用都视为 GameInactive。
    pub async fn playable_game(
        &self,
        game_id: i64,
        now: DateTime<Utc>,
    ) -> AppResult<(games::Model, Vec<outcomes::Model>)> {
        let game = self.find_game(game_id).await?;
        if !game.is_open_at(now) {
            return Err(AppError::GameInactive(game_id));
        }

        let list = load_outcomes(&self.pool, game_id).await?;
        if list.is_empty() {
            log::warn!("Game {game_id} has no outcomes configured");
            return Err(AppError::GameInactive(game_id));
        }

        let coupon_ids: HashSet<i64> = list.iter().filter_map(|o| o.coupon_id).collect();
        if !coupon_ids.is_empty() {
            let active = coupons::Entity::find()
                .filter(coupons::Column::Id.is_in(coupon_ids.iter().copied()))
                .filter(coupons::Column::IsActive.eq(true))
                .all(&self.pool)
                .await?;
            if active.len() != coupon_ids.len() {
                log::warn!("Game {game_id} references missing or inactive coupons");
                return Err(AppError::GameInactive(game_id));
            }
        }

        Ok((game, list))
    }

    /// 整体替换奖项列表
    pub async fn replace_outcomes(
        &self,
        game_id: i64,
        req: ReplaceOutcomesRequest,
    ) -> AppResult<GameResponse> {
        validate_outcomes(&req.outcomes)?;

        let txn = self.pool.begin().await?;
        let game = games::Entity::find_by_id(game_id)
            .one(&txn)
            .await?
            .ok_or(AppError::GameNotFound(game_id))?;
        ensure_coupons_exist(&txn, &req.outcomes).await?;

        outcomes::Entity::delete_many()
            .filter(outcomes::Column::GameId.eq(game_id))
            .exec(&txn)
            .await?;
        let now = Utc::now();
        insert_outcomes(&txn, game_id, &req.outcomes, now).await?;

        let mut am = game.into_active_model();
        am.updated_at = Set(Some(now));
        let game = am.update(&txn).await?;

        let saved = load_outcomes(&txn, game_id).await?;
        txn.commit().await?;
        Ok(GameResponse::new(game, saved))
    }

    pub async fn set_active(&self, game_id: i64, is_active: bool) -> AppResult<GameResponse> {
        let game = self.find_game(game_id).await?;
        let mut am = game.into_active_model();
        am.is_active = Set(is_active);
        am.updated_at = Set(Some(Utc::now()));
        let game = am.update(&self.pool).await?;

        log::info!("Game {game_id} active={is_active}");
        let list = load_outcomes(&self.pool, game_id).await?;
        Ok(GameResponse::new(game, list))
    }

    async fn with_outcomes(&self, list: Vec<games::Model>) -> AppResult<Vec<GameResponse>> {
        let ids: Vec<i64> = list.iter().map(|g| g.id).collect();
        let mut grouped: HashMap<i64, Vec<outcomes::Model>> = HashMap::new();
        for o in outcomes::Entity::find()
            .filter(outcomes::Column::GameId.is_in(ids))
            .order_by_asc(outcomes::Column::GameId)
            .order_by_asc(outcomes::Column::Position)
            .all(&self.pool)
            .await?
        {
            grouped.entry(o.game_id).or_default().push(o);
        }

        Ok(list
            .into_iter()
            .map(|g| {
                let os = grouped.remove(&g.id).unwrap_or_default();
                GameResponse::new(g, os)
            })
            .collect())
    }
}

/// 按 position 顺序读取奖项
pub async fn load_outcomes<C: ConnectionTrait>(
    conn: &C,
    game_id: i64,
) -> AppResult<Vec<outcomes::Model>> {
    Ok(outcomes::Entity::find()
        .filter(outcomes::Column::GameId.eq(game_id))
        .order_by_asc(outcomes::Column::Position)
        .all(conn)
        .await?)
}

async fn insert_outcomes<C: ConnectionTrait>(
    conn: &C,
    game_id: i64,
    inputs: &[OutcomeInput],
    now: DateTime<Utc>,
) -> AppResult<()> {
    let models = inputs
        .iter()
        .enumerate()
        .map(|(idx, o)| outcomes::ActiveModel {
            game_id: Set(game_id),
            position: Set(idx as i32),
            label: Set(o.label.trim().to_string()),
            kind: Set(o.kind),
            coupon_id: Set(o.coupon_id),
            weight: Set(o.weight),
            created_at: Set(Some(now)),
            ..Default::default()
        });
    outcomes::Entity::insert_many(models).exec(conn).await?;
    Ok(())
}

async fn ensure_coupons_exist<C: ConnectionTrait>(
    conn: &C,
    inputs: &[OutcomeInput],
) -> AppResult<()> {
    let wanted: HashSet<i64> = inputs.iter().filter_map(|o| o.coupon_id).collect();
    if wanted.is_empty() {
        return Ok(());
    }
    let found: HashSet<i64> = coupons::Entity::find()
        .filter(coupons::Column::Id.is_in(wanted.iter().copied()))
        .all(conn)
        .await?
        .into_iter()
        .map(|c| c.id)
        .collect();
    if let Some(missing) = wanted.difference(&found).next() {
        return Err(AppError::ValidationError(format!(
            "Coupon {missing} does not exist"
        )));
    }
    Ok(())
}

use crate::entities::{
    game_entity as games, game_play_counter_entity as counters, game_play_entity as plays,
};
use crate::error::{AppError, AppResult};
use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, Set,
};

/// 游戏限次校验
///
/// 次数以 game_plays 流水条数为准。放行一次游戏时通过
/// game_play_counters 上带条件的 UPDATE 原子占用一次次数，计数行会先
/// 抬升到不低于流水条数；必须与写入流水处于同一事务中。
#[derive(Clone)]
pub struct PlayLimitService {
    pool: DatabaseConnection,
}

impl PlayLimitService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 用户在该游戏上已产生的流水条数
    pub async fn plays_used(&self, user_id: i64, game_id: i64) -> AppResult<i64> {
        count_plays(&self.pool, user_id, game_id).await
    }

    /// 是否还能再玩: count(流水) < max_plays，无副作用
    pub async fn can_play(&self, user_id: i64, game_id: i64, max_plays: i32) -> AppResult<bool> {
        let used = self.plays_used(user_id, game_id).await?;
        Ok(used < i64::from(max_plays))
    }

    /// 在给定事务中占用一次游戏次数。
    ///
    /// 事务的第一条语句是写入 (确保计数行存在)，之后才读取流水。
    /// `enforce = false` 时不检查上限 (仅开发环境)，但仍然计数。
    pub async fn consume_play<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: i64,
        game: &games::Model,
        enforce: bool,
    ) -> AppResult<()> {
        let now = Utc::now();

        // 确保计数行存在 (并发插入时由唯一索引去重)
        counters::Entity::insert(counters::ActiveModel {
            user_id: Set(user_id),
            game_id: Set(game.id),
            plays_used: Set(0),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
            ..Default::default()
        })
        .on_conflict(
            OnConflict::columns([counters::Column::UserId, counters::Column::GameId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

        // 计数行不得低于流水条数 (导入或早于计数表的历史流水)
        let ledger = i32::try_from(count_plays(conn, user_id, game.id).await?)
            .map_err(|_| AppError::InternalError("Play count out of range".into()))?;
        let raised = counters::Entity::update_many()
            .col_expr(counters::Column::PlaysUsed, Expr::value(ledger))
            .col_expr(counters::Column::UpdatedAt, Expr::value(now))
            .filter(counters::Column::UserId.eq(user_id))
            .filter(counters::Column::GameId.eq(game.id))
            .filter(counters::Column::PlaysUsed.lt(ledger))
            .exec(conn)
            .await?;
        if raised.rows_affected > 0 {
            log::warn!(
                "Play counter behind ledger, raised to {ledger}: user={user_id} game={}",
                game.id
            );
        }

        let mut update = counters::Entity::update_many()
            .col_expr(
                counters::Column::PlaysUsed,
                Expr::col(counters::Column::PlaysUsed).add(1),
            )
            .col_expr(counters::Column::UpdatedAt, Expr::value(now))
            .filter(counters::Column::UserId.eq(user_id))
            .filter(counters::Column::GameId.eq(game.id));
        if enforce {
            update = update.filter(counters::Column::PlaysUsed.lt(game.max_plays));
        }

        let result = update.exec(conn).await?;
        if result.rows_affected == 0 {
            return Err(AppError::MaxPlaysReached);
        }
        Ok(())
    }
}

/// 统计 (user_id, game_id) 的流水条数
pub async fn count_plays<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
    game_id: i64,
) -> AppResult<i64> {
    let count = plays::Entity::find()
        .filter(plays::Column::UserId.eq(user_id))
        .filter(plays::Column::GameId.eq(game_id))
        .count(conn)
        .await?;
    Ok(count as i64)
}

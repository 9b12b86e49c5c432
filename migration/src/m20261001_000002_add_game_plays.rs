use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Games {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Coupons {
    Table,
    Id,
}

/// Game plays (抽奖流水, 只追加不修改)
#[derive(DeriveIden)]
enum GamePlays {
    Table,
    Id,
    UserId,
    GameId,
    GameKind,
    OutcomeId,
    OutcomeLabel,
    Won,
    CreatedAt,
}

/// Play counters (每个用户每个游戏一行, 用于原子限次)
#[derive(DeriveIden)]
enum GamePlayCounters {
    Table,
    Id,
    UserId,
    GameId,
    PlaysUsed,
    CreatedAt,
    UpdatedAt,
}

/// Issued rewards (已发放奖励, (user_id, coupon_id) 唯一)
#[derive(DeriveIden)]
enum IssuedRewards {
    Table,
    Id,
    UserId,
    CouponId,
    Source,
    IssuedAt,
    ExpiresAt,
    IsUsed,
    UsedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(GamePlays::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GamePlays::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GamePlays::UserId).big_integer().not_null())
                    .col(ColumnDef::new(GamePlays::GameId).big_integer().not_null())
                    .col(ColumnDef::new(GamePlays::GameKind).string_len(32).not_null())
                    .col(ColumnDef::new(GamePlays::OutcomeId).big_integer().not_null())
                    .col(
                        ColumnDef::new(GamePlays::OutcomeLabel)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GamePlays::Won)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(GamePlays::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_game_plays_game")
                            .from(GamePlays::Table, GamePlays::GameId)
                            .to(Games::Table, Games::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // 计数查询 (user_id, game_id)
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_game_plays_user_game")
                    .table(GamePlays::Table)
                    .col(GamePlays::UserId)
                    .col(GamePlays::GameId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GamePlayCounters::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GamePlayCounters::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(GamePlayCounters::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GamePlayCounters::GameId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GamePlayCounters::PlaysUsed)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(GamePlayCounters::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(GamePlayCounters::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_game_play_counters_user_game_unique")
                    .table(GamePlayCounters::Table)
                    .col(GamePlayCounters::UserId)
                    .col(GamePlayCounters::GameId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(IssuedRewards::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(IssuedRewards::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(IssuedRewards::UserId).big_integer().not_null())
                    .col(
                        ColumnDef::new(IssuedRewards::CouponId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(IssuedRewards::Source).string_len(64).not_null())
                    .col(
                        ColumnDef::new(IssuedRewards::IssuedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IssuedRewards::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IssuedRewards::IsUsed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(IssuedRewards::UsedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_issued_rewards_coupon")
                            .from(IssuedRewards::Table, IssuedRewards::CouponId)
                            .to(Coupons::Table, Coupons::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // 同一用户同一优惠券只发放一次
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_issued_rewards_user_coupon_unique")
                    .table(IssuedRewards::Table)
                    .col(IssuedRewards::UserId)
                    .col(IssuedRewards::CouponId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 删除顺序：奖励 -> 计数 -> 流水
        manager
            .drop_table(Table::drop().if_exists().table(IssuedRewards::Table).to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(GamePlayCounters::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(GamePlays::Table).to_owned())
            .await?;
        Ok(())
    }
}

use sea_orm_migration::prelude::*;

/// Coupons (可作为游戏奖励的优惠券)
#[derive(DeriveIden)]
enum Coupons {
    Table,
    Id,
    Code,
    DiscountType,
    DiscountValue,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

/// Games (小游戏配置: scratch / wheel / flip)
#[derive(DeriveIden)]
enum Games {
    Table,
    Id,
    Name,
    Kind,
    MaxPlays,
    IsActive,
    StartsAt,
    EndsAt,
    CreatedAt,
    UpdatedAt,
}

/// Game outcomes (奖项及概率, 按 position 排序)
#[derive(DeriveIden)]
enum GameOutcomes {
    Table,
    Id,
    GameId,
    Position,
    Label,
    Kind,
    CouponId,
    Weight,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

/// 概率使用百分点 (weight 0..=100), 同一游戏的 weight 之和 <= 100。
/// 落入空隙的抽取结果回落到 position 最小的奖项。
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Coupons::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Coupons::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Coupons::Code).string_len(64).not_null())
                    .col(
                        ColumnDef::new(Coupons::DiscountType)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Coupons::DiscountValue)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Coupons::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Coupons::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Coupons::UpdatedAt)
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
                    .name("idx_coupons_code_unique")
                    .table(Coupons::Table)
                    .col(Coupons::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Games::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Games::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Games::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Games::Kind).string_len(32).not_null())
                    .col(ColumnDef::new(Games::MaxPlays).integer().not_null())
                    .col(
                        ColumnDef::new(Games::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Games::StartsAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Games::EndsAt).timestamp_with_time_zone().null())
                    .col(
                        ColumnDef::new(Games::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Games::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GameOutcomes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GameOutcomes::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GameOutcomes::GameId).big_integer().not_null())
                    .col(ColumnDef::new(GameOutcomes::Position).integer().not_null())
                    .col(
                        ColumnDef::new(GameOutcomes::Label)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(GameOutcomes::Kind).string_len(16).not_null())
                    .col(ColumnDef::new(GameOutcomes::CouponId).big_integer().null())
                    .col(ColumnDef::new(GameOutcomes::Weight).integer().not_null())
                    .col(
                        ColumnDef::new(GameOutcomes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_game_outcomes_game")
                            .from(GameOutcomes::Table, GameOutcomes::GameId)
                            .to(Games::Table, Games::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_game_outcomes_coupon")
                            .from(GameOutcomes::Table, GameOutcomes::CouponId)
                            .to(Coupons::Table, Coupons::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_game_outcomes_game_position")
                    .table(GameOutcomes::Table)
                    .col(GameOutcomes::GameId)
                    .col(GameOutcomes::Position)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(GameOutcomes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Games::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Coupons::Table).to_owned())
            .await?;
        Ok(())
    }
}

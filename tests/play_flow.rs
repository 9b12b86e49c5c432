mod common;

use chrono::{Duration, Utc};
use common::{lose, setup, setup_concurrent, setup_with, win};
use futures_util::future::join_all;
use promo_games_backend::config::GamesConfig;
use promo_games_backend::entities::{
    DiscountType, GameKind, OutcomeKind, game_play_counter_entity as counters,
    game_play_entity as plays, issued_reward_entity as rewards,
};
use promo_games_backend::error::AppError;
use promo_games_backend::models::{
    CreateCouponRequest, CreateGameRequest, GameResponse, PlayRecordQuery, ReplaceOutcomesRequest,
    RewardQuery,
};
use promo_games_backend::services::{REWARD_VALIDITY_DAYS, RewardIssuance};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::rngs::mock::StepRng;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Set,
};

const USER: i64 = 42;

async fn play_rows(db: &sea_orm::DatabaseConnection, user_id: i64, game_id: i64) -> u64 {
    plays::Entity::find()
        .filter(plays::Column::UserId.eq(user_id))
        .filter(plays::Column::GameId.eq(game_id))
        .count(db)
        .await
        .unwrap()
}

/// 直接写入历史流水 (不经过计数行)
async fn seed_ledger(
    db: &sea_orm::DatabaseConnection,
    user_id: i64,
    game: &GameResponse,
    n: usize,
) {
    let outcome = &game.outcomes[0];
    for _ in 0..n {
        plays::ActiveModel {
            user_id: Set(user_id),
            game_id: Set(game.id),
            game_kind: Set(game.kind),
            outcome_id: Set(outcome.id),
            outcome_label: Set(outcome.label.clone()),
            won: Set(false),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap();
    }
}

async fn reward_rows(db: &sea_orm::DatabaseConnection, user_id: i64) -> u64 {
    rewards::Entity::find()
        .filter(rewards::Column::UserId.eq(user_id))
        .count(db)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_first_winning_play_issues_one_reward() {
    let app = setup().await;
    let coupon = app.coupon("SPRING10").await;
    let game = app.game(3, vec![win(coupon.id, 100)]).await;

    let mut rng = StdRng::seed_from_u64(7);
    let result = app.plays.play_with_rng(USER, game.id, &mut rng).await.unwrap();

    assert!(result.won);
    assert_eq!(result.outcome.kind, OutcomeKind::Win);
    assert_eq!(result.remaining_plays, 2);
    let reward = result.reward.expect("winning play carries a reward");
    assert_eq!(reward.code, "SPRING10");

    assert_eq!(play_rows(&app.db, USER, game.id).await, 1);
    let issued = rewards::Entity::find()
        .filter(rewards::Column::UserId.eq(USER))
        .all(&app.db)
        .await
        .unwrap();
    assert_eq!(issued.len(), 1);
    assert_eq!(issued[0].coupon_id, coupon.id);
    assert_eq!(issued[0].source, "scratch_game");
    assert_eq!(
        issued[0].expires_at - issued[0].issued_at,
        Duration::days(REWARD_VALIDITY_DAYS)
    );
    assert!(!issued[0].is_used);
}

#[tokio::test]
async fn test_thirty_seventy_game_low_draw_wins() {
    let app = setup().await;
    let coupon = app.coupon("THIRTY").await;
    let game = app.game(3, vec![win(coupon.id, 30), lose(70)]).await;

    // 恒为 0 的随机源 -> r = 0.0 -> 第一个奖项
    let mut rng = StepRng::new(0, 0);
    let result = app.plays.play_with_rng(USER, game.id, &mut rng).await.unwrap();

    assert!(result.won);
    assert_eq!(result.outcome.id, game.outcomes[0].id);
    let reward = result.reward.unwrap();
    let issued = rewards::Entity::find()
        .filter(rewards::Column::UserId.eq(USER))
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reward.expires_at, issued.expires_at);
    assert_eq!(
        issued.expires_at - issued.issued_at,
        Duration::days(REWARD_VALIDITY_DAYS)
    );
}

#[tokio::test]
async fn test_thirty_seventy_game_high_draw_loses() {
    let app = setup().await;
    let coupon = app.coupon("SEVENTY").await;
    let game = app.game(3, vec![win(coupon.id, 30), lose(70)]).await;

    // 恒为 u64::MAX -> r 接近 100 -> 落在第二个奖项
    let mut rng = StepRng::new(u64::MAX, 0);
    let result = app.plays.play_with_rng(USER, game.id, &mut rng).await.unwrap();

    assert!(!result.won);
    assert_eq!(result.outcome.id, game.outcomes[1].id);
    assert_eq!(play_rows(&app.db, USER, game.id).await, 1);
    assert_eq!(reward_rows(&app.db, USER).await, 0);
}

#[tokio::test]
async fn test_losing_play_issues_nothing() {
    let app = setup().await;
    let game = app.game(3, vec![lose(100)]).await;

    let mut rng = StdRng::seed_from_u64(1);
    let result = app.plays.play_with_rng(USER, game.id, &mut rng).await.unwrap();

    assert!(!result.won);
    assert!(result.reward.is_none());
    assert_eq!(result.outcome.label, "Try again");
    assert_eq!(play_rows(&app.db, USER, game.id).await, 1);
    assert_eq!(reward_rows(&app.db, USER).await, 0);
}

#[tokio::test]
async fn test_max_plays_reached_writes_nothing() {
    let app = setup().await;
    let game = app.game(3, vec![lose(100)]).await;
    let mut rng = StdRng::seed_from_u64(3);

    for expected_remaining in [2, 1, 0] {
        let result = app.plays.play_with_rng(USER, game.id, &mut rng).await.unwrap();
        assert_eq!(result.remaining_plays, expected_remaining);
    }

    let err = app
        .plays
        .play_with_rng(USER, game.id, &mut rng)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::MaxPlaysReached));
    assert_eq!(play_rows(&app.db, USER, game.id).await, 3);

    let status = app.plays.status(USER, game.id).await.unwrap();
    assert_eq!(status.plays_used, 3);
    assert_eq!(status.remaining_plays, 0);
    assert!(!status.can_play);
}

#[tokio::test]
async fn test_limits_are_per_user_and_per_game() {
    let app = setup().await;
    let first = app.game(1, vec![lose(100)]).await;
    let second = app.game(1, vec![lose(100)]).await;
    let mut rng = StdRng::seed_from_u64(5);

    app.plays.play_with_rng(USER, first.id, &mut rng).await.unwrap();
    assert!(app.plays.play_with_rng(USER, second.id, &mut rng).await.is_ok());
    assert!(app.plays.play_with_rng(USER + 1, first.id, &mut rng).await.is_ok());
    assert!(matches!(
        app.plays.play_with_rng(USER, first.id, &mut rng).await,
        Err(AppError::MaxPlaysReached)
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_plays_never_exceed_max() {
    let (_dir, app) = setup_concurrent(5).await;
    let coupon = app.coupon("RACE").await;
    let game = app.game(3, vec![win(coupon.id, 50), lose(50)]).await;

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let plays = app.plays.clone();
            let game_id = game.id;
            tokio::spawn(async move { plays.play(USER, game_id).await })
        })
        .collect();
    let results: Vec<_> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.expect("play task panicked"))
        .collect();

    let ok = results.iter().filter(|r| r.is_ok()).count();
    let limited = results
        .iter()
        .filter(|r| matches!(r, Err(AppError::MaxPlaysReached)))
        .count();
    let unexpected: Vec<String> = results
        .iter()
        .filter_map(|r| match r {
            Err(AppError::MaxPlaysReached) | Ok(_) => None,
            Err(e) => Some(e.to_string()),
        })
        .collect();
    assert!(unexpected.is_empty(), "unexpected errors: {unexpected:?}");
    assert_eq!(ok, 3);
    assert_eq!(limited, 7);
    assert_eq!(play_rows(&app.db, USER, game.id).await, 3);
    assert!(reward_rows(&app.db, USER).await <= 1);

    let counter = counters::Entity::find()
        .filter(counters::Column::UserId.eq(USER))
        .filter(counters::Column::GameId.eq(game.id))
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(counter.plays_used, 3);
}

#[tokio::test]
async fn test_prior_ledger_rows_count_against_limit() {
    let app = setup().await;
    let game = app.game(3, vec![lose(100)]).await;
    seed_ledger(&app.db, USER, &game, 3).await;

    let status = app.plays.status(USER, game.id).await.unwrap();
    assert_eq!(status.plays_used, 3);
    assert!(!status.can_play);

    let mut rng = StdRng::seed_from_u64(21);
    let err = app
        .plays
        .play_with_rng(USER, game.id, &mut rng)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::MaxPlaysReached));
    assert_eq!(play_rows(&app.db, USER, game.id).await, 3);
    assert_eq!(reward_rows(&app.db, USER).await, 0);
}

#[tokio::test]
async fn test_counter_behind_ledger_is_raised() {
    let app = setup().await;
    let game = app.game(3, vec![lose(100)]).await;
    let mut rng = StdRng::seed_from_u64(22);

    // 计数行已存在 (=1)，之后又补录了一条历史流水
    let first = app.plays.play_with_rng(USER, game.id, &mut rng).await.unwrap();
    assert_eq!(first.remaining_plays, 2);
    seed_ledger(&app.db, USER, &game, 1).await;

    let second = app.plays.play_with_rng(USER, game.id, &mut rng).await.unwrap();
    assert_eq!(second.remaining_plays, 0);
    let status = app.plays.status(USER, game.id).await.unwrap();
    assert_eq!(status.remaining_plays, second.remaining_plays);

    assert!(matches!(
        app.plays.play_with_rng(USER, game.id, &mut rng).await,
        Err(AppError::MaxPlaysReached)
    ));
    assert_eq!(play_rows(&app.db, USER, game.id).await, 3);
}

#[tokio::test]
async fn test_play_and_status_report_same_remaining() {
    let app = setup().await;
    let game = app.game(4, vec![lose(100)]).await;
    seed_ledger(&app.db, USER, &game, 1).await;

    let mut rng = StdRng::seed_from_u64(23);
    let result = app.plays.play_with_rng(USER, game.id, &mut rng).await.unwrap();
    let status = app.plays.status(USER, game.id).await.unwrap();
    assert_eq!(result.remaining_plays, 2);
    assert_eq!(status.remaining_plays, result.remaining_plays);
    assert_eq!(status.plays_used, 2);
}

#[tokio::test]
async fn test_issue_reward_is_idempotent() {
    let app = setup().await;
    let coupon = app.coupon("ONCE").await;
    let game = app.game(5, vec![win(coupon.id, 100)]).await;
    let (_, outcomes) = app.games.playable_game(game.id, Utc::now()).await.unwrap();
    let outcome = &outcomes[0];

    let first = app
        .rewards
        .issue_reward(&app.db, USER, outcome, "scratch_game")
        .await
        .unwrap();
    let second = app
        .rewards
        .issue_reward(&app.db, USER, outcome, "scratch_game")
        .await
        .unwrap();

    assert!(matches!(first, RewardIssuance::Issued(_)));
    assert!(matches!(second, RewardIssuance::AlreadyIssued(_)));
    assert_eq!(first.reward().map(|r| r.id), second.reward().map(|r| r.id));
    assert_eq!(reward_rows(&app.db, USER).await, 1);
}

#[tokio::test]
async fn test_winning_twice_keeps_single_reward() {
    let app = setup().await;
    let coupon = app.coupon("TWICE").await;
    let game = app.game(2, vec![win(coupon.id, 100)]).await;
    let mut rng = StdRng::seed_from_u64(11);

    let first = app.plays.play_with_rng(USER, game.id, &mut rng).await.unwrap();
    let second = app.plays.play_with_rng(USER, game.id, &mut rng).await.unwrap();

    assert!(first.won && second.won);
    assert_eq!(play_rows(&app.db, USER, game.id).await, 2);
    assert_eq!(reward_rows(&app.db, USER).await, 1);
    assert_eq!(
        first.reward.map(|r| r.expires_at),
        second.reward.map(|r| r.expires_at)
    );
}

#[tokio::test]
async fn test_gap_in_weights_falls_back_to_first_outcome() {
    let app = setup().await;
    let coupon = app.coupon("GAP").await;
    let game = app.game(50, vec![win(coupon.id, 10), lose(10)]).await;
    let mut rng = StdRng::seed_from_u64(99);

    let mut wins = 0;
    for _ in 0..50 {
        let result = app.plays.play_with_rng(USER, game.id, &mut rng).await.unwrap();
        if result.won {
            wins += 1;
        }
    }
    // 80% 落在空档，回退到第一个 (中奖) 奖项
    assert!(wins > 25, "wins = {wins}");
}

#[tokio::test]
async fn test_disabled_enforcement_still_records_plays() {
    let app = setup_with(GamesConfig {
        enforce_play_limit: false,
    })
    .await;
    let game = app.game(1, vec![lose(100)]).await;
    let mut rng = StdRng::seed_from_u64(2);

    for _ in 0..3 {
        app.plays.play_with_rng(USER, game.id, &mut rng).await.unwrap();
    }
    assert_eq!(play_rows(&app.db, USER, game.id).await, 3);

    let status = app.plays.status(USER, game.id).await.unwrap();
    assert_eq!(status.plays_used, 3);
    assert!(status.can_play);
}

#[tokio::test]
async fn test_missing_and_inactive_games_are_rejected() {
    let app = setup().await;
    let mut rng = StdRng::seed_from_u64(4);

    assert!(matches!(
        app.plays.play_with_rng(USER, 9999, &mut rng).await,
        Err(AppError::GameNotFound(9999))
    ));

    let game = app.game(3, vec![lose(100)]).await;
    app.games.set_active(game.id, false).await.unwrap();
    assert!(matches!(
        app.plays.play_with_rng(USER, game.id, &mut rng).await,
        Err(AppError::GameInactive(_))
    ));
    assert_eq!(play_rows(&app.db, USER, game.id).await, 0);
}

#[tokio::test]
async fn test_game_outside_window_is_inactive() {
    let app = setup().await;
    let now = Utc::now();
    let game = app
        .games
        .create_game(CreateGameRequest {
            name: "Last week's wheel".into(),
            kind: GameKind::Wheel,
            max_plays: 3,
            is_active: Some(true),
            starts_at: Some(now - Duration::days(14)),
            ends_at: Some(now - Duration::days(7)),
            outcomes: vec![lose(100)],
        })
        .await
        .unwrap();

    let mut rng = StdRng::seed_from_u64(6);
    assert!(matches!(
        app.plays.play_with_rng(USER, game.id, &mut rng).await,
        Err(AppError::GameInactive(_))
    ));
    assert!(app.games.list_open_games().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_inactive_coupon_closes_game() {
    let app = setup().await;
    let coupon = app
        .coupons
        .create_coupon(CreateCouponRequest {
            code: Some("PAUSED".into()),
            discount_type: DiscountType::FixedAmount,
            discount_value: 500,
            is_active: Some(false),
        })
        .await
        .unwrap();
    let game = app.game(3, vec![win(coupon.id, 50), lose(50)]).await;

    let mut rng = StdRng::seed_from_u64(8);
    assert!(matches!(
        app.plays.play_with_rng(USER, game.id, &mut rng).await,
        Err(AppError::GameInactive(_))
    ));
}

#[tokio::test]
async fn test_failed_persistence_rolls_back_the_play() {
    let app = setup().await;
    let coupon = app.coupon("BROKEN").await;
    let game = app.game(3, vec![win(coupon.id, 100)]).await;

    app.db
        .execute_unprepared("DROP TABLE issued_rewards")
        .await
        .unwrap();

    let mut rng = StdRng::seed_from_u64(10);
    let err = app
        .plays
        .play_with_rng(USER, game.id, &mut rng)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DatabaseError(_)));

    assert_eq!(play_rows(&app.db, USER, game.id).await, 0);
    let status = app.plays.status(USER, game.id).await.unwrap();
    assert_eq!(status.remaining_plays, 3);
    let counter = counters::Entity::find()
        .filter(counters::Column::UserId.eq(USER))
        .one(&app.db)
        .await
        .unwrap();
    assert!(counter.is_none());
}

#[tokio::test]
async fn test_replaced_outcomes_keep_history_labels() {
    let app = setup().await;
    let game = app.game(3, vec![lose(100)]).await;
    let mut rng = StdRng::seed_from_u64(12);
    app.plays.play_with_rng(USER, game.id, &mut rng).await.unwrap();

    let mut renamed = lose(100);
    renamed.label = "Better luck next time".into();
    let updated = app
        .games
        .replace_outcomes(
            game.id,
            ReplaceOutcomesRequest {
                outcomes: vec![renamed],
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.outcomes[0].label, "Better luck next time");

    app.plays.play_with_rng(USER, game.id, &mut rng).await.unwrap();

    let history = app
        .plays
        .list_plays(
            USER,
            game.id,
            &PlayRecordQuery {
                page: None,
                per_page: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(history.total, 2);
    let labels: Vec<&str> = history.data.iter().map(|p| p.outcome_label.as_str()).collect();
    assert!(labels.contains(&"Try again"));
    assert!(labels.contains(&"Better luck next time"));
}

#[tokio::test]
async fn test_list_rewards_for_user() {
    let app = setup().await;
    let coupon = app.coupon("MINE").await;
    let game = app.game(1, vec![win(coupon.id, 100)]).await;
    let mut rng = StdRng::seed_from_u64(13);
    app.plays.play_with_rng(USER, game.id, &mut rng).await.unwrap();

    let page = app
        .rewards
        .list_rewards(
            USER,
            &RewardQuery {
                page: Some(1),
                per_page: Some(10),
            },
        )
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.data[0].code, "MINE");
    assert!(!page.data[0].is_expired);

    let empty = app
        .rewards
        .list_rewards(
            USER + 1,
            &RewardQuery {
                page: None,
                per_page: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(empty.total, 0);
}

#[tokio::test]
async fn test_invalid_game_config_is_rejected() {
    let app = setup().await;
    let coupon = app.coupon("OVER").await;
    let err = app
        .games
        .create_game(CreateGameRequest {
            name: "Overweight".into(),
            kind: GameKind::Flip,
            max_plays: 1,
            is_active: None,
            starts_at: None,
            ends_at: None,
            outcomes: vec![win(coupon.id, 60), lose(50)],
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    let err = app
        .games
        .create_game(CreateGameRequest {
            name: "Dangling coupon".into(),
            kind: GameKind::Flip,
            max_plays: 1,
            is_active: None,
            starts_at: None,
            ends_at: None,
            outcomes: vec![win(coupon.id + 100, 100)],
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
}

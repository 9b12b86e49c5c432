#![allow(dead_code)]

use migration::{Migrator, MigratorTrait};
use promo_games_backend::config::GamesConfig;
use promo_games_backend::entities::{DiscountType, GameKind, OutcomeKind};
use promo_games_backend::models::{
    CouponResponse, CreateCouponRequest, CreateGameRequest, GameResponse, OutcomeInput,
};
use promo_games_backend::services::{CouponService, GameService, PlayService, RewardService};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tempfile::TempDir;

pub struct TestApp {
    pub db: DatabaseConnection,
    pub games: GameService,
    pub rewards: RewardService,
    pub coupons: CouponService,
    pub plays: PlayService,
}

/// 内存 SQLite，单连接 (每个连接各自是一个独立库)
pub async fn setup_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:".to_string());
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opts).await.expect("connect sqlite");
    Migrator::up(&db, None).await.expect("run migrations");
    db
}

/// 临时文件 SQLite，多连接 (事务真正并发，写锁冲突靠 sqlx 默认 busy timeout 等待)
pub async fn setup_file_db(max_connections: u32) -> (TempDir, DatabaseConnection) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("games.db").display());
    let mut opts = ConnectOptions::new(url);
    opts.max_connections(max_connections)
        .min_connections(max_connections)
        .sqlx_logging(false);
    let db = Database::connect(opts).await.expect("connect sqlite file");
    Migrator::up(&db, None).await.expect("run migrations");
    (dir, db)
}

pub async fn setup() -> TestApp {
    setup_with(GamesConfig::default()).await
}

pub async fn setup_with(settings: GamesConfig) -> TestApp {
    app_with_db(setup_db().await, settings)
}

/// 多连接版本；返回的 TempDir 需在测试期间保持存活
pub async fn setup_concurrent(max_connections: u32) -> (TempDir, TestApp) {
    let (dir, db) = setup_file_db(max_connections).await;
    (dir, app_with_db(db, GamesConfig::default()))
}

fn app_with_db(db: DatabaseConnection, settings: GamesConfig) -> TestApp {
    let games = GameService::new(db.clone());
    let rewards = RewardService::new(db.clone());
    let coupons = CouponService::new(db.clone());
    let plays = PlayService::new(db.clone(), games.clone(), rewards.clone(), settings);
    TestApp {
        db,
        games,
        rewards,
        coupons,
        plays,
    }
}

pub fn win(coupon_id: i64, weight: i32) -> OutcomeInput {
    OutcomeInput {
        label: "10% off".into(),
        kind: OutcomeKind::Win,
        coupon_id: Some(coupon_id),
        weight,
    }
}

pub fn lose(weight: i32) -> OutcomeInput {
    OutcomeInput {
        label: "Try again".into(),
        kind: OutcomeKind::Lose,
        coupon_id: None,
        weight,
    }
}

impl TestApp {
    pub async fn coupon(&self, code: &str) -> CouponResponse {
        self.coupons
            .create_coupon(CreateCouponRequest {
                code: Some(code.into()),
                discount_type: DiscountType::Percentage,
                discount_value: 10,
                is_active: Some(true),
            })
            .await
            .expect("create coupon")
    }

    pub async fn game(&self, max_plays: i32, outcomes: Vec<OutcomeInput>) -> GameResponse {
        self.games
            .create_game(CreateGameRequest {
                name: "Spring scratch".into(),
                kind: GameKind::Scratch,
                max_plays,
                is_active: Some(true),
                starts_at: None,
                ends_at: None,
                outcomes,
            })
            .await
            .expect("create game")
    }
}

pub mod admin;
pub mod game;
pub mod reward;

pub use admin::admin_config;
pub use game::game_config;
pub use reward::reward_config;

use actix_web::{HttpResponse, web};

/// 健康检查
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(crate::models::ApiResponse::success("ok"))
}

pub fn health_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health));
}

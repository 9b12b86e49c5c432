use crate::middlewares::require_admin;
use crate::models::*;
use crate::services::{CouponService, GameService};
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    post,
    path = "/admin/coupons",
    tag = "admin",
    request_body = CreateCouponRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "创建优惠券成功", body = CouponResponse),
        (status = 400, description = "参数错误"),
        (status = 403, description = "非管理员")
    )
)]
pub async fn create_coupon(
    service: web::Data<CouponService>,
    req: HttpRequest,
    body: web::Json<CreateCouponRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req) {
        return Ok(e.error_response());
    }
    match service.create_coupon(body.into_inner()).await {
        Ok(coupon) => Ok(HttpResponse::Created().json(ApiResponse::success(coupon))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/coupons",
    tag = "admin",
    params(
        ("page" = Option<u32>, Query, description = "页码 (默认1)"),
        ("per_page" = Option<u32>, Query, description = "每页数量 (默认20)")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取优惠券成功", body = CouponPageResponse),
        (status = 403, description = "非管理员")
    )
)]
pub async fn list_coupons(
    service: web::Data<CouponService>,
    req: HttpRequest,
    query: web::Query<CouponQuery>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req) {
        return Ok(e.error_response());
    }
    match service.list_coupons(&query.into_inner()).await {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/coupons/{id}/status",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "优惠券ID")
    ),
    request_body = UpdateCouponStatusRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "状态已更新", body = CouponResponse),
        (status = 404, description = "优惠券不存在")
    )
)]
/// 停用后，中奖奖项引用该优惠券的游戏对玩家不可玩
pub async fn update_coupon_status(
    service: web::Data<CouponService>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<UpdateCouponStatusRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req) {
        return Ok(e.error_response());
    }
    match service
        .set_active(path.into_inner(), body.into_inner().is_active)
        .await
    {
        Ok(coupon) => Ok(HttpResponse::Ok().json(ApiResponse::success(coupon))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/games",
    tag = "admin",
    request_body = CreateGameRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "创建游戏成功", body = GameResponse),
        (status = 400, description = "配置错误 (概率之和超过100等)"),
        (status = 403, description = "非管理员")
    )
)]
/// 创建游戏及奖项
pub async fn create_game(
    service: web::Data<GameService>,
    req: HttpRequest,
    body: web::Json<CreateGameRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req) {
        return Ok(e.error_response());
    }
    match service.create_game(body.into_inner()).await {
        Ok(game) => Ok(HttpResponse::Created().json(ApiResponse::success(game))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/games",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取全部游戏成功", body = [GameResponse]),
        (status = 403, description = "非管理员")
    )
)]
pub async fn list_games(
    service: web::Data<GameService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req) {
        return Ok(e.error_response());
    }
    match service.list_games().await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/games/{id}",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "游戏ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取游戏成功", body = GameResponse),
        (status = 404, description = "游戏不存在")
    )
)]
pub async fn get_game(
    service: web::Data<GameService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req) {
        return Ok(e.error_response());
    }
    match service.get_game(path.into_inner()).await {
        Ok(game) => Ok(HttpResponse::Ok().json(ApiResponse::success(game))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/games/{id}/outcomes",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "游戏ID")
    ),
    request_body = ReplaceOutcomesRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "奖项已替换", body = GameResponse),
        (status = 400, description = "配置错误"),
        (status = 404, description = "游戏不存在")
    )
)]
/// 整体替换奖项列表（历史流水保留奖项文案快照）
pub async fn replace_outcomes(
    service: web::Data<GameService>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<ReplaceOutcomesRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req) {
        return Ok(e.error_response());
    }
    match service
        .replace_outcomes(path.into_inner(), body.into_inner())
        .await
    {
        Ok(game) => Ok(HttpResponse::Ok().json(ApiResponse::success(game))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/games/{id}/status",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "游戏ID")
    ),
    request_body = UpdateGameStatusRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "状态已更新", body = GameResponse),
        (status = 404, description = "游戏不存在")
    )
)]
pub async fn update_game_status(
    service: web::Data<GameService>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<UpdateGameStatusRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req) {
        return Ok(e.error_response());
    }
    match service
        .set_active(path.into_inner(), body.into_inner().is_active)
        .await
    {
        Ok(game) => Ok(HttpResponse::Ok().json(ApiResponse::success(game))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/coupons", web::post().to(create_coupon))
            .route("/coupons", web::get().to(list_coupons))
            .route("/coupons/{id}/status", web::put().to(update_coupon_status))
            .route("/games", web::post().to(create_game))
            .route("/games", web::get().to(list_games))
            .route("/games/{id}", web::get().to(get_game))
            .route("/games/{id}/outcomes", web::put().to(replace_outcomes))
            .route("/games/{id}/status", web::put().to(update_game_status)),
    );
}

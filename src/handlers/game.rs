use crate::middlewares::current_user;
use crate::models::*;
use crate::services::{GameService, PlayService};
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    get,
    path = "/games",
    tag = "games",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取开放中的游戏成功", body = [GameResponse]),
        (status = 401, description = "未授权")
    )
)]
/// 获取当前开放的游戏及奖项配置
pub async fn list_games(service: web::Data<GameService>) -> Result<HttpResponse> {
    match service.list_open_games().await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/games/{id}",
    tag = "games",
    params(
        ("id" = i64, Path, description = "游戏ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取游戏成功", body = GameResponse),
        (status = 404, description = "游戏不存在"),
        (status = 409, description = "游戏未开放")
    )
)]
pub async fn get_game(
    service: web::Data<GameService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match service.get_open_game(path.into_inner()).await {
        Ok(game) => Ok(HttpResponse::Ok().json(ApiResponse::success(game))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/games/{id}/status",
    tag = "games",
    params(
        ("id" = i64, Path, description = "游戏ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取次数状态成功", body = PlayStatusResponse),
        (status = 404, description = "游戏不存在")
    )
)]
/// 当前用户已用 / 剩余次数
pub async fn get_status(
    service: web::Data<PlayService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(u) => u,
        Err(e) => return Ok(e.error_response()),
    };
    match service.status(user.id, path.into_inner()).await {
        Ok(status) => Ok(HttpResponse::Ok().json(ApiResponse::success(status))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/games/{id}/play",
    tag = "games",
    params(
        ("id" = i64, Path, description = "游戏ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "游戏完成", body = PlayResponse),
        (status = 404, description = "游戏不存在"),
        (status = 409, description = "次数已用完或游戏未开放"),
        (status = 500, description = "保存失败，本次不计")
    )
)]
/// 玩一次游戏:
/// 1. 服务端校验次数 (唯一依据)
/// 2. 按概率抽取奖项
/// 3. 记录流水，中奖发放优惠券
pub async fn play(
    service: web::Data<PlayService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(u) => u,
        Err(e) => return Ok(e.error_response()),
    };
    match service.play(user.id, path.into_inner()).await {
        Ok(result) => Ok(HttpResponse::Ok().json(ApiResponse::success(result))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/games/{id}/plays",
    tag = "games",
    params(
        ("id" = i64, Path, description = "游戏ID"),
        ("page" = Option<u32>, Query, description = "页码 (默认1)"),
        ("per_page" = Option<u32>, Query, description = "每页数量 (默认20)")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取游戏记录成功", body = PlayRecordPageResponse),
        (status = 401, description = "未授权")
    )
)]
/// 分页获取当前用户的游戏记录（倒序）
pub async fn get_plays(
    service: web::Data<PlayService>,
    req: HttpRequest,
    path: web::Path<i64>,
    query: web::Query<PlayRecordQuery>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(u) => u,
        Err(e) => return Ok(e.error_response()),
    };
    match service
        .list_plays(user.id, path.into_inner(), &query.into_inner())
        .await
    {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(page))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 路由配置
pub fn game_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/games")
            .route("", web::get().to(list_games))
            .route("/{id}", web::get().to(get_game))
            .route("/{id}/status", web::get().to(get_status))
            .route("/{id}/play", web::post().to(play))
            .route("/{id}/plays", web::get().to(get_plays)),
    );
}

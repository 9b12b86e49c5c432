use crate::middlewares::current_user;
use crate::models::*;
use crate::services::RewardService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    get,
    path = "/rewards",
    tag = "rewards",
    params(
        ("page" = Option<u32>, Query, description = "页码 (默认1)"),
        ("per_page" = Option<u32>, Query, description = "每页数量 (默认20)")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取奖励成功", body = IssuedRewardPageResponse),
        (status = 401, description = "未授权")
    )
)]
/// 分页获取当前用户赢得的优惠券（按发放时间倒序）
pub async fn get_rewards(
    service: web::Data<RewardService>,
    req: HttpRequest,
    query: web::Query<RewardQuery>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(u) => u,
        Err(e) => return Ok(e.error_response()),
    };
    match service.list_rewards(user.id, &query.into_inner()).await {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(page))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn reward_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/rewards", web::get().to(get_rewards));
}

use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{DiscountType, GameKind, OutcomeKind};
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::game::list_games,
        handlers::game::get_game,
        handlers::game::get_status,
        handlers::game::play,
        handlers::game::get_plays,
        handlers::reward::get_rewards,
        handlers::admin::create_coupon,
        handlers::admin::list_coupons,
        handlers::admin::update_coupon_status,
        handlers::admin::create_game,
        handlers::admin::list_games,
        handlers::admin::get_game,
        handlers::admin::replace_outcomes,
        handlers::admin::update_game_status,
    ),
    components(
        schemas(
            GameKind,
            OutcomeKind,
            DiscountType,
            GameResponse,
            OutcomeResponse,
            OutcomeInput,
            CreateGameRequest,
            ReplaceOutcomesRequest,
            UpdateGameStatusRequest,
            PlayStatusResponse,
            PlayResponse,
            PlayedOutcome,
            RewardSummary,
            PlayRecordResponse,
            PlayRecordPageResponse,
            IssuedRewardResponse,
            IssuedRewardPageResponse,
            CouponResponse,
            CouponPageResponse,
            CreateCouponRequest,
            UpdateCouponStatusRequest,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "games", description = "Mini-game play API"),
        (name = "rewards", description = "Issued reward API"),
        (name = "admin", description = "Game and coupon administration API"),
    ),
    info(
        title = "Promo Games API",
        version = "1.0.0",
        description = "Reward draw and play-limit REST API documentation",
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}

use crate::entities::coupon_entity as coupons;
use crate::error::{AppError, AppResult};
use crate::models::{
    CouponPageResponse, CouponQuery, CouponResponse, CreateCouponRequest, PaginatedResponse,
    PaginationParams,
};
use crate::utils::generate_coupon_code;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

const GENERATED_CODE_PREFIX: &str = "GAME";

#[derive(Clone)]
pub struct CouponService {
    pool: DatabaseConnection,
}

impl CouponService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 创建优惠券；未指定 code 时随机生成且保证唯一
    pub async fn create_coupon(&self, req: CreateCouponRequest) -> AppResult<CouponResponse> {
        req.validate()?;

        let code = match req.code.as_deref() {
            Some(code) => {
                let code = code.trim().to_ascii_uppercase();
                if self.code_exists(&code).await? {
                    return Err(AppError::ValidationError(format!(
                        "Coupon code {code} already exists"
                    )));
                }
                code
            }
            None => self.unique_generated_code().await?,
        };

        let now = Utc::now();
        let model = coupons::ActiveModel {
            code: Set(code),
            discount_type: Set(req.discount_type),
            discount_value: Set(req.discount_value),
            is_active: Set(req.is_active.unwrap_or(true)),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        Ok(model.into())
    }

    pub async fn list_coupons(
        &self,
        query: &CouponQuery,
    ) -> AppResult<CouponPageResponse> {
        let params = PaginationParams::new(query.page, query.per_page);
        let total = coupons::Entity::find().count(&self.pool).await? as i64;
        let items = coupons::Entity::find()
            .order_by_desc(coupons::Column::Id)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(&self.pool)
            .await?;

        Ok(PaginatedResponse::new(
            items.into_iter().map(Into::into).collect(),
            params.get_page(),
            params.get_page_size(),
            total,
        ))
    }

    pub async fn set_active(&self, coupon_id: i64, is_active: bool) -> AppResult<CouponResponse> {
        let coupon = coupons::Entity::find_by_id(coupon_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Coupon {coupon_id} not found")))?;
        let mut am = coupon.into_active_model();
        am.is_active = Set(is_active);
        am.updated_at = Set(Some(Utc::now()));
        let coupon = am.update(&self.pool).await?;

        log::info!("Coupon {coupon_id} active={is_active}");
        Ok(coupon.into())
    }

    async fn code_exists(&self, code: &str) -> AppResult<bool> {
        let found = coupons::Entity::find()
            .filter(coupons::Column::Code.eq(code))
            .count(&self.pool)
            .await?;
        Ok(found > 0)
    }

    async fn unique_generated_code(&self) -> AppResult<String> {
        for _ in 0..5 {
            let code = generate_coupon_code(GENERATED_CODE_PREFIX);
            if !self.code_exists(&code).await? {
                return Ok(code);
            }
        }
        Err(AppError::InternalError(
            "Failed to generate a unique coupon code".into(),
        ))
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{DiscountType, coupon_entity};
use crate::error::{AppError, AppResult};

/// 创建优惠券请求 (管理员)
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CreateCouponRequest {
    /// 优惠码，不传则自动生成
    pub code: Option<String>,
    pub discount_type: DiscountType,
    /// 百分比 (1..=100) 或金额 (美分, > 0)
    pub discount_value: i64,
    pub is_active: Option<bool>,
}

impl CreateCouponRequest {
    pub fn validate(&self) -> AppResult<()> {
        if let Some(code) = &self.code {
            let code = code.trim();
            if code.is_empty() || code.len() > 64 {
                return Err(AppError::ValidationError(
                    "Coupon code must be 1 to 64 characters".into(),
                ));
            }
        }
        match self.discount_type {
            DiscountType::Percentage if !(1..=100).contains(&self.discount_value) => Err(
                AppError::ValidationError("Percentage discount must be between 1 and 100".into()),
            ),
            DiscountType::FixedAmount if self.discount_value <= 0 => Err(
                AppError::ValidationError("Fixed discount amount must be positive".into()),
            ),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CouponResponse {
    pub id: i64,
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<coupon_entity::Model> for CouponResponse {
    fn from(m: coupon_entity::Model) -> Self {
        CouponResponse {
            id: m.id,
            code: m.code,
            discount_type: m.discount_type,
            discount_value: m.discount_value,
            is_active: m.is_active,
            created_at: m.created_at.unwrap_or_else(Utc::now),
        }
    }
}

/// 启用 / 停用优惠券。停用后引用它的游戏对玩家不可玩
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct UpdateCouponStatusRequest {
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CouponQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(discount_type: DiscountType, discount_value: i64) -> CreateCouponRequest {
        CreateCouponRequest {
            code: None,
            discount_type,
            discount_value,
            is_active: None,
        }
    }

    #[test]
    fn test_percentage_bounds() {
        assert!(req(DiscountType::Percentage, 15).validate().is_ok());
        assert!(req(DiscountType::Percentage, 0).validate().is_err());
        assert!(req(DiscountType::Percentage, 101).validate().is_err());
    }

    #[test]
    fn test_fixed_amount_must_be_positive() {
        assert!(req(DiscountType::FixedAmount, 500).validate().is_ok());
        assert!(req(DiscountType::FixedAmount, 0).validate().is_err());
    }

    #[test]
    fn test_blank_code_rejected() {
        let mut r = req(DiscountType::FixedAmount, 500);
        r.code = Some("  ".into());
        assert!(r.validate().is_err());
    }
}

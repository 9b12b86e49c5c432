pub mod code_generator;
pub mod jwt;
pub mod outcome_selector;

pub use code_generator::generate_coupon_code;
pub use jwt::*;
pub use outcome_selector::{Weighted, draw, draw_index, validate_weights};

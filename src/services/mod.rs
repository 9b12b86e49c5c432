pub mod coupon_service;
pub mod game_service;
pub mod play_limit_service;
pub mod play_service;
pub mod reward_service;

pub use coupon_service::*;
pub use game_service::*;
pub use play_limit_service::*;
pub use play_service::*;
pub use reward_service::*;

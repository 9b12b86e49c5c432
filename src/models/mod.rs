pub mod common;
pub mod coupon;
pub mod game;
pub mod pagination;
pub mod play;
pub mod reward;

pub use common::*;
pub use coupon::*;
pub use game::*;
pub use pagination::*;
pub use play::*;
pub use reward::*;

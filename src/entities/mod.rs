pub mod coupons;
pub mod game_outcomes;
pub mod game_play_counters;
pub mod game_plays;
pub mod games;
pub mod issued_rewards;

pub use coupons as coupon_entity;
pub use game_outcomes as game_outcome_entity;
pub use game_play_counters as game_play_counter_entity;
pub use game_plays as game_play_entity;
pub use games as game_entity;
pub use issued_rewards as issued_reward_entity;

pub use coupons::DiscountType;
pub use game_outcomes::OutcomeKind;
pub use games::GameKind;

//! 加权奖项抽取
//!
//! 权重以百分点表示 (0..=100)，同一游戏的权重之和不超过 100。
//! 抽取时在 [0, 100) 内均匀取 r，按列表顺序累加权重，返回第一个
//! 累计权重 >= r 的奖项；若 r 落在权重之和与 100 之间的空隙，
//! 则回落到第一个奖项。

use rand::Rng;

/// 权重刻度: 100 个百分点
pub const WEIGHT_SCALE: i32 = 100;

/// 可参与抽取的奖项
pub trait Weighted {
    /// 百分点权重
    fn weight(&self) -> i32;
}

impl Weighted for crate::entities::game_outcome_entity::Model {
    fn weight(&self) -> i32 {
        self.weight
    }
}

impl<T> Weighted for (i32, T) {
    fn weight(&self) -> i32 {
        self.0
    }
}

/// 返回被抽中奖项的下标；空列表返回 None
pub fn draw_index<T: Weighted, R: Rng + ?Sized>(outcomes: &[T], rng: &mut R) -> Option<usize> {
    if outcomes.is_empty() {
        return None;
    }

    let r: f64 = rng.gen_range(0.0..f64::from(WEIGHT_SCALE));
    let mut acc = 0.0;
    for (idx, outcome) in outcomes.iter().enumerate() {
        acc += f64::from(outcome.weight().max(0));
        if acc >= r {
            return Some(idx);
        }
    }

    // 落入空隙 -> 第一个奖项
    Some(0)
}

/// 抽取一个奖项
pub fn draw<'a, T: Weighted, R: Rng + ?Sized>(outcomes: &'a [T], rng: &mut R) -> Option<&'a T> {
    draw_index(outcomes, rng).and_then(|idx| outcomes.get(idx))
}

/// 校验权重: 每项 0..=100 且总和 <= 100；返回总和
pub fn validate_weights<T: Weighted>(outcomes: &[T]) -> Result<i32, String> {
    let mut total = 0i32;
    for (idx, outcome) in outcomes.iter().enumerate() {
        let w = outcome.weight();
        if !(0..=WEIGHT_SCALE).contains(&w) {
            return Err(format!(
                "Outcome #{idx} has weight {w}, expected 0..={WEIGHT_SCALE}"
            ));
        }
        total += w;
    }
    if total > WEIGHT_SCALE {
        return Err(format!(
            "Outcome weights sum to {total}, must not exceed {WEIGHT_SCALE}"
        ));
    }
    Ok(total)
}

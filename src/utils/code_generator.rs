use rand::Rng;

/// 优惠码字符集 (去掉易混淆的 0/O/1/I)
const COUPON_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// 生成优惠码，格式: `{PREFIX}-XXXXXXXX`
pub fn generate_coupon_code(prefix: &str) -> String {
    let mut rng = rand::thread_rng();
    let body: String = (0..8)
        .map(|_| COUPON_ALPHABET[rng.gen_range(0..COUPON_ALPHABET.len())] as char)
        .collect();
    format!("{}-{body}", prefix.to_ascii_uppercase())
}

use rand::Rng;

/// 兑换码字符集：去掉了 0/O、1/I/L 等易混字符，方便口头报码
const CODE_CHARSET: &[u8] = b"23456789ABCDEFGHJKMNPQRSTUVWXYZ";

/// 生成人可读的兑换短码（大写字母数字混合）
pub fn generate_redeem_code(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| CODE_CHARSET[rng.gen_range(0..CODE_CHARSET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_redeem_code_length() {
        assert_eq!(generate_redeem_code(6).len(), 6);
        assert_eq!(generate_redeem_code(8).len(), 8);
        assert_eq!(generate_redeem_code(0).len(), 0);
    }

    #[test]
    fn test_generate_redeem_code_charset() {
        let code = generate_redeem_code(64);
        assert!(
            code.bytes().all(|b| CODE_CHARSET.contains(&b)),
            "unexpected char in {code}"
        );
        // 不应出现易混字符
        assert!(!code.contains('0'));
        assert!(!code.contains('O'));
        assert!(!code.contains('1'));
        assert!(!code.contains('I'));
    }
}

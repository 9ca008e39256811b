//! 通用工具函数

/// 大小写不敏感的子串匹配，空查询匹配所有内容
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// 去除首尾空白后判断字段是否为空
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("Migraine", "GRAIN"));
        assert!(contains_ignore_case("Migraine", ""));
        assert!(!contains_ignore_case("Migraine", "flu"));
        assert!(contains_ignore_case("Ünal", "ün"));
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank("   "));
        assert!(is_blank(""));
        assert!(!is_blank(" a "));
    }
}

use crate::language::{detect_language, Language, LanguagePolicy};

#[test]
fn test_pure_chinese_text() {
    assert_eq!(detect_language("你好世界"), Language::Zh);
}

#[test]
fn test_pure_english_text() {
    assert_eq!(detect_language("Hello world"), Language::En);
}

#[test]
fn test_empty_text_is_english() {
    assert_eq!(detect_language(""), Language::En);
}

#[test]
fn test_threshold_is_exclusive() {
    // 3 иероглифа из 10 символов, ровно 30%
    assert_eq!(detect_language("你好吗abcdefg"), Language::En);
    // 4 из 10 уже больше порога
    assert_eq!(detect_language("你好吗呢abcdef"), Language::Zh);
}

#[test]
fn test_characters_outside_unified_range_do_not_count() {
    // Японская кана и китайская пунктуация не входят в U+4E00..U+9FFF
    assert_eq!(detect_language("こんにちは。"), Language::En);
}

#[test]
fn test_fixed_policy_ignores_text() {
    let policy = LanguagePolicy::Fixed(Language::Zh);
    assert_eq!(policy.apply("Hello world"), Language::Zh);
    assert_eq!(LanguagePolicy::Auto.apply("Hello world"), Language::En);
}

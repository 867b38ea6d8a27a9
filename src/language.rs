//! Определение языка текста
//!
//! Грубая эвристика по доле иероглифов CJK: это не полноценная идентификация
//! языка, японский или корейский текст будет помечен как `en` или `zh`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Тег языка, передаваемый движку синтеза
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Zh,
    En,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Zh => "zh",
            Self::En => "en",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Политика выбора языка
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LanguagePolicy {
    /// Определять по тексту
    #[default]
    Auto,
    /// Всегда использовать указанный язык
    Fixed(Language),
}

impl LanguagePolicy {
    pub fn apply(&self, text: &str) -> Language {
        match self {
            Self::Auto => detect_language(text),
            Self::Fixed(language) => *language,
        }
    }
}

/// Диапазон CJK Unified Ideographs
fn is_cjk_ideograph(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

/// Определить язык: `zh`, если иероглифов строго больше 30%, иначе `en`
pub fn detect_language(text: &str) -> Language {
    let (total, cjk) = text.chars().fold((0usize, 0usize), |(total, cjk), c| {
        (total + 1, cjk + usize::from(is_cjk_ideograph(c)))
    });

    if total == 0 {
        return Language::En;
    }

    // cjk / total > 0.3 без погрешности плавающей точки
    if cjk * 10 > total * 3 {
        Language::Zh
    } else {
        Language::En
    }
}

//! Автоматическое распознавание референсного текста
//!
//! Распознавание работает по принципу best-effort: ошибка не прерывает
//! клонирование, а возвращается как `Transcription::Failed`.

use std::path::Path;

use crate::backend::Transcriber;

/// Текст-заглушка, который интерфейс показывает при неудачном распознавании
pub const RECOGNITION_FAILED: &str = "【识别失败】";

/// Результат распознавания
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transcription {
    /// Распознанный текст (пустой, если аудио не передано)
    Text(String),
    /// Распознавание не удалось
    Failed(String),
}

impl Transcription {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Failed(_) => None,
        }
    }

    /// Текст для поля ввода в интерфейсе
    pub fn display_text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Failed(_) => RECOGNITION_FAILED,
        }
    }
}

/// Распознать референсное аудио
pub async fn transcribe_reference<T>(transcriber: &T, audio_path: Option<&Path>) -> Transcription
where
    T: Transcriber + ?Sized,
{
    let Some(path) = audio_path else {
        return Transcription::Text(String::new());
    };

    match transcriber.transcribe(path).await {
        Ok(text) => {
            let text = text.trim().to_string();
            log::debug!("Recognized reference text: {}", text);
            Transcription::Text(text)
        }
        Err(e) => {
            log::warn!("Reference audio recognition failed for {}: {}", path.display(), e);
            Transcription::Failed(e.to_string())
        }
    }
}

//! Режимы синтеза
//!
//! Каждый режим определяет используемый чекпойнт и набор параметров генерации.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StudioError;

/// Режим синтеза
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Предустановленные голоса с эмоцией
    #[serde(rename = "Pro-Custom")]
    CustomVoice,
    /// Голос по текстовому описанию
    #[serde(rename = "Pro-Design")]
    VoiceDesign,
    /// Клонирование по референсному аудио
    #[serde(rename = "Pro-Clone")]
    Clone,
}

impl Default for Mode {
    fn default() -> Self {
        Self::CustomVoice
    }
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::CustomVoice, Mode::VoiceDesign, Mode::Clone];

    /// Ключ режима в реестре моделей
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CustomVoice => "Pro-Custom",
            Self::VoiceDesign => "Pro-Design",
            Self::Clone => "Pro-Clone",
        }
    }

    /// Подпись режима в интерфейсе
    pub fn label(&self) -> &'static str {
        match self {
            Self::CustomVoice => "官方角色",
            Self::VoiceDesign => "语音设计",
            Self::Clone => "零样本克隆",
        }
    }

    /// Режим по подписи из интерфейса
    pub fn from_label(label: &str) -> Result<Self, StudioError> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.label() == label)
            .ok_or_else(|| StudioError::UnknownMode(label.to_string()))
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pro-Custom" => Ok(Self::CustomVoice),
            "Pro-Design" => Ok(Self::VoiceDesign),
            "Pro-Clone" => Ok(Self::Clone),
            other => Err(StudioError::UnknownMode(other.to_string())),
        }
    }
}

//! Модуль конфигурации библиотеки qwen3-tts-studio
//!
//! Этот модуль содержит структуры для настройки путей к моделям, движка синтеза
//! и распознавания речи. Конфигурация читается из JSON и может быть частично
//! переопределена переменными окружения.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StudioError};
use crate::language::LanguagePolicy;
use crate::mode::Mode;

/// Переменная окружения для директории моделей
pub const MODELS_DIR_ENV: &str = "QWEN3_TTS_MODELS_DIR";

/// Имена папок чекпойнтов для каждого режима
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ModelFolders {
    pub custom_voice: String,
    pub voice_design: String,
    pub clone: String,
}

impl Default for ModelFolders {
    fn default() -> Self {
        Self {
            custom_voice: "Qwen3-TTS-12Hz-1.7B-CustomVoice-8bit".to_string(),
            voice_design: "Qwen3-TTS-12Hz-1.7B-VoiceDesign-8bit".to_string(),
            clone: "Qwen3-TTS-12Hz-1.7B-Base-8bit".to_string(),
        }
    }
}

impl ModelFolders {
    pub fn get(&self, mode: Mode) -> &str {
        match mode {
            Mode::CustomVoice => &self.custom_voice,
            Mode::VoiceDesign => &self.voice_design,
            Mode::Clone => &self.clone,
        }
    }
}

/// Настройки внешних Python-компонентов (mlx-audio, mlx-whisper)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PythonConfig {
    /// Путь к интерпретатору; если не задан, ищется `python3`, затем `python`
    pub interpreter: Option<PathBuf>,
    /// Время ожидания готовности воркера после запуска, секунды
    pub load_timeout_secs: u64,
    /// Идентификатор модели Whisper на HuggingFace
    pub whisper_model: String,
    /// Подсказка для распознавания (например, "以下是普通话。")
    pub whisper_prompt: Option<String>,
    /// Время ожидания распознавания, секунды
    pub transcription_timeout_secs: u64,
}

impl Default for PythonConfig {
    fn default() -> Self {
        Self {
            interpreter: None,
            load_timeout_secs: 300,
            whisper_model: "mlx-community/whisper-base-mlx".to_string(),
            whisper_prompt: None,
            transcription_timeout_secs: 600,
        }
    }
}

/// Конфигурация библиотеки
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Директория с чекпойнтами
    pub models_dir: PathBuf,
    /// Папки чекпойнтов по режимам
    pub model_folders: ModelFolders,
    /// Куда копировать готовые файлы (по умолчанию системная временная директория)
    pub output_dir: Option<PathBuf>,
    /// Где создавать временные директории запросов
    pub scratch_dir: Option<PathBuf>,
    /// Префикс имени итогового файла
    pub output_prefix: String,
    /// Имя файла, который создает движок синтеза
    pub artifact_name: String,
    /// Ограничение времени синтеза, секунды
    pub synthesis_timeout_secs: u64,
    /// Выбор тега языка
    pub language: LanguagePolicy,
    /// Голос по умолчанию для режима CustomVoice
    pub default_speaker: String,
    /// Настройки Python-компонентов
    pub python: PythonConfig,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            models_dir: PathBuf::from("models"),
            model_folders: ModelFolders::default(),
            output_dir: None,
            scratch_dir: None,
            output_prefix: "qwen3_pro".to_string(),
            artifact_name: "audio_000.wav".to_string(),
            synthesis_timeout_secs: 900,
            language: LanguagePolicy::default(),
            default_speaker: "vivian".to_string(),
            python: PythonConfig::default(),
        }
    }
}

impl StudioConfig {
    /// Загрузить конфигурацию из JSON-файла
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            StudioError::Configuration(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Применить переопределения из переменных окружения
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(dir) = std::env::var(MODELS_DIR_ENV) {
            if !dir.trim().is_empty() {
                log::debug!("Models directory overridden by {}: {}", MODELS_DIR_ENV, dir);
                self.models_dir = PathBuf::from(dir);
            }
        }
        self
    }

    /// Проверить корректность значений
    pub fn validate(&self) -> Result<()> {
        if self.artifact_name.trim().is_empty() {
            return Err(StudioError::Configuration("artifact_name must not be empty".to_string()));
        }
        if self.output_prefix.trim().is_empty() {
            return Err(StudioError::Configuration("output_prefix must not be empty".to_string()));
        }
        if self.synthesis_timeout_secs == 0 {
            return Err(StudioError::Configuration(
                "synthesis_timeout_secs must be greater than zero".to_string(),
            ));
        }
        for mode in Mode::ALL {
            if self.model_folders.get(mode).trim().is_empty() {
                return Err(StudioError::Configuration(format!(
                    "model folder for {} must not be empty",
                    mode
                )));
            }
        }
        Ok(())
    }

    /// Директория для итоговых файлов
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    pub fn synthesis_timeout(&self) -> Duration {
        Duration::from_secs(self.synthesis_timeout_secs)
    }

    /// Локальная директория модели Whisper: `models/mlx_whisper/<имя модели>`
    pub fn whisper_model_dir(&self) -> PathBuf {
        let name = self
            .python
            .whisper_model
            .rsplit('/')
            .next()
            .unwrap_or(&self.python.whisper_model);
        self.models_dir.join("mlx_whisper").join(name)
    }
}

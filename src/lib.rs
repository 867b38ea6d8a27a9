//! Основной файл библиотеки qwen3-tts-studio
//!
//! Библиотека управляет генерацией речи моделями Qwen3-TTS: лениво загружает
//! чекпойнт нужного режима (предустановленные голоса, дизайн голоса,
//! клонирование), держит в памяти не более одной модели, выдает
//! воспроизводимые seed и распознает референсное аудио для клонирования.
//!
//! Сам синтез и распознавание выполняют внешние движки (mlx-audio,
//! mlx-whisper), подключаемые через трейты [`SpeechBackend`] и [`Transcriber`].
//!
//! Запросы к одному [`TtsStudio`] выполняются последовательно.

pub mod backend;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod generation;
pub mod language;
pub mod logger;
pub mod mode;
pub mod progress;
pub mod registry;
pub mod seed;
pub mod transcription;
pub mod utils;

pub use backend::{MlxAudioBackend, SpeechBackend, SynthesisParams, Transcriber, WhisperTranscriber};
pub use config::StudioConfig;
pub use error::{BackendError, Result, StudioError};
pub use generation::{GenerationControl, GenerationRequest, GenerationResult, TtsStudio};
pub use language::{detect_language, Language, LanguagePolicy};
pub use mode::Mode;
pub use progress::ProgressUpdate;
pub use seed::SeedChoice;
pub use transcription::Transcription;

/// Оркестратор с движками mlx-audio и mlx-whisper
pub type MlxStudio = TtsStudio<MlxAudioBackend, WhisperTranscriber>;

impl MlxStudio {
    /// Создать оркестратор на базе mlx-audio и mlx-whisper
    pub fn with_mlx(config: StudioConfig) -> Result<Self> {
        let backend = MlxAudioBackend::new(&config.python).map_err(|e| StudioError::Configuration(e.to_string()))?;
        let transcriber = WhisperTranscriber::new(&config).map_err(|e| StudioError::Configuration(e.to_string()))?;
        TtsStudio::new(config, backend, transcriber)
    }
}

/// Публичный API для разовой генерации
pub async fn generate_speech(config: StudioConfig, request: GenerationRequest) -> Result<GenerationResult> {
    let studio = MlxStudio::with_mlx(config)?;
    let result = studio.generate(request).await;
    studio.unload().await;
    result
}

// Внешние компоненты: движок синтеза речи и распознавание речи.
// Библиотека зависит только от трейтов; реализации на mlx-audio и mlx-whisper
// запускают Python-процессы.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;

use crate::error::BackendError;
use crate::language::Language;

pub mod mlx_audio;
pub mod python;
pub mod whisper;

pub use mlx_audio::{MlxAudioBackend, MlxAudioWorker};
pub use whisper::WhisperTranscriber;

/// Параметры одного вызова синтеза
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SynthesisParams {
    pub text: String,
    /// Имя предустановленного голоса (только CustomVoice)
    pub voice: Option<String>,
    /// Эмоция или описание голоса
    pub instruct: Option<String>,
    pub ref_audio: Option<PathBuf>,
    pub ref_text: Option<String>,
    pub speed: f32,
    pub language: Language,
    pub seed: u32,
    /// Директория, в которую движок кладет результат
    pub output_dir: PathBuf,
}

/// Движок синтеза речи
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    /// Загруженная модель; освобождение памяти происходит при ее удалении
    type Model: Send + Sync;

    /// Загрузить модель из директории чекпойнта
    async fn load_model(&self, path: &Path) -> Result<Self::Model, BackendError>;

    /// Синтезировать речь в `params.output_dir`
    async fn synthesize(&self, model: &Self::Model, params: &SynthesisParams) -> Result<(), BackendError>;

    /// Выгрузить модель
    async fn unload_model(&self, model: Self::Model) {
        drop(model);
    }

    /// Очистить кэш памяти ускорителя
    async fn clear_cache(&self, _model: Option<&Self::Model>) -> Result<(), BackendError> {
        Ok(())
    }
}

/// Распознавание речи для референсного аудио
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio_path: &Path) -> Result<String, BackendError>;
}

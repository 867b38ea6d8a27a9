//! Модуль обработки ошибок библиотеки qwen3-tts-studio
//!
//! Этот модуль содержит типы ошибок, которые могут возникнуть при генерации речи,
//! а также ошибки внешних компонентов (движок синтеза, распознавание речи).

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::mode::Mode;

/// Ошибки библиотеки qwen3-tts-studio
#[derive(Debug, Error)]
pub enum StudioError {
    /// Неизвестный ключ режима
    #[error("Unknown model key: {0}")]
    UnknownMode(String),

    /// Папка модели не найдена ни напрямую, ни через snapshots
    #[error("Model not found: {folder} (looked in {path})")]
    ModelNotFound { folder: String, path: PathBuf },

    /// Директория snapshots пуста
    #[error("Model snapshot directory is empty: {folder} ({path})")]
    EmptySnapshot { folder: String, path: PathBuf },

    /// Ошибка загрузки модели
    #[error("Failed to load model for {mode}: {source}")]
    ModelLoad {
        mode: Mode,
        #[source]
        source: BackendError,
    },

    /// Пустой текст для синтеза
    #[error("Text to synthesize is empty")]
    EmptyText,

    /// В режиме клонирования не передано референсное аудио
    #[error("Clone mode requires a reference audio file")]
    MissingReferenceAudio,

    /// Значение seed вне допустимого диапазона
    #[error("Invalid seed {0}: expected -1 or a value in 0..=4294967295")]
    InvalidSeed(i64),

    /// Ошибка синтеза (загрузка модели или вызов движка)
    #[error("Synthesis failed: {0}")]
    Synthesis(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),

    /// Генерация отменена вызывающей стороной
    #[error("Generation cancelled")]
    Cancelled,

    /// Ошибка конфигурации
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Ошибка ввода-вывода
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Ошибка сериализации/десериализации JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StudioError {
    /// Обернуть ошибку в `StudioError::Synthesis`
    pub fn synthesis<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        StudioError::Synthesis(Box::new(err))
    }

    /// Исходная ошибка внутри `Synthesis`, если это ошибка библиотеки
    pub fn synthesis_cause(&self) -> Option<&StudioError> {
        match self {
            StudioError::Synthesis(inner) => inner.downcast_ref::<StudioError>(),
            _ => None,
        }
    }
}

/// Ошибки внешних компонентов: воркер синтеза и распознавание речи
#[derive(Debug, Error)]
pub enum BackendError {
    /// Не удалось запустить процесс
    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Нарушен протокол обмена с воркером
    #[error("Worker protocol error: {0}")]
    Protocol(String),

    /// Воркер сообщил об ошибке
    #[error("Worker reported an error: {0}")]
    Worker(String),

    /// Вызов не уложился в отведенное время
    #[error("Call timed out after {0:?}")]
    Timeout(Duration),

    /// Движок не создал ожидаемый файл
    #[error("Expected output file was not produced: {0}")]
    MissingArtifact(PathBuf),

    /// Интерпретатор Python не найден
    #[error("Python interpreter not found: {0}")]
    InterpreterNotFound(String),

    /// Ошибка ввода-вывода
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Ошибка сериализации/десериализации JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Тип Result для библиотеки qwen3-tts-studio
pub type Result<T> = std::result::Result<T, StudioError>;

//! Уведомления о ходе генерации

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::Sender;

use crate::mode::Mode;

/// Обновления о прогрессе генерации речи
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProgressUpdate {
    /// Запрос принят, seed определен
    Started { seed: u32 },
    /// Распознавание референсного аудио
    Transcribing,
    /// Загрузка или проверка модели
    LoadingModel(Mode),
    /// Вызов движка синтеза
    Synthesizing,
    /// Копирование результата
    Exporting,
    /// Генерация завершена
    Completed,
    /// Ошибка
    Error(String),
}

/// Отправить обновление, если есть получатель.
///
/// Отправка не ждет места в канале: генерация держит блокировку кэша, и
/// медленный получатель не должен ее задерживать. При заполненном канале
/// обновление отбрасывается.
pub(crate) fn report(sender: Option<&Sender<ProgressUpdate>>, update: ProgressUpdate) {
    let Some(sender) = sender else {
        return;
    };

    match sender.try_send(update) {
        Ok(()) => {}
        Err(TrySendError::Full(update)) => {
            log::debug!("Progress channel is full, dropping {:?}", update);
        }
        // Получатель закрыл канал, генерация от этого не зависит
        Err(TrySendError::Closed(_)) => {}
    }
}

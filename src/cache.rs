//! Кэш загруженной модели
//!
//! В памяти держится не более одной модели. Запрос другого режима выгружает
//! текущую модель до загрузки новой. Вытеснение происходит только при смене
//! режима (или явном `release`), без TTL и учета нагрузки на память.

use std::sync::Arc;
use std::time::Instant;

use crate::backend::SpeechBackend;
use crate::error::{Result, StudioError};
use crate::mode::Mode;
use crate::registry::ModelRegistry;

/// Модель в памяти вместе с режимом, для которого она загружена
struct ResidentModel<M> {
    mode: Mode,
    model: M,
    loaded_at: Instant,
}

/// Кэш на одну модель
pub struct ModelCache<B: SpeechBackend> {
    backend: Arc<B>,
    registry: ModelRegistry,
    slot: Option<ResidentModel<B::Model>>,
}

impl<B: SpeechBackend> ModelCache<B> {
    pub fn new(backend: Arc<B>, registry: ModelRegistry) -> Self {
        Self {
            backend,
            registry,
            slot: None,
        }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Режим загруженной модели
    pub fn resident_mode(&self) -> Option<Mode> {
        self.slot.as_ref().map(|resident| resident.mode)
    }

    pub fn is_resident(&self, mode: Mode) -> bool {
        self.resident_mode() == Some(mode)
    }

    /// Получить модель для режима, загрузив ее при необходимости
    pub async fn acquire(&mut self, mode: Mode) -> Result<&B::Model> {
        self.ensure_loaded(mode).await?;
        self.resident_model(mode)
    }

    /// Загрузить модель для режима, если в памяти другая или никакой.
    /// Если future прервать во время загрузки, слот остается пустым.
    pub async fn ensure_loaded(&mut self, mode: Mode) -> Result<()> {
        if self.is_resident(mode) {
            log::debug!("Model cache hit for {}", mode);
        } else {
            if let Some(previous) = self.resident_mode() {
                log::info!("Switching model {} -> {}, releasing memory", previous, mode);
                self.release().await;
            }

            let path = self.registry.resolve(mode)?;
            log::info!("Loading model {} from {}", mode, path.display());
            let started = Instant::now();

            let model = match self.backend.load_model(&path).await {
                Ok(model) => model,
                Err(source) => {
                    log::error!("Failed to load model {}: {}", mode, source);
                    self.clear_backend_cache().await;
                    return Err(StudioError::ModelLoad { mode, source });
                }
            };

            log::info!("Model {} loaded in {:.1}s", mode, started.elapsed().as_secs_f32());
            self.slot = Some(ResidentModel {
                mode,
                model,
                loaded_at: Instant::now(),
            });
        }
        Ok(())
    }

    /// Загруженная модель, если она соответствует режиму
    pub fn resident_model(&self, mode: Mode) -> Result<&B::Model> {
        self.slot
            .as_ref()
            .filter(|resident| resident.mode == mode)
            .map(|resident| &resident.model)
            .ok_or_else(|| StudioError::Configuration(format!("model for {} is not loaded", mode)))
    }

    /// Выгрузить модель и освободить память
    pub async fn release(&mut self) {
        if let Some(resident) = self.slot.take() {
            log::info!(
                "Releasing model {} (resident for {:.1}s)",
                resident.mode,
                resident.loaded_at.elapsed().as_secs_f32()
            );
            self.backend.unload_model(resident.model).await;
            self.clear_backend_cache().await;
        }
    }

    /// Очистить кэш памяти движка, не выгружая модель
    pub async fn clear_backend_cache(&self) {
        let model = self.slot.as_ref().map(|resident| &resident.model);
        if let Err(e) = self.backend.clear_cache(model).await {
            log::warn!("Failed to clear backend memory cache: {}", e);
        }
    }
}

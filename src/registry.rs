//! Реестр моделей
//!
//! Сопоставляет режим синтеза с папкой чекпойнта и находит ее на диске, в том
//! числе в раскладке кэша HuggingFace (`<папка>/snapshots/<хэш>`).

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{ModelFolders, StudioConfig};
use crate::error::{Result, StudioError};
use crate::mode::Mode;

/// Реестр чекпойнтов
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models_dir: PathBuf,
    folders: ModelFolders,
}

impl ModelRegistry {
    pub fn new(models_dir: impl Into<PathBuf>, folders: ModelFolders) -> Self {
        Self {
            models_dir: models_dir.into(),
            folders,
        }
    }

    pub fn from_config(config: &StudioConfig) -> Self {
        Self::new(config.models_dir.clone(), config.model_folders.clone())
    }

    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    /// Создать директорию моделей, если ее нет
    pub fn ensure_models_dir(&self) -> Result<()> {
        if !self.models_dir.exists() {
            log::info!("Creating models directory {}", self.models_dir.display());
            fs::create_dir_all(&self.models_dir)?;
        }
        Ok(())
    }

    /// Имя папки чекпойнта для режима
    pub fn folder_name(&self, mode: Mode) -> &str {
        self.folders.get(mode)
    }

    /// Имя папки по строковому ключу режима
    pub fn folder_for_key(&self, key: &str) -> Result<&str> {
        let mode: Mode = key.parse()?;
        Ok(self.folder_name(mode))
    }

    /// Найти путь к чекпойнту на диске
    pub fn resolve(&self, mode: Mode) -> Result<PathBuf> {
        let folder = self.folder_name(mode);
        let direct = self.models_dir.join(folder);

        // Раскладка кэша HuggingFace имеет приоритет над плоской папкой
        let snapshots = direct.join("snapshots");
        if !snapshots.is_dir() {
            if direct.exists() {
                return Ok(direct);
            }
            return Err(StudioError::ModelNotFound {
                folder: folder.to_string(),
                path: direct,
            });
        }

        let mut entries: Vec<PathBuf> = fs::read_dir(&snapshots)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| !entry.file_name().to_string_lossy().starts_with('.'))
            .map(|entry| entry.path())
            .collect();
        entries.sort();

        if entries.len() > 1 {
            log::warn!(
                "Several snapshots found for {}, using {}",
                folder,
                entries[0].display()
            );
        }

        entries
            .into_iter()
            .next()
            .ok_or_else(|| StudioError::EmptySnapshot {
                folder: folder.to_string(),
                path: snapshots,
            })
    }
}

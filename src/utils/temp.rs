//! Модуль для работы с временными файлами
//!
//! Каждый запрос получает собственную временную директорию. Она удаляется при
//! уничтожении `ScratchDir` на любом пути выхода, поэтому результат нужно
//! скопировать наружу до этого.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use rand::Rng;
use tempfile::TempDir;

use crate::error::{BackendError, Result, StudioError};

/// Префикс временных директорий запросов
pub const SCRATCH_PREFIX: &str = "qwen3_tts_";

/// Сколько раз пробовать подобрать свободное имя итогового файла
const MAX_NAME_ATTEMPTS: usize = 16;

/// Временная директория одного запроса
pub struct ScratchDir {
    temp_dir: TempDir,
}

impl ScratchDir {
    /// Создать директорию в `root` или в системной временной директории
    pub fn new(root: Option<&Path>) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(SCRATCH_PREFIX);

        let temp_dir = match root {
            Some(root) => {
                std::fs::create_dir_all(root)?;
                builder.tempdir_in(root)?
            }
            None => builder.tempdir()?,
        };

        log::debug!("Created scratch directory {}", temp_dir.path().display());
        Ok(Self { temp_dir })
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Путь к файлу, созданному движком
    pub fn artifact(&self, name: &str) -> Result<PathBuf> {
        let path = self.temp_dir.path().join(name);
        if path.is_file() {
            Ok(path)
        } else {
            Err(StudioError::synthesis(BackendError::MissingArtifact(path)))
        }
    }

    /// Скопировать результат в `output_dir` под уникальным именем
    /// `<prefix>_<unix-время>.<расширение>`
    pub async fn export<R: Rng + ?Sized>(
        &self,
        artifact_name: &str,
        output_dir: &Path,
        prefix: &str,
        rng: &mut R,
    ) -> Result<PathBuf> {
        let source = self.artifact(artifact_name)?;
        let extension = Path::new(artifact_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("wav");

        tokio::fs::create_dir_all(output_dir).await?;
        let destination = reserve_output_path(output_dir, prefix, extension, rng)?;

        if let Err(e) = tokio::fs::copy(&source, &destination).await {
            log::error!("Failed to copy {} to {}: {}", source.display(), destination.display(), e);
            let _ = tokio::fs::remove_file(&destination).await;
            return Err(e.into());
        }

        log::debug!("Exported {} to {}", source.display(), destination.display());
        Ok(destination)
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        log::debug!("Removing scratch directory {}", self.temp_dir.path().display());
    }
}

/// Создать пустой файл с уникальным именем, чтобы параллельные процессы не
/// перезаписали результат друг друга
fn reserve_output_path<R: Rng + ?Sized>(
    output_dir: &Path,
    prefix: &str,
    extension: &str,
    rng: &mut R,
) -> Result<PathBuf> {
    let timestamp = chrono::Utc::now().timestamp();
    let mut candidate = output_dir.join(format!("{}_{}.{}", prefix, timestamp, extension));

    for _ in 0..MAX_NAME_ATTEMPTS {
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(_) => return Ok(candidate),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                candidate = output_dir.join(format!(
                    "{}_{}_{:04x}.{}",
                    prefix,
                    timestamp,
                    rng.gen::<u16>(),
                    extension
                ));
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(StudioError::Io(std::io::Error::new(
        std::io::ErrorKind::AlreadyExists,
        format!("no free output file name for {}_{} in {}", prefix, timestamp, output_dir.display()),
    )))
}

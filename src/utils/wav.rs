//! Чтение заголовка WAV

use std::path::Path;

/// Длительность WAV-файла в секундах, если заголовок читается
pub fn duration_secs(path: &Path) -> Option<f32> {
    match hound::WavReader::open(path) {
        Ok(reader) => {
            let spec = reader.spec();
            if spec.sample_rate == 0 {
                return None;
            }
            Some(reader.duration() as f32 / spec.sample_rate as f32)
        }
        Err(e) => {
            log::debug!("Could not read WAV header of {}: {}", path.display(), e);
            None
        }
    }
}

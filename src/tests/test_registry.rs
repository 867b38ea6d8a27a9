use std::fs;

use crate::config::ModelFolders;
use crate::error::StudioError;
use crate::mode::Mode;
use crate::registry::ModelRegistry;

fn registry(dir: &tempfile::TempDir) -> ModelRegistry {
    ModelRegistry::new(dir.path(), ModelFolders::default())
}

#[test]
fn test_folder_mapping() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry(&dir);

    assert_eq!(registry.folder_name(Mode::CustomVoice), "Qwen3-TTS-12Hz-1.7B-CustomVoice-8bit");
    assert_eq!(registry.folder_name(Mode::VoiceDesign), "Qwen3-TTS-12Hz-1.7B-VoiceDesign-8bit");
    assert_eq!(registry.folder_name(Mode::Clone), "Qwen3-TTS-12Hz-1.7B-Base-8bit");
    assert_eq!(registry.folder_for_key("Pro-Clone").unwrap(), "Qwen3-TTS-12Hz-1.7B-Base-8bit");
}

#[test]
fn test_unknown_key() {
    let dir = tempfile::tempdir().unwrap();
    let err = registry(&dir).folder_for_key("Lite-Custom").unwrap_err();
    assert!(matches!(err, StudioError::UnknownMode(key) if key == "Lite-Custom"));
}

#[test]
fn test_direct_folder() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry(&dir);
    let folder = dir.path().join(registry.folder_name(Mode::CustomVoice));
    fs::create_dir_all(&folder).unwrap();

    assert_eq!(registry.resolve(Mode::CustomVoice).unwrap(), folder);
}

#[test]
fn test_missing_folder() {
    let dir = tempfile::tempdir().unwrap();
    let err = registry(&dir).resolve(Mode::VoiceDesign).unwrap_err();
    assert!(matches!(err, StudioError::ModelNotFound { .. }));
}

#[test]
fn test_snapshot_layout() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry(&dir);
    let snapshots = dir.path().join(registry.folder_name(Mode::Clone)).join("snapshots");
    fs::create_dir_all(snapshots.join(".lock")).unwrap();
    fs::create_dir_all(snapshots.join("3f2a9c")).unwrap();

    assert_eq!(registry.resolve(Mode::Clone).unwrap(), snapshots.join("3f2a9c"));
}

#[test]
fn test_empty_snapshot_dir() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry(&dir);
    let snapshots = dir.path().join(registry.folder_name(Mode::Clone)).join("snapshots");
    fs::create_dir_all(snapshots.join(".hidden")).unwrap();

    let err = registry.resolve(Mode::Clone).unwrap_err();
    assert!(matches!(err, StudioError::EmptySnapshot { path, .. } if path == snapshots));
}

#[test]
fn test_ensure_models_dir() {
    let dir = tempfile::tempdir().unwrap();
    let models = dir.path().join("nested").join("models");
    let registry = ModelRegistry::new(&models, ModelFolders::default());

    registry.ensure_models_dir().unwrap();
    assert!(models.is_dir());
}

use std::path::PathBuf;
use std::time::Duration;

use crate::config::StudioConfig;
use crate::error::StudioError;
use crate::language::{Language, LanguagePolicy};

#[test]
fn test_default_config() {
    let config = StudioConfig::default();

    assert_eq!(config.models_dir, PathBuf::from("models"));
    assert_eq!(config.output_prefix, "qwen3_pro");
    assert_eq!(config.artifact_name, "audio_000.wav");
    assert_eq!(config.default_speaker, "vivian");
    assert_eq!(config.language, LanguagePolicy::Auto);
    assert_eq!(config.synthesis_timeout(), Duration::from_secs(900));
    tokio_test::assert_ok!(config.validate());
}

#[test]
fn test_partial_json_uses_defaults() {
    let json = r#"{
        "models_dir": "/opt/qwen3",
        "language": { "fixed": "zh" },
        "python": { "whisper_prompt": "以下是普通话。" }
    }"#;

    let config: StudioConfig = serde_json::from_str(json).unwrap();

    assert_eq!(config.models_dir, PathBuf::from("/opt/qwen3"));
    assert_eq!(config.language, LanguagePolicy::Fixed(Language::Zh));
    assert_eq!(config.python.whisper_prompt.as_deref(), Some("以下是普通话。"));
    assert_eq!(config.python.whisper_model, "mlx-community/whisper-base-mlx");
    assert_eq!(config.model_folders.clone, "Qwen3-TTS-12Hz-1.7B-Base-8bit");
}

#[test]
fn test_from_file_validates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{ "synthesis_timeout_secs": 0 }"#).unwrap();

    let err = StudioConfig::from_file(&path).unwrap_err();
    assert!(matches!(err, StudioError::Configuration(_)));
}

#[test]
fn test_from_file_missing() {
    let err = StudioConfig::from_file("/nonexistent/qwen3/config.json").unwrap_err();
    assert!(matches!(err, StudioError::Configuration(_)));
}

#[test]
fn test_validate_rejects_empty_folder() {
    let mut config = StudioConfig::default();
    config.model_folders.voice_design = " ".to_string();

    assert!(matches!(config.validate(), Err(StudioError::Configuration(_))));
}

#[test]
fn test_whisper_model_dir() {
    let mut config = StudioConfig {
        models_dir: PathBuf::from("/data/models"),
        ..StudioConfig::default()
    };
    assert_eq!(
        config.whisper_model_dir(),
        PathBuf::from("/data/models/mlx_whisper/whisper-base-mlx")
    );

    config.python.whisper_model = "local-whisper".to_string();
    assert_eq!(config.whisper_model_dir(), PathBuf::from("/data/models/mlx_whisper/local-whisper"));
}

#[test]
fn test_output_dir_defaults_to_temp() {
    let config = StudioConfig::default();
    assert_eq!(config.output_dir(), std::env::temp_dir());
}

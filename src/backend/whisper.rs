//! Распознавание референсного аудио через mlx-whisper
//!
//! Модель скачивается в локальную директорию при первом вызове, поэтому первый
//! запуск может занять заметное время.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::python::{forward_stderr, resolve_interpreter, script_command};
use super::Transcriber;
use crate::config::StudioConfig;
use crate::error::BackendError;

const TRANSCRIBE_SCRIPT: &str = r#"
import json, os, sys
proto = sys.stdout
sys.stdout = sys.stderr
audio_path, model_id, local_dir = sys.argv[1], sys.argv[2], sys.argv[3]
prompt = sys.argv[4] if len(sys.argv) > 4 and sys.argv[4] else None
try:
    if not os.path.exists(local_dir):
        from huggingface_hub import snapshot_download
        print("downloading %s to %s" % (model_id, local_dir))
        snapshot_download(repo_id=model_id, local_dir=local_dir)
    import mlx_whisper
    kwargs = {"path_or_hf_repo": local_dir}
    if prompt:
        kwargs["initial_prompt"] = prompt
    result = mlx_whisper.transcribe(audio_path, **kwargs)
    proto.write(json.dumps({"ok": True, "text": result["text"].strip()}, ensure_ascii=False) + "\n")
except Exception as exc:
    proto.write(json.dumps({"ok": False, "error": str(exc)}, ensure_ascii=False) + "\n")
    sys.exit(1)
"#;

#[derive(Debug, Deserialize)]
struct TranscribeResponse {
    ok: bool,
    #[serde(default)]
    text: String,
    #[serde(default)]
    error: Option<String>,
}

/// Распознавание речи mlx-whisper
pub struct WhisperTranscriber {
    interpreter: PathBuf,
    model_id: String,
    model_dir: PathBuf,
    prompt: Option<String>,
    timeout: Duration,
}

impl WhisperTranscriber {
    pub fn new(config: &StudioConfig) -> Result<Self, BackendError> {
        Ok(Self {
            interpreter: resolve_interpreter(&config.python)?,
            model_id: config.python.whisper_model.clone(),
            model_dir: config.whisper_model_dir(),
            prompt: config.python.whisper_prompt.clone(),
            timeout: Duration::from_secs(config.python.transcription_timeout_secs),
        })
    }

    fn parse_output(stdout: &[u8]) -> Result<String, BackendError> {
        let output = String::from_utf8_lossy(stdout);
        let line = output
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .ok_or_else(|| BackendError::Protocol("transcriber produced no output".to_string()))?;

        let response: TranscribeResponse = serde_json::from_str(line)?;
        if response.ok {
            Ok(response.text)
        } else {
            Err(BackendError::Worker(
                response.error.unwrap_or_else(|| "transcription failed".to_string()),
            ))
        }
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe(&self, audio_path: &Path) -> Result<String, BackendError> {
        log::info!("Transcribing reference audio {}", audio_path.display());

        if let Some(parent) = self.model_dir.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut cmd = script_command(&self.interpreter, TRANSCRIBE_SCRIPT);
        cmd.arg(audio_path)
            .arg(&self.model_id)
            .arg(&self.model_dir)
            .arg(self.prompt.as_deref().unwrap_or(""));

        let mut child = cmd.spawn().map_err(|source| BackendError::Spawn {
            program: self.interpreter.display().to_string(),
            source,
        })?;
        if let Some(stderr) = child.stderr.take() {
            forward_stderr(stderr, "mlx-whisper");
        }

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| BackendError::Timeout(self.timeout))??;

        Self::parse_output(&output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_last_json_line() {
        let stdout = b"noise\n{\"ok\": true, \"text\": \"\xe4\xbd\xa0\xe5\xa5\xbd\"}\n\n";
        assert_eq!(WhisperTranscriber::parse_output(stdout).unwrap(), "你好");
    }

    #[test]
    fn reports_worker_error() {
        let stdout = b"{\"ok\": false, \"error\": \"no audio\"}\n";
        let err = WhisperTranscriber::parse_output(stdout).unwrap_err();
        assert!(matches!(err, BackendError::Worker(msg) if msg == "no audio"));
    }
}

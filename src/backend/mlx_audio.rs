//! Движок синтеза на базе mlx-audio
//!
//! Каждая загруженная модель живет в отдельном Python-процессе. Процесс
//! загружает чекпойнт один раз и обслуживает запросы в формате JSON по строке
//! на stdin/stdout. Завершение процесса освобождает память модели, поэтому
//! выгрузка модели сводится к остановке воркера.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout};
use tokio::sync::Mutex;

use super::python::{forward_stderr, resolve_interpreter, script_command};
use super::{SpeechBackend, SynthesisParams};
use crate::config::PythonConfig;
use crate::error::BackendError;

static REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// Время на корректное завершение воркера перед принудительной остановкой
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Скрипт воркера. Протокол пишется в настоящий stdout, весь вывод библиотек
/// перенаправлен в stderr.
const WORKER_SCRIPT: &str = r#"
import gc, json, random, sys
proto = sys.stdout
sys.stdout = sys.stderr

def send(obj):
    proto.write(json.dumps(obj, ensure_ascii=False) + "\n")
    proto.flush()

def clear_cache():
    try:
        import mlx.core as mx
        if hasattr(mx, "clear_cache"):
            mx.clear_cache()
        elif hasattr(mx, "metal") and hasattr(mx.metal, "clear_cache"):
            mx.metal.clear_cache()
    except Exception:
        pass
    gc.collect()

try:
    import numpy as np
    import mlx.core as mx
    from mlx_audio.tts.utils import load_model
    from mlx_audio.tts.generate import generate_audio
    model = load_model(sys.argv[1])
except Exception as exc:
    send({"event": "error", "error": str(exc)})
    sys.exit(1)

send({"event": "ready"})

for line in sys.stdin:
    line = line.strip()
    if not line:
        continue
    try:
        request = json.loads(line)
    except ValueError as exc:
        send({"id": None, "ok": False, "error": "bad request: %s" % exc})
        continue
    rid = request.get("id")
    method = request.get("method")
    params = request.get("params") or {}
    try:
        if method == "generate":
            seed = int(params.pop("seed"))
            random.seed(seed)
            np.random.seed(seed)
            mx.random.seed(seed)
            generate_audio(model=model, **params)
        elif method == "clear_cache":
            clear_cache()
        elif method == "shutdown":
            send({"id": rid, "ok": True})
            break
        else:
            raise ValueError("unknown method: %s" % method)
        send({"id": rid, "ok": True})
    except Exception as exc:
        send({"id": rid, "ok": False, "error": str(exc)})
"#;

#[derive(Debug, Serialize)]
struct WorkerRequest<'a> {
    id: u64,
    method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WorkerMessage {
    id: Option<u64>,
    event: Option<String>,
    ok: Option<bool>,
    error: Option<String>,
}

/// Аргументы `generate_audio` в mlx-audio
#[derive(Debug, Serialize)]
struct GenerateArgs<'a> {
    text: &'a str,
    voice: Option<&'a str>,
    instruct: Option<&'a str>,
    speed: f32,
    ref_audio: Option<&'a Path>,
    ref_text: Option<&'a str>,
    output_path: &'a Path,
    language: &'a str,
    seed: u32,
}

impl<'a> From<&'a SynthesisParams> for GenerateArgs<'a> {
    fn from(params: &'a SynthesisParams) -> Self {
        Self {
            text: &params.text,
            voice: params.voice.as_deref(),
            instruct: params.instruct.as_deref(),
            speed: params.speed,
            ref_audio: params.ref_audio.as_deref(),
            ref_text: params.ref_text.as_deref(),
            output_path: &params.output_dir,
            language: params.language.as_str(),
            seed: params.seed,
        }
    }
}

struct WorkerIo {
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
}

impl WorkerIo {
    /// Прочитать следующее сообщение протокола, пропуская посторонние строки
    async fn next_message(&mut self) -> Result<WorkerMessage, BackendError> {
        loop {
            let line = self
                .stdout
                .next_line()
                .await?
                .ok_or_else(|| BackendError::Protocol("worker exited unexpectedly".to_string()))?;

            match serde_json::from_str::<WorkerMessage>(&line) {
                Ok(message) if message.id.is_some() || message.event.is_some() => return Ok(message),
                _ => log::debug!("[mlx-audio] {}", line),
            }
        }
    }
}

/// Процесс с загруженной моделью
pub struct MlxAudioWorker {
    model_path: PathBuf,
    child: Child,
    io: Mutex<WorkerIo>,
}

impl MlxAudioWorker {
    /// Запустить воркер и дождаться загрузки модели
    pub async fn spawn(interpreter: &Path, model_path: &Path, load_timeout: Duration) -> Result<Self, BackendError> {
        log::info!("Spawning mlx-audio worker for {}", model_path.display());

        let mut cmd = script_command(interpreter, WORKER_SCRIPT);
        cmd.arg(model_path).stdin(Stdio::piped());

        let mut child = cmd.spawn().map_err(|source| BackendError::Spawn {
            program: interpreter.display().to_string(),
            source,
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| BackendError::Protocol("failed to capture worker stdin".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| BackendError::Protocol("failed to capture worker stdout".to_string()))?;
        if let Some(stderr) = child.stderr.take() {
            forward_stderr(stderr, "mlx-audio");
        }

        let mut io = WorkerIo {
            stdin,
            stdout: BufReader::new(stdout).lines(),
        };

        // При ошибке child удаляется вместе с процессом (kill_on_drop)
        let ready = tokio::time::timeout(load_timeout, async {
            loop {
                let message = io.next_message().await?;
                match message.event.as_deref() {
                    Some("ready") => return Ok(()),
                    Some("error") => {
                        return Err(BackendError::Worker(
                            message.error.unwrap_or_else(|| "model load failed".to_string()),
                        ))
                    }
                    _ => continue,
                }
            }
        })
        .await
        .map_err(|_| BackendError::Timeout(load_timeout))?;
        ready?;

        log::info!("mlx-audio worker ready (pid {:?})", child.id());

        Ok(Self {
            model_path: model_path.to_path_buf(),
            child,
            io: Mutex::new(io),
        })
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Отправить запрос и дождаться ответа с тем же идентификатором
    async fn call(&self, method: &str, params: Option<Value>) -> Result<(), BackendError> {
        let id = REQUEST_ID.fetch_add(1, Ordering::SeqCst);
        let mut line = serde_json::to_string(&WorkerRequest { id, method, params })?;
        line.push('\n');

        let mut io = self.io.lock().await;
        io.stdin.write_all(line.as_bytes()).await?;
        io.stdin.flush().await?;

        loop {
            let message = io.next_message().await?;
            if message.id != Some(id) {
                log::warn!("Ignoring worker message for request {:?} (waiting for {})", message.id, id);
                continue;
            }
            return match message.ok {
                Some(true) => Ok(()),
                _ => Err(BackendError::Worker(
                    message.error.unwrap_or_else(|| format!("{} failed", method)),
                )),
            };
        }
    }

    /// Корректно завершить процесс, при неудаче остановить принудительно
    pub async fn shutdown(mut self) {
        match tokio::time::timeout(SHUTDOWN_GRACE, self.call("shutdown", None)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => log::warn!("Worker shutdown request failed: {}", e),
            Err(_) => log::warn!("Worker did not answer shutdown within {:?}", SHUTDOWN_GRACE),
        }

        match tokio::time::timeout(SHUTDOWN_GRACE, self.child.wait()).await {
            Ok(Ok(status)) => log::debug!("mlx-audio worker exited with {}", status),
            _ => {
                if let Err(e) = self.child.kill().await {
                    log::warn!("Failed to kill mlx-audio worker: {}", e);
                }
            }
        }
    }
}

/// Движок синтеза mlx-audio
pub struct MlxAudioBackend {
    interpreter: PathBuf,
    load_timeout: Duration,
}

impl MlxAudioBackend {
    pub fn new(config: &PythonConfig) -> Result<Self, BackendError> {
        let interpreter = resolve_interpreter(config)?;
        log::debug!("Using Python interpreter {}", interpreter.display());
        Ok(Self {
            interpreter,
            load_timeout: Duration::from_secs(config.load_timeout_secs),
        })
    }
}

#[async_trait]
impl SpeechBackend for MlxAudioBackend {
    type Model = MlxAudioWorker;

    async fn load_model(&self, path: &Path) -> Result<Self::Model, BackendError> {
        MlxAudioWorker::spawn(&self.interpreter, path, self.load_timeout).await
    }

    async fn synthesize(&self, model: &Self::Model, params: &SynthesisParams) -> Result<(), BackendError> {
        let args = serde_json::to_value(GenerateArgs::from(params))?;
        model.call("generate", Some(args)).await
    }

    async fn unload_model(&self, model: Self::Model) {
        log::info!("Stopping mlx-audio worker for {}", model.model_path().display());
        model.shutdown().await;
    }

    async fn clear_cache(&self, model: Option<&Self::Model>) -> Result<(), BackendError> {
        match model {
            Some(worker) => worker.call("clear_cache", None).await,
            None => Ok(()),
        }
    }
}

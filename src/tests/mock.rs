//! Тестовые движки синтеза и распознавания

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use crate::backend::{SpeechBackend, SynthesisParams, Transcriber};
use crate::config::StudioConfig;
use crate::error::BackendError;
use crate::generation::TtsStudio;
use crate::mode::Mode;

/// Поведение движка при синтезе
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SynthBehaviour {
    /// Записать `audio_000.wav` длительностью в одну секунду
    WriteArtifact,
    /// Вернуть ошибку движка
    Fail,
    /// Записать файл, затем вернуть ошибку
    WriteThenFail,
    /// Завершиться успешно, не создав файл
    NoArtifact,
    /// Никогда не завершаться
    Hang,
}

pub struct MockModel {
    pub path: PathBuf,
    live: Arc<AtomicUsize>,
}

impl Drop for MockModel {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct MockLog {
    pub loads: Vec<PathBuf>,
    pub calls: Vec<SynthesisParams>,
    pub unloads: Vec<PathBuf>,
    pub cache_clears: usize,
}

#[derive(Clone)]
pub struct MockBackend {
    pub log: Arc<Mutex<MockLog>>,
    pub live: Arc<AtomicUsize>,
    pub behaviour: Arc<Mutex<SynthBehaviour>>,
    pub fail_load: Arc<Mutex<bool>>,
    pub hang_load: Arc<Mutex<bool>>,
}

impl MockBackend {
    pub fn new(behaviour: SynthBehaviour) -> Self {
        Self {
            log: Arc::new(Mutex::new(MockLog::default())),
            live: Arc::new(AtomicUsize::new(0)),
            behaviour: Arc::new(Mutex::new(behaviour)),
            fail_load: Arc::new(Mutex::new(false)),
            hang_load: Arc::new(Mutex::new(false)),
        }
    }

    pub fn set_behaviour(&self, behaviour: SynthBehaviour) {
        *self.behaviour.lock().unwrap() = behaviour;
    }

    pub fn set_fail_load(&self, fail: bool) {
        *self.fail_load.lock().unwrap() = fail;
    }

    /// Загрузка модели никогда не завершается
    pub fn set_hang_load(&self, hang: bool) {
        *self.hang_load.lock().unwrap() = hang;
    }

    pub fn load_count(&self) -> usize {
        self.log.lock().unwrap().loads.len()
    }

    pub fn live_models(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<SynthesisParams> {
        self.log.lock().unwrap().calls.clone()
    }

    pub fn last_call(&self) -> SynthesisParams {
        self.calls().pop().expect("no synthesis call recorded")
    }
}

/// Записать тишину длительностью в одну секунду (16 кГц, моно)
pub fn write_test_wav(path: &Path) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for _ in 0..16_000 {
        writer.write_sample(0i16).unwrap();
    }
    writer.finalize().unwrap();
}

#[async_trait]
impl SpeechBackend for MockBackend {
    type Model = MockModel;

    async fn load_model(&self, path: &Path) -> Result<Self::Model, BackendError> {
        self.log.lock().unwrap().loads.push(path.to_path_buf());
        if *self.fail_load.lock().unwrap() {
            return Err(BackendError::Worker("corrupt weights".to_string()));
        }
        let hang = *self.hang_load.lock().unwrap();
        if hang {
            std::future::pending::<()>().await;
        }
        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(MockModel {
            path: path.to_path_buf(),
            live: self.live.clone(),
        })
    }

    async fn synthesize(&self, _model: &Self::Model, params: &SynthesisParams) -> Result<(), BackendError> {
        self.log.lock().unwrap().calls.push(params.clone());
        let behaviour = *self.behaviour.lock().unwrap();
        let artifact = params.output_dir.join("audio_000.wav");

        match behaviour {
            SynthBehaviour::WriteArtifact => {
                write_test_wav(&artifact);
                Ok(())
            }
            SynthBehaviour::Fail => Err(BackendError::Worker("synthesis exploded".to_string())),
            SynthBehaviour::WriteThenFail => {
                write_test_wav(&artifact);
                Err(BackendError::Worker("failed after writing".to_string()))
            }
            SynthBehaviour::NoArtifact => Ok(()),
            SynthBehaviour::Hang => {
                std::future::pending::<()>().await;
                Ok(())
            }
        }
    }

    async fn unload_model(&self, model: Self::Model) {
        self.log.lock().unwrap().unloads.push(model.path.clone());
        drop(model);
    }

    async fn clear_cache(&self, _model: Option<&Self::Model>) -> Result<(), BackendError> {
        self.log.lock().unwrap().cache_clears += 1;
        Ok(())
    }
}

#[derive(Clone)]
pub struct MockTranscriber {
    pub calls: Arc<AtomicUsize>,
    pub result: Arc<Mutex<Result<String, String>>>,
    pub hang: bool,
}

impl MockTranscriber {
    pub fn returning(text: &str) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            result: Arc::new(Mutex::new(Ok(text.to_string()))),
            hang: false,
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            result: Arc::new(Mutex::new(Err(reason.to_string()))),
            hang: false,
        }
    }

    /// Распознавание никогда не завершается
    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Self::returning("")
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transcriber for MockTranscriber {
    async fn transcribe(&self, _audio_path: &Path) -> Result<String, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.hang {
            std::future::pending::<()>().await;
        }
        self.result
            .lock()
            .unwrap()
            .clone()
            .map_err(BackendError::Worker)
    }
}

/// Рабочее окружение теста: модели для всех режимов, выходная и временная директории
pub struct Fixture {
    pub dir: TempDir,
    pub config: StudioConfig,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config = StudioConfig {
            models_dir: dir.path().join("models"),
            output_dir: Some(dir.path().join("out")),
            scratch_dir: Some(dir.path().join("scratch")),
            ..StudioConfig::default()
        };
        config.synthesis_timeout_secs = 5;

        for mode in Mode::ALL {
            std::fs::create_dir_all(config.models_dir.join(config.model_folders.get(mode))).unwrap();
        }

        Self { dir, config }
    }

    pub fn reference_audio(&self) -> PathBuf {
        let path = self.dir.path().join("reference.wav");
        if !path.exists() {
            write_test_wav(&path);
        }
        path
    }

    pub fn scratch_root(&self) -> PathBuf {
        self.dir.path().join("scratch")
    }

    pub fn studio(&self, backend: &MockBackend, transcriber: &MockTranscriber) -> TtsStudio<MockBackend, MockTranscriber> {
        TtsStudio::new(self.config.clone(), backend.clone(), transcriber.clone()).unwrap()
    }
}

/// Количество записей в директории (0, если ее нет)
pub fn entry_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0)
}

//! Оркестратор генерации речи
//!
//! Проверяет запрос, определяет seed, получает модель из кэша, собирает
//! параметры под режим и вызывает движок синтеза во временной директории.
//! Запросы выполняются строго по одному: кэш модели находится под мьютексом,
//! который держится от загрузки модели до копирования результата.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::Sender;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::backend::{SpeechBackend, SynthesisParams, Transcriber};
use crate::cache::ModelCache;
use crate::config::StudioConfig;
use crate::error::{BackendError, Result, StudioError};
use crate::language::Language;
use crate::mode::Mode;
use crate::progress::{report, ProgressUpdate};
use crate::registry::ModelRegistry;
use crate::seed::{self, ResolvedSeed, SeedChoice};
use crate::transcription::{transcribe_reference, Transcription};
use crate::utils::temp::ScratchDir;
use crate::utils::wav;

/// Запрос на генерацию
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub text: String,
    pub mode: Mode,
    /// Голос для CustomVoice
    pub speaker: Option<String>,
    /// Эмоция (CustomVoice) или описание голоса (VoiceDesign)
    pub instruction: Option<String>,
    /// Референсное аудио для Clone
    pub reference_audio: Option<PathBuf>,
    /// Текст референсного аудио; пустой распознается автоматически
    pub reference_text: Option<String>,
    pub speed: f32,
    pub seed: SeedChoice,
}

impl GenerationRequest {
    pub fn custom_voice(text: impl Into<String>, speaker: impl Into<String>, emotion: impl Into<String>) -> Self {
        Self {
            speaker: Some(speaker.into()),
            instruction: Some(emotion.into()),
            ..Self::base(text, Mode::CustomVoice)
        }
    }

    pub fn voice_design(text: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            instruction: Some(description.into()),
            ..Self::base(text, Mode::VoiceDesign)
        }
    }

    pub fn voice_clone(
        text: impl Into<String>,
        reference_audio: impl Into<PathBuf>,
        reference_text: Option<String>,
    ) -> Self {
        Self {
            reference_audio: Some(reference_audio.into()),
            reference_text,
            ..Self::base(text, Mode::Clone)
        }
    }

    fn base(text: impl Into<String>, mode: Mode) -> Self {
        Self {
            text: text.into(),
            mode,
            speaker: None,
            instruction: None,
            reference_audio: None,
            reference_text: None,
            speed: 1.0,
            seed: SeedChoice::Random,
        }
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_seed(mut self, seed: impl Into<SeedChoice>) -> Self {
        self.seed = seed.into();
        self
    }

    /// Нужно ли распознавать референсный текст
    fn needs_transcription(&self) -> bool {
        self.mode == Mode::Clone
            && self
                .reference_text
                .as_deref()
                .map_or(true, |text| text.trim().is_empty())
    }
}

/// Результат генерации
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// Путь к итоговому аудиофайлу
    pub audio_path: PathBuf,
    /// Фактически использованный seed
    pub seed: u32,
    pub language: Language,
    /// Длительность в секундах, если заголовок WAV читается
    pub duration: Option<f32>,
}

/// Управление отдельным запросом: прогресс и отмена
#[derive(Debug, Clone, Default)]
pub struct GenerationControl {
    pub progress: Option<Sender<ProgressUpdate>>,
    pub cancel: Option<CancellationToken>,
}

impl GenerationControl {
    pub fn with_progress(mut self, sender: Sender<ProgressUpdate>) -> Self {
        self.progress = Some(sender);
        self
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn report(&self, update: ProgressUpdate) {
        report(self.progress.as_ref(), update);
    }

    async fn cancelled(&self) {
        match &self.cancel {
            Some(token) => token.cancelled().await,
            None => std::future::pending().await,
        }
    }

    /// Выполнить шаг запроса, прервав его при отмене
    async fn guard<F: Future>(&self, step: F) -> Result<F::Output> {
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(StudioError::Cancelled),
            output = step => Ok(output),
        }
    }
}

/// Почему вызов движка был прерван
enum Interrupted {
    TimedOut(Duration),
    Cancelled,
}

/// Собрать параметры синтеза для режима запроса
pub(crate) fn build_params(
    request: &GenerationRequest,
    reference_text: Option<String>,
    language: Language,
    seed: ResolvedSeed,
    output_dir: &Path,
    default_speaker: &str,
) -> SynthesisParams {
    let instruction = request
        .instruction
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string);

    let (voice, instruct, ref_audio, ref_text) = match request.mode {
        Mode::CustomVoice => {
            let speaker = request
                .speaker
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .unwrap_or(default_speaker);
            (Some(speaker.to_lowercase()), instruction, None, None)
        }
        Mode::VoiceDesign => (None, instruction, None, None),
        Mode::Clone => (None, None, request.reference_audio.clone(), reference_text),
    };

    SynthesisParams {
        text: request.text.trim().to_string(),
        voice,
        instruct,
        ref_audio,
        ref_text,
        speed: request.speed,
        language,
        seed: seed.value(),
        output_dir: output_dir.to_path_buf(),
    }
}

/// Оркестратор генерации
pub struct TtsStudio<B: SpeechBackend, T: Transcriber> {
    config: StudioConfig,
    backend: Arc<B>,
    transcriber: Arc<T>,
    cache: Mutex<ModelCache<B>>,
}

impl<B: SpeechBackend, T: Transcriber> TtsStudio<B, T> {
    /// Создать оркестратор с заданными движками
    pub fn new(config: StudioConfig, backend: B, transcriber: T) -> Result<Self> {
        config.validate()?;

        let registry = ModelRegistry::from_config(&config);
        registry.ensure_models_dir()?;

        let backend = Arc::new(backend);
        let cache = ModelCache::new(backend.clone(), registry);

        Ok(Self {
            config,
            backend,
            transcriber: Arc::new(transcriber),
            cache: Mutex::new(cache),
        })
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    /// Режим модели, находящейся в памяти
    pub async fn resident_mode(&self) -> Option<Mode> {
        self.cache.lock().await.resident_mode()
    }

    /// Выгрузить модель
    pub async fn unload(&self) {
        self.cache.lock().await.release().await;
    }

    /// Распознать референсное аудио (например, при его замене в интерфейсе)
    pub async fn transcribe(&self, audio_path: Option<&Path>) -> Transcription {
        let _guard = self.cache.lock().await;
        transcribe_reference(self.transcriber.as_ref(), audio_path).await
    }

    /// Сгенерировать речь
    pub async fn generate(&self, request: GenerationRequest) -> Result<GenerationResult> {
        self.generate_with(request, GenerationControl::default()).await
    }

    /// Сгенерировать речь с отслеживанием прогресса и возможностью отмены
    pub async fn generate_with(
        &self,
        request: GenerationRequest,
        control: GenerationControl,
    ) -> Result<GenerationResult> {
        match self.run(&request, &control).await {
            Ok(result) => {
                control.report(ProgressUpdate::Completed);
                Ok(result)
            }
            Err(e) => {
                log::error!("Generation failed ({}): {}", request.mode, e);
                control.report(ProgressUpdate::Error(e.to_string()));
                Err(e)
            }
        }
    }

    async fn run(&self, request: &GenerationRequest, control: &GenerationControl) -> Result<GenerationResult> {
        if request.text.trim().is_empty() {
            return Err(StudioError::EmptyText);
        }
        if request.mode == Mode::Clone && request.reference_audio.is_none() {
            return Err(StudioError::MissingReferenceAudio);
        }
        if !(request.speed.is_finite() && request.speed > 0.0) {
            return Err(StudioError::Configuration(format!(
                "speed must be a positive number, got {}",
                request.speed
            )));
        }

        let seed = seed::resolve(request.seed);
        let mut rng = seed.rng();
        let language = self.config.language.apply(&request.text);
        log::info!(
            "Generating speech: mode={}, seed={}, language={}, chars={}",
            request.mode,
            seed.value(),
            language,
            request.text.chars().count()
        );
        control.report(ProgressUpdate::Started { seed: seed.value() });

        let mut cache = control.guard(self.cache.lock()).await?;

        let reference_text = if request.needs_transcription() {
            control.report(ProgressUpdate::Transcribing);
            let transcription = control
                .guard(transcribe_reference(
                    self.transcriber.as_ref(),
                    request.reference_audio.as_deref(),
                ))
                .await?;
            match transcription {
                Transcription::Text(text) if !text.is_empty() => Some(text),
                Transcription::Text(_) => None,
                Transcription::Failed(reason) => {
                    log::warn!("Continuing clone without reference text: {}", reason);
                    None
                }
            }
        } else {
            request.reference_text.as_deref().map(|text| text.trim().to_string())
        };

        control.report(ProgressUpdate::LoadingModel(request.mode));
        match control.guard(cache.ensure_loaded(request.mode)).await {
            Ok(loaded) => loaded.map_err(StudioError::synthesis)?,
            Err(cancelled) => {
                // Загрузка прервана, недозагруженная модель уже удалена вместе с future
                log::warn!("Model loading for {} cancelled", request.mode);
                cache.clear_backend_cache().await;
                return Err(cancelled);
            }
        }
        let model = cache.resident_model(request.mode).map_err(StudioError::synthesis)?;

        let scratch = ScratchDir::new(self.config.scratch_dir.as_deref())?;
        let params = build_params(
            request,
            reference_text,
            language,
            seed,
            scratch.path(),
            &self.config.default_speaker,
        );

        control.report(ProgressUpdate::Synthesizing);
        let call_result = self.call_backend(model, &params, control).await;
        let outcome = match call_result {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(StudioError::synthesis(e)),
            Err(interrupted) => {
                // Состояние воркера неизвестно, модель перезагрузится при следующем запросе
                log::warn!("Synthesis interrupted, evicting model {}", request.mode);
                cache.release().await;
                Err(match interrupted {
                    Interrupted::TimedOut(limit) => StudioError::synthesis(BackendError::Timeout(limit)),
                    Interrupted::Cancelled => StudioError::Cancelled,
                })
            }
        };
        cache.clear_backend_cache().await;
        outcome?;

        control.report(ProgressUpdate::Exporting);
        let audio_path = scratch
            .export(
                &self.config.artifact_name,
                &self.config.output_dir(),
                &self.config.output_prefix,
                &mut rng,
            )
            .await?;
        drop(scratch);
        drop(cache);

        let duration = wav::duration_secs(&audio_path);
        log::info!("Speech saved to {} (seed {})", audio_path.display(), seed.value());

        Ok(GenerationResult {
            audio_path,
            seed: seed.value(),
            language,
            duration,
        })
    }

    /// Вызов движка с ограничением по времени и отменой
    async fn call_backend(
        &self,
        model: &B::Model,
        params: &SynthesisParams,
        control: &GenerationControl,
    ) -> std::result::Result<std::result::Result<(), BackendError>, Interrupted> {
        let limit = self.config.synthesis_timeout();
        tokio::select! {
            result = tokio::time::timeout(limit, self.backend.synthesize(model, params)) => {
                result.map_err(|_| Interrupted::TimedOut(limit))
            }
            _ = control.cancelled() => Err(Interrupted::Cancelled),
        }
    }
}

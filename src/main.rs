use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use qwen3_tts_studio::catalog;
use qwen3_tts_studio::config::StudioConfig;
use qwen3_tts_studio::logger::init_logger;
use qwen3_tts_studio::{GenerationControl, GenerationRequest, MlxStudio, ProgressUpdate, SeedChoice};

/// Qwen3-TTS Studio
///
/// Generate speech with local Qwen3-TTS checkpoints: preset voices,
/// voice design from a description, or zero-shot cloning from reference audio.
#[derive(Parser, Debug)]
#[command(name = "qwen3-tts-studio")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory with model checkpoints (overrides config)
    #[arg(long)]
    models_dir: Option<PathBuf>,

    /// Directory for generated audio (defaults to the system temp dir)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Speak with a preset voice
    Speak {
        #[command(flatten)]
        common: CommonArgs,

        /// Preset speaker name
        #[arg(long, default_value = "Vivian")]
        speaker: String,

        /// Emotion instruction
        #[arg(long, default_value = catalog::DEFAULT_EMOTION)]
        emotion: String,
    },
    /// Design a voice from a description
    Design {
        #[command(flatten)]
        common: CommonArgs,

        /// Voice description, e.g. "deep male voice, slightly husky, slow pace"
        #[arg(long)]
        description: String,
    },
    /// Clone a voice from reference audio
    #[command(name = "clone")]
    CloneVoice {
        #[command(flatten)]
        common: CommonArgs,

        /// Reference audio file
        #[arg(long)]
        ref_audio: PathBuf,

        /// Transcript of the reference audio (recognized automatically if omitted)
        #[arg(long)]
        ref_text: Option<String>,
    },
    /// Transcribe a reference audio file
    Transcribe {
        /// Audio file
        audio: PathBuf,
    },
    /// List preset speakers and emotions
    Speakers {
        /// Only show speakers for this language
        #[arg(long)]
        language: Option<String>,
    },
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Text to synthesize
    #[arg(short, long)]
    text: String,

    /// Speech speed factor
    #[arg(long, default_value_t = 1.0)]
    speed: f32,

    /// Random seed (-1 picks one at random)
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    seed: i64,

    /// Copy the result to this path
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn load_config(cli: &Cli) -> Result<StudioConfig> {
    let mut config = match &cli.config {
        Some(path) => StudioConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => StudioConfig::default(),
    }
    .with_env_overrides();

    if let Some(dir) = &cli.models_dir {
        config.models_dir = dir.clone();
    }
    if let Some(dir) = &cli.output_dir {
        config.output_dir = Some(dir.clone());
    }
    Ok(config)
}

fn print_speakers(language: Option<&str>) {
    for name in catalog::languages() {
        if language.is_some_and(|wanted| !wanted.eq_ignore_ascii_case(name)) {
            continue;
        }
        println!("{}: {}", name, catalog::speakers_for(name).join(", "));
    }
    println!("Emotions: {}", catalog::EMOTIONS.join(", "));
}

async fn run_generation(studio: &MlxStudio, request: GenerationRequest, output: Option<PathBuf>) -> Result<()> {
    let (tx, mut rx) = tokio::sync::mpsc::channel(16);
    let cancel = CancellationToken::new();

    let progress_task = tokio::spawn(async move {
        while let Some(update) = rx.recv().await {
            match update {
                ProgressUpdate::Started { seed } => log::info!("Started (seed {})", seed),
                ProgressUpdate::Error(_) => {}
                other => log::info!("{:?}", other),
            }
        }
    });

    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted, cancelling generation (press Ctrl-C again to exit immediately)");
            ctrl_c.cancel();
        }
        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(130);
        }
    });

    let control = GenerationControl::default().with_progress(tx).with_cancel(cancel);
    let result = studio.generate_with(request, control).await;
    let _ = progress_task.await;
    let result = result?;

    let audio_path = match output {
        Some(path) => {
            tokio::fs::copy(&result.audio_path, &path)
                .await
                .with_context(|| format!("Failed to copy result to {}", path.display()))?;
            path
        }
        None => result.audio_path.clone(),
    };

    println!("{}", audio_path.display());
    match result.duration {
        Some(duration) => println!("seed: {}  language: {}  duration: {:.2}s", result.seed, result.language, duration),
        None => println!("seed: {}  language: {}", result.seed, result.language),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    if let Command::Speakers { language } = &cli.command {
        print_speakers(language.as_deref());
        return Ok(());
    }

    let config = load_config(&cli)?;
    let studio = MlxStudio::with_mlx(config).context("Failed to initialize TTS studio")?;

    match cli.command {
        Command::Speak { common, speaker, emotion } => {
            let request = GenerationRequest::custom_voice(common.text, speaker, emotion)
                .with_speed(common.speed)
                .with_seed(SeedChoice::from_raw(common.seed)?);
            run_generation(&studio, request, common.output).await?;
        }
        Command::Design { common, description } => {
            let request = GenerationRequest::voice_design(common.text, description)
                .with_speed(common.speed)
                .with_seed(SeedChoice::from_raw(common.seed)?);
            run_generation(&studio, request, common.output).await?;
        }
        Command::CloneVoice { common, ref_audio, ref_text } => {
            let request = GenerationRequest::voice_clone(common.text, ref_audio, ref_text)
                .with_speed(common.speed)
                .with_seed(SeedChoice::from_raw(common.seed)?);
            run_generation(&studio, request, common.output).await?;
        }
        Command::Transcribe { audio } => {
            let transcription = studio.transcribe(Some(&audio)).await;
            if let qwen3_tts_studio::Transcription::Failed(reason) = &transcription {
                log::error!("Recognition failed: {}", reason);
            }
            println!("{}", transcription.display_text());
        }
        Command::Speakers { .. } => {}
    }

    studio.unload().await;
    Ok(())
}

use env_logger::{Builder, Env};
use log::LevelFilter;
use std::io::Write;

/// Фильтр по умолчанию, если RUST_LOG не задан
const DEFAULT_FILTER: &str = "warn,qwen3_tts_studio=info";

pub fn init_logger(verbose: bool) {
    let env = Env::default().filter_or("RUST_LOG", DEFAULT_FILTER);

    let mut builder = Builder::from_env(env);

    if verbose {
        builder.filter_module("qwen3_tts_studio", LevelFilter::Debug);
    }

    builder
        // Вывод Python-воркеров идет через debug, остальные библиотеки подавляем
        .filter_module("mio", LevelFilter::Error)
        .filter_module("tokio_util", LevelFilter::Error)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {}: {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .target(env_logger::Target::Stderr)
        .init();
}

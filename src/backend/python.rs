//! Общие функции для запуска Python-компонентов

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{ChildStderr, Command};

use crate::config::PythonConfig;
use crate::error::BackendError;

/// Переменные окружения, отключающие телеметрию и параллелизм токенизаторов
const COLLABORATOR_ENV: [(&str, &str); 3] = [
    ("TOKENIZERS_PARALLELISM", "false"),
    ("GRADIO_ANALYTICS_ENABLED", "false"),
    ("FIX_MISTRAL_REGEX", "1"),
];

/// Найти интерпретатор Python
pub fn resolve_interpreter(config: &PythonConfig) -> Result<PathBuf, BackendError> {
    if let Some(path) = &config.interpreter {
        if path.exists() {
            return Ok(path.clone());
        }
        // Имя без пути ищем в PATH
        return which::which(path)
            .map_err(|e| BackendError::InterpreterNotFound(format!("{}: {}", path.display(), e)));
    }

    which::which("python3")
        .or_else(|_| which::which("python"))
        .map_err(|e| BackendError::InterpreterNotFound(format!("python3/python: {}", e)))
}

/// Команда запуска встроенного скрипта: `python -u -c <script> <args...>`
pub fn script_command(interpreter: &Path, script: &str) -> Command {
    let mut cmd = Command::new(interpreter);
    cmd.arg("-u")
        .arg("-c")
        .arg(script)
        .envs(COLLABORATOR_ENV)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    cmd
}

/// Пересылать stderr процесса в лог
pub fn forward_stderr(stderr: ChildStderr, tag: &'static str) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(stderr).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if !line.trim().is_empty() {
                log::debug!("[{}] {}", tag, line);
            }
        }
    });
}

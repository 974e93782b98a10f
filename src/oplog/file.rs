use super::parser::parse_log;
use super::stream::{execute_log, render_output};
use crate::core::{KvError, Result};
use crate::pipeline::{BatchConfig, BatchReport};
use log::info;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Read an operation log from `input`, execute it, and write the result log
/// to `output`. The output file is replaced atomically.
pub async fn execute_file(
    input: &Path,
    output: &Path,
    config: BatchConfig,
    workers_override: Option<usize>,
) -> Result<BatchReport> {
    info!("Loading operation log '{}'", input.display());
    let text = fs::read_to_string(input).await.map_err(|err| {
        KvError::IoError(format!("Failed to read '{}': {}", input.display(), err))
    })?;
    let log = parse_log(&text)?;

    info!("Executing {} operations", log.requests.len());
    let report = tokio::task::spawn_blocking(move || execute_log(log, &config, workers_override))
        .await
        .map_err(|err| KvError::WorkerPanic(format!("batch task: {}", err)))??;

    info!("Writing result log '{}'", output.display());
    let rendered = render_output(report.workers, &report.lines);
    atomic_write(output, rendered.as_bytes()).await?;
    Ok(report)
}

async fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).await.map_err(|err| {
            KvError::IoError(format!(
                "Failed to create parent directory '{}': {}",
                parent.display(),
                err
            ))
        })?;
    }

    let tmp = temp_path(path);
    fs::write(&tmp, bytes).await.map_err(|err| {
        KvError::IoError(format!(
            "Failed to write temp file '{}': {}",
            tmp.display(),
            err
        ))
    })?;

    fs::rename(&tmp, path).await.map_err(|err| {
        KvError::IoError(format!(
            "Failed to rename temp file '{}' -> '{}': {}",
            tmp.display(),
            path.display(),
            err
        ))
    })?;

    Ok(())
}

/// Sibling of `path` named `<file name>.<pid>.tmp`, so it never replaces a
/// file the caller passed in.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("output"));
    name.push(format!(".{}.tmp", std::process::id()));
    path.with_file_name(name)
}

//! Rasterize the generated DOT files with Graphviz.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;
use tokio::process::Command;

#[derive(Debug, Clone, Default)]
pub struct RenderSummary {
    /// `(dot file, png file)` pairs that converted successfully
    pub rendered: Vec<(String, String)>,
    pub warnings: Vec<String>,
}

/// `.dot` files directly inside `dir`, sorted by name
async fn dot_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)
        .await
        .with_context(|| format!("Failed to read {}", dir.display()))?;

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_dot = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("dot"))
            .unwrap_or(false);
        if is_dot && entry.file_type().await?.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Convert every `.dot` file in `output_dir` to `<png_dir>/<stem>.png`.
///
/// A file that fails to convert is reported as a warning and the rest are
/// still processed. A renderer binary that cannot be started aborts the run.
/// Dropping the returned future kills the renderer currently running.
pub async fn render_dot_files(
    output_dir: &Path,
    png_dir: &Path,
    dot_bin: &str,
    dpi: u32,
) -> Result<RenderSummary> {
    fs::create_dir_all(png_dir)
        .await
        .with_context(|| format!("Failed to create {}", png_dir.display()))?;

    let mut summary = RenderSummary::default();
    for dot_path in dot_files(output_dir).await? {
        let stem = dot_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("diagram");
        let png_path = png_dir.join(format!("{}.png", stem));
        tracing::info!("Converting {} -> {}", dot_path.display(), png_path.display());

        let result = Command::new(dot_bin)
            .arg("-Tpng:cairo")
            .arg(format!("-Gdpi={}", dpi))
            .arg(&dot_path)
            .arg("-o")
            .arg(&png_path)
            .kill_on_drop(true)
            .output()
            .await;

        let output = match result {
            Ok(output) => output,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                anyhow::bail!("Graphviz renderer '{}' not found; install Graphviz or set RACKFORGE_DOT_BIN", dot_bin);
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to run {}", dot_bin));
            }
        };

        if output.status.success() {
            summary
                .rendered
                .push((dot_path.display().to_string(), png_path.display().to_string()));
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let msg = format!(
                "Failed to convert {}: {}",
                dot_path.display(),
                stderr.trim()
            );
            tracing::warn!("{}", msg);
            summary.warnings.push(msg);
        }
    }

    Ok(summary)
}

pub mod generate;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::sync::OwnedMutexGuard;

use crate::config::Config;
use crate::render::{render_dot_files, RenderSummary};

pub use generate::{load_system, parse_system, run, GenerateSummary};

/// Result of a full generate + render pass
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    pub summary: GenerateSummary,
    pub render: RenderSummary,
}

impl PipelineReport {
    /// Every warning from generation and rendering, in order
    pub fn warnings(&self) -> Vec<String> {
        self.summary
            .warnings
            .iter()
            .chain(self.render.warnings.iter())
            .cloned()
            .collect()
    }

    /// Human-readable run log shown by the CLI and returned to the UI
    pub fn output_text(&self, yaml_path: &Path) -> String {
        let mut lines = vec![format!("Loaded {}", yaml_path.display())];
        lines.push(format!(
            "Device map built with {} devices ({} external)",
            self.summary.device_count, self.summary.external_count
        ));
        lines.extend(self.summary.generated.iter().map(|f| format!("Generated {}", f)));
        lines.extend(
            self.render
                .rendered
                .iter()
                .map(|(dot, png)| format!("Converted {} -> {}", dot, png)),
        );
        lines.extend(self.warnings().iter().map(|w| format!("Warning: {}", w)));
        lines.push("All files processed.".to_string());
        lines.join("\n")
    }
}

/// Load the system description, generate every output, then rasterize the
/// DOT files. Generation runs on the blocking pool.
///
/// `run_guard` is the caller's hold on the output directory. It stays held
/// until the blocking generation has finished, even when this future is
/// dropped part way through.
pub async fn generate_and_render(
    config: &Config,
    yaml_path: &Path,
    run_guard: OwnedMutexGuard<()>,
) -> Result<PipelineReport> {
    let path: PathBuf = yaml_path.to_path_buf();
    let output_dir = PathBuf::from(&config.output_dir);

    let (_run_guard, summary) = tokio::task::spawn_blocking(move || {
        let summary = load_system(&path).and_then(|system| run(&system, &output_dir));
        (run_guard, summary)
    })
    .await
    .context("Generation task failed")?;
    let summary = summary?;

    let render = render_dot_files(
        Path::new(&config.output_dir),
        Path::new(&config.png_dir),
        &config.dot_bin,
        config.dpi,
    )
    .await?;

    Ok(PipelineReport { summary, render })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::generate::tests::SAMPLE_YAML;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    async fn guard() -> OwnedMutexGuard<()> {
        Arc::new(Mutex::new(())).lock_owned().await
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_generate_and_render() {
        let dir = tempfile::tempdir().unwrap();
        let yaml_path = dir.path().join("system.yaml");
        std::fs::write(&yaml_path, SAMPLE_YAML).unwrap();

        let config = Config {
            yaml_path: yaml_path.display().to_string(),
            output_dir: dir.path().join("output").display().to_string(),
            png_dir: dir.path().join("pngs").display().to_string(),
            // exits 0 without writing anything
            dot_bin: "true".to_string(),
            ..Config::default()
        };

        let report = generate_and_render(&config, &yaml_path, guard().await).await.unwrap();
        assert_eq!(report.summary.device_count, 5);
        assert_eq!(report.render.rendered.len(), 3);
        assert_eq!(report.warnings().len(), 1);

        let text = report.output_text(&yaml_path);
        assert!(text.contains("Device map built with 5 devices (1 external)"));
        assert!(text.contains("rack_layout.dot"));
        assert!(text.contains("Warning: Device 'Ghost' not found"));
        assert!(text.ends_with("All files processed."));
    }

    #[tokio::test]
    async fn test_generate_and_render_bad_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let yaml_path = dir.path().join("system.yaml");
        std::fs::write(&yaml_path, "wiring_layers: []\n").unwrap();

        let config = Config {
            yaml_path: yaml_path.display().to_string(),
            output_dir: dir.path().join("output").display().to_string(),
            ..Config::default()
        };
        let err = generate_and_render(&config, &yaml_path, guard().await).await.unwrap_err();
        assert!(format!("{:#}", err).contains("'racks'"));
    }
}

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::sync::Arc;

use super::ApiError;
use crate::models::*;
use crate::services::generate_and_render;
use crate::utils::sanitize_filename;
use crate::AppState;

/// Write the posted YAML next to the configured system file, then generate
/// and render everything from it.
///
/// Runs are serialized on `AppState::run_lock`. Configuration errors and
/// timeouts are reported with `ok: false` and a 200 status, so the designer
/// UI can show the output panel.
pub async fn run_design(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RunRequest>, JsonRejection>,
) -> Result<Json<RunResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::bad_request(format!("Bad JSON: {}", e.body_text())))?;
    let cfg = &state.config;

    let default_name = cfg.default_filename();
    let filename = sanitize_filename(req.filename.as_deref().unwrap_or(""), &default_name);
    let yaml_path = cfg.base_dir().join(&filename);

    let run_guard = state.run_lock.clone().lock_owned().await;

    tokio::fs::write(&yaml_path, req.yaml.as_bytes())
        .await
        .map_err(|e| ApiError::internal(format!("Could not write YAML: {}", e)))?;
    tracing::info!("Wrote {}", yaml_path.display());

    let run = generate_and_render(cfg, &yaml_path, run_guard);
    let response = match tokio::time::timeout(cfg.run_timeout(), run).await {
        Ok(Ok(report)) => RunResponse {
            ok: true,
            output: report.output_text(&yaml_path),
            warnings: report.warnings(),
            generated: report.summary.generated,
        },
        Ok(Err(e)) => {
            tracing::warn!("Run failed for {}: {:#}", yaml_path.display(), e);
            RunResponse {
                ok: false,
                output: format!("Error: {:#}", e),
                generated: Vec::new(),
                warnings: Vec::new(),
            }
        }
        Err(_) => {
            tracing::warn!("Run timed out after {} seconds", cfg.run_timeout_secs);
            RunResponse {
                ok: false,
                output: format!("Error: run timed out after {} seconds.", cfg.run_timeout_secs),
                generated: Vec::new(),
                warnings: Vec::new(),
            }
        }
    };

    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::services::generate::tests::SAMPLE_YAML;

    fn config_in(dir: &std::path::Path) -> Config {
        Config {
            yaml_path: dir.join("system.yaml").display().to_string(),
            output_dir: dir.join("output").display().to_string(),
            png_dir: dir.join("pngs").display().to_string(),
            dot_bin: "true".to_string(),
            ..Config::default()
        }
    }

    fn state_in(dir: &std::path::Path) -> Arc<AppState> {
        Arc::new(AppState::new(config_in(dir)))
    }

    fn request(yaml: &str, filename: Option<&str>) -> Result<Json<RunRequest>, JsonRejection> {
        Ok(Json(RunRequest {
            yaml: yaml.to_string(),
            filename: filename.map(String::from),
        }))
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_design_writes_and_generates() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(dir.path());

        let Json(resp) = run_design(State(state), request(SAMPLE_YAML, Some("../../lab.yaml")))
            .await
            .unwrap();

        assert!(resp.ok, "{}", resp.output);
        // traversal stripped, file lands next to the configured system file
        assert!(dir.path().join("lab.yaml").is_file());
        assert!(dir.path().join("output").join("rack_layout.dot").is_file());
        assert_eq!(resp.generated.len(), 11);
        assert_eq!(resp.warnings.len(), 1);
        assert!(resp.output.contains("All files processed."));
    }

    #[tokio::test]
    async fn test_run_design_default_filename() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(dir.path());

        let Json(resp) = run_design(State(state), request("racks: [", None)).await.unwrap();

        assert!(!resp.ok);
        assert!(resp.output.starts_with("Error:"));
        assert!(dir.path().join("system.yaml").is_file());
    }

    #[tokio::test]
    async fn test_run_design_config_error_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(dir.path());

        let Json(resp) = run_design(State(state), request("wiring_layers: []\n", Some("x.yaml")))
            .await
            .unwrap();
        assert!(!resp.ok);
        assert!(resp.output.contains("'racks'"));
        assert!(resp.generated.is_empty());
    }

    #[tokio::test]
    async fn test_run_design_write_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(dir.path());
        Arc::get_mut(&mut state).unwrap().config.yaml_path =
            dir.path().join("missing-dir").join("system.yaml").display().to_string();

        let err = run_design(State(state), request("racks: []", None)).await.unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_design_timeout_kills_renderer() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("rendered.txt");
        let script = dir.path().join("slow-dot.sh");
        std::fs::write(
            &script,
            format!("#!/bin/sh\nsleep 2\necho done >> '{}'\n", marker.display()),
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let state = Arc::new(AppState::new(Config {
            dot_bin: script.display().to_string(),
            run_timeout_secs: 1,
            ..config_in(dir.path())
        }));

        let Json(resp) = run_design(State(state.clone()), request(SAMPLE_YAML, None))
            .await
            .unwrap();
        assert!(!resp.ok);
        assert_eq!(resp.output, "Error: run timed out after 1 seconds.");

        // the renderer was killed with the request, so nothing lands later
        tokio::time::sleep(std::time::Duration::from_secs(3)).await;
        assert!(!marker.exists());
        assert!(state.run_lock.try_lock().is_ok());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_design_waits_for_running_job() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(dir.path());

        let held = state.run_lock.clone().lock_owned().await;
        let task = tokio::spawn(run_design(State(state.clone()), request(SAMPLE_YAML, None)));

        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        assert!(!task.is_finished());
        assert!(!dir.path().join("output").exists());

        drop(held);
        let Json(resp) = task.await.unwrap().unwrap();
        assert!(resp.ok, "{}", resp.output);
        assert!(dir.path().join("output").join("rack_layout.dot").is_file());
    }
}

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_YAML: &str = "system.yaml";
const DEFAULT_OUTPUT_DIR: &str = "output";
const DEFAULT_PNG_DIR: &str = "pngs";
const DEFAULT_DOT_BIN: &str = "dot";
const DEFAULT_DPI: u32 = 300;
const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8765";
const DEFAULT_FRONTEND_DIR: &str = ".";
const DEFAULT_RUN_TIMEOUT_SECS: u64 = 120;

/// Config holds all application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub yaml_path: String,
    pub output_dir: String,
    pub png_dir: String,
    pub dot_bin: String,
    pub dpi: u32,
    pub listen_addr: String,
    pub frontend_dir: String,
    pub run_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            yaml_path: DEFAULT_YAML.to_string(),
            output_dir: DEFAULT_OUTPUT_DIR.to_string(),
            png_dir: DEFAULT_PNG_DIR.to_string(),
            dot_bin: DEFAULT_DOT_BIN.to_string(),
            dpi: DEFAULT_DPI,
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            frontend_dir: DEFAULT_FRONTEND_DIR.to_string(),
            run_timeout_secs: DEFAULT_RUN_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn load() -> Self {
        Self {
            yaml_path: get_env("RACKFORGE_YAML", DEFAULT_YAML),
            output_dir: get_env("RACKFORGE_OUTPUT_DIR", DEFAULT_OUTPUT_DIR),
            png_dir: get_env("RACKFORGE_PNG_DIR", DEFAULT_PNG_DIR),
            dot_bin: get_env("RACKFORGE_DOT_BIN", DEFAULT_DOT_BIN),
            dpi: get_env("RACKFORGE_DPI", "300")
                .parse()
                .unwrap_or(DEFAULT_DPI),
            listen_addr: get_env("LISTEN_ADDR", DEFAULT_LISTEN_ADDR),
            frontend_dir: get_env("FRONTEND_DIR", DEFAULT_FRONTEND_DIR),
            run_timeout_secs: get_env("RACKFORGE_RUN_TIMEOUT_SECS", "120")
                .parse()
                .unwrap_or(DEFAULT_RUN_TIMEOUT_SECS),
        }
    }

    /// Directory uploaded system descriptions are written to
    pub fn base_dir(&self) -> PathBuf {
        match Path::new(&self.yaml_path).parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// File name used when an upload names none
    pub fn default_filename(&self) -> String {
        Path::new(&self.yaml_path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(DEFAULT_YAML)
            .to_string()
    }

    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.run_timeout_secs)
    }
}

fn get_env(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

mod cables;
mod devices;
mod system;

pub use cables::*;
pub use devices::*;
pub use system::*;

use serde::Serialize;

/// RunResponse returned by the control server after a generation run
#[derive(Debug, Clone, Serialize)]
pub struct RunResponse {
    pub ok: bool,
    pub output: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub generated: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// RunRequest posted by the designer UI
#[derive(Debug, Clone, serde::Deserialize)]
pub struct RunRequest {
    #[serde(default)]
    pub yaml: String,
    #[serde(default)]
    pub filename: Option<String>,
}

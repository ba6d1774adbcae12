mod cable;
mod clusters;
mod config;
mod handlers;
mod layout;
mod models;
mod registry;
mod render;
mod reports;
mod router;
mod services;
mod utils;
mod wiring;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::signal;
use tokio::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Config;

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    /// Held for the whole of a run so concurrent requests never write into
    /// the output directory at the same time
    pub run_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            run_lock: Arc::new(Mutex::new(())),
        }
    }
}

#[derive(Parser)]
#[command(name = "rack-forge")]
#[command(about = "RackForge - rack elevations, wiring diagrams and cable planning")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// System description YAML (overrides RACKFORGE_YAML)
    #[arg(short = 'f', long = "yaml", global = true)]
    yaml: Option<String>,

    /// Directory for DOT files and reports (overrides RACKFORGE_OUTPUT_DIR)
    #[arg(short, long = "output-dir", global = true)]
    output_dir: Option<String>,

    /// Directory for rendered PNGs (overrides RACKFORGE_PNG_DIR)
    #[arg(long = "png-dir", global = true)]
    png_dir: Option<String>,

    /// Graphviz binary (overrides RACKFORGE_DOT_BIN)
    #[arg(long = "dot-bin", global = true)]
    dot_bin: Option<String>,

    /// Rasterization resolution (overrides RACKFORGE_DPI)
    #[arg(long, global = true)]
    dpi: Option<u32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate diagrams and reports, then render them to PNG (default)
    Generate {
        /// Only write DOT files and reports
        #[arg(long)]
        no_render: bool,
    },

    /// Render the DOT files already in the output directory
    Render,

    /// Serve the designer UI and the /run endpoint
    Serve {
        /// Listen address (overrides LISTEN_ADDR)
        #[arg(short, long)]
        listen: Option<String>,

        /// Static files directory (overrides FRONTEND_DIR)
        #[arg(long = "frontend-dir")]
        frontend_dir: Option<String>,
    },
}

impl Cli {
    fn apply(&self, cfg: &mut Config) {
        if let Some(yaml) = &self.yaml {
            cfg.yaml_path = yaml.clone();
        }
        if let Some(dir) = &self.output_dir {
            cfg.output_dir = dir.clone();
        }
        if let Some(dir) = &self.png_dir {
            cfg.png_dir = dir.clone();
        }
        if let Some(bin) = &self.dot_bin {
            cfg.dot_bin = bin.clone();
        }
        if let Some(dpi) = self.dpi {
            cfg.dpi = dpi;
        }
        if let Some(Commands::Serve { listen, frontend_dir }) = &self.command {
            if let Some(addr) = listen {
                cfg.listen_addr = addr.clone();
            }
            if let Some(dir) = frontend_dir {
                cfg.frontend_dir = dir.clone();
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rack_forge=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut cfg = Config::load();
    cli.apply(&mut cfg);

    match cli.command.unwrap_or(Commands::Generate { no_render: false }) {
        Commands::Generate { no_render } => generate(&cfg, no_render).await,
        Commands::Render => render(&cfg).await,
        Commands::Serve { .. } => serve(cfg).await,
    }
}

async fn generate(cfg: &Config, no_render: bool) -> anyhow::Result<()> {
    let yaml_path = PathBuf::from(&cfg.yaml_path);

    if no_render {
        let output_dir = PathBuf::from(&cfg.output_dir);
        let path = yaml_path.clone();
        let summary = tokio::task::spawn_blocking(move || {
            let system = services::load_system(&path)?;
            services::run(&system, &output_dir)
        })
        .await
        .context("Generation task failed")??;
        let report = services::PipelineReport {
            summary,
            ..Default::default()
        };
        println!("{}", report.output_text(&yaml_path));
        return Ok(());
    }

    let guard = Arc::new(Mutex::new(())).lock_owned().await;
    let report = services::generate_and_render(cfg, &yaml_path, guard).await?;
    println!("{}", report.output_text(&yaml_path));
    Ok(())
}

async fn render(cfg: &Config) -> anyhow::Result<()> {
    let summary = render::render_dot_files(
        Path::new(&cfg.output_dir),
        Path::new(&cfg.png_dir),
        &cfg.dot_bin,
        cfg.dpi,
    )
    .await?;
    tracing::info!(
        "Rendered {} files ({} failed)",
        summary.rendered.len(),
        summary.warnings.len()
    );
    Ok(())
}

async fn serve(cfg: Config) -> anyhow::Result<()> {
    tracing::info!("Starting RackForge Server");
    tracing::info!("System file: {}", cfg.yaml_path);
    tracing::info!("Output: {} (PNGs: {})", cfg.output_dir, cfg.png_dir);
    tracing::info!("Serving: {}", cfg.frontend_dir);

    let frontend_dir = cfg.frontend_dir.clone();
    let listen_addr = cfg.listen_addr.clone();
    let state = Arc::new(AppState::new(cfg));

    // Build router
    let app = router::build(state, &frontend_dir);

    // Start server
    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    tracing::info!("RackForge listening on http://{}", listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("RackForge shutting down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => { sig.recv().await; }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

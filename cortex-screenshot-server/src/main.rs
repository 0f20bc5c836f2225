use anyhow::Result;
use clap::Parser;
use cortex::{logging, BridgeConfig};
use cortex_screenshot_server::{build_router, http_dispatcher};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "cortex-screenshot-server")]
#[command(about = "HTTP server that serves iOS Simulator screenshots as base64 JSON")]
struct Args {
    /// Host to bind to
    #[arg(long, default_value = "0.0.0.0", env = "CORTEX_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8090", env = "CORTEX_PORT")]
    port: u16,

    /// JSON file with bridge settings
    #[arg(long, env = "CORTEX_CONFIG")]
    config: Option<PathBuf>,

    /// Seconds to wait for the capture command
    #[arg(long, env = "CORTEX_SCREENSHOT_TIMEOUT_SECS")]
    screenshot_timeout_secs: Option<u64>,

    /// Directory for temporary screenshot files
    #[arg(long, env = "CORTEX_SCREENSHOT_DIR")]
    screenshot_dir: Option<PathBuf>,
}

impl Args {
    fn bridge_config(&self) -> Result<BridgeConfig> {
        let mut config = match &self.config {
            Some(path) => BridgeConfig::from_file(path)?,
            None => BridgeConfig::default(),
        };
        if let Some(secs) = self.screenshot_timeout_secs {
            config.screenshot_timeout_secs = secs;
        }
        if let Some(dir) = &self.screenshot_dir {
            config.screenshot_dir = dir.clone();
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::install_panic_hook("cortex-screenshot-server");
    logging::init_logging("cortex-screenshot-server.log")?;

    info!("🚀 Starting cortex-screenshot-server v{}", env!("CARGO_PKG_VERSION"));

    let config = args.bridge_config()?;
    info!("📲 Capture command: {}", config.screenshot_command.join(" "));
    let dispatcher = http_dispatcher(config)?;
    let app = build_router(dispatcher);

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("✅ Server listening on http://{}", addr);
    info!("📱 Simulator app should connect to: http://localhost:{}", args.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    info!("🛑 Server stopped");
    Ok(())
}
